mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::app::{spawn_test_app, spawn_with};
use common::fixtures::{flawed_face, landmarks_payload, reference_payload, seed_analysis};
use common::http::{assert_json_error, assert_status_ok_json, get_json, post_json, request, response_json};
use facial_analysis_backend::analysis::landmarks::INDEX_TABLE;
use facial_analysis_backend::analysis::reference::reference_face;
use facial_analysis_backend::analysis::Landmark;
use facial_analysis_backend::config::AnalysisEnvConfig;

#[tokio::test]
async fn it_create_analysis_persists_and_reads_back() {
    let app = spawn_test_app().await;

    let (status, body) = post_json(&app.app, "/api/analysis", reference_payload()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_status_ok_json(status, &body);

    let data = &body["data"];
    let id = data["id"].as_str().expect("id").to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(data["landmarkCount"], 478);
    assert!(data["createdAt"].is_string());

    let result = &data["result"];
    assert!(result["overallScore"].as_f64().unwrap() >= 9.9);
    assert_eq!(result["rarity"], "1 in 1.2M+");
    assert_eq!(result["features"].as_array().unwrap().len(), 14);
    for key in ["harm", "misc", "angu", "dimo"] {
        assert!(result["categoryScores"][key].is_number(), "missing {key}");
    }
    assert!(result["measurements"]["facialThirds"]["upper"].is_number());
    assert_eq!(result["features"][0]["category"], "HARM");
    assert_eq!(result["features"][0]["importance"], "highest");
    assert!(result["features"][0]["isStrength"].as_bool().unwrap());

    let (status, fetched) = get_json(&app.app, &format!("/api/analysis/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["id"], id.as_str());
    assert_eq!(fetched["data"]["result"]["overallScore"], result["overallScore"]);
    assert_eq!(app.state.store().count_analyses(), 1);
}

#[tokio::test]
async fn it_empty_landmarks_rejected() {
    let app = spawn_test_app().await;

    let (status, body) = post_json(&app.app, "/api/analysis", json!({ "landmarks": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");
}

#[tokio::test]
async fn it_short_landmarks_need_partial_mode() {
    let short = vec![Landmark::flat(0.5, 0.5); 100];

    let strict = spawn_test_app().await;
    let (status, body) = post_json(&strict.app, "/api/analysis", landmarks_payload(&short)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");

    let lenient = spawn_with(AnalysisEnvConfig {
        allow_partial_landmarks: true,
        ..AnalysisEnvConfig::default()
    })
    .await;
    let (status, body) = post_json(&lenient.app, "/api/analysis", landmarks_payload(&short)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["landmarkCount"], 100);
    // 缺失的测量项全部降级为默认值，比例尺无法标定
    assert_eq!(body["data"]["result"]["measurements"]["scaleFactor"], 0.0);
}

#[tokio::test]
async fn it_oversized_and_out_of_range_rejected() {
    let app = spawn_test_app().await;

    let too_many = vec![Landmark::flat(0.5, 0.5); app.config.analysis.max_landmarks + 1];
    let (status, body) = post_json(&app.app, "/api/analysis", landmarks_payload(&too_many)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");

    let mut wild = reference_face().into_points();
    wild[200] = Landmark::flat(1e9, 0.5);
    let (status, body) = post_json(&app.app, "/api/analysis", landmarks_payload(&wild)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("200"));
}

#[tokio::test]
async fn it_malformed_body_rejected_with_trace_id() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/analysis",
        Some(json!({ "landmarks": [{ "x": "left", "y": 0.5 }] })),
        &[("x-request-id", "analysis-test-1".to_string())],
    )
    .await;
    let (status, headers, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REQUEST_BODY");
    assert_eq!(body["traceId"], "analysis-test-1");
    assert_eq!(headers["x-request-id"], "analysis-test-1");
}

#[tokio::test]
async fn it_missing_z_defaults_to_zero() {
    let app = spawn_test_app().await;

    let points: Vec<_> = reference_face()
        .points()
        .iter()
        .map(|p| json!({ "x": p.x, "y": p.y }))
        .collect();
    let (status, body) = post_json(&app.app, "/api/analysis", json!({ "landmarks": points })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["result"]["rarity"], "1 in 1.2M+");
}

#[tokio::test]
async fn it_collapsed_face_rejected() {
    let app = spawn_test_app().await;

    let blank = vec![Landmark::flat(0.5, 0.5); 478];
    let (status, body) = post_json(&app.app, "/api/analysis", landmarks_payload(&blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");

    let t = &INDEX_TABLE;
    let mut face = reference_face();
    let right = face.get(t.right_cheekbone).unwrap();
    face.points_mut()[t.left_cheekbone] = right;
    let (status, body) = post_json(&app.app, "/api/analysis", landmarks_payload(face.points())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");
    assert_eq!(app.state.store().count_analyses(), 0);
}

#[tokio::test]
async fn it_unknown_and_invalid_ids() {
    let app = spawn_test_app().await;

    let missing = uuid::Uuid::new_v4();
    let (status, body) = get_json(&app.app, &format!("/api/analysis/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");

    let (status, body) = get_json(&app.app, &format!("/api/analysis/{missing}/flaws")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");

    let (status, body) = get_json(&app.app, "/api/analysis/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");
}

#[tokio::test]
async fn it_flaws_are_sorted_negative_deviations() {
    let app = spawn_test_app().await;
    let record = seed_analysis(app.state.store(), &flawed_face());

    let (status, body) = get_json(&app.app, &format!("/api/analysis/{}/flaws", record.id)).await;
    assert_eq!(status, StatusCode::OK);
    let flaws = body["data"]["flaws"].as_array().unwrap();
    assert!(!flaws.is_empty() && flaws.len() <= 3);

    let magnitudes: Vec<f64> = flaws
        .iter()
        .map(|f| {
            assert_eq!(f["isStrength"], false);
            let d = f["deviation"].as_f64().unwrap();
            assert!(d < 0.0);
            d.abs()
        })
        .collect();
    assert!(magnitudes.windows(2).all(|w| w[0] >= w[1]));

    let all_flaw_ids: Vec<String> = record
        .result
        .top_flaws(14)
        .iter()
        .map(|f| f.id.clone())
        .collect();
    assert!(all_flaw_ids.contains(&"bigonial".to_string()));
    assert!(all_flaw_ids.contains(&"canthal_tilt".to_string()));
}

#[tokio::test]
async fn it_flaws_limit_is_clamped_and_validated() {
    let app = spawn_test_app().await;
    let record = seed_analysis(app.state.store(), &flawed_face());
    let base = format!("/api/analysis/{}/flaws", record.id);

    let (status, body) = get_json(&app.app, &format!("{base}?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["flaws"].as_array().unwrap().len(), 1);

    let (status, body) = get_json(&app.app, &format!("{base}?limit=99")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["flaws"].as_array().unwrap().len(),
        record.result.top_flaws(14).len()
    );

    let (status, body) = get_json(&app.app, &format!("{base}?limit=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "VALIDATION_ERROR");
}

#[tokio::test]
async fn it_catalog_lists_features_weights_and_rarity() {
    let app = spawn_test_app().await;

    let (status, body) = get_json(&app.app, "/api/analysis/catalog").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["features"].as_array().unwrap().len(), 14);
    let weight_sum: f64 = data["categoryWeights"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["weight"].as_f64().unwrap())
        .sum();
    assert!((weight_sum - 1.0).abs() < 1e-12);

    let rarity = data["rarity"].as_array().unwrap();
    assert_eq!(rarity.len(), 15);
    assert_eq!(rarity[0]["label"], "1 in 1.2M+");
    assert!(rarity[14]["minScore"].is_null());

    let ipd = data["features"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["id"] == "ipd")
        .unwrap();
    assert_eq!(ipd["idealRange"], "58–68 mm (ideal 63 mm)");
}

#[tokio::test]
async fn it_persistence_can_be_disabled() {
    let app = spawn_with(AnalysisEnvConfig {
        persist_results: false,
        ..AnalysisEnvConfig::default()
    })
    .await;

    let (status, body) = post_json(&app.app, "/api/analysis", reference_payload()).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = get_json(&app.app, &format!("/api/analysis/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.state.store().count_analyses(), 0);
}

#[tokio::test]
async fn it_unknown_route_is_json_404() {
    let app = spawn_test_app().await;

    let (status, body) = get_json(&app.app, "/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
    assert!(body["traceId"].is_string());
}
