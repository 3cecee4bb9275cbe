use axum::extract::{DefaultBodyLimit, Path, State};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analysis::catalog::{
    ideal_range_description, CATEGORY_WEIGHTS, FEATURE_CATALOG, RARITY_FLOOR, RARITY_LADDER,
};
use crate::analysis::{self, Category, FeatureAnalysis, Importance, Landmark, LandmarkSet};
use crate::constants::MAX_ANALYSIS_BODY_BYTES;
use crate::extractors::{JsonBody, QueryParams};
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::analyses::StoredAnalysis;
use crate::validation::{resolve_flaw_limit, validate_analysis_id, validate_landmarks};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_analysis))
        .route("/catalog", get(catalog))
        .route("/:id", get(get_analysis))
        .route("/:id/flaws", get(get_flaws))
        .layer(DefaultBodyLimit::max(MAX_ANALYSIS_BODY_BYTES))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    landmarks: Vec<Landmark>,
}

async fn create_analysis(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnalyzeRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let settings = &state.config().analysis;
    validate_landmarks(&req.landmarks, settings).map_err(|msg| AppError::validation(&msg))?;

    let landmark_count = req.landmarks.len();
    let result = analysis::analyze(&LandmarkSet::new(req.landmarks));

    let record = StoredAnalysis {
        id: uuid::Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        landmark_count,
        result,
    };

    if settings.persist_results {
        state.store().insert_analysis(&record)?;
    }

    tracing::info!(
        analysis_id = %record.id,
        landmark_count,
        overall_score = record.result.overall_score,
        persisted = settings.persist_results,
        "Analysis created"
    );

    Ok(created(record))
}

async fn get_analysis(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    validate_analysis_id(&id).map_err(AppError::validation)?;
    let record = state
        .store()
        .get_analysis(&id)?
        .ok_or_else(|| AppError::not_found("Analysis not found"))?;
    Ok(ok(record))
}

#[derive(Debug, Deserialize)]
struct FlawsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlawsResponse {
    id: String,
    overall_score: f64,
    flaws: Vec<FeatureAnalysis>,
}

/// 下游推荐服务使用的缺陷列表
async fn get_flaws(
    Path(id): Path<String>,
    QueryParams(query): QueryParams<FlawsQuery>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    validate_analysis_id(&id).map_err(AppError::validation)?;
    let record = state.store().require_analysis(&id)?;

    let limit = resolve_flaw_limit(query.limit);
    let flaws = record.result.top_flaws(limit).into_iter().cloned().collect();

    Ok(ok(FlawsResponse {
        id: record.id,
        overall_score: record.result.overall_score,
        flaws,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFeature {
    id: &'static str,
    name: &'static str,
    category: Category,
    importance: Importance,
    weight: f64,
    ideal_range: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryWeight {
    category: Category,
    weight: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RarityBucket {
    min_score: Option<f64>,
    label: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogResponse {
    features: Vec<CatalogFeature>,
    category_weights: Vec<CategoryWeight>,
    rarity: Vec<RarityBucket>,
}

async fn catalog() -> impl axum::response::IntoResponse {
    let features = FEATURE_CATALOG
        .iter()
        .map(|def| CatalogFeature {
            id: def.id,
            name: def.name,
            category: def.category,
            importance: def.importance,
            weight: def.importance.weight(),
            ideal_range: ideal_range_description(def.measurement),
        })
        .collect();

    let category_weights = CATEGORY_WEIGHTS
        .iter()
        .map(|&(category, weight)| CategoryWeight { category, weight })
        .collect();

    let rarity = RARITY_LADDER
        .iter()
        .map(|&(threshold, label)| RarityBucket {
            min_score: Some(threshold),
            label,
        })
        .chain(std::iter::once(RarityBucket {
            min_score: None,
            label: RARITY_FLOOR,
        }))
        .collect();

    ok(CatalogResponse {
        features,
        category_weights,
        rarity,
    })
}
