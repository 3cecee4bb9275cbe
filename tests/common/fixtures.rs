use chrono::Utc;
use serde_json::{json, Value};

use facial_analysis_backend::analysis::landmarks::INDEX_TABLE;
use facial_analysis_backend::analysis::reference::reference_face;
use facial_analysis_backend::analysis::{analyze, Landmark, LandmarkSet};
use facial_analysis_backend::store::operations::analyses::StoredAnalysis;
use facial_analysis_backend::store::Store;

pub fn landmarks_payload(points: &[Landmark]) -> Value {
    json!({ "landmarks": points })
}

pub fn reference_payload() -> Value {
    landmarks_payload(reference_face().points())
}

/// 参考脸上把下颌收窄、眼角下垂，制造几个确定的缺陷
pub fn flawed_face() -> LandmarkSet {
    let t = &INDEX_TABLE;
    let mut face = reference_face();
    let points = face.points_mut();
    points[t.right_gonion].x += 0.06;
    points[t.left_gonion].x -= 0.06;
    points[t.right_eye_outer].y += 0.02;
    points[t.left_eye_outer].y += 0.02;
    face
}

pub fn seed_analysis(store: &Store, face: &LandmarkSet) -> StoredAnalysis {
    let record = StoredAnalysis {
        id: uuid::Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        landmark_count: face.len(),
        result: analyze(face),
    };
    store.insert_analysis(&record).expect("seed analysis");
    record
}
