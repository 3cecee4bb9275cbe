//! 请求输入校验
//!
//! 分析核心对任意长度的关键点列表都能降级运行，这里在 HTTP 边界上拒绝明显无效的输入。

use crate::analysis::geometry::distance_2d;
use crate::analysis::landmarks::{required_landmark_count, INDEX_TABLE};
use crate::analysis::measurements::MIN_CALIBRATION_WIDTH;
use crate::analysis::Landmark;
use crate::config::AnalysisEnvConfig;
use crate::constants::{DEFAULT_FLAW_LIMIT, MAX_COORDINATE_MAGNITUDE, MAX_FLAW_LIMIT};

pub fn validate_landmarks(landmarks: &[Landmark], config: &AnalysisEnvConfig) -> Result<(), String> {
    if landmarks.is_empty() {
        return Err("关键点列表不能为空".to_string());
    }
    if landmarks.len() > config.max_landmarks {
        return Err(format!("关键点数量不能超过{}个", config.max_landmarks));
    }

    let required = required_landmark_count();
    if landmarks.len() < required && !config.allow_partial_landmarks {
        return Err(format!(
            "关键点数量不足：需要至少{}个，实际{}个",
            required,
            landmarks.len()
        ));
    }

    if let Some(idx) = landmarks.iter().position(|p| !is_valid_coordinate(p)) {
        return Err(format!("第{}个关键点坐标无效", idx));
    }

    validate_face_extent(landmarks)
}

/// 脸宽或脸高塌缩为 0 的输入无法标定，所有测量都会退化为默认值。
/// 部分输入缺少对应关键点时跳过。
fn validate_face_extent(landmarks: &[Landmark]) -> Result<(), String> {
    let t = &INDEX_TABLE;

    if let (Some(right), Some(left)) = (landmarks.get(t.right_cheekbone), landmarks.get(t.left_cheekbone)) {
        if distance_2d(right, left) < MIN_CALIBRATION_WIDTH {
            return Err("颧骨关键点重合，无法标定脸宽".to_string());
        }
    }

    if let (Some(forehead), Some(chin)) = (landmarks.get(t.forehead), landmarks.get(t.chin)) {
        if (chin.y - forehead.y).abs() < MIN_CALIBRATION_WIDTH {
            return Err("额头到下巴的高度为零".to_string());
        }
    }

    Ok(())
}

fn is_valid_coordinate(p: &Landmark) -> bool {
    p.is_finite()
        && p.x.abs() <= MAX_COORDINATE_MAGNITUDE
        && p.y.abs() <= MAX_COORDINATE_MAGNITUDE
        && p.z.abs() <= MAX_COORDINATE_MAGNITUDE
}

/// 缺陷列表数量：缺省为 3，超过目录大小时截断
pub fn resolve_flaw_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_FLAW_LIMIT).min(MAX_FLAW_LIMIT)
}

/// 分析 ID 必须是 UUID
pub fn validate_analysis_id(id: &str) -> Result<(), &'static str> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| "分析ID格式无效")
}
