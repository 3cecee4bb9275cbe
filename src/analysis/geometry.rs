//! 几何基础运算
//!
//! 只处理归一化坐标上的向量计算，不涉及任何面部语义。

use crate::analysis::landmarks::INDEX_TABLE;
use crate::analysis::types::{Landmark, LandmarkSet};

/// 向量模长低于此值视为退化
const DEGENERATE_MAGNITUDE: f64 = 1e-12;

pub fn distance_2d(a: &Landmark, b: &Landmark) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

pub fn distance_3d(a: &Landmark, b: &Landmark) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

/// 以 `b` 为顶点、射线 b→a 与 b→c 之间的夹角（度，忽略 z）。
///
/// 余弦值在 `acos` 前截断到 [-1, 1]；任一射线长度接近 0 时返回 0°。
pub fn angle_at_vertex(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let (v1x, v1y) = (a.x - b.x, a.y - b.y);
    let (v2x, v2y) = (c.x - b.x, c.y - b.y);
    angle_between(v1x, v1y, v2x, v2y)
}

/// 两个二维向量的夹角（度），退化向量返回 0°。
pub fn angle_between(v1x: f64, v1y: f64, v2x: f64, v2y: f64) -> f64 {
    let mag = (v1x * v1x + v1y * v1y).sqrt() * (v2x * v2x + v2y * v2y).sqrt();
    if mag < DEGENERATE_MAGNITUDE {
        return 0.0;
    }
    let cos = ((v1x * v2x + v1y * v2y) / mag).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

pub fn midpoint(a: &Landmark, b: &Landmark) -> Landmark {
    Landmark::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0)
}

pub fn centroid(points: &[Landmark]) -> Landmark {
    if points.is_empty() {
        return Landmark::default();
    }
    let n = points.len() as f64;
    let (sx, sy, sz) = points
        .iter()
        .fold((0.0, 0.0, 0.0), |(sx, sy, sz), p| (sx + p.x, sy + p.y, sz + p.z));
    Landmark::new(sx / n, sy / n, sz / n)
}

/// 眼角倾斜角（度），外眼角高于内眼角时为正，取双眼平均。
///
/// 图像坐标 y 轴向下，右眼（图像左侧）外眼角 x 更小，左眼外眼角 x 更大，
/// 所以两只眼的水平分量方向相反。
pub fn canthal_tilt(landmarks: &LandmarkSet) -> Option<f64> {
    let t = &INDEX_TABLE;
    let r_outer = landmarks.get(t.right_eye_outer)?;
    let r_inner = landmarks.get(t.right_eye_inner)?;
    let l_outer = landmarks.get(t.left_eye_outer)?;
    let l_inner = landmarks.get(t.left_eye_inner)?;

    let right = (r_inner.y - r_outer.y)
        .atan2(r_inner.x - r_outer.x)
        .to_degrees();
    let left = (l_inner.y - l_outer.y)
        .atan2(l_outer.x - l_inner.x)
        .to_degrees();

    Some((right + left) / 2.0)
}
