//! 从关键点提取人体测量值
//!
//! 先用颧宽做尺度标定，再按索引表逐项计算距离、比例和角度。
//! 每一项在关键点缺失或出现非有限值时退化为文档中的默认值，不会中断整次分析。

use crate::analysis::catalog::{ideal_range, MeasurementKey};
use crate::analysis::geometry::{angle_at_vertex, angle_between, canthal_tilt, distance_2d, midpoint};
use crate::analysis::landmarks::{INDEX_TABLE, MIDLINE_INDICES, NOMINAL_LANDMARK_COUNT, SYMMETRY_PAIRS};
use crate::analysis::types::{FacialMeasurements, FacialThirds, LandmarkSet};

/// 人群平均颧宽（毫米），作为单目输入下唯一的尺度参考。
///
/// 单张 2D 图像没有真实的度量尺度，所有毫米值都假设被测者颧宽恰为 140mm，
/// 精度取决于这一假设与实际颧宽的差距。
pub const REFERENCE_BIZYGOMATIC_MM: f64 = 140.0;

pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// 鼻额角的合理区间（度），区间外的原始角度视为深度噪声，改用深度启发式
pub const NASOFRONTAL_PLAUSIBLE: (f64, f64) = (90.0, 170.0);
pub const NASOFRONTAL_DEFAULT: f64 = 130.0;
/// 深度差小于此值时无法区分鼻部突出度与额部斜度
const NASOFRONTAL_FLAT_EPSILON: f64 = 0.001;
/// 经验标定常数
const NASOFRONTAL_FALLBACK_BASE: f64 = 125.0;
const NASOFRONTAL_FALLBACK_GAIN: f64 = 200.0;

/// 人中长度为 0 时的颏人中比（即理想值）
pub const CHIN_PHILTRUM_FALLBACK: f64 = 2.0;

/// 对称性：配对点到中线的平均水平距离低于此值时跳过
const SYMMETRY_MIN_MIDLINE_DISTANCE: f64 = 0.01;
/// 对称性：垂直错位的归一化基准（约 15% 脸宽）
const SYMMETRY_VERTICAL_REFERENCE: f64 = 0.15;
const SYMMETRY_HORIZONTAL_WEIGHT: f64 = 0.7;
const SYMMETRY_VERTICAL_WEIGHT: f64 = 0.3;
const SYMMETRY_DECAY: f64 = 0.5;

const EPSILON: f64 = 1e-9;

/// 颧宽低于此值（归一化单位）时无法标定
pub const MIN_CALIBRATION_WIDTH: f64 = 1e-6;

pub fn extract(landmarks: &LandmarkSet) -> FacialMeasurements {
    if landmarks.len() != NOMINAL_LANDMARK_COUNT {
        tracing::warn!(
            count = landmarks.len(),
            expected = NOMINAL_LANDMARK_COUNT,
            "Landmark count differs from nominal contract, missing indices will use defaults"
        );
    }

    let t = &INDEX_TABLE;
    let defaults = default_measurements();

    let bizygomatic_norm = dist(landmarks, t.right_cheekbone, t.left_cheekbone);
    let scale = calibrate(bizygomatic_norm);
    let mm = |d: Option<f64>| -> Option<f64> { Some(d? * scale?) };

    let ipd_norm = dist(landmarks, t.right_iris, t.left_iris);
    let right_eye_norm = dist(landmarks, t.right_eye_outer, t.right_eye_inner);
    let left_eye_norm = dist(landmarks, t.left_eye_inner, t.left_eye_outer);
    let eye_width_norm = match (right_eye_norm, left_eye_norm) {
        (Some(r), Some(l)) => Some((r + l) / 2.0),
        _ => None,
    };
    let philtrum_norm = dist(landmarks, t.nose_base, t.upper_lip);
    let nasal_width_norm = dist(landmarks, t.right_ala, t.left_ala);

    let eye_aspect_ratio = match (
        dist(landmarks, t.right_eye_top, t.right_eye_bottom).zip(right_eye_norm),
        dist(landmarks, t.left_eye_top, t.left_eye_bottom).zip(left_eye_norm),
    ) {
        (Some((rv, rh)), Some((lv, lh))) => safe_ratio(rv, rh)
            .zip(safe_ratio(lv, lh))
            .map(|(r, l)| (r + l) / 2.0),
        _ => None,
    };

    let midface_ratio = (|| {
        let pupils = midpoint(&landmarks.get(t.right_iris)?, &landmarks.get(t.left_iris)?);
        let lip = landmarks.get(t.upper_lip)?;
        safe_ratio(ipd_norm?, distance_2d(&pupils, &lip))
    })();

    let nasal_index = (|| {
        let height = dist(landmarks, t.nasion, t.nose_base)?;
        Some(safe_ratio(nasal_width_norm?, height)? * 100.0)
    })();

    let mut fallbacks = Fallbacks::default();

    FacialMeasurements {
        ipd: fallbacks.resolve(MeasurementKey::Ipd, mm(ipd_norm), defaults.ipd),
        esr: fallbacks.resolve(
            MeasurementKey::Esr,
            ipd_norm
                .zip(bizygomatic_norm)
                .and_then(|(ipd, width)| safe_ratio(ipd, width))
                .map(|r| r * 100.0),
            defaults.esr,
        ),
        pfl: fallbacks.resolve(MeasurementKey::Pfl, mm(eye_width_norm), defaults.pfl),
        eye_aspect_ratio: resolve("eye_aspect_ratio", eye_aspect_ratio, defaults.eye_aspect_ratio),
        intercanthal_width: resolve(
            "intercanthal_width",
            mm(dist(landmarks, t.right_eye_inner, t.left_eye_inner)),
            defaults.intercanthal_width,
        ),
        canthal_tilt: fallbacks.resolve(
            MeasurementKey::CanthalTilt,
            canthal_tilt(landmarks),
            defaults.canthal_tilt,
        ),
        fwhr: fallbacks.resolve(
            MeasurementKey::Fwhr,
            bizygomatic_norm
                .zip(dist(landmarks, t.glabella, t.upper_lip))
                .and_then(|(w, h)| safe_ratio(w, h)),
            defaults.fwhr,
        ),
        facial_index: resolve(
            "facial_index",
            dist(landmarks, t.forehead, t.chin)
                .zip(bizygomatic_norm)
                .and_then(|(h, w)| safe_ratio(h, w)),
            defaults.facial_index,
        ),
        facial_thirds: fallbacks.resolve_thirds(third_heights(landmarks).and_then(thirds_from_heights)),
        philtrum_length: fallbacks.resolve(
            MeasurementKey::PhiltrumLength,
            mm(philtrum_norm),
            defaults.philtrum_length,
        ),
        chin_philtrum_ratio: fallbacks.resolve(
            MeasurementKey::ChinPhiltrumRatio,
            chin_philtrum_ratio(dist(landmarks, t.lower_lip, t.chin), philtrum_norm),
            defaults.chin_philtrum_ratio,
        ),
        midface_ratio: fallbacks.resolve(MeasurementKey::MidfaceRatio, midface_ratio, defaults.midface_ratio),
        mouth_width: resolve(
            "mouth_width",
            mm(dist(landmarks, t.right_mouth_corner, t.left_mouth_corner)),
            defaults.mouth_width,
        ),
        nasal_width: resolve("nasal_width", mm(nasal_width_norm), defaults.nasal_width),
        nasal_index: fallbacks.resolve(MeasurementKey::NasalIndex, nasal_index, defaults.nasal_index),
        gonial_angle: fallbacks.resolve(
            MeasurementKey::GonialAngle,
            gonial_angle(landmarks),
            defaults.gonial_angle,
        ),
        nasofrontal_angle: fallbacks.resolve(
            MeasurementKey::NasofrontalAngle,
            nasofrontal_angle(landmarks),
            defaults.nasofrontal_angle,
        ),
        bizygomatic: fallbacks.resolve(
            MeasurementKey::Bizygomatic,
            mm(bizygomatic_norm),
            defaults.bizygomatic,
        ),
        bigonial: fallbacks.resolve(
            MeasurementKey::Bigonial,
            mm(dist(landmarks, t.right_gonion, t.left_gonion)),
            defaults.bigonial,
        ),
        symmetry_score: fallbacks.resolve(
            MeasurementKey::SymmetryScore,
            midline_x(landmarks).and_then(|midline| paired_symmetry(landmarks, midline)),
            defaults.symmetry_score,
        ),
        golden_ratio_adherence: resolve(
            "golden_ratio_adherence",
            golden_ratio_adherence(landmarks, bizygomatic_norm, ipd_norm, eye_width_norm),
            defaults.golden_ratio_adherence,
        ),
        scale_factor: scale.unwrap_or(0.0),
        fallbacks: fallbacks.0,
    }
}

/// 关键点不可用时各测量项的默认值。
///
/// 参与评分的项取理想区间中的理想值；仅供参考的宽度类指标取 0；
/// 三庭取等分，对称性取 1。
pub fn default_measurements() -> FacialMeasurements {
    let ideal = |key: MeasurementKey, fallback: f64| ideal_range(key).map(|r| r.ideal).unwrap_or(fallback);

    FacialMeasurements {
        ipd: ideal(MeasurementKey::Ipd, 63.0),
        esr: ideal(MeasurementKey::Esr, 45.0),
        pfl: ideal(MeasurementKey::Pfl, 31.0),
        eye_aspect_ratio: 0.0,
        intercanthal_width: 0.0,
        canthal_tilt: ideal(MeasurementKey::CanthalTilt, 6.0),
        fwhr: ideal(MeasurementKey::Fwhr, 2.0),
        facial_index: 0.0,
        facial_thirds: FacialThirds::EQUAL,
        philtrum_length: ideal(MeasurementKey::PhiltrumLength, 12.0),
        chin_philtrum_ratio: CHIN_PHILTRUM_FALLBACK,
        midface_ratio: ideal(MeasurementKey::MidfaceRatio, 1.0),
        mouth_width: 0.0,
        nasal_width: 0.0,
        nasal_index: ideal(MeasurementKey::NasalIndex, 70.0),
        gonial_angle: ideal(MeasurementKey::GonialAngle, 125.0),
        nasofrontal_angle: NASOFRONTAL_DEFAULT,
        bizygomatic: REFERENCE_BIZYGOMATIC_MM,
        bigonial: ideal(MeasurementKey::Bigonial, 105.0),
        symmetry_score: 1.0,
        golden_ratio_adherence: 0.0,
        scale_factor: 0.0,
        fallbacks: Vec::new(),
    }
}

fn calibrate(bizygomatic_norm: Option<f64>) -> Option<f64> {
    match bizygomatic_norm {
        Some(width) if width > MIN_CALIBRATION_WIDTH => Some(REFERENCE_BIZYGOMATIC_MM / width),
        Some(width) => {
            tracing::warn!(width, "Bizygomatic width is degenerate, physical measurements will use defaults");
            None
        }
        None => {
            tracing::warn!("Cheekbone landmarks missing, physical measurements will use defaults");
            None
        }
    }
}

/// 记录退化为默认值的评分项
#[derive(Debug, Default)]
struct Fallbacks(Vec<MeasurementKey>);

impl Fallbacks {
    fn resolve(&mut self, key: MeasurementKey, value: Option<f64>, default: f64) -> f64 {
        if !value.is_some_and(f64::is_finite) {
            self.0.push(key);
        }
        resolve(key.as_str(), value, default)
    }

    fn resolve_thirds(&mut self, thirds: Option<FacialThirds>) -> FacialThirds {
        thirds.unwrap_or_else(|| {
            tracing::debug!(measurement = "facial_thirds", "Face height unavailable, using default");
            self.0.push(MeasurementKey::FacialThirds);
            FacialThirds::EQUAL
        })
    }
}

fn resolve(name: &'static str, value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        Some(v) => {
            tracing::debug!(measurement = name, value = %v, "Non-finite measurement, using default");
            default
        }
        None => {
            tracing::debug!(measurement = name, "Landmarks unavailable, using default");
            default
        }
    }
}

fn dist(landmarks: &LandmarkSet, a: usize, b: usize) -> Option<f64> {
    Some(distance_2d(&landmarks.get(a)?, &landmarks.get(b)?))
}

fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator.abs() < EPSILON {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// 额→鼻根→鼻底→下巴三段的垂直长度占比，总高为三段之和。
///
/// 总高为 0 时返回等分。
pub fn facial_thirds(landmarks: &LandmarkSet) -> Option<FacialThirds> {
    let heights = third_heights(landmarks)?;
    Some(thirds_from_heights(heights).unwrap_or(FacialThirds::EQUAL))
}

fn third_heights(landmarks: &LandmarkSet) -> Option<[f64; 3]> {
    let t = &INDEX_TABLE;
    let forehead = landmarks.get(t.forehead)?.y;
    let nasion = landmarks.get(t.nasion)?.y;
    let nose_base = landmarks.get(t.nose_base)?.y;
    let chin = landmarks.get(t.chin)?.y;

    Some([
        (nasion - forehead).abs(),
        (nose_base - nasion).abs(),
        (chin - nose_base).abs(),
    ])
}

fn thirds_from_heights([upper, middle, lower]: [f64; 3]) -> Option<FacialThirds> {
    let total = upper + middle + lower;
    if total < EPSILON {
        return None;
    }

    Some(FacialThirds {
        upper: upper / total,
        middle: middle / total,
        lower: lower / total,
    })
}

fn chin_philtrum_ratio(chin_height: Option<f64>, philtrum: Option<f64>) -> Option<f64> {
    safe_ratio(chin_height?, philtrum?)
}

/// 下颌角：左右两侧分别计算 ∠(下巴, 下颌角点, 下颌支) 后取平均。
pub fn gonial_angle(landmarks: &LandmarkSet) -> Option<f64> {
    let t = &INDEX_TABLE;
    let chin = landmarks.get(t.chin)?;
    let right = angle_at_vertex(&chin, &landmarks.get(t.right_gonion)?, &landmarks.get(t.right_ramus)?);
    let left = angle_at_vertex(&chin, &landmarks.get(t.left_gonion)?, &landmarks.get(t.left_ramus)?);
    Some((right + left) / 2.0)
}

/// 鼻额角：在 Y/Z（侧面）平面内，鼻根点处 鼻根→眉间 与 鼻根→鼻尖 的夹角。
///
/// 单目深度噪声大，原始角度落在 [90°, 170°] 之外时改用
/// `125 + (鼻尖突出度 − 额部斜度) × 200` 估计，估计值保持经验公式原样不截断；
/// 两个深度差都小于 0.001 时直接取 130°。
pub fn nasofrontal_angle(landmarks: &LandmarkSet) -> Option<f64> {
    let t = &INDEX_TABLE;
    let nasion = landmarks.get(t.nasion)?;
    let glabella = landmarks.get(t.glabella)?;
    let tip = landmarks.get(t.nose_tip)?;

    let raw = angle_between(
        glabella.y - nasion.y,
        glabella.z - nasion.z,
        tip.y - nasion.y,
        tip.z - nasion.z,
    );

    let (lo, hi) = NASOFRONTAL_PLAUSIBLE;
    if (lo..=hi).contains(&raw) {
        return Some(raw);
    }

    // MediaPipe 的 z 越小越靠近相机
    let nose_prominence = nasion.z - tip.z;
    let forehead_slope = nasion.z - glabella.z;

    let estimate = if nose_prominence.abs() < NASOFRONTAL_FLAT_EPSILON
        && forehead_slope.abs() < NASOFRONTAL_FLAT_EPSILON
    {
        NASOFRONTAL_DEFAULT
    } else {
        NASOFRONTAL_FALLBACK_BASE + (nose_prominence - forehead_slope) * NASOFRONTAL_FALLBACK_GAIN
    };

    tracing::debug!(raw, estimate, "Nasofrontal angle outside plausible window, using depth heuristic");
    Some(estimate)
}

/// 对称性评分 (0-1)，1 表示完全对称。
///
/// 中线取 5 个中线点 x 的均值；每对点计算到中线水平距离之差（按平均距离归一化）
/// 与垂直错位（按 0.15 归一化），按 7:3 合成后加权平均，
/// 最后经 `exp(-avg × 0.5)` 映射。没有可用的配对点时取 1。
pub fn symmetry_score(landmarks: &LandmarkSet) -> Option<f64> {
    let midline = midline_x(landmarks)?;
    Some(paired_symmetry(landmarks, midline).unwrap_or(1.0))
}

fn midline_x(landmarks: &LandmarkSet) -> Option<f64> {
    let mut midline_sum = 0.0;
    for idx in MIDLINE_INDICES {
        midline_sum += landmarks.get(idx)?.x;
    }
    Some(midline_sum / MIDLINE_INDICES.len() as f64)
}

/// 所有配对点都缺失或贴近中线时返回 `None`
fn paired_symmetry(landmarks: &LandmarkSet, midline: f64) -> Option<f64> {
    let mut weighted_diff = 0.0;
    let mut total_weight = 0.0;

    for pair in SYMMETRY_PAIRS.iter() {
        let (Some(right), Some(left)) = (landmarks.get(pair.right), landmarks.get(pair.left)) else {
            continue;
        };

        let right_dist = (midline - right.x).abs();
        let left_dist = (left.x - midline).abs();
        let avg_dist = (right_dist + left_dist) / 2.0;
        if avg_dist < SYMMETRY_MIN_MIDLINE_DISTANCE {
            continue;
        }

        let horizontal = (left_dist - right_dist).abs() / avg_dist;
        let vertical = (left.y - right.y).abs() / SYMMETRY_VERTICAL_REFERENCE;
        let combined = SYMMETRY_HORIZONTAL_WEIGHT * horizontal + SYMMETRY_VERTICAL_WEIGHT * vertical;

        weighted_diff += pair.weight * combined;
        total_weight += pair.weight;
    }

    if total_weight <= 0.0 {
        return None;
    }

    let avg = weighted_diff / total_weight;
    Some((-avg * SYMMETRY_DECAY).exp().clamp(0.0, 1.0))
}

/// 黄金比例贴合度 (0-1)，仅供参考，不参与类别评分。
fn golden_ratio_adherence(
    landmarks: &LandmarkSet,
    bizygomatic_norm: Option<f64>,
    ipd_norm: Option<f64>,
    eye_width_norm: Option<f64>,
) -> Option<f64> {
    let t = &INDEX_TABLE;
    let face_height = dist(landmarks, t.forehead, t.chin);
    let upper_face_height = dist(landmarks, t.nasion, t.upper_lip);

    let ratios = [
        face_height.zip(bizygomatic_norm).and_then(|(h, w)| safe_ratio(h, w)),
        bizygomatic_norm.zip(upper_face_height).and_then(|(w, h)| safe_ratio(w, h)),
        ipd_norm.zip(eye_width_norm).and_then(|(ipd, eye)| safe_ratio(ipd, eye)),
    ];

    let deviations: Vec<f64> = ratios.iter().flatten().map(|&r| golden_deviation(r)).collect();
    if deviations.is_empty() {
        return None;
    }

    let avg = deviations.iter().sum::<f64>() / deviations.len() as f64;
    Some((1.0 - avg).clamp(0.0, 1.0))
}

/// 与 φ 或 1/φ 的最小相对偏差
fn golden_deviation(ratio: f64) -> f64 {
    let inverse = 1.0 / GOLDEN_RATIO;
    let to_phi = (ratio - GOLDEN_RATIO).abs() / GOLDEN_RATIO;
    let to_inverse = (ratio - inverse).abs() / inverse;
    to_phi.min(to_inverse)
}
