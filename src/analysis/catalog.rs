//! 评分用常量表：理想区间、特征目录、类别权重、稀有度阶梯。
//!
//! 全部为编译期常量，运行时只读。

use serde::{Deserialize, Serialize};

use crate::analysis::types::{Category, FacialMeasurements, Importance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementKey {
    Ipd,
    Esr,
    Pfl,
    CanthalTilt,
    Fwhr,
    FacialThirds,
    PhiltrumLength,
    ChinPhiltrumRatio,
    MidfaceRatio,
    NasalIndex,
    GonialAngle,
    NasofrontalAngle,
    Bizygomatic,
    Bigonial,
    SymmetryScore,
}

impl MeasurementKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKey::Ipd => "ipd",
            MeasurementKey::Esr => "esr",
            MeasurementKey::Pfl => "pfl",
            MeasurementKey::CanthalTilt => "canthal_tilt",
            MeasurementKey::Fwhr => "fwhr",
            MeasurementKey::FacialThirds => "facial_thirds",
            MeasurementKey::PhiltrumLength => "philtrum_length",
            MeasurementKey::ChinPhiltrumRatio => "chin_philtrum_ratio",
            MeasurementKey::MidfaceRatio => "midface_ratio",
            MeasurementKey::NasalIndex => "nasal_index",
            MeasurementKey::GonialAngle => "gonial_angle",
            MeasurementKey::NasofrontalAngle => "nasofrontal_angle",
            MeasurementKey::Bizygomatic => "bizygomatic",
            MeasurementKey::Bigonial => "bigonial",
            MeasurementKey::SymmetryScore => "symmetry_score",
        }
    }

    /// 取出对应的标量值；三庭由专门的评分函数处理，这里返回 `None`。
    pub fn value_of(&self, m: &FacialMeasurements) -> Option<f64> {
        let value = match self {
            MeasurementKey::Ipd => m.ipd,
            MeasurementKey::Esr => m.esr,
            MeasurementKey::Pfl => m.pfl,
            MeasurementKey::CanthalTilt => m.canthal_tilt,
            MeasurementKey::Fwhr => m.fwhr,
            MeasurementKey::FacialThirds => return None,
            MeasurementKey::PhiltrumLength => m.philtrum_length,
            MeasurementKey::ChinPhiltrumRatio => m.chin_philtrum_ratio,
            MeasurementKey::MidfaceRatio => m.midface_ratio,
            MeasurementKey::NasalIndex => m.nasal_index,
            MeasurementKey::GonialAngle => m.gonial_angle,
            MeasurementKey::NasofrontalAngle => m.nasofrontal_angle,
            MeasurementKey::Bizygomatic => m.bizygomatic,
            MeasurementKey::Bigonial => m.bigonial,
            MeasurementKey::SymmetryScore => m.symmetry_score,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mm,
    Degrees,
    Percent,
    Ratio,
    Score,
}

impl Unit {
    fn suffix(&self) -> &'static str {
        match self {
            Unit::Mm => " mm",
            Unit::Degrees => "°",
            Unit::Percent => "%",
            Unit::Ratio | Unit::Score => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub ideal: f64,
    pub unit: Unit,
}

impl IdealRange {
    pub const fn bounded(min: f64, max: f64, ideal: f64, unit: Unit) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ideal,
            unit,
        }
    }

    pub const fn ideal_only(ideal: f64, unit: Unit) -> Self {
        Self {
            min: None,
            max: None,
            ideal,
            unit,
        }
    }

    /// 评分用区间宽度：有上下界时取 max-min，否则取 ideal 的 30%
    pub fn span(&self) -> f64 {
        match (self.min, self.max) {
            (Some(min), Some(max)) => max - min,
            _ => self.ideal * 0.3,
        }
    }

    /// 面向用户的理想区间描述
    pub fn describe(&self) -> String {
        let suffix = self.unit.suffix();
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                format!("{}–{}{} (ideal {}{})", fmt_num(min), fmt_num(max), suffix, fmt_num(self.ideal), suffix)
            }
            _ => format!("≈{}{}", fmt_num(self.ideal), suffix),
        }
    }
}

fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v:.2}").trim_end_matches('0').to_string()
    }
}

pub static IDEAL_RANGES: [(MeasurementKey, IdealRange); 14] = [
    (MeasurementKey::Ipd, IdealRange::bounded(58.0, 68.0, 63.0, Unit::Mm)),
    (MeasurementKey::Esr, IdealRange::bounded(43.0, 47.0, 45.0, Unit::Percent)),
    (MeasurementKey::Pfl, IdealRange::bounded(28.0, 34.0, 31.0, Unit::Mm)),
    (MeasurementKey::CanthalTilt, IdealRange::bounded(4.0, 8.0, 6.0, Unit::Degrees)),
    (MeasurementKey::Fwhr, IdealRange::bounded(1.8, 2.2, 2.0, Unit::Ratio)),
    (MeasurementKey::PhiltrumLength, IdealRange::bounded(10.0, 15.0, 12.0, Unit::Mm)),
    (MeasurementKey::ChinPhiltrumRatio, IdealRange::bounded(1.8, 2.2, 2.0, Unit::Ratio)),
    (MeasurementKey::MidfaceRatio, IdealRange::bounded(0.95, 1.05, 1.0, Unit::Ratio)),
    (MeasurementKey::NasalIndex, IdealRange::ideal_only(70.0, Unit::Percent)),
    (MeasurementKey::GonialAngle, IdealRange::bounded(115.0, 135.0, 125.0, Unit::Degrees)),
    (MeasurementKey::NasofrontalAngle, IdealRange::bounded(115.0, 135.0, 130.0, Unit::Degrees)),
    (MeasurementKey::Bizygomatic, IdealRange::bounded(130.0, 150.0, 140.0, Unit::Mm)),
    (MeasurementKey::Bigonial, IdealRange::bounded(95.0, 115.0, 105.0, Unit::Mm)),
    (MeasurementKey::SymmetryScore, IdealRange::bounded(0.85, 1.0, 1.0, Unit::Score)),
];

pub fn ideal_range(key: MeasurementKey) -> Option<&'static IdealRange> {
    IDEAL_RANGES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, range)| range)
}

/// 三庭的理想描述（三段各占三分之一）
pub const FACIAL_THIRDS_IDEAL: &str = "33% / 33% / 33%";

/// 特征结果与目录接口中展示的理想区间文本
pub fn ideal_range_description(key: MeasurementKey) -> String {
    match key {
        MeasurementKey::FacialThirds => FACIAL_THIRDS_IDEAL.to_string(),
        key => ideal_range(key).map(IdealRange::describe).unwrap_or_default(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub importance: Importance,
    pub measurement: MeasurementKey,
}

const fn feature(
    id: &'static str,
    name: &'static str,
    category: Category,
    importance: Importance,
    measurement: MeasurementKey,
) -> FeatureDefinition {
    FeatureDefinition {
        id,
        name,
        category,
        importance,
        measurement,
    }
}

pub const FEATURE_CATALOG: [FeatureDefinition; 14] = [
    feature("facial_thirds", "Facial Thirds", Category::Harm, Importance::Highest, MeasurementKey::FacialThirds),
    feature("symmetry", "Facial Symmetry", Category::Harm, Importance::Highest, MeasurementKey::SymmetryScore),
    feature("midface_ratio", "Midface Ratio", Category::Harm, Importance::High, MeasurementKey::MidfaceRatio),
    feature("esr", "Eye Separation Ratio", Category::Harm, Importance::Medium, MeasurementKey::Esr),
    feature("ipd", "Interpupillary Distance", Category::Misc, Importance::Medium, MeasurementKey::Ipd),
    feature("pfl", "Palpebral Fissure Length", Category::Misc, Importance::Medium, MeasurementKey::Pfl),
    feature("nasal_index", "Nasal Index", Category::Misc, Importance::Low, MeasurementKey::NasalIndex),
    feature("philtrum_length", "Philtrum Length", Category::Misc, Importance::Low, MeasurementKey::PhiltrumLength),
    feature("gonial_angle", "Gonial Angle", Category::Angu, Importance::Highest, MeasurementKey::GonialAngle),
    feature("canthal_tilt", "Canthal Tilt", Category::Angu, Importance::High, MeasurementKey::CanthalTilt),
    feature("nasofrontal_angle", "Nasofrontal Angle", Category::Angu, Importance::Medium, MeasurementKey::NasofrontalAngle),
    feature("fwhr", "Facial Width-to-Height Ratio", Category::Dimo, Importance::Highest, MeasurementKey::Fwhr),
    feature("bigonial", "Jaw Width", Category::Dimo, Importance::High, MeasurementKey::Bigonial),
    feature("chin_philtrum_ratio", "Chin-to-Philtrum Ratio", Category::Dimo, Importance::High, MeasurementKey::ChinPhiltrumRatio),
];

pub const CATEGORY_WEIGHTS: [(Category, f64); 4] = [
    (Category::Harm, 0.32),
    (Category::Misc, 0.26),
    (Category::Angu, 0.22),
    (Category::Dimo, 0.20),
];

pub fn category_weight(category: Category) -> f64 {
    CATEGORY_WEIGHTS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

/// 降序阈值阶梯，未命中任何阈值时使用 [`RARITY_FLOOR`]
pub const RARITY_LADDER: [(f64, &str); 14] = [
    (9.1, "1 in 1.2M+"),
    (9.0, "1 in 420K"),
    (8.5, "1 in 31K"),
    (8.0, "1 in 4.1K"),
    (7.5, "1 in 440"),
    (7.0, "1 in 90"),
    (6.5, "1 in 25"),
    (6.0, "1 in 9"),
    (5.5, "1 in 4"),
    (5.0, "1 in 2"),
    (4.5, "1 in 1.6"),
    (4.0, "1 in 1.3"),
    (3.5, "1 in 1.1"),
    (3.0, "1 in 1.05"),
];

pub const RARITY_FLOOR: &str = "1 in 1";
