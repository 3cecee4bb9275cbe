//! 评分引擎
//!
//! 测量值 → 0-10 特征分 → 类别分 → 总分 → 稀有度。
//! 只依赖 `FacialMeasurements` 的字段，不关心它们如何从关键点得到。

use crate::analysis::catalog::{
    category_weight, ideal_range, ideal_range_description, FeatureDefinition, IdealRange, MeasurementKey,
    RARITY_FLOOR, RARITY_LADDER,
};
use crate::analysis::types::{Category, CategoryScores, FacialMeasurements, FacialThirds, FeatureAnalysis};

pub const MAX_SCORE: f64 = 10.0;
pub const MIN_SCORE: f64 = 1.0;
/// 缺少理想区间配置或类别为空时的中性分
pub const NEUTRAL_SCORE: f64 = 5.0;

/// 高斯评分的标准差（以半区间为单位）
const SCORE_SIGMA: f64 = 0.7;
const SCORING_DEVIATION_LIMIT: f64 = 1.5;
const REPORTED_DEVIATION_LIMIT: f64 = 1.0;

/// 三庭 RMS 的衰减系数与报告偏差的归一化基准
const THIRDS_DECAY: f64 = 0.02;
const THIRDS_DEVIATION_REFERENCE: f64 = 0.1;

pub const STRENGTH_MIN_SCORE: f64 = 6.5;
pub const STRENGTH_MIN_DEVIATION: f64 = -0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementScore {
    pub score: f64,
    /// 报告给下游的偏差，[-1, 1]
    pub deviation: f64,
}

impl MeasurementScore {
    const NEUTRAL: MeasurementScore = MeasurementScore {
        score: NEUTRAL_SCORE,
        deviation: 0.0,
    };
}

/// 单项测量值对照理想区间打分。
///
/// 偏差以半区间为单位：评分用的偏差截断到 ±1.5，报告用的截断到 ±1；
/// 分数为 `10·exp(−d²/(2·0.7²))`，截断到 [1, 10]。
pub fn score_measurement(value: f64, range: Option<&IdealRange>) -> MeasurementScore {
    let Some(range) = range else {
        return MeasurementScore::NEUTRAL;
    };
    if !value.is_finite() {
        return MeasurementScore::NEUTRAL;
    }

    let half = range.span() / 2.0;
    let raw = if half.abs() > f64::EPSILON {
        (value - range.ideal) / half
    } else if value == range.ideal {
        0.0
    } else {
        SCORING_DEVIATION_LIMIT.copysign(value - range.ideal)
    };

    let d = raw.clamp(-SCORING_DEVIATION_LIMIT, SCORING_DEVIATION_LIMIT);
    let score = (MAX_SCORE * (-(d * d) / (2.0 * SCORE_SIGMA * SCORE_SIGMA)).exp()).clamp(MIN_SCORE, MAX_SCORE);

    MeasurementScore {
        score,
        deviation: d.clamp(-REPORTED_DEVIATION_LIMIT, REPORTED_DEVIATION_LIMIT),
    }
}

/// 三庭评分：按三段偏离 1/3 的均方根衰减。
///
/// 报告偏差的符号取偏离最大的那一段（全部相等时为正）。
pub fn score_facial_thirds(thirds: &FacialThirds) -> MeasurementScore {
    let deviations = thirds.as_array().map(|t| t - 1.0 / 3.0);
    let rms = (deviations.iter().map(|d| d * d).sum::<f64>() / 3.0).sqrt();
    if !rms.is_finite() {
        return MeasurementScore::NEUTRAL;
    }

    let score = (MAX_SCORE * (-(rms * rms) / THIRDS_DECAY).exp()).clamp(MIN_SCORE, MAX_SCORE);

    let dominant = deviations
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    let sign = if dominant < 0.0 { -1.0 } else { 1.0 };

    MeasurementScore {
        score,
        deviation: sign * (rms / THIRDS_DEVIATION_REFERENCE).min(REPORTED_DEVIATION_LIMIT),
    }
}

pub fn is_strength(score: f64, deviation: f64) -> bool {
    deviation >= STRENGTH_MIN_DEVIATION && score >= STRENGTH_MIN_SCORE
}

/// 特征评分（未取整），类别聚合使用这个值
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFeature {
    pub definition: FeatureDefinition,
    pub score: MeasurementScore,
}

impl ScoredFeature {
    pub fn to_analysis(&self) -> FeatureAnalysis {
        let def = &self.definition;
        FeatureAnalysis {
            id: def.id.to_string(),
            name: def.name.to_string(),
            category: def.category,
            value: round1(self.score.score),
            ideal_range: ideal_range_description(def.measurement),
            deviation: self.score.deviation,
            importance: def.importance,
            is_strength: is_strength(self.score.score, self.score.deviation),
        }
    }
}

pub fn score_feature(definition: &FeatureDefinition, measurements: &FacialMeasurements) -> ScoredFeature {
    let score = match definition.measurement {
        key if measurements.fallbacks.contains(&key) => MeasurementScore::NEUTRAL,
        MeasurementKey::FacialThirds => score_facial_thirds(&measurements.facial_thirds),
        key => match key.value_of(measurements) {
            Some(value) => score_measurement(value, ideal_range(key)),
            None => MeasurementScore::NEUTRAL,
        },
    };

    ScoredFeature {
        definition: *definition,
        score,
    }
}

/// 类别内按重要性加权平均；类别没有任何特征时返回 5。
pub fn category_score(category: Category, features: &[ScoredFeature]) -> f64 {
    let (sum, weights) = features
        .iter()
        .filter(|f| f.definition.category == category)
        .fold((0.0, 0.0), |(sum, weights), f| {
            let w = f.definition.importance.weight();
            (sum + f.score.score * w, weights + w)
        });

    if weights <= 0.0 {
        return NEUTRAL_SCORE;
    }
    sum / weights
}

/// 未取整的类别分
pub fn category_scores(features: &[ScoredFeature]) -> CategoryScores {
    CategoryScores {
        harm: category_score(Category::Harm, features),
        misc: category_score(Category::Misc, features),
        angu: category_score(Category::Angu, features),
        dimo: category_score(Category::Dimo, features),
    }
}

pub fn overall_score(scores: &CategoryScores) -> f64 {
    Category::ALL
        .iter()
        .map(|&c| scores.get(c) * category_weight(c))
        .sum()
}

pub fn rarity_for(score: f64) -> &'static str {
    RARITY_LADDER
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, label)| *label)
        .unwrap_or(RARITY_FLOOR)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
