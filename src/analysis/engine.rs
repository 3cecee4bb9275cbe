use crate::analysis::catalog::FEATURE_CATALOG;
use crate::analysis::measurements;
use crate::analysis::scoring::{self, ScoredFeature};
use crate::analysis::types::{AnalysisResult, CategoryScores, FacialMeasurements, LandmarkSet};

/// 完整分析流水线：关键点 → 测量值 → 特征评分 → 类别分 → 总分与稀有度。
///
/// 纯同步计算，不持有任何共享可变状态，可在任意线程并发调用。
pub fn analyze(landmarks: &LandmarkSet) -> AnalysisResult {
    let measurements = measurements::extract(landmarks);
    score(measurements)
}

/// 对已有测量值评分
pub fn score(measurements: FacialMeasurements) -> AnalysisResult {
    let scored: Vec<ScoredFeature> = FEATURE_CATALOG
        .iter()
        .map(|def| scoring::score_feature(def, &measurements))
        .collect();

    // 类别与总分都基于未取整的特征分
    let categories = scoring::category_scores(&scored);
    let overall = scoring::round1(scoring::overall_score(&categories));
    let rarity = scoring::rarity_for(overall);

    let features: Vec<_> = scored.iter().map(ScoredFeature::to_analysis).collect();

    tracing::debug!(
        overall_score = overall,
        rarity,
        strengths = features.iter().filter(|f| f.is_strength).count(),
        "Facial analysis complete"
    );

    AnalysisResult {
        overall_score: overall,
        rarity: rarity.to_string(),
        category_scores: CategoryScores {
            harm: scoring::round1(categories.harm),
            misc: scoring::round1(categories.misc),
            angu: scoring::round1(categories.angu),
            dimo: scoring::round1(categories.dimo),
        },
        features,
        measurements,
    }
}
