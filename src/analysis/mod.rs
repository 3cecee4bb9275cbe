//! 面部关键点分析核心
//!
//! 纯同步计算：几何基础运算 → 测量提取 → 评分。不做任何 I/O。

pub mod catalog;
pub mod engine;
pub mod geometry;
pub mod landmarks;
pub mod measurements;
pub mod reference;
pub mod scoring;
pub mod types;

pub use engine::analyze;
pub use types::{
    AnalysisResult, Category, CategoryScores, FacialMeasurements, FacialThirds, FeatureAnalysis,
    Importance, Landmark, LandmarkSet,
};
