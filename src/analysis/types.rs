use serde::{Deserialize, Serialize};

use crate::analysis::catalog::MeasurementKey;

/// 单个面部关键点，x/y 为相对图像宽高的归一化坐标，z 为相对深度（可缺省）。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn flat(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// 一张图像对应的有序关键点集合，按位置索引。
///
/// 语义角色只通过 [`crate::analysis::landmarks::INDEX_TABLE`] 获得；
/// 长度不足时 `get` 返回 `None`，由各测量项自行降级。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Landmark> {
        self.points.get(idx).copied()
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Landmark] {
        &mut self.points
    }

    pub fn into_points(self) -> Vec<Landmark> {
        self.points
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

/// 面部三庭：额→鼻根、鼻根→鼻底、鼻底→下巴三段占总高的比例，三者之和为 1。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacialThirds {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl FacialThirds {
    pub const EQUAL: FacialThirds = FacialThirds {
        upper: 1.0 / 3.0,
        middle: 1.0 / 3.0,
        lower: 1.0 / 3.0,
    };

    pub fn as_array(&self) -> [f64; 3] {
        [self.upper, self.middle, self.lower]
    }
}

impl Default for FacialThirds {
    fn default() -> Self {
        Self::EQUAL
    }
}

/// 一次分析得到的人体测量值。
///
/// 距离单位为毫米（经颧宽标定换算），角度单位为度，比例无量纲，
/// `esr`/`nasal_index` 为百分比。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacialMeasurements {
    pub ipd: f64,
    pub esr: f64,
    pub pfl: f64,
    pub eye_aspect_ratio: f64,
    pub intercanthal_width: f64,
    pub canthal_tilt: f64,
    pub fwhr: f64,
    pub facial_index: f64,
    pub facial_thirds: FacialThirds,
    pub philtrum_length: f64,
    pub chin_philtrum_ratio: f64,
    pub midface_ratio: f64,
    pub mouth_width: f64,
    pub nasal_width: f64,
    pub nasal_index: f64,
    pub gonial_angle: f64,
    pub nasofrontal_angle: f64,
    pub bizygomatic: f64,
    pub bigonial: f64,
    pub symmetry_score: f64,
    pub golden_ratio_adherence: f64,
    /// 每个归一化单位对应的毫米数
    pub scale_factor: f64,
    /// 无法从关键点算出、退化为默认值的评分项，评分时按中性分处理
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<MeasurementKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Harmony
    Harm,
    /// Miscellaneous
    Misc,
    /// Angularity
    Angu,
    /// Dimorphism
    Dimo,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Harm, Category::Misc, Category::Angu, Category::Dimo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Harm => "HARM",
            Category::Misc => "MISC",
            Category::Angu => "ANGU",
            Category::Dimo => "DIMO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Highest,
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn weight(&self) -> f64 {
        match self {
            Importance::Highest => 1.5,
            Importance::High => 1.2,
            Importance::Medium => 1.0,
            Importance::Low => 0.7,
        }
    }
}

/// 单个特征的评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAnalysis {
    pub id: String,
    pub name: String,
    pub category: Category,
    /// 0-10 分，保留一位小数
    pub value: f64,
    pub ideal_range: String,
    /// [-1, 1]，负值表示低于理想值
    pub deviation: f64,
    pub importance: Importance,
    pub is_strength: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub harm: f64,
    pub misc: f64,
    pub angu: f64,
    pub dimo: f64,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Harm => self.harm,
            Category::Misc => self.misc,
            Category::Angu => self.angu,
            Category::Dimo => self.dimo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: f64,
    pub rarity: String,
    pub category_scores: CategoryScores,
    pub features: Vec<FeatureAnalysis>,
    pub measurements: FacialMeasurements,
}

impl AnalysisResult {
    /// 下游推荐所依赖的缺陷排序：非优势且偏差为负，按 |deviation| 降序取前 `limit` 个。
    pub fn top_flaws(&self, limit: usize) -> Vec<&FeatureAnalysis> {
        let mut flaws: Vec<&FeatureAnalysis> = self
            .features
            .iter()
            .filter(|f| !f.is_strength && f.deviation < 0.0)
            .collect();
        flaws.sort_by(|a, b| b.deviation.abs().total_cmp(&a.deviation.abs()));
        flaws.truncate(limit);
        flaws
    }

    pub fn strengths(&self) -> impl Iterator<Item = &FeatureAnalysis> {
        self.features.iter().filter(|f| f.is_strength)
    }
}
