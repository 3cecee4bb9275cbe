/// 缺陷列表默认返回数量
pub const DEFAULT_FLAW_LIMIT: usize = 3;

/// 缺陷列表最大返回数量（特征目录的大小）
pub const MAX_FLAW_LIMIT: usize = crate::analysis::catalog::FEATURE_CATALOG.len();

/// 分析请求体上限（字节）。1000 个带 z 的关键点约 70KB
pub const MAX_ANALYSIS_BODY_BYTES: usize = 256 * 1024;

/// 坐标绝对值上限；归一化坐标允许少量越界（脸部超出画面）
pub const MAX_COORDINATE_MAGNITUDE: f64 = 10.0;

/// 就绪检查要求参考脸达到的最低总分
pub const READINESS_MIN_SCORE: f64 = 9.5;
