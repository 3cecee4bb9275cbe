pub const ANALYSES: &str = "analyses";
/// 迁移版本等元数据
pub const META: &str = "meta";
