//! 解剖学关键点索引表
//!
//! 索引基于 MediaPipe FaceLandmarker 的 478 点拓扑（468-477 为虹膜点）。
//! "左/右" 指被拍摄者自身的左右：右眼位于图像左侧（x 较小）。

use crate::analysis::types::{Landmark, LandmarkSet};

/// 上游检测器约定的关键点数量
pub const NOMINAL_LANDMARK_COUNT: usize = 478;

#[derive(Debug, Clone, Copy)]
pub struct AnatomicalIndexTable {
    // 中线
    pub forehead: usize,
    pub glabella: usize,
    pub nasion: usize,
    pub nose_tip: usize,
    pub nose_base: usize,
    pub upper_lip: usize,
    pub lower_lip: usize,
    pub chin: usize,
    // 颧骨 / 下颌
    pub right_cheekbone: usize,
    pub left_cheekbone: usize,
    pub right_gonion: usize,
    pub left_gonion: usize,
    pub right_ramus: usize,
    pub left_ramus: usize,
    pub right_jaw: usize,
    pub left_jaw: usize,
    // 眼部
    pub right_eye_outer: usize,
    pub right_eye_inner: usize,
    pub left_eye_inner: usize,
    pub left_eye_outer: usize,
    pub right_eye_top: usize,
    pub right_eye_bottom: usize,
    pub left_eye_top: usize,
    pub left_eye_bottom: usize,
    pub right_iris: usize,
    pub left_iris: usize,
    pub right_brow: usize,
    pub left_brow: usize,
    // 口鼻
    pub right_mouth_corner: usize,
    pub left_mouth_corner: usize,
    pub right_ala: usize,
    pub left_ala: usize,
}

pub const INDEX_TABLE: AnatomicalIndexTable = AnatomicalIndexTable {
    forehead: 10,
    glabella: 9,
    nasion: 168,
    nose_tip: 1,
    nose_base: 2,
    upper_lip: 0,
    lower_lip: 17,
    chin: 152,
    right_cheekbone: 234,
    left_cheekbone: 454,
    right_gonion: 172,
    left_gonion: 397,
    right_ramus: 132,
    left_ramus: 361,
    right_jaw: 136,
    left_jaw: 365,
    right_eye_outer: 33,
    right_eye_inner: 133,
    left_eye_inner: 362,
    left_eye_outer: 263,
    right_eye_top: 159,
    right_eye_bottom: 145,
    left_eye_top: 386,
    left_eye_bottom: 374,
    right_iris: 468,
    left_iris: 473,
    right_brow: 105,
    left_brow: 334,
    right_mouth_corner: 61,
    left_mouth_corner: 291,
    right_ala: 129,
    left_ala: 358,
};

/// 用于确定面部中线 x 坐标的中线点（不含脸颊/下颌，避免不对称点拉偏中线）
pub const MIDLINE_INDICES: [usize; 5] = [
    INDEX_TABLE.nasion,
    INDEX_TABLE.nose_tip,
    INDEX_TABLE.nose_base,
    INDEX_TABLE.chin,
    INDEX_TABLE.glabella,
];

/// 对称性评估的左右配对点
#[derive(Debug, Clone, Copy)]
pub struct SymmetryPair {
    pub right: usize,
    pub left: usize,
    pub weight: f64,
}

const fn pair(right: usize, left: usize, weight: f64) -> SymmetryPair {
    SymmetryPair {
        right,
        left,
        weight,
    }
}

pub const SYMMETRY_PAIRS: [SymmetryPair; 11] = [
    pair(INDEX_TABLE.right_eye_outer, INDEX_TABLE.left_eye_outer, 1.5),
    pair(INDEX_TABLE.right_eye_inner, INDEX_TABLE.left_eye_inner, 1.5),
    pair(INDEX_TABLE.right_iris, INDEX_TABLE.left_iris, 1.5),
    pair(INDEX_TABLE.right_eye_top, INDEX_TABLE.left_eye_top, 1.5),
    pair(INDEX_TABLE.right_brow, INDEX_TABLE.left_brow, 1.2),
    pair(INDEX_TABLE.right_cheekbone, INDEX_TABLE.left_cheekbone, 1.2),
    pair(INDEX_TABLE.right_gonion, INDEX_TABLE.left_gonion, 1.2),
    pair(INDEX_TABLE.right_mouth_corner, INDEX_TABLE.left_mouth_corner, 1.1),
    pair(INDEX_TABLE.right_ramus, INDEX_TABLE.left_ramus, 1.0),
    pair(INDEX_TABLE.right_jaw, INDEX_TABLE.left_jaw, 1.0),
    pair(INDEX_TABLE.right_ala, INDEX_TABLE.left_ala, 0.9),
];

/// 索引表中所有左右成对的角色 (right, left)
pub const PAIRED_ROLES: [(usize, usize); 12] = [
    (INDEX_TABLE.right_cheekbone, INDEX_TABLE.left_cheekbone),
    (INDEX_TABLE.right_gonion, INDEX_TABLE.left_gonion),
    (INDEX_TABLE.right_ramus, INDEX_TABLE.left_ramus),
    (INDEX_TABLE.right_jaw, INDEX_TABLE.left_jaw),
    (INDEX_TABLE.right_eye_outer, INDEX_TABLE.left_eye_outer),
    (INDEX_TABLE.right_eye_inner, INDEX_TABLE.left_eye_inner),
    (INDEX_TABLE.right_eye_top, INDEX_TABLE.left_eye_top),
    (INDEX_TABLE.right_eye_bottom, INDEX_TABLE.left_eye_bottom),
    (INDEX_TABLE.right_iris, INDEX_TABLE.left_iris),
    (INDEX_TABLE.right_brow, INDEX_TABLE.left_brow),
    (INDEX_TABLE.right_mouth_corner, INDEX_TABLE.left_mouth_corner),
    (INDEX_TABLE.right_ala, INDEX_TABLE.left_ala),
];

/// 索引表引用到的最大下标
pub const fn max_referenced_index() -> usize {
    // 虹膜中心是表中唯一超出 468 点基础网格的索引
    INDEX_TABLE.left_iris
}

/// 所有测量所需的最少关键点数量
pub const fn required_landmark_count() -> usize {
    max_referenced_index() + 1
}

/// 左右镜像：x 取 1-x，并交换索引表中成对角色的位置。
pub fn mirror(landmarks: &LandmarkSet) -> LandmarkSet {
    let mut points: Vec<Landmark> = landmarks
        .points()
        .iter()
        .map(|p| Landmark::new(1.0 - p.x, p.y, p.z))
        .collect();

    for &(right, left) in PAIRED_ROLES.iter() {
        if right < points.len() && left < points.len() {
            points.swap(right, left);
        }
    }

    LandmarkSet::new(points)
}
