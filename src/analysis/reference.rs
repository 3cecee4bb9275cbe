//! 内置的理想参考脸
//!
//! 按毫米坐标摆放所有被索引的关键点，每一项测量都恰好落在理想值上。
//! 就绪检查与测试用它验证整条流水线。

use crate::analysis::landmarks::{INDEX_TABLE, NOMINAL_LANDMARK_COUNT};
use crate::analysis::types::{Landmark, LandmarkSet};

/// 每个归一化单位对应的毫米数：颧宽 140mm 映射为 0.56
const MM_PER_UNIT: f64 = 250.0;
const ORIGIN_X: f64 = 0.5;
/// 鼻根点所在的归一化 y
const ORIGIN_Y: f64 = 0.35;

const CANTHAL_TILT_DEG: f64 = 6.0;
const EYE_WIDTH_MM: f64 = 31.0;
const GONIAL_ANGLE_DEG: f64 = 125.0;
const RAMUS_LENGTH_MM: f64 = 40.0;

fn at(x_mm: f64, y_mm: f64) -> Landmark {
    Landmark::flat(ORIGIN_X + x_mm / MM_PER_UNIT, ORIGIN_Y + y_mm / MM_PER_UNIT)
}

struct Builder {
    points: Vec<Landmark>,
}

impl Builder {
    fn new() -> Self {
        Self {
            points: vec![Landmark::flat(0.5, 0.5); NOMINAL_LANDMARK_COUNT],
        }
    }

    fn midline(&mut self, idx: usize, y_mm: f64) -> &mut Self {
        self.points[idx] = at(0.0, y_mm);
        self
    }

    /// 右侧在图像左边（x 更小），左侧取镜像
    fn pair(&mut self, right: usize, left: usize, x_mm: f64, y_mm: f64) -> &mut Self {
        self.points[right] = at(-x_mm, y_mm);
        self.points[left] = at(x_mm, y_mm);
        self
    }

    fn build(&mut self) -> LandmarkSet {
        LandmarkSet::new(std::mem::take(&mut self.points))
    }
}

/// 对称且各项测量均为理想值的 478 点关键点集合。
///
/// 三庭各 53mm，颧宽 140mm，眼距 63mm，下颌角 125°，z 全为 0
/// （鼻额角因此走平面兜底，取 130°）。
pub fn reference_face() -> LandmarkSet {
    let t = &INDEX_TABLE;

    let (tilt_sin, tilt_cos) = CANTHAL_TILT_DEG.to_radians().sin_cos();
    let eye_inner_x = 16.0;
    let eye_y = 2.0;

    // 下颌支：从下颌角点出发，与 下颌角→下巴 方向成 125°，朝上并向外
    let (gonion_x, gonion_y): (f64, f64) = (52.5, 85.0);
    let (to_chin_x, to_chin_y) = (gonion_x, 106.0 - gonion_y);
    let len = (to_chin_x * to_chin_x + to_chin_y * to_chin_y).sqrt();
    let (ux, uy) = (to_chin_x / len, to_chin_y / len);
    let (rot_sin, rot_cos) = (-GONIAL_ANGLE_DEG.to_radians()).sin_cos();
    // 右侧坐标系下旋转后取 x 的绝对值交给 pair() 镜像
    let ramus_dx = ux * rot_cos - uy * rot_sin;
    let ramus_dy = ux * rot_sin + uy * rot_cos;
    let ramus_x = gonion_x - RAMUS_LENGTH_MM * ramus_dx;
    let ramus_y = gonion_y + RAMUS_LENGTH_MM * ramus_dy;

    Builder::new()
        .midline(t.forehead, -53.0)
        .midline(t.glabella, -5.0)
        .midline(t.nasion, 0.0)
        .midline(t.nose_tip, 45.0)
        .midline(t.nose_base, 53.0)
        .midline(t.upper_lip, 65.0)
        .midline(t.lower_lip, 82.0)
        .midline(t.chin, 106.0)
        .pair(t.right_cheekbone, t.left_cheekbone, 70.0, 30.0)
        .pair(t.right_gonion, t.left_gonion, gonion_x, gonion_y)
        .pair(t.right_ramus, t.left_ramus, ramus_x, ramus_y)
        .pair(t.right_jaw, t.left_jaw, 30.0, 98.0)
        .pair(t.right_eye_inner, t.left_eye_inner, eye_inner_x, eye_y)
        .pair(
            t.right_eye_outer,
            t.left_eye_outer,
            eye_inner_x + EYE_WIDTH_MM * tilt_cos,
            eye_y - EYE_WIDTH_MM * tilt_sin,
        )
        .pair(t.right_iris, t.left_iris, 31.5, eye_y)
        .pair(t.right_eye_top, t.left_eye_top, 31.4, -3.0)
        .pair(t.right_eye_bottom, t.left_eye_bottom, 31.4, 7.0)
        .pair(t.right_brow, t.left_brow, 32.0, -12.0)
        .pair(t.right_mouth_corner, t.left_mouth_corner, 25.0, 73.0)
        // 鼻翼宽 = 0.7 × 鼻根到鼻底 53mm
        .pair(t.right_ala, t.left_ala, 18.55, 50.0)
        .build()
}
