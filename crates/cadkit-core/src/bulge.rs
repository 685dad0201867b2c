//! 凸度（bulge）与圆弧的转换
//!
//! 凸度编码了圆弧段包含角四分之一的正切值，符号表示绕行方向。
//! 多段线用它在两个顶点之间以一个标量描述一段圆弧。

use crate::math::{normalize_angle, Vector2, EPSILON};
use serde::{Deserialize, Serialize};

/// 由弦和凸度还原出的圆弧描述
///
/// 角度单位为度；圆弧总是从 `start_angle` 逆时针转到 `end_angle`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BulgeArc {
    /// 圆心（局部坐标）
    pub center: Vector2,
    /// 半径。`radius ≈ 0` 是哨兵值，表示应退化为直线段
    pub radius: f64,
    /// 起始角度（度）
    pub start_angle: f64,
    /// 终止角度（度）
    pub end_angle: f64,
}

impl BulgeArc {
    /// 圆弧扫过的角度（度），始终为正
    pub fn sweep(&self) -> f64 {
        let mut sweep = self.end_angle - self.start_angle;
        while sweep <= 0.0 {
            sweep += 360.0;
        }
        sweep
    }

    /// 圆弧上指定角度（度）的点
    pub fn point_at(&self, degrees: f64) -> Vector2 {
        let rad = degrees.to_radians();
        Vector2::new(
            self.center.x + self.radius * rad.cos(),
            self.center.y + self.radius * rad.sin(),
        )
    }
}

/// 将弦 `p1→p2` 和带符号凸度转换为圆弧。
///
/// 包含角 θ = 4·atan(|bulge|)。凸度为正时圆弧在弦的左侧（逆时针），
/// 为负时在右侧；返回的角度对已经交换，保证「从起始角逆时针到终止角」
/// 的约定恒成立。θ ≈ 0 时返回半径为 0 的哨兵，调用方应画直线段。
pub fn arc_from_bulge(p1: &Vector2, p2: &Vector2, bulge: f64) -> BulgeArc {
    let theta = 4.0 * bulge.abs().atan();
    let chord = p2 - p1;
    let chord_len = chord.norm();

    if theta.abs() < EPSILON || chord_len < EPSILON {
        // 退化为直线段
        return BulgeArc {
            center: Vector2::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0),
            radius: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
        };
    }

    let radius = chord_len / (2.0 * (theta / 2.0).sin());
    let apothem = radius * (theta / 2.0).cos();

    // 弦的左法向；圆心在凸起的对侧
    let mid = Vector2::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0);
    let left = Vector2::new(-chord.y, chord.x) / chord_len;
    let center = mid + left * (bulge.signum() * apothem);

    let a1 = normalize_angle((p1.y - center.y).atan2(p1.x - center.x).to_degrees());
    let a2 = normalize_angle((p2.y - center.y).atan2(p2.x - center.x).to_degrees());

    // 负凸度表示顺时针绕行，交换两角以维持逆时针约定
    let (start_angle, end_angle) = if bulge < 0.0 { (a2, a1) } else { (a1, a2) };

    BulgeArc {
        center,
        radius,
        start_angle,
        end_angle,
    }
}

/// 由圆弧包含角（度）计算凸度值
pub fn bulge_from_sweep(sweep_degrees: f64) -> f64 {
    (sweep_degrees.to_radians() / 4.0).tan()
}
