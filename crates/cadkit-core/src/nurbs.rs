//! NURBS 曲线求值
//!
//! 非均匀有理B样条（NURBS）求值器，用于样条与平滑多段线的细分。
//! 纯函数：给定控制点、权重、节点向量与阶数，产出有限的采样点序列。
//!
//! # 约定
//!
//! - 开放曲线的节点向量长度为 `控制点数 + 阶数 + 1`，周期曲线为
//!   `控制点数 + 2·阶数 + 1`；不提供时按同样的公式在内部生成。
//! - 周期曲线求值前将最后 `阶数` 个控制点（及权重）前置到工作数组，
//!   使曲线在接缝处导数连续。
//! - 开放曲线采样 `precision - 1` 个均匀参数后补上精确的末控制点；
//!   闭合曲线在 `[knots[degree], knots[len-degree-1]]` 上采样
//!   `precision` 个参数，不重复闭合点（调用方自行首尾相连）。

use crate::error::GeometryError;
use crate::math::{Point3, Vector3, EPSILON};

/// 样条阶数的合法范围
pub const DEGREE_RANGE: (usize, usize) = (1, 10);

/// 开放曲线的节点向量：`degree+1` 个前导 0，中段按 `i - degree` 递增，
/// `degree+1` 个 `n - degree` 收尾
pub fn open_knots(control_count: usize, degree: usize) -> Vec<f64> {
    let n = control_count;
    let mut knots = Vec::with_capacity(n + degree + 1);
    for i in 0..n + degree + 1 {
        if i <= degree {
            knots.push(0.0);
        } else if i < n {
            knots.push((i - degree) as f64);
        } else {
            knots.push((n - degree) as f64);
        }
    }
    knots
}

/// 周期曲线的节点向量：步长 `1/(n-degree)` 均匀分布，
/// 偏移使下标 `degree` 处取值为 0
pub fn periodic_knots(control_count: usize, degree: usize) -> Vec<f64> {
    let n = control_count;
    let step = 1.0 / (n - degree) as f64;
    (0..n + 2 * degree + 1)
        .map(|i| (i as f64 - degree as f64) * step)
        .collect()
}

/// 给定周期性时节点向量的期望长度
pub fn expected_knot_count(control_count: usize, degree: usize, is_periodic: bool) -> usize {
    if is_periodic {
        control_count + 2 * degree + 1
    } else {
        control_count + degree + 1
    }
}

/// B样条基函数 N(i, p, u)，递归形式。
///
/// 分母接近零的系数按 0 处理，绝不除以零。
fn basis(i: usize, p: usize, u: f64, knots: &[f64]) -> f64 {
    if p == 0 {
        return if knots[i] <= u && u < knots[i + 1] {
            1.0
        } else {
            0.0
        };
    }

    let mut value = 0.0;
    let d1 = knots[i + p] - knots[i];
    if d1.abs() > EPSILON {
        value += (u - knots[i]) / d1 * basis(i, p - 1, u, knots);
    }
    let d2 = knots[i + p + 1] - knots[i + 1];
    if d2.abs() > EPSILON {
        value += (knots[i + p + 1] - u) / d2 * basis(i + 1, p - 1, u, knots);
    }
    value
}

/// 有理求值 C(u) = Σ wᵢNᵢ(u)Pᵢ / Σ wᵢNᵢ(u)。
///
/// 分母接近零时返回原点（合法输入下不应出现，属文档化的边界情形）。
fn curve_point(
    u: f64,
    controls: &[Point3],
    weights: &[f64],
    knots: &[f64],
    degree: usize,
) -> Point3 {
    let mut numerator = Vector3::zeros();
    let mut denominator = 0.0;

    for (i, (point, weight)) in controls.iter().zip(weights).enumerate() {
        let b = basis(i, degree, u, knots);
        if b == 0.0 {
            continue;
        }
        let wb = weight * b;
        numerator += point.coords * wb;
        denominator += wb;
    }

    if denominator.abs() < EPSILON {
        Point3::origin()
    } else {
        Point3::from(numerator / denominator)
    }
}

/// NURBS 曲线求值。
///
/// # 前置条件
///
/// - `controls.len() >= max(2, degree + 1)`
/// - `degree ∈ [1, 10]`
/// - `precision >= 2`
/// - `weights` 若给出，长度与控制点一致（缺省每点 1.0）
/// - `knots` 若给出，长度必须符合 [`expected_knot_count`]，否则内部生成
pub fn nurbs_evaluate(
    controls: &[Point3],
    weights: Option<&[f64]>,
    knots: Option<&[f64]>,
    degree: usize,
    is_closed: bool,
    is_periodic: bool,
    precision: usize,
) -> Result<Vec<Point3>, GeometryError> {
    if !(DEGREE_RANGE.0..=DEGREE_RANGE.1).contains(&degree) {
        return Err(GeometryError::InvalidDegree(degree));
    }
    let required = 2.max(degree + 1);
    if controls.len() < required {
        return Err(GeometryError::NotEnoughControlPoints {
            required,
            actual: controls.len(),
        });
    }
    if precision < 2 {
        return Err(GeometryError::InvalidPrecision(precision));
    }

    let weights = match weights {
        Some(w) => {
            if w.len() != controls.len() {
                return Err(GeometryError::WeightCountMismatch {
                    expected: controls.len(),
                    actual: w.len(),
                });
            }
            w.to_vec()
        }
        None => vec![1.0; controls.len()],
    };

    let expected = expected_knot_count(controls.len(), degree, is_periodic);
    let knots = match knots {
        Some(k) => {
            if k.len() != expected {
                return Err(GeometryError::KnotCountMismatch {
                    expected,
                    actual: k.len(),
                });
            }
            k.to_vec()
        }
        None if is_periodic => periodic_knots(controls.len(), degree),
        None => open_knots(controls.len(), degree),
    };

    // 周期包裹：前置末尾 degree 个控制点，使接缝处导数连续
    let (work_controls, work_weights) = if is_periodic {
        let mut c = Vec::with_capacity(controls.len() + degree);
        let mut w = Vec::with_capacity(weights.len() + degree);
        c.extend_from_slice(&controls[controls.len() - degree..]);
        c.extend_from_slice(controls);
        w.extend_from_slice(&weights[weights.len() - degree..]);
        w.extend_from_slice(&weights);
        (c, w)
    } else {
        (controls.to_vec(), weights)
    };

    let mut points = Vec::with_capacity(precision);
    if is_closed {
        let start = knots[degree];
        let end = knots[knots.len() - 1 - degree];
        for i in 0..precision {
            let u = start + (end - start) * i as f64 / precision as f64;
            points.push(curve_point(u, &work_controls, &work_weights, &knots, degree));
        }
    } else {
        let start = knots[0];
        let end = knots[knots.len() - 1];
        for i in 0..precision - 1 {
            let u = start + (end - start) * i as f64 / (precision - 1) as f64;
            points.push(curve_point(u, &work_controls, &work_weights, &knots, degree));
        }
        // 末端参数处基函数全为零，直接取精确的末控制点
        points.push(controls[controls.len() - 1]);
    }

    Ok(points)
}
