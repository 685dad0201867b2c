//! 样条曲线
//!
//! NURBS 曲线实体：控制点保存在 WCS，求值委托给 [`crate::nurbs`]。
//! 构造时校验阶数、控制点数与权重/节点数量的匹配关系；非法输入
//! 立即失败，绝不静默修正。

use crate::error::GeometryError;
use crate::geometry::{transformed_normal, validated_normal};
use crate::math::{BoundingBox3, Matrix3, Point3, Vector3};
use crate::nurbs::{expected_knot_count, nurbs_evaluate, DEGREE_RANGE};
use serde::{Deserialize, Serialize};

/// 样条曲线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spline {
    control_points: Vec<Point3>,
    weights: Vec<f64>,
    knots: Vec<f64>,
    degree: usize,
    /// 是否闭合
    pub is_closed: bool,
    /// 是否周期（影响节点向量与接缝连续性）
    pub is_periodic: bool,
    /// 拟合点（可选的另一种创建方式）
    pub fit_points: Vec<Point3>,
    normal: Vector3,
}

impl Spline {
    /// 创建样条曲线。
    ///
    /// - `degree ∈ [1, 10]`
    /// - 控制点数至少 `max(2, degree + 1)`
    /// - `weights` 若给出，数量必须与控制点一致（缺省每点 1.0）
    /// - `knots` 若给出，长度必须符合当前阶数与周期性的公式，
    ///   否则按同样的公式在内部生成
    pub fn new(
        control_points: Vec<Point3>,
        weights: Option<Vec<f64>>,
        knots: Option<Vec<f64>>,
        degree: usize,
        is_closed: bool,
        is_periodic: bool,
    ) -> Result<Self, GeometryError> {
        if !(DEGREE_RANGE.0..=DEGREE_RANGE.1).contains(&degree) {
            return Err(GeometryError::InvalidDegree(degree));
        }
        let required = 2.max(degree + 1);
        if control_points.len() < required {
            return Err(GeometryError::NotEnoughControlPoints {
                required,
                actual: control_points.len(),
            });
        }

        let weights = match weights {
            Some(w) => {
                if w.len() != control_points.len() {
                    return Err(GeometryError::WeightCountMismatch {
                        expected: control_points.len(),
                        actual: w.len(),
                    });
                }
                w
            }
            None => vec![1.0; control_points.len()],
        };

        let expected = expected_knot_count(control_points.len(), degree, is_periodic);
        let knots = match knots {
            Some(k) => {
                if k.len() != expected {
                    return Err(GeometryError::KnotCountMismatch {
                        expected,
                        actual: k.len(),
                    });
                }
                k
            }
            None if is_periodic => crate::nurbs::periodic_knots(control_points.len(), degree),
            None => crate::nurbs::open_knots(control_points.len(), degree),
        };

        Ok(Self {
            control_points,
            weights,
            knots,
            degree,
            is_closed,
            is_periodic,
            fit_points: Vec::new(),
            normal: Vector3::z(),
        })
    }

    /// 从拟合点创建样条曲线。
    ///
    /// 拟合点被记录下来并用作控制多边形（近似而非插值）。
    pub fn from_fit_points(fit_points: Vec<Point3>, degree: usize) -> Result<Self, GeometryError> {
        if fit_points.is_empty() {
            return Err(GeometryError::EmptyCollection("fit points"));
        }
        let mut spline = Self::new(fit_points.clone(), None, None, degree, false, false)?;
        spline.fit_points = fit_points;
        Ok(spline)
    }

    /// 控制点
    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    /// 权重
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// 节点向量
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// 曲线阶数
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// 法向量（单位向量）
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// 设置法向量，零向量立即失败
    pub fn set_normal(&mut self, normal: Vector3) -> Result<(), GeometryError> {
        self.normal = validated_normal(normal)?;
        Ok(())
    }

    /// 以折线近似样条曲线，返回 WCS 采样点
    pub fn sample_points(&self, precision: usize) -> Result<Vec<Point3>, GeometryError> {
        nurbs_evaluate(
            &self.control_points,
            Some(&self.weights),
            Some(&self.knots),
            self.degree,
            self.is_closed,
            self.is_periodic,
            precision,
        )
    }

    /// 控制点的包围盒（保守估计：曲线总在控制多边形的凸包内）
    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(self.control_points.iter().copied())
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        self.normal = transformed_normal(m, &self.normal);
        for p in &mut self.control_points {
            *p = m * *p + t;
        }
        for p in &mut self.fit_points {
            *p = m * *p + t;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(3.0, 2.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            Spline::new(controls(), None, None, 0, false, false),
            Err(GeometryError::InvalidDegree(0))
        ));
        assert!(matches!(
            Spline::new(controls(), None, None, 11, false, false),
            Err(GeometryError::InvalidDegree(11))
        ));
        assert!(matches!(
            Spline::new(controls(), None, None, 4, false, false),
            Err(GeometryError::NotEnoughControlPoints { required: 5, .. })
        ));
        assert!(matches!(
            Spline::new(controls(), Some(vec![1.0; 3]), None, 3, false, false),
            Err(GeometryError::WeightCountMismatch { .. })
        ));
        assert!(matches!(
            Spline::new(controls(), None, Some(vec![0.0; 7]), 3, false, false),
            Err(GeometryError::KnotCountMismatch { expected: 8, .. })
        ));
    }

    #[test]
    fn test_generated_knots_match_formula() {
        let open = Spline::new(controls(), None, None, 3, false, false).unwrap();
        assert_eq!(open.knots().len(), 4 + 3 + 1);

        let periodic = Spline::new(controls(), None, None, 2, true, true).unwrap();
        assert_eq!(periodic.knots().len(), 4 + 2 * 2 + 1);
    }

    #[test]
    fn test_default_weights() {
        let s = Spline::new(controls(), None, None, 3, false, false).unwrap();
        assert_eq!(s.weights(), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_sample_endpoints_clamped() {
        let s = Spline::new(controls(), None, None, 3, false, false).unwrap();
        let points = s.sample_points(16).unwrap();
        assert_eq!(points.len(), 16);
        assert!((points[0] - controls()[0]).norm() < 1e-9);
        assert!((points[15] - controls()[3]).norm() < 1e-9);
    }

    #[test]
    fn test_transform_moves_control_points() {
        let mut s = Spline::new(controls(), None, None, 3, false, false).unwrap();
        let before = s.sample_points(8).unwrap();

        let m = Matrix3::identity();
        s.transform_by(&m, &Vector3::new(10.0, 0.0, 0.0)).unwrap();
        let after = s.sample_points(8).unwrap();

        // 曲线整体平移：每个采样点都移动同样的量
        for (a, b) in before.iter().zip(&after) {
            assert!((b - a - Vector3::new(10.0, 0.0, 0.0)).norm() < 1e-9);
        }
        // 节点与权重不变
        assert_eq!(s.knots().len(), 8);
    }

    #[test]
    fn test_from_fit_points() {
        let fit = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 5.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(15.0, -5.0, 0.0),
        ];
        let s = Spline::from_fit_points(fit.clone(), 3).unwrap();
        assert_eq!(s.fit_points.len(), 4);
        assert_eq!(s.control_points().len(), 4);
    }
}
