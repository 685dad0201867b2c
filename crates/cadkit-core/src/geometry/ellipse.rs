//! 椭圆
//!
//! 中心保存在 WCS；长轴向量与起止参数定义在 OCS 平面内。
//! 一般线性映射下椭圆仍是椭圆，但映射后的两条轴向量只是一对
//! 共轭直径，不再正交——新的主轴通过 2x2 对称矩阵的特征分解
//! （即对共轭直径做 Rytz 构造）重新求出。

use crate::error::GeometryError;
use crate::geometry::{validated_normal, FrameMap, DEFAULT_CURVE_PRECISION};
use crate::math::{normalize_angle, BoundingBox3, Matrix3, Point3, Vector2, Vector3, EPSILON};
use crate::ocs::arbitrary_axis;
use serde::{Deserialize, Serialize};

/// 由一对共轭半径向量求出椭圆的半长轴向量与半短轴长度。
///
/// 椭圆是单位圆在 B = [u v] 下的像，轴长即 B 的奇异值，
/// 轴方向是 B·Bᵀ 的特征向量。
pub(crate) fn axes_from_conjugate(u: &Vector2, v: &Vector2) -> (Vector2, f64) {
    let m11 = u.x * u.x + v.x * v.x;
    let m22 = u.y * u.y + v.y * v.y;
    let m12 = u.x * u.y + v.x * v.y;

    let half_trace = (m11 + m22) / 2.0;
    let det = m11 * m22 - m12 * m12;
    let disc = (half_trace * half_trace - det).max(0.0).sqrt();
    let l1 = half_trace + disc;
    let l2 = (half_trace - disc).max(0.0);

    let major_len = l1.sqrt();
    let minor_len = l2.sqrt();

    let dir = if m12.abs() > EPSILON {
        Vector2::new(m12, l1 - m11)
    } else if m11 >= m22 {
        Vector2::new(1.0, 0.0)
    } else {
        Vector2::new(0.0, 1.0)
    };

    if dir.norm() < EPSILON || major_len < EPSILON {
        // 完全退化：保持X方向，长度用极小正值
        return (Vector2::new(EPSILON, 0.0), EPSILON);
    }

    (dir.normalize() * major_len, minor_len)
}

/// 椭圆
///
/// 支持完整椭圆和椭圆弧：
/// - 中心点 + 半长轴向量（OCS）+ 短长轴比例
/// - 起止参数（度）用于椭圆弧；参数是椭圆的参数化角度，
///   不是几何角度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    /// 中心点（WCS）
    pub center: Point3,
    /// 半长轴向量（OCS，相对中心）
    major_axis: Vector2,
    /// 短轴与长轴的比例 (0, 1]
    ratio: f64,
    /// 起始参数（度）
    pub start_param: f64,
    /// 终止参数（度，完整椭圆为 360）
    pub end_param: f64,
    normal: Vector3,
}

impl Ellipse {
    /// 创建完整椭圆
    pub fn new(center: Point3, major_axis: Vector2, ratio: f64) -> Result<Self, GeometryError> {
        if major_axis.norm() < EPSILON {
            return Err(GeometryError::NonPositive("major axis length"));
        }
        if ratio <= 0.0 || ratio > 1.0 {
            return Err(GeometryError::InvalidAxisRatio(ratio));
        }
        Ok(Self {
            center,
            major_axis,
            ratio,
            start_param: 0.0,
            end_param: 360.0,
            normal: Vector3::z(),
        })
    }

    /// 创建椭圆弧
    pub fn arc(
        center: Point3,
        major_axis: Vector2,
        ratio: f64,
        start_param: f64,
        end_param: f64,
    ) -> Result<Self, GeometryError> {
        let mut e = Self::new(center, major_axis, ratio)?;
        e.start_param = normalize_angle(start_param);
        e.end_param = normalize_angle(end_param);
        Ok(e)
    }

    /// 半长轴向量（OCS）
    pub fn major_axis(&self) -> &Vector2 {
        &self.major_axis
    }

    /// 获取长轴半径
    pub fn major_radius(&self) -> f64 {
        self.major_axis.norm()
    }

    /// 短轴与长轴的比例
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// 设置比例，(0, 1] 之外立即失败
    pub fn set_ratio(&mut self, ratio: f64) -> Result<(), GeometryError> {
        if ratio <= 0.0 || ratio > 1.0 {
            return Err(GeometryError::InvalidAxisRatio(ratio));
        }
        self.ratio = ratio;
        Ok(())
    }

    /// 获取短轴半径
    pub fn minor_radius(&self) -> f64 {
        self.major_radius() * self.ratio
    }

    /// 半短轴向量（OCS，长轴逆时针转90°方向）
    pub fn minor_axis(&self) -> Vector2 {
        Vector2::new(-self.major_axis.y, self.major_axis.x) * self.ratio
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

    /// 是否是完整椭圆
    pub fn is_full(&self) -> bool {
        (self.end_param - self.start_param).abs() < EPSILON
            || (self.end_param - self.start_param - 360.0).abs() < EPSILON
    }

    /// 参数扫过的角度（度）
    fn sweep(&self) -> f64 {
        if self.is_full() {
            return 360.0;
        }
        let mut sweep = self.end_param - self.start_param;
        if sweep <= 0.0 {
            sweep += 360.0;
        }
        sweep
    }

    /// 指定参数（度）处的 OCS 平面内坐标
    fn local_point_at(&self, degrees: f64) -> Vector2 {
        let t = degrees.to_radians();
        self.major_axis * t.cos() + self.minor_axis() * t.sin()
    }

    /// 指定参数（度）处的 WCS 点
    pub fn point_at(&self, degrees: f64) -> Point3 {
        let local = self.local_point_at(degrees);
        self.center + arbitrary_axis(&self.normal) * Vector3::new(local.x, local.y, 0.0)
    }

    /// 计算周长（Ramanujan 近似）
    pub fn circumference(&self) -> f64 {
        let a = self.major_radius();
        let b = self.minor_radius();
        let h = ((a - b) / (a + b)).powi(2);
        std::f64::consts::PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
    }

    /// 计算面积
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.major_radius() * self.minor_radius()
    }

    /// 以折线近似椭圆（弧），返回 WCS 采样点
    pub fn sample_points(&self, precision: usize) -> Result<Vec<Point3>, GeometryError> {
        if precision < 2 {
            return Err(GeometryError::InvalidPrecision(precision));
        }
        Ok(self.sample(precision))
    }

    fn sample(&self, precision: usize) -> Vec<Point3> {
        let sweep = self.sweep();
        let mut points = Vec::with_capacity(precision);
        if self.is_full() {
            // 完整椭圆不重复闭合点
            for i in 0..precision {
                let t = self.start_param + sweep * i as f64 / precision as f64;
                points.push(self.point_at(t));
            }
        } else {
            for i in 0..precision {
                let t = self.start_param + sweep * i as f64 / (precision - 1) as f64;
                points.push(self.point_at(t));
            }
        }
        points
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(self.sample(DEFAULT_CURVE_PRECISION.max(32)))
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        let frame = FrameMap::new(m, t, &self.normal);

        // 映射后的轴向量是一对共轭直径，重新求主轴
        let minor = self.minor_axis();
        let u3 = frame.map_direction(&Vector3::new(self.major_axis.x, self.major_axis.y, 0.0));
        let v3 = frame.map_direction(&Vector3::new(minor.x, minor.y, 0.0));
        let u = Vector2::new(u3.x, u3.y);
        let v = Vector2::new(v3.x, v3.y);

        let (new_major, minor_len) = axes_from_conjugate(&u, &v);
        let new_ratio = (minor_len / new_major.norm()).clamp(EPSILON, 1.0);

        // 起止参数：把参数点映射后在新轴坐标系下重新取参数
        let mirrored = frame.reflects_plane();
        let (new_start, new_end) = if self.is_full() {
            (0.0, 360.0)
        } else {
            let e1 = new_major.normalize();
            let e2 = Vector2::new(-e1.y, e1.x);
            let a = new_major.norm();
            let b = a * new_ratio;
            let reparam = |degrees: f64| -> f64 {
                let local = self.local_point_at(degrees);
                let p3 = frame.map_direction(&Vector3::new(local.x, local.y, 0.0));
                let p = Vector2::new(p3.x, p3.y);
                normalize_angle((p.dot(&e2) / b).atan2(p.dot(&e1) / a).to_degrees())
            };
            let s = reparam(self.start_param);
            let e = reparam(self.end_param);
            // 镜像翻转绕行方向，交换起止参数
            if mirrored {
                (e, s)
            } else {
                (s, e)
            }
        };

        self.center = m * self.center + t;
        self.normal = frame.new_normal;
        self.major_axis = new_major;
        self.ratio = new_ratio;
        self.start_param = new_start;
        self.end_param = new_end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn test_invalid_arguments() {
        assert!(Ellipse::new(Point3::origin(), Vector2::zeros(), 0.5).is_err());
        assert!(matches!(
            Ellipse::new(Point3::origin(), Vector2::new(5.0, 0.0), 1.5),
            Err(GeometryError::InvalidAxisRatio(_))
        ));
        assert!(Ellipse::new(Point3::origin(), Vector2::new(5.0, 0.0), 0.0).is_err());
    }

    #[test]
    fn test_axes_from_conjugate_orthogonal() {
        // 已经正交的共轭直径直接得到轴
        let (major, minor_len) = axes_from_conjugate(&Vector2::new(4.0, 0.0), &Vector2::new(0.0, 2.0));
        assert!(approx_eq(major.norm(), 4.0));
        assert!(approx_eq(minor_len, 2.0));
        assert!(major.y.abs() < EPSILON);
    }

    #[test]
    fn test_axes_from_conjugate_rotated() {
        // 旋转45°的圆保持为圆
        let s = std::f64::consts::FRAC_1_SQRT_2 * 3.0;
        let (major, minor_len) = axes_from_conjugate(&Vector2::new(s, s), &Vector2::new(-s, s));
        assert!(approx_eq(major.norm(), 3.0));
        assert!(approx_eq(minor_len, 3.0));
    }

    #[test]
    fn test_uniform_scale() {
        let mut e = Ellipse::new(Point3::origin(), Vector2::new(4.0, 0.0), 0.5).unwrap();
        let m = Matrix3::from_diagonal(&Vector3::new(2.0, 2.0, 2.0));
        e.transform_by(&m, &Vector3::zeros()).unwrap();
        assert!(approx_eq(e.major_radius(), 8.0));
        assert!(approx_eq(e.ratio(), 0.5));
    }

    #[test]
    fn test_nonuniform_scale_swaps_axes() {
        // X方向压缩到四分之一后，原来的短轴方向变成长轴
        let mut e = Ellipse::new(Point3::origin(), Vector2::new(4.0, 0.0), 0.5).unwrap();
        let m = Matrix3::from_diagonal(&Vector3::new(0.25, 1.0, 1.0));
        e.transform_by(&m, &Vector3::zeros()).unwrap();

        assert!(approx_eq(e.major_radius(), 2.0));
        assert!(approx_eq(e.ratio(), 0.5));
        // 新长轴沿Y方向
        assert!(e.major_axis().x.abs() < 1e-9);
    }

    #[test]
    fn test_arc_params_after_rotation() {
        let mut e =
            Ellipse::arc(Point3::origin(), Vector2::new(4.0, 0.0), 0.5, 0.0, 90.0).unwrap();
        let start_before = e.point_at(e.start_param);

        let m = crate::transform::Transform3::rotation_z(std::f64::consts::FRAC_PI_2);
        e.transform_by(&m.linear(), &m.translation_part()).unwrap();

        // 起点跟随旋转
        let start_after = e.point_at(e.start_param);
        let expected = Point3::new(-start_before.y, start_before.x, start_before.z);
        assert!((start_after - expected).norm() < 1e-9);
    }

    #[test]
    fn test_full_ellipse_stays_full() {
        let mut e = Ellipse::new(Point3::origin(), Vector2::new(4.0, 1.0), 0.7).unwrap();
        let m = Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, 1.0));
        e.transform_by(&m, &Vector3::zeros()).unwrap();
        assert!(e.is_full());
    }
}
