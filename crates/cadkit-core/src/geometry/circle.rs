//! 圆和圆弧
//!
//! 圆心保存在 WCS；半径与圆弧角度定义在实体自己的 OCS 平面内，
//! 变换时通过参考方向映射重新推导。

use crate::error::GeometryError;
use crate::geometry::{validated_normal, FrameMap, DEFAULT_CURVE_PRECISION};
use crate::math::{normalize_angle, vector_angle, BoundingBox3, Matrix3, Point3, Vector2, Vector3, EPSILON};
use crate::ocs::arbitrary_axis;
use serde::{Deserialize, Serialize};

/// 圆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    /// 圆心（WCS）
    pub center: Point3,
    radius: f64,
    normal: Vector3,
}

impl Circle {
    /// 创建圆，半径必须为正
    pub fn new(center: Point3, radius: f64) -> Result<Self, GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::NonPositive("radius"));
        }
        Ok(Self {
            center,
            radius,
            normal: Vector3::z(),
        })
    }

    /// 半径
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// 设置半径，非正值立即失败
    pub fn set_radius(&mut self, radius: f64) -> Result<(), GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::NonPositive("radius"));
        }
        self.radius = radius;
        Ok(())
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

    /// 计算周长
    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius
    }

    /// 计算面积
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// 以多边形近似圆，返回 WCS 采样点
    pub fn sample_points(&self, precision: usize) -> Result<Vec<Point3>, GeometryError> {
        if precision < 2 {
            return Err(GeometryError::InvalidPrecision(precision));
        }
        Ok(self.sample(precision))
    }

    fn sample(&self, precision: usize) -> Vec<Point3> {
        let frame = arbitrary_axis(&self.normal);
        let mut points = Vec::with_capacity(precision);
        for i in 0..precision {
            let a = 2.0 * std::f64::consts::PI * i as f64 / precision as f64;
            let local = Vector3::new(self.radius * a.cos(), self.radius * a.sin(), 0.0);
            points.push(self.center + frame * local);
        }
        points
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(self.sample(DEFAULT_CURVE_PRECISION))
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        let frame = FrameMap::new(m, t, &self.normal);

        // 半径从变换后的局部X参考方向重新推导；退化为零时代以极小正值
        let v = frame.map_direction(&Vector3::new(self.radius, 0.0, 0.0));
        let mut new_radius = Vector2::new(v.x, v.y).norm();
        if new_radius < EPSILON {
            new_radius = EPSILON;
        }

        self.center = m * self.center + t;
        self.normal = frame.new_normal;
        self.radius = new_radius;
        Ok(())
    }
}

/// 圆弧
///
/// 角度单位为度，从 OCS 的X轴起逆时针计量；圆弧总是从起始角
/// 逆时针扫到终止角。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arc {
    /// 圆心（WCS）
    pub center: Point3,
    radius: f64,
    /// 起始角度（度）
    pub start_angle: f64,
    /// 终止角度（度）
    pub end_angle: f64,
    normal: Vector3,
}

impl Arc {
    /// 创建圆弧，半径必须为正
    pub fn new(
        center: Point3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self, GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::NonPositive("radius"));
        }
        Ok(Self {
            center,
            radius,
            start_angle: normalize_angle(start_angle),
            end_angle: normalize_angle(end_angle),
            normal: Vector3::z(),
        })
    }

    /// 半径
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// 设置半径，非正值立即失败
    pub fn set_radius(&mut self, radius: f64) -> Result<(), GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::NonPositive("radius"));
        }
        self.radius = radius;
        Ok(())
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

    /// 扫过的角度（度），始终为正
    pub fn sweep(&self) -> f64 {
        let mut sweep = self.end_angle - self.start_angle;
        if sweep <= 0.0 {
            sweep += 360.0;
        }
        sweep
    }

    /// 计算弧长
    pub fn length(&self) -> f64 {
        self.sweep().to_radians() * self.radius
    }

    /// 圆弧上指定角度（度）的 WCS 点
    pub fn point_at(&self, degrees: f64) -> Point3 {
        let frame = arbitrary_axis(&self.normal);
        let rad = degrees.to_radians();
        let local = Vector3::new(self.radius * rad.cos(), self.radius * rad.sin(), 0.0);
        self.center + frame * local
    }

    /// 获取起点
    pub fn start_point(&self) -> Point3 {
        self.point_at(self.start_angle)
    }

    /// 获取终点
    pub fn end_point(&self) -> Point3 {
        self.point_at(self.end_angle)
    }

    /// 以折线近似圆弧，返回 WCS 采样点（含两端）
    pub fn sample_points(&self, precision: usize) -> Result<Vec<Point3>, GeometryError> {
        if precision < 2 {
            return Err(GeometryError::InvalidPrecision(precision));
        }
        Ok(self.sample(precision))
    }

    fn sample(&self, precision: usize) -> Vec<Point3> {
        let sweep = self.sweep();
        let mut points = Vec::with_capacity(precision);
        for i in 0..precision {
            let a = self.start_angle + sweep * i as f64 / (precision - 1) as f64;
            points.push(self.point_at(a));
        }
        points
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(self.sample(DEFAULT_CURVE_PRECISION))
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        let frame = FrameMap::new(m, t, &self.normal);

        let v = frame.map_direction(&Vector3::new(self.radius, 0.0, 0.0));
        let mut new_radius = Vector2::new(v.x, v.y).norm();
        if new_radius < EPSILON {
            new_radius = EPSILON;
        }

        // 起止角：把圆弧端点的径向参考方向映射到新OCS再取角度
        let sa = self.start_angle.to_radians();
        let ea = self.end_angle.to_radians();
        let vs = frame.map_direction(&Vector3::new(
            self.radius * sa.cos(),
            self.radius * sa.sin(),
            0.0,
        ));
        let ve = frame.map_direction(&Vector3::new(
            self.radius * ea.cos(),
            self.radius * ea.sin(),
            0.0,
        ));
        let mut new_start = vector_angle(&Vector2::new(vs.x, vs.y));
        let mut new_end = vector_angle(&Vector2::new(ve.x, ve.y));

        // 镜像翻转绕行方向，交换两角以维持逆时针约定
        if frame.reflects_plane() {
            std::mem::swap(&mut new_start, &mut new_end);
        }

        self.center = m * self.center + t;
        self.normal = frame.new_normal;
        self.radius = new_radius;
        self.start_angle = new_start;
        self.end_angle = new_end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;
    use crate::transform::Transform3;

    #[test]
    fn test_invalid_radius() {
        assert!(Circle::new(Point3::origin(), 0.0).is_err());
        assert!(Circle::new(Point3::origin(), -1.0).is_err());
        assert!(Arc::new(Point3::origin(), -2.0, 0.0, 90.0).is_err());
    }

    #[test]
    fn test_circle_area() {
        let circle = Circle::new(Point3::origin(), 1.0).unwrap();
        assert!(approx_eq(circle.area(), std::f64::consts::PI));
    }

    #[test]
    fn test_scenario_rotate_and_translate() {
        // Circle(center=(0,0,0), r=1, normal=+Z)，绕Z旋转90°并平移(5,0,0)
        // ⇒ center=(5,0,0)，radius=1，normal 不变
        let mut circle = Circle::new(Point3::origin(), 1.0).unwrap();
        let tr = Transform3::translation(5.0, 0.0, 0.0)
            .then(&Transform3::rotation_z(std::f64::consts::FRAC_PI_2));
        circle
            .transform_by(&tr.linear(), &tr.translation_part())
            .unwrap();

        assert!((circle.center - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-12);
        assert!(approx_eq(circle.radius(), 1.0));
        assert!((circle.normal() - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_identity_changes_nothing() {
        let mut circle = Circle::new(Point3::new(1.0, 2.0, 3.0), 4.0).unwrap();
        circle
            .transform_by(&Matrix3::identity(), &Vector3::zeros())
            .unwrap();
        assert!(approx_eq(circle.radius(), 4.0));
        assert!((circle.center - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-12);

        let mut arc = Arc::new(Point3::origin(), 2.0, 30.0, 120.0).unwrap();
        arc.transform_by(&Matrix3::identity(), &Vector3::zeros())
            .unwrap();
        assert!(approx_eq(arc.start_angle, 30.0));
        assert!(approx_eq(arc.end_angle, 120.0));
        assert!(approx_eq(arc.radius(), 2.0));
    }

    #[test]
    fn test_circle_uniform_scale() {
        let mut circle = Circle::new(Point3::new(2.0, 0.0, 0.0), 3.0).unwrap();
        let m = Matrix3::from_diagonal(&Vector3::new(2.0, 2.0, 2.0));
        circle.transform_by(&m, &Vector3::zeros()).unwrap();
        assert!(approx_eq(circle.radius(), 6.0));
        assert!((circle.center - Point3::new(4.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_circle_transform_composability() {
        let t1 = Transform3::rotation_x(0.3).then(&Transform3::uniform_scale(1.5));
        let t2 = Transform3::translation(1.0, 2.0, 3.0).then(&Transform3::rotation_z(1.1));

        let mut stepwise = Circle::new(Point3::new(4.0, -1.0, 2.0), 2.5).unwrap();
        let mut composed = stepwise.clone();

        stepwise
            .transform_by(&t1.linear(), &t1.translation_part())
            .unwrap();
        stepwise
            .transform_by(&t2.linear(), &t2.translation_part())
            .unwrap();

        let c = t2.then(&t1);
        composed
            .transform_by(&c.linear(), &c.translation_part())
            .unwrap();

        assert!((stepwise.center - composed.center).norm() < 1e-9);
        assert!((stepwise.radius() - composed.radius()).abs() < 1e-9);
        assert!((stepwise.normal() - composed.normal()).norm() < 1e-9);
    }

    #[test]
    fn test_arc_rotation_updates_angles() {
        let mut arc = Arc::new(Point3::origin(), 1.0, 0.0, 90.0).unwrap();
        let tr = Transform3::rotation_z(std::f64::consts::FRAC_PI_2);
        arc.transform_by(&tr.linear(), &tr.translation_part())
            .unwrap();
        assert!(approx_eq(arc.start_angle, 90.0));
        assert!(approx_eq(arc.end_angle, 180.0));
    }

    #[test]
    fn test_arc_mirror_swaps_angles() {
        let mut arc = Arc::new(Point3::origin(), 1.0, 0.0, 90.0).unwrap();
        let m = Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, 1.0));
        arc.transform_by(&m, &Vector3::zeros()).unwrap();

        // 镜像后圆弧仍逆时针：起点在 90°（镜像的终点），终点在 180°
        assert!(approx_eq(arc.start_angle, 90.0));
        assert!(approx_eq(arc.end_angle, 180.0));
        // 端点坐标与镜像前的端点镜像一致
        assert!((arc.start_point() - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-9);
        assert!((arc.end_point() - Point3::new(-1.0, 0.0, 0.0)).norm() < 1e-9);
    }
}
