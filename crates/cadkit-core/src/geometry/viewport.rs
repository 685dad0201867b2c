//! 视口
//!
//! 图纸空间中的一个观察窗口。可携带一个自有的裁剪边界实体；
//! 变换时同一个 (M, T) 在本次调用内同步传播给裁剪边界，绝不
//! 延迟或异步。

use crate::error::GeometryError;
use crate::geometry::Geometry;
use crate::math::{BoundingBox3, Matrix3, Point3, Vector3, EPSILON};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 视口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// 视口中心（WCS）
    pub center: Point3,
    /// 观察方向
    pub view_direction: Vector3,
    /// 自有的裁剪边界实体
    pub clipping_boundary: Option<Box<Geometry>>,
    width: f64,
    height: f64,
}

impl Viewport {
    /// 创建视口，宽高必须为正
    pub fn new(center: Point3, width: f64, height: f64) -> Result<Self, GeometryError> {
        if width <= 0.0 {
            return Err(GeometryError::NonPositive("viewport width"));
        }
        if height <= 0.0 {
            return Err(GeometryError::NonPositive("viewport height"));
        }
        Ok(Self {
            center,
            view_direction: Vector3::z(),
            clipping_boundary: None,
            width,
            height,
        })
    }

    /// 视口宽度
    pub fn width(&self) -> f64 {
        self.width
    }

    /// 视口高度
    pub fn height(&self) -> f64 {
        self.height
    }

    /// 设置尺寸，非正值立即失败
    pub fn set_size(&mut self, width: f64, height: f64) -> Result<(), GeometryError> {
        if width <= 0.0 {
            return Err(GeometryError::NonPositive("viewport width"));
        }
        if height <= 0.0 {
            return Err(GeometryError::NonPositive("viewport height"));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points([
            self.center + Vector3::new(-self.width / 2.0, -self.height / 2.0, 0.0),
            self.center + Vector3::new(self.width / 2.0, self.height / 2.0, 0.0),
        ])
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        // 先变换自有的裁剪边界；失败时整个调用保持原状
        let new_boundary = match &self.clipping_boundary {
            Some(boundary) => {
                let mut b = boundary.clone();
                b.transform_by(m, t)?;
                Some(b)
            }
            None => None,
        };

        // 宽高按变换后参考方向的长度缩放，退化时代以极小正值
        let wx = (m * Vector3::new(self.width, 0.0, 0.0)).norm();
        let hy = (m * Vector3::new(0.0, self.height, 0.0)).norm();

        let new_dir = m * self.view_direction;
        if new_dir.norm() < EPSILON {
            debug!("transform produced a zero view direction, keeping the previous one");
        } else {
            self.view_direction = new_dir.normalize();
        }

        self.center = m * self.center + t;
        self.width = wx.max(EPSILON);
        self.height = hy.max(EPSILON);
        self.clipping_boundary = new_boundary;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, DimensionKind, Dimension};
    use crate::math::approx_eq;

    #[test]
    fn test_invalid_size() {
        assert!(Viewport::new(Point3::origin(), 0.0, 10.0).is_err());
        assert!(Viewport::new(Point3::origin(), 10.0, -1.0).is_err());
    }

    #[test]
    fn test_scale_changes_size() {
        let mut vp = Viewport::new(Point3::new(5.0, 5.0, 0.0), 10.0, 4.0).unwrap();
        let m = Matrix3::from_diagonal(&Vector3::new(2.0, 3.0, 1.0));
        vp.transform_by(&m, &Vector3::zeros()).unwrap();

        assert!(approx_eq(vp.width(), 20.0));
        assert!(approx_eq(vp.height(), 12.0));
        assert!((vp.center - Point3::new(10.0, 15.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_clipping_boundary_propagation() {
        let mut vp = Viewport::new(Point3::origin(), 10.0, 10.0).unwrap();
        vp.clipping_boundary = Some(Box::new(Geometry::Circle(
            Circle::new(Point3::origin(), 2.0).unwrap(),
        )));

        let m = Matrix3::from_diagonal(&Vector3::new(2.0, 2.0, 2.0));
        vp.transform_by(&m, &Vector3::new(1.0, 0.0, 0.0)).unwrap();

        match vp.clipping_boundary.as_deref() {
            Some(Geometry::Circle(c)) => {
                assert!(approx_eq(c.radius(), 4.0));
                assert!((c.center - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_failed_boundary_rejects_whole_call() {
        let mut vp = Viewport::new(Point3::origin(), 10.0, 10.0).unwrap();
        // 两线角度标注作为裁剪边界（构造上合法，但变换会退化）
        vp.clipping_boundary = Some(Box::new(Geometry::Dimension(Dimension::new(
            DimensionKind::Angular2Line {
                first_start: Point3::origin(),
                first_end: Point3::new(10.0, 0.0, 0.0),
                second_start: Point3::origin(),
                second_end: Point3::new(0.0, 10.0, 0.0),
            },
            Point3::new(5.0, 5.0, 0.0),
        ))));

        let mut m = Matrix3::zeros();
        m[(0, 0)] = 1.0;
        m[(0, 1)] = 1.0;
        m[(2, 2)] = 1.0;
        let result = vp.transform_by(&m, &Vector3::zeros());

        assert!(result.is_err());
        // 拒绝的调用保持视口不变
        assert!(approx_eq(vp.width(), 10.0));
        assert!((vp.center - Point3::origin()).norm() < 1e-12);
    }
}
