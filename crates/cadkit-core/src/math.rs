//! 数学基础类型
//!
//! 基于 nalgebra 提供的向量、点和矩阵类型的别名。

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 3D点类型
pub type Point3 = na::Point3<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 3D向量类型
pub type Vector3 = na::Vector3<f64>;

/// 3x3线性变换矩阵
pub type Matrix3 = na::Matrix3<f64>;

/// 4x4仿射变换矩阵
pub type Matrix4 = na::Matrix4<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// 判断两个3D点是否近似相等
#[inline]
pub fn points_approx_eq(a: &Point3, b: &Point3) -> bool {
    (a - b).norm() < EPSILON
}

/// 将角度（度）归一化到 [0, 360)
#[inline]
pub fn normalize_angle(degrees: f64) -> f64 {
    let r = degrees % 360.0;
    if r < 0.0 {
        r + 360.0
    } else {
        r
    }
}

/// 计算2D向量相对X轴的角度（度），归一化到 [0, 360)
#[inline]
pub fn vector_angle(v: &Vector2) -> f64 {
    normalize_angle(v.y.atan2(v.x).to_degrees())
}

/// 3D包围盒
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox3 {
    /// 创建新的包围盒
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// 创建空的包围盒（无效状态）
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// 从点集创建包围盒
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    /// 扩展包围盒以包含指定点
    pub fn expand_to_include(&mut self, point: &Point3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// 合并两个包围盒
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// 检查是否包含指定点
    pub fn contains(&self, point: &Point3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// 获取中心点
    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle() {
        assert!(approx_eq(normalize_angle(370.0), 10.0));
        assert!(approx_eq(normalize_angle(-90.0), 270.0));
        assert!(approx_eq(normalize_angle(360.0), 0.0));
        assert!(approx_eq(normalize_angle(0.0), 0.0));
    }

    #[test]
    fn test_vector_angle() {
        assert!(approx_eq(vector_angle(&Vector2::new(1.0, 0.0)), 0.0));
        assert!(approx_eq(vector_angle(&Vector2::new(0.0, 1.0)), 90.0));
        assert!(approx_eq(vector_angle(&Vector2::new(-1.0, 0.0)), 180.0));
        assert!(approx_eq(vector_angle(&Vector2::new(0.0, -1.0)), 270.0));
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox3::from_points([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 5.0, -2.0),
            Point3::new(-5.0, 8.0, 3.0),
        ]);

        assert!(approx_eq(bbox.min.x, -5.0));
        assert!(approx_eq(bbox.min.z, -2.0));
        assert!(approx_eq(bbox.max.x, 10.0));
        assert!(approx_eq(bbox.max.y, 8.0));
        assert!(bbox.contains(&Point3::new(0.0, 4.0, 0.0)));
        assert!(!bbox.contains(&Point3::new(20.0, 4.0, 0.0)));
    }
}
