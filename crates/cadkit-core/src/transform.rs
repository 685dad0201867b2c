//! 3D仿射变换
//!
//! 支持平移、旋转、缩放、镜像等变换。4x4矩阵可分解为
//! 3x3线性部分加平移向量，供实体变换协议使用。

use crate::math::{Matrix3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// 3D仿射变换
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform3 {
    matrix: Matrix4,
}

impl Transform3 {
    /// 创建单位变换
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// 创建平移变换
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// 创建绕X轴的旋转变换（弧度）
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// 创建绕Y轴的旋转变换（弧度）
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// 创建绕Z轴的旋转变换（弧度）
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// 创建非均匀缩放变换
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// 创建均匀缩放变换
    pub fn uniform_scale(s: f64) -> Self {
        Self::scale(s, s, s)
    }

    /// 创建相对YZ平面的镜像变换
    pub fn mirror_yz() -> Self {
        Self::scale(-1.0, 1.0, 1.0)
    }

    /// 创建相对XZ平面的镜像变换
    pub fn mirror_xz() -> Self {
        Self::scale(1.0, -1.0, 1.0)
    }

    /// 创建相对XY平面的镜像变换
    pub fn mirror_xy() -> Self {
        Self::scale(1.0, 1.0, -1.0)
    }

    /// 组合两个变换（先应用 other，再应用 self）
    pub fn then(&self, other: &Transform3) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// 变换一个点
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        self.matrix.transform_point(point)
    }

    /// 变换一个向量（不受平移影响）
    pub fn transform_vector(&self, vector: &Vector3) -> Vector3 {
        self.linear() * vector
    }

    /// 获取逆变换
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|m| Self { matrix: m })
    }

    /// 获取变换矩阵
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    /// 从矩阵创建变换
    pub fn from_matrix(matrix: Matrix4) -> Self {
        Self { matrix }
    }

    /// 提取3x3线性部分
    pub fn linear(&self) -> Matrix3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// 提取平移分量
    pub fn translation_part(&self) -> Vector3 {
        Vector3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_translation() {
        let t = Transform3::translation(10.0, 20.0, 30.0);
        let p = Point3::new(5.0, 5.0, 5.0);
        let result = t.transform_point(&p);

        assert!(approx_eq(result.x, 15.0));
        assert!(approx_eq(result.y, 25.0));
        assert!(approx_eq(result.z, 35.0));
    }

    #[test]
    fn test_rotation_z() {
        let t = Transform3::rotation_z(PI / 2.0);
        let p = Point3::new(1.0, 0.0, 0.0);
        let result = t.transform_point(&p);

        assert!(approx_eq(result.x, 0.0));
        assert!(approx_eq(result.y, 1.0));
    }

    #[test]
    fn test_decompose() {
        let t = Transform3::translation(1.0, 2.0, 3.0).then(&Transform3::rotation_z(0.5));
        let p = Point3::new(7.0, -4.0, 2.0);

        // 分解出的 (M, T) 与直接应用矩阵等价
        let direct = t.transform_point(&p);
        let decomposed = t.linear() * p + t.translation_part();
        assert!((direct - decomposed).norm() < 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Transform3::translation(10.0, 20.0, 0.0)
            .then(&Transform3::rotation_z(0.5))
            .then(&Transform3::scale(2.0, 3.0, 1.0));

        let inv = t.inverse().unwrap();
        let p = Point3::new(100.0, 200.0, 50.0);

        let transformed = t.transform_point(&p);
        let restored = inv.transform_point(&transformed);

        assert!((restored - p).norm() < 1e-9);
    }

    #[test]
    fn test_mirror_determinant() {
        let t = Transform3::mirror_yz();
        assert!(approx_eq(t.linear().determinant(), -1.0));
    }
}
