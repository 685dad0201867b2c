//! 对象坐标系（OCS）
//!
//! 实体的局部坐标系仅由其法向量确定。任意轴算法（Arbitrary Axis
//! Algorithm）从一个法向量确定性地构造出正交右手基，无需迭代：
//!
//! - 若法向量几乎平行于世界Z轴（|nx| < 1/64 且 |ny| < 1/64），
//!   以世界Y轴作为参考轴，否则以世界Z轴作为参考轴；
//! - X轴 = normalize(参考轴 × 法向量)，Y轴 = normalize(法向量 × X轴)。
//!
//! 参考轴的选取避免了两个近平行向量叉积的数值爆炸。阈值处基的选取
//! 不连续——这是有意为之并被依赖的行为，不是缺陷。

use crate::math::{Matrix3, Vector3};

/// 任意轴算法的参考轴切换阈值
const AXIS_THRESHOLD: f64 = 1.0 / 64.0;

/// 从法向量构造 OCS→WCS 变换矩阵。
///
/// 返回的正交矩阵第三列等于 normalize(normal)；其转置即 WCS→OCS。
/// 调用者必须保证 `normal` 非零（实体的法向量设置器负责此校验）。
pub fn arbitrary_axis(normal: &Vector3) -> Matrix3 {
    let n = normal.normalize();

    let reference = if n.x.abs() < AXIS_THRESHOLD && n.y.abs() < AXIS_THRESHOLD {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let x_axis = reference.cross(&n).normalize();
    let y_axis = n.cross(&x_axis).normalize();

    Matrix3::from_columns(&[x_axis, y_axis, n])
}

/// 将 OCS 中的点提升到 WCS
#[inline]
pub fn ocs_to_wcs(normal: &Vector3, local: &Vector3) -> Vector3 {
    arbitrary_axis(normal) * local
}

/// 将 WCS 中的点投影到 OCS
#[inline]
pub fn wcs_to_ocs(normal: &Vector3, world: &Vector3) -> Vector3 {
    arbitrary_axis(normal).transpose() * world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, EPSILON};

    fn assert_orthonormal_right_handed(m: &Matrix3) {
        let x = m.column(0).into_owned();
        let y = m.column(1).into_owned();
        let z = m.column(2).into_owned();

        assert!(approx_eq(x.norm(), 1.0));
        assert!(approx_eq(y.norm(), 1.0));
        assert!(approx_eq(z.norm(), 1.0));
        assert!(x.dot(&y).abs() < EPSILON);
        assert!(y.dot(&z).abs() < EPSILON);
        assert!(z.dot(&x).abs() < EPSILON);
        // 右手系：x × y = z
        assert!((x.cross(&y) - z).norm() < EPSILON);
    }

    #[test]
    fn test_axis_aligned_normals() {
        for n in [
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
            -Vector3::x(),
            -Vector3::y(),
            -Vector3::z(),
        ] {
            let m = arbitrary_axis(&n);
            assert_orthonormal_right_handed(&m);
            assert!((m.column(2).into_owned() - n.normalize()).norm() < EPSILON);
        }
    }

    #[test]
    fn test_world_z_identity() {
        // 法向量为世界Z时，OCS 与 WCS 重合
        let m = arbitrary_axis(&Vector3::z());
        assert!((m - Matrix3::identity()).norm() < EPSILON);
    }

    #[test]
    fn test_threshold_straddle() {
        // 阈值两侧的法向量都必须产生合法的正交右手基
        let eps = 1e-6;
        let inside = Vector3::new(1.0 / 64.0 - eps, 0.0, 1.0);
        let outside = Vector3::new(1.0 / 64.0 + eps, 0.0, 1.0);

        let mi = arbitrary_axis(&inside);
        let mo = arbitrary_axis(&outside);
        assert_orthonormal_right_handed(&mi);
        assert_orthonormal_right_handed(&mo);

        // 阈值内使用世界Y作为参考轴：x = y × n
        let ni = inside.normalize();
        let expected_x = Vector3::y().cross(&ni).normalize();
        assert!((mi.column(0).into_owned() - expected_x).norm() < EPSILON);

        // 阈值外使用世界Z作为参考轴
        let no = outside.normalize();
        let expected_x = Vector3::z().cross(&no).normalize();
        assert!((mo.column(0).into_owned() - expected_x).norm() < EPSILON);
    }

    #[test]
    fn test_near_negative_z() {
        let m = arbitrary_axis(&Vector3::new(0.001, -0.002, -1.0));
        assert_orthonormal_right_handed(&m);
    }

    #[test]
    fn test_unnormalized_input() {
        // 未归一化的输入得到与归一化后相同的基
        let a = arbitrary_axis(&Vector3::new(3.0, 4.0, 5.0));
        let b = arbitrary_axis(&Vector3::new(3.0, 4.0, 5.0).normalize());
        assert!((a - b).norm() < EPSILON);
    }

    #[test]
    fn test_roundtrip() {
        let n = Vector3::new(1.0, 2.0, 3.0);
        let local = Vector3::new(5.0, -7.0, 2.0);
        let world = ocs_to_wcs(&n, &local);
        let back = wcs_to_ocs(&n, &world);
        assert!((back - local).norm() < EPSILON);
    }
}
