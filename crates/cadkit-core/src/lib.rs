//! CADKit 核心几何内核
//!
//! 图纸交换库的内存模型：2D/3D 图元实体，以及让任何实体都能被
//! 一致地平移、缩放、旋转、镜像的几何机制。
//!
//! # 架构设计
//!
//! - `ocs`: 任意轴算法，仅凭法向量构造实体的局部坐标系（OCS）
//! - `geometry`: 实体集合与逐实体的仿射变换协议
//! - `nurbs`: NURBS 曲线求值，用于样条与平滑多段线的细分
//! - `bulge`: 凸度↔圆弧转换，用于解释多段线的弧段
//! - `dimstyle`: 样式标量默认值与实体级覆盖表的统一解析
//!
//! # 示例
//!
//! ```rust
//! use cadkit_core::prelude::*;
//!
//! // 创建一个圆并绕Z轴旋转90°、平移 (5,0,0)
//! let mut circle = Circle::new(Point3::origin(), 1.0).unwrap();
//! let tr = Transform3::translation(5.0, 0.0, 0.0)
//!     .then(&Transform3::rotation_z(std::f64::consts::FRAC_PI_2));
//! circle.transform_by(&tr.linear(), &tr.translation_part()).unwrap();
//! assert!((circle.center - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-9);
//! ```

pub mod bulge;
pub mod dimstyle;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod math;
pub mod nurbs;
pub mod ocs;
pub mod properties;
pub mod transform;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::bulge::{arc_from_bulge, BulgeArc};
    pub use crate::dimstyle::{DimStyle, DimStyleOverride, StyleOverrides};
    pub use crate::entity::{Entity, EntityId};
    pub use crate::error::GeometryError;
    pub use crate::geometry::{
        transform_batch, Arc, Circle, Dimension, DimensionKind, Ellipse, Geometry, Hatch,
        HatchEdge, HatchPath, HatchPattern, Leader, Line, LwPolyline, Mesh, MeshEdge,
        MlineJustification, Multiline, Point, Polyline3d, PolylineVertex, SmoothType, Spline,
        Text, TextAlignment, Tolerance, Viewport,
    };
    pub use crate::math::{Matrix3, Matrix4, Point2, Point3, Vector2, Vector3};
    pub use crate::nurbs::nurbs_evaluate;
    pub use crate::ocs::arbitrary_axis;
    pub use crate::properties::{Color, LineType, LineWeight, Properties};
    pub use crate::transform::Transform3;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_entity_serde_roundtrip() {
        let entity = Entity::new(Geometry::Circle(
            Circle::new(Point3::new(1.0, 2.0, 3.0), 4.5).unwrap(),
        ));

        let json = serde_json::to_string(&entity).unwrap();
        let back: Entity = serde_json::from_str(&json).unwrap();

        match (&entity.geometry, &back.geometry) {
            (Geometry::Circle(a), Geometry::Circle(b)) => {
                assert!((a.center - b.center).norm() < 1e-12);
                assert!((a.radius() - b.radius()).abs() < 1e-12);
            }
            _ => unreachable!(),
        }
        assert_eq!(entity.id, back.id);
    }

    #[test]
    fn test_spline_serde_roundtrip() {
        let spline = Spline::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
            Some(vec![1.0, 2.0, 2.0, 1.0]),
            None,
            3,
            false,
            false,
        )
        .unwrap();

        let json = serde_json::to_string(&spline).unwrap();
        let back: Spline = serde_json::from_str(&json).unwrap();

        assert_eq!(back.degree(), 3);
        assert_eq!(back.weights(), spline.weights());
        assert_eq!(back.knots(), spline.knots());
    }
}
