//! 引线
//!
//! 从箭头出发指向注释的折线。顶点保存在 OCS 平面内；注释相对
//! 最后一个顶点的偏移是方向量，变换时不参与平移。箭头大小等
//! 标量默认值来自样式，经实体级覆盖表解析。

use crate::dimstyle::{DimStyle, DimStyleOverride, StyleOverrides};
use crate::error::GeometryError;
use crate::geometry::{validated_normal, FrameMap};
use crate::math::{BoundingBox3, Matrix3, Point3, Vector2, Vector3, EPSILON};
use crate::ocs::arbitrary_axis;
use serde::{Deserialize, Serialize};

/// 引线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leader {
    /// 顶点列表（OCS，从箭头到注释端）
    pub vertices: Vec<Vector2>,
    /// 注释相对最后一个顶点的偏移
    pub annotation_offset: Vector2,
    /// 是否带钩线
    pub has_hook_line: bool,
    /// 实体级样式覆盖表
    pub style_overrides: StyleOverrides,
    /// OCS 平面的标高
    pub elevation: f64,
    normal: Vector3,
}

impl Leader {
    /// 创建引线，至少需要两个顶点
    pub fn new(vertices: Vec<Vector2>) -> Result<Self, GeometryError> {
        if vertices.len() < 2 {
            return Err(GeometryError::NotEnoughVertices {
                required: 2,
                actual: vertices.len(),
            });
        }
        Ok(Self {
            vertices,
            annotation_offset: Vector2::zeros(),
            has_hook_line: false,
            style_overrides: StyleOverrides::new(),
            elevation: 0.0,
            normal: Vector3::z(),
        })
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

    /// 箭头位置（第一个顶点）
    pub fn arrow_point(&self) -> Vector2 {
        self.vertices[0]
    }

    /// 箭头方向（指向外侧的单位向量）
    pub fn arrow_direction(&self) -> Option<Vector2> {
        let d = self.vertices[0] - self.vertices[1];
        if d.norm() < EPSILON {
            None
        } else {
            Some(d.normalize())
        }
    }

    /// 钩线长度：箭头大小 × 整体比例，两者都先过覆盖表
    pub fn hook_line_length(&self, style: &DimStyle) -> f64 {
        style.resolve(&self.style_overrides, DimStyleOverride::ArrowSize)
            * style.resolve(&self.style_overrides, DimStyleOverride::DimScale)
    }

    /// 计算总长度
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        let frame = arbitrary_axis(&self.normal);
        BoundingBox3::from_points(
            self.vertices
                .iter()
                .map(|p| Point3::from(frame * Vector3::new(p.x, p.y, self.elevation))),
        )
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        let frame = FrameMap::new(m, t, &self.normal);

        let mut new_elevation = self.elevation;
        for v in &mut self.vertices {
            let p = frame.map_point(&Vector3::new(v.x, v.y, self.elevation));
            *v = Vector2::new(p.x, p.y);
            new_elevation = p.z;
        }

        // 注释偏移是方向量，不含平移
        let o = frame.map_direction(&Vector3::new(
            self.annotation_offset.x,
            self.annotation_offset.y,
            0.0,
        ));
        self.annotation_offset = Vector2::new(o.x, o.y);

        self.elevation = new_elevation;
        self.normal = frame.new_normal;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn test_requires_two_vertices() {
        assert!(Leader::new(vec![Vector2::zeros()]).is_err());
    }

    #[test]
    fn test_hook_line_length_resolution() {
        let style = DimStyle::default();
        let mut leader =
            Leader::new(vec![Vector2::new(0.0, 0.0), Vector2::new(5.0, 5.0)]).unwrap();

        // 默认：箭头 2.5 × 比例 1.0
        assert!(approx_eq(leader.hook_line_length(&style), 2.5));

        leader
            .style_overrides
            .insert(DimStyleOverride::ArrowSize, 4.0);
        leader.style_overrides.insert(DimStyleOverride::DimScale, 2.0);
        assert!(approx_eq(leader.hook_line_length(&style), 8.0));
    }

    #[test]
    fn test_offset_ignores_translation() {
        let mut leader =
            Leader::new(vec![Vector2::new(0.0, 0.0), Vector2::new(5.0, 0.0)]).unwrap();
        leader.annotation_offset = Vector2::new(1.0, 1.0);

        leader
            .transform_by(&Matrix3::identity(), &Vector3::new(100.0, 200.0, 0.0))
            .unwrap();

        // 顶点被平移，偏移不受影响
        assert!((leader.vertices[0] - Vector2::new(100.0, 200.0)).norm() < 1e-9);
        assert!((leader.annotation_offset - Vector2::new(1.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_arrow_direction() {
        let leader = Leader::new(vec![Vector2::new(0.0, 0.0), Vector2::new(3.0, 0.0)]).unwrap();
        let dir = leader.arrow_direction().unwrap();
        assert!((dir - Vector2::new(-1.0, 0.0)).norm() < 1e-12);
    }
}
