//! 多线
//!
//! 多线沿一条骨架折线同时绘制多条平行元素线。每个顶点携带自己的
//! 切线方向与斜接方向；每条元素线相对骨架的偏移来自样式，乘以
//! 实体的比例因子。变换时逐顶点映射位置与方向，偏移距离统一乘以
//! 参考方向的缩放因子。

use crate::error::GeometryError;
use crate::geometry::{validated_normal, FrameMap};
use crate::math::{BoundingBox3, Matrix3, Point3, Vector2, Vector3, EPSILON};
use crate::ocs::arbitrary_axis;
use serde::{Deserialize, Serialize};

/// 多线对正方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MlineJustification {
    /// 顶部对正
    Top,
    /// 中线对正（默认）
    #[default]
    Zero,
    /// 底部对正
    Bottom,
}

impl MlineJustification {
    /// 镜像对：顶/底互换，中线自身配对
    pub fn mirrored(self) -> Self {
        match self {
            MlineJustification::Top => MlineJustification::Bottom,
            MlineJustification::Bottom => MlineJustification::Top,
            MlineJustification::Zero => MlineJustification::Zero,
        }
    }
}

/// 多线顶点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlineVertex {
    /// 位置（OCS）
    pub position: Vector2,
    /// 该顶点处的切线方向（单位向量）
    pub direction: Vector2,
    /// 该顶点处的斜接方向（单位向量）
    pub miter: Vector2,
}

impl MlineVertex {
    pub fn new(position: Vector2, direction: Vector2, miter: Vector2) -> Self {
        Self {
            position,
            direction,
            miter,
        }
    }
}

/// 多线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Multiline {
    pub vertices: Vec<MlineVertex>,
    /// 每条元素线相对骨架的偏移（来自样式的标量默认）
    pub offsets: Vec<f64>,
    /// 对正方式
    pub justification: MlineJustification,
    /// 是否闭合
    pub is_closed: bool,
    /// OCS 平面的标高
    pub elevation: f64,
    scale: f64,
    normal: Vector3,
}

impl Multiline {
    /// 创建多线：至少两个顶点、至少一条元素线
    pub fn new(vertices: Vec<MlineVertex>, offsets: Vec<f64>) -> Result<Self, GeometryError> {
        if vertices.len() < 2 {
            return Err(GeometryError::NotEnoughVertices {
                required: 2,
                actual: vertices.len(),
            });
        }
        if offsets.is_empty() {
            return Err(GeometryError::EmptyCollection("multiline element offsets"));
        }
        Ok(Self {
            vertices,
            offsets,
            justification: MlineJustification::default(),
            is_closed: false,
            elevation: 0.0,
            scale: 1.0,
            normal: Vector3::z(),
        })
    }

    /// 从折线点创建，方向与斜接按相邻段自动推导
    pub fn from_points(
        points: &[Vector2],
        offsets: Vec<f64>,
    ) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            return Err(GeometryError::NotEnoughVertices {
                required: 2,
                actual: points.len(),
            });
        }
        let mut vertices = Vec::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            let dir_in = if i > 0 {
                (points[i] - points[i - 1]).normalize()
            } else {
                (points[1] - points[0]).normalize()
            };
            let dir_out = if i + 1 < points.len() {
                (points[i + 1] - points[i]).normalize()
            } else {
                dir_in
            };
            let direction = dir_out;
            // 斜接方向：相邻段方向和的左法向
            let sum = dir_in + dir_out;
            let miter = if sum.norm() < EPSILON {
                Vector2::new(-direction.y, direction.x)
            } else {
                let s = sum.normalize();
                Vector2::new(-s.y, s.x)
            };
            vertices.push(MlineVertex::new(*p, direction, miter));
        }
        Self::new(vertices, offsets)
    }

    /// 比例因子
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// 设置比例因子，非正值立即失败
    pub fn set_scale(&mut self, scale: f64) -> Result<(), GeometryError> {
        if scale <= 0.0 {
            return Err(GeometryError::NonPositive("multiline scale"));
        }
        self.scale = scale;
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

    /// 某条元素线在顶点处的实际偏移量
    pub fn element_offset(&self, element: usize) -> Option<f64> {
        self.offsets.get(element).map(|o| o * self.scale)
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        let frame = arbitrary_axis(&self.normal);
        BoundingBox3::from_points(self.vertices.iter().map(|v| {
            Point3::from(frame * Vector3::new(v.position.x, v.position.y, self.elevation))
        }))
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        let frame = FrameMap::new(m, t, &self.normal);
        let scale = frame.uniform_scale();
        let mirrored = frame.reflects_plane();

        let mut new_elevation = self.elevation;
        for v in &mut self.vertices {
            let p = frame.map_point(&Vector3::new(v.position.x, v.position.y, self.elevation));
            v.position = Vector2::new(p.x, p.y);
            new_elevation = p.z;

            // 方向向量不含平移，映射后重新归一化；退化时保留原方向
            let d = frame.map_direction(&Vector3::new(v.direction.x, v.direction.y, 0.0));
            let d2 = Vector2::new(d.x, d.y);
            if d2.norm() > EPSILON {
                v.direction = d2.normalize();
            }
            let mi = frame.map_direction(&Vector3::new(v.miter.x, v.miter.y, 0.0));
            let mi2 = Vector2::new(mi.x, mi.y);
            if mi2.norm() > EPSILON {
                v.miter = mi2.normalize();
            }
        }

        // 逐元素偏移统一缩放；镜像翻转对正方向
        if scale > EPSILON {
            self.scale *= scale;
        }
        if mirrored {
            self.justification = self.justification.mirrored();
        }

        self.elevation = new_elevation;
        self.normal = frame.new_normal;
        Ok(())
    }
}
