//! 几何图元定义
//!
//! 支持的图元：
//! - 点 (Point) / 线段 (Line)
//! - 圆 (Circle) / 圆弧 (Arc) / 椭圆 (Ellipse)
//! - 轻量多段线 (LwPolyline) / 3D多段线 (Polyline3d)
//! - 样条曲线 (Spline)
//! - 文本 (Text) / 公差 (Tolerance)
//! - 尺寸标注 (Dimension)
//! - 填充 (Hatch) / 多线 (Multiline) / 引线 (Leader)
//! - 视口 (Viewport) / 网格 (Mesh)
//!
//! 每个图元自己实现变换协议 `transform_by(M, T)`：法向量退化时保留
//! 原值；受约束标量（旋转、宽度因子、倾斜角、半径/高度）从变换后的
//! 参考方向重新推导并收敛到合法区间；参考方向互相平行等不可恢复的
//! 退化统一拒绝调用并保持实体不变。

mod circle;
mod dimension;
mod ellipse;
mod hatch;
mod leader;
mod mesh;
mod mline;
mod point;
mod polyline;
mod spline;
mod text;
mod tolerance;
mod viewport;

pub use circle::{Arc, Circle};
pub use dimension::{Dimension, DimensionKind};
pub use ellipse::Ellipse;
pub use hatch::{Hatch, HatchEdge, HatchPath, HatchPattern};
pub use leader::Leader;
pub use mesh::{Mesh, MeshEdge};
pub use mline::{MlineJustification, MlineVertex, Multiline};
pub use point::{Line, Point};
pub use polyline::{LwPolyline, Polyline3d, PolylineVertex, SmoothType};
pub use spline::Spline;
pub use text::{Text, TextAlignment, MIRROR_TEXT_DEFAULT};
pub use tolerance::Tolerance;
pub use viewport::Viewport;

use crate::entity::Entity;
use crate::error::GeometryError;
use crate::math::{BoundingBox3, Matrix3, Vector2, Vector3, EPSILON};
use crate::ocs::arbitrary_axis;
use crate::transform::Transform3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 实体没有自有文档提供细分密度设置时使用的默认值
pub const DEFAULT_CURVE_PRECISION: usize = 16;

/// 校验并归一化法向量，零向量立即失败
pub(crate) fn validated_normal(normal: Vector3) -> Result<Vector3, GeometryError> {
    if normal.norm() < EPSILON {
        return Err(GeometryError::ZeroNormal);
    }
    Ok(normal.normalize())
}

/// 变换法向量；结果为零向量时保留原法向量（文档化的退化回退）
pub(crate) fn transformed_normal(m: &Matrix3, old: &Vector3) -> Vector3 {
    let n = m * old;
    if n.norm() < EPSILON {
        debug!("transform produced a zero normal, keeping the previous one");
        *old
    } else {
        n.normalize()
    }
}

/// 局部坐标系三明治映射：旧OCS提升 → 仿射映射 → 新OCS投影。
///
/// 变换协议的公共骨架：每个实体用它映射局部点和参考方向，
/// 再从映射结果重新推导各自的受约束标量。
pub(crate) struct FrameMap {
    m: Matrix3,
    t: Vector3,
    old_frame: Matrix3,
    new_frame_inv: Matrix3,
    pub new_normal: Vector3,
}

impl FrameMap {
    pub fn new(m: &Matrix3, t: &Vector3, old_normal: &Vector3) -> Self {
        let new_normal = transformed_normal(m, old_normal);
        Self {
            m: *m,
            t: *t,
            old_frame: arbitrary_axis(old_normal),
            new_frame_inv: arbitrary_axis(&new_normal).transpose(),
            new_normal,
        }
    }

    /// 映射局部点（含平移）
    pub fn map_point(&self, local: &Vector3) -> Vector3 {
        self.new_frame_inv * (self.m * (self.old_frame * local) + self.t)
    }

    /// 映射局部方向（不含平移）
    pub fn map_direction(&self, local: &Vector3) -> Vector3 {
        self.new_frame_inv * (self.m * (self.old_frame * local))
    }

    /// 统一缩放因子：局部X单位方向映射后的平面内长度。
    /// 逐顶点的标量距离（宽度、偏移）一律乘以它。
    pub fn uniform_scale(&self) -> f64 {
        let v = self.map_direction(&Vector3::x());
        Vector2::new(v.x, v.y).norm()
    }

    /// 映射是否翻转了实体所在平面（镜像检测：变换后参考方向叉积为负）
    pub fn reflects_plane(&self) -> bool {
        let x = self.map_direction(&Vector3::x());
        let y = self.map_direction(&Vector3::y());
        x.x * y.y - x.y * y.x < 0.0
    }
}

/// 几何类型枚举
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point),
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Ellipse(Ellipse),
    LwPolyline(LwPolyline),
    Polyline3d(Polyline3d),
    Spline(Spline),
    Text(Text),
    Dimension(Dimension),
    Hatch(Hatch),
    Multiline(Multiline),
    Leader(Leader),
    Tolerance(Tolerance),
    Viewport(Viewport),
    Mesh(Mesh),
}

impl Geometry {
    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::Line(_) => "Line",
            Geometry::Circle(_) => "Circle",
            Geometry::Arc(_) => "Arc",
            Geometry::Ellipse(_) => "Ellipse",
            Geometry::LwPolyline(_) => "LwPolyline",
            Geometry::Polyline3d(_) => "Polyline3d",
            Geometry::Spline(_) => "Spline",
            Geometry::Text(_) => "Text",
            Geometry::Dimension(_) => "Dimension",
            Geometry::Hatch(_) => "Hatch",
            Geometry::Multiline(_) => "Multiline",
            Geometry::Leader(_) => "Leader",
            Geometry::Tolerance(_) => "Tolerance",
            Geometry::Viewport(_) => "Viewport",
            Geometry::Mesh(_) => "Mesh",
        }
    }

    /// 对实体就地施加仿射变换（3x3线性部分 + 平移向量）。
    ///
    /// 单次调用是原子的：返回错误时实体保持调用前的状态。
    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        match self {
            Geometry::Point(g) => g.transform_by(m, t),
            Geometry::Line(g) => g.transform_by(m, t),
            Geometry::Circle(g) => g.transform_by(m, t),
            Geometry::Arc(g) => g.transform_by(m, t),
            Geometry::Ellipse(g) => g.transform_by(m, t),
            Geometry::LwPolyline(g) => g.transform_by(m, t),
            Geometry::Polyline3d(g) => g.transform_by(m, t),
            Geometry::Spline(g) => g.transform_by(m, t),
            Geometry::Text(g) => g.transform_by(m, t),
            Geometry::Dimension(g) => g.transform_by(m, t),
            Geometry::Hatch(g) => g.transform_by(m, t),
            Geometry::Multiline(g) => g.transform_by(m, t),
            Geometry::Leader(g) => g.transform_by(m, t),
            Geometry::Tolerance(g) => g.transform_by(m, t),
            Geometry::Viewport(g) => g.transform_by(m, t),
            Geometry::Mesh(g) => g.transform_by(m, t),
        }
    }

    /// 便捷入口：分解 4x4 仿射矩阵后委托给 [`Geometry::transform_by`]
    pub fn transform(&mut self, transform: &Transform3) -> Result<(), GeometryError> {
        self.transform_by(&transform.linear(), &transform.translation_part())
    }

    /// 将复合/曲线实体分解为更简单的图元。
    ///
    /// 多段线按凸度拆成线段与圆弧，平滑多段线拆成样条；
    /// 其余类型返回空集。
    pub fn explode(&self) -> Vec<Geometry> {
        match self {
            Geometry::LwPolyline(g) => g.explode(),
            Geometry::Polyline3d(g) => g.explode(),
            _ => Vec::new(),
        }
    }

    /// 获取包围盒
    pub fn bounding_box(&self) -> BoundingBox3 {
        match self {
            Geometry::Point(g) => BoundingBox3::from_points([g.position]),
            Geometry::Line(g) => BoundingBox3::from_points([g.start, g.end]),
            Geometry::Circle(g) => g.bounding_box(),
            Geometry::Arc(g) => g.bounding_box(),
            Geometry::Ellipse(g) => g.bounding_box(),
            Geometry::LwPolyline(g) => g.bounding_box(),
            Geometry::Polyline3d(g) => BoundingBox3::from_points(g.vertices.iter().copied()),
            Geometry::Spline(g) => g.bounding_box(),
            Geometry::Text(g) => BoundingBox3::from_points([g.position]),
            Geometry::Dimension(g) => g.bounding_box(),
            Geometry::Hatch(g) => g.bounding_box(),
            Geometry::Multiline(g) => g.bounding_box(),
            Geometry::Leader(g) => g.bounding_box(),
            Geometry::Tolerance(g) => BoundingBox3::from_points([g.position]),
            Geometry::Viewport(g) => g.bounding_box(),
            Geometry::Mesh(g) => BoundingBox3::from_points(g.vertices.iter().copied()),
        }
    }
}

/// 对一批顶层实体并行施加同一个变换。
///
/// 实体之间没有任何协调；所有者→从属的传播发生在各实体自己的
/// `transform_by` 内部。返回被拒绝的实体下标及其错误。
pub fn transform_batch(
    entities: &mut [Entity],
    m: &Matrix3,
    t: &Vector3,
) -> Vec<(usize, GeometryError)> {
    entities
        .par_iter_mut()
        .enumerate()
        .filter_map(|(i, e)| e.geometry.transform_by(m, t).err().map(|err| (i, err)))
        .collect()
}
