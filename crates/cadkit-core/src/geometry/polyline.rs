//! 多段线
//!
//! 轻量多段线（LwPolyline）的顶点保存在 OCS 平面内，带凸度和
//! 可选的起止宽度；3D多段线（Polyline3d）的顶点直接保存在 WCS。
//! 两者都支持 B 样条平滑：细分与分解经由 NURBS 求值器。

use crate::bulge::arc_from_bulge;
use crate::error::GeometryError;
use crate::geometry::{
    validated_normal, Arc, FrameMap, Geometry, Line, Spline, DEFAULT_CURVE_PRECISION,
};
use crate::math::{BoundingBox3, Matrix3, Point3, Vector2, Vector3, EPSILON};
use crate::nurbs::nurbs_evaluate;
use crate::ocs::arbitrary_axis;
use serde::{Deserialize, Serialize};

/// 多段线平滑类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SmoothType {
    /// 不平滑（默认）
    #[default]
    None,
    /// 二次B样条
    Quadratic,
    /// 三次B样条
    Cubic,
}

impl SmoothType {
    /// 平滑对应的样条阶数
    pub fn degree(&self) -> Option<usize> {
        match self {
            SmoothType::None => None,
            SmoothType::Quadratic => Some(2),
            SmoothType::Cubic => Some(3),
        }
    }
}

/// 多段线顶点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolylineVertex {
    /// 位置（OCS）
    pub position: Vector2,
    /// 凸度 - 用于弧线段，0表示直线
    pub bulge: f64,
    start_width: f64,
    end_width: f64,
}

impl PolylineVertex {
    pub fn new(position: Vector2) -> Self {
        Self {
            position,
            bulge: 0.0,
            start_width: 0.0,
            end_width: 0.0,
        }
    }

    pub fn with_bulge(position: Vector2, bulge: f64) -> Self {
        Self {
            position,
            bulge,
            start_width: 0.0,
            end_width: 0.0,
        }
    }

    /// 线段起点宽度
    pub fn start_width(&self) -> f64 {
        self.start_width
    }

    /// 线段终点宽度
    pub fn end_width(&self) -> f64 {
        self.end_width
    }

    /// 设置起点宽度，负值立即失败
    pub fn set_start_width(&mut self, width: f64) -> Result<(), GeometryError> {
        if width < 0.0 {
            return Err(GeometryError::NegativeOffset(width));
        }
        self.start_width = width;
        Ok(())
    }

    /// 设置终点宽度，负值立即失败
    pub fn set_end_width(&mut self, width: f64) -> Result<(), GeometryError> {
        if width < 0.0 {
            return Err(GeometryError::NegativeOffset(width));
        }
        self.end_width = width;
        Ok(())
    }
}

/// 轻量多段线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LwPolyline {
    pub vertices: Vec<PolylineVertex>,
    /// OCS 平面的标高
    pub elevation: f64,
    /// 是否闭合
    pub is_closed: bool,
    /// 平滑类型
    pub smooth_type: SmoothType,
    normal: Vector3,
}

impl LwPolyline {
    /// 创建多段线，至少需要两个顶点
    pub fn new(vertices: Vec<PolylineVertex>, is_closed: bool) -> Result<Self, GeometryError> {
        if vertices.len() < 2 {
            return Err(GeometryError::NotEnoughVertices {
                required: 2,
                actual: vertices.len(),
            });
        }
        Ok(Self {
            vertices,
            elevation: 0.0,
            is_closed,
            smooth_type: SmoothType::None,
            normal: Vector3::z(),
        })
    }

    /// 从点列表创建（所有顶点都是直线连接）
    pub fn from_points(
        points: impl IntoIterator<Item = Vector2>,
        is_closed: bool,
    ) -> Result<Self, GeometryError> {
        Self::new(
            points.into_iter().map(PolylineVertex::new).collect(),
            is_closed,
        )
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

    /// 线段数量
    pub fn segment_count(&self) -> usize {
        if self.is_closed {
            self.vertices.len()
        } else {
            self.vertices.len() - 1
        }
    }

    /// 计算总长度（凸度弧段按弧长计）
    pub fn length(&self) -> f64 {
        let mut total = 0.0;
        for i in 0..self.segment_count() {
            let v1 = &self.vertices[i];
            let v2 = &self.vertices[(i + 1) % self.vertices.len()];
            let chord = (v2.position - v1.position).norm();

            if v1.bulge.abs() < EPSILON {
                total += chord;
            } else {
                let theta = 4.0 * v1.bulge.abs().atan();
                let radius = chord / (2.0 * (theta / 2.0).sin());
                total += radius * theta;
            }
        }
        total
    }

    /// 将 OCS 平面内的点提升到 WCS
    fn lift(&self, p: &Vector2) -> Point3 {
        let w = arbitrary_axis(&self.normal) * Vector3::new(p.x, p.y, self.elevation);
        Point3::from(w)
    }

    /// 以折线近似多段线，返回 OCS 采样点。
    ///
    /// 凸度弧段每段细分 `precision` 份；平滑多段线整体作为
    /// B 样条曲线用 NURBS 求值器细分。
    pub fn sample_points(&self, precision: usize) -> Result<Vec<Vector2>, GeometryError> {
        if precision < 2 {
            return Err(GeometryError::InvalidPrecision(precision));
        }

        if let Some(degree) = self.smooth_type.degree() {
            let controls: Vec<Point3> = self
                .vertices
                .iter()
                .map(|v| Point3::new(v.position.x, v.position.y, 0.0))
                .collect();
            let points = nurbs_evaluate(
                &controls,
                None,
                None,
                degree,
                self.is_closed,
                self.is_closed,
                precision,
            )?;
            return Ok(points.iter().map(|p| Vector2::new(p.x, p.y)).collect());
        }

        let mut points = Vec::new();
        for i in 0..self.segment_count() {
            let v1 = &self.vertices[i];
            let v2 = &self.vertices[(i + 1) % self.vertices.len()];

            if v1.bulge.abs() < EPSILON {
                points.push(v1.position);
                continue;
            }

            let arc = arc_from_bulge(&v1.position, &v2.position, v1.bulge);
            if arc.radius < EPSILON {
                // 哨兵：退化为直线段
                points.push(v1.position);
                continue;
            }

            // 按遍历方向从 v1 扫到 v2
            let start = (v1.position.y - arc.center.y).atan2(v1.position.x - arc.center.x);
            let sweep = 4.0 * v1.bulge.atan();
            for k in 0..precision {
                let a = start + sweep * k as f64 / precision as f64;
                points.push(Vector2::new(
                    arc.center.x + arc.radius * a.cos(),
                    arc.center.y + arc.radius * a.sin(),
                ));
            }
        }
        if !self.is_closed {
            points.push(self.vertices[self.vertices.len() - 1].position);
        }
        Ok(points)
    }

    /// 爆炸为独立的线段/圆弧实体（WCS）。
    ///
    /// 平滑多段线整体转换为一条样条曲线。
    pub fn explode(&self) -> Vec<Geometry> {
        if let Some(degree) = self.smooth_type.degree() {
            let controls: Vec<Point3> =
                self.vertices.iter().map(|v| self.lift(&v.position)).collect();
            match Spline::new(controls, None, None, degree, self.is_closed, self.is_closed) {
                Ok(mut spline) => {
                    // 法向量沿用多段线自己的（不变式保证非零）
                    if spline.set_normal(self.normal).is_ok() {
                        return vec![Geometry::Spline(spline)];
                    }
                    self.explode_segments()
                }
                // 顶点数不足以支撑该阶数时退回控制多边形
                Err(_) => self.explode_segments(),
            }
        } else {
            self.explode_segments()
        }
    }

    fn explode_segments(&self) -> Vec<Geometry> {
        let mut result = Vec::with_capacity(self.segment_count());
        for i in 0..self.segment_count() {
            let v1 = &self.vertices[i];
            let v2 = &self.vertices[(i + 1) % self.vertices.len()];
            let straight = Line::with_normal(
                self.lift(&v1.position),
                self.lift(&v2.position),
                self.normal,
            );

            if v1.bulge.abs() < EPSILON {
                result.push(Geometry::Line(straight));
                continue;
            }

            let arc = arc_from_bulge(&v1.position, &v2.position, v1.bulge);
            if arc.radius < EPSILON {
                // 哨兵：退化为直线段
                result.push(Geometry::Line(straight));
                continue;
            }

            match Arc::new(self.lift(&arc.center), arc.radius, arc.start_angle, arc.end_angle) {
                Ok(mut a) => match a.set_normal(self.normal) {
                    Ok(()) => result.push(Geometry::Arc(a)),
                    Err(_) => result.push(Geometry::Line(straight)),
                },
                Err(_) => result.push(Geometry::Line(straight)),
            }
        }
        result
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        let samples = self
            .sample_points(DEFAULT_CURVE_PRECISION)
            .unwrap_or_else(|_| self.vertices.iter().map(|v| v.position).collect());
        BoundingBox3::from_points(samples.iter().map(|p| self.lift(p)))
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
            // 逐顶点标量距离统一乘以缩放因子
            v.start_width *= scale;
            v.end_width *= scale;
            // 镜像翻转弧段的绕行方向
            if mirrored {
                v.bulge = -v.bulge;
            }
        }

        self.elevation = new_elevation;
        self.normal = frame.new_normal;
        Ok(())
    }
}

/// 3D多段线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polyline3d {
    /// 顶点（WCS）
    pub vertices: Vec<Point3>,
    /// 是否闭合
    pub is_closed: bool,
    /// 平滑类型
    pub smooth_type: SmoothType,
}

impl Polyline3d {
    /// 创建3D多段线，至少需要两个顶点
    pub fn new(vertices: Vec<Point3>, is_closed: bool) -> Result<Self, GeometryError> {
        if vertices.len() < 2 {
            return Err(GeometryError::NotEnoughVertices {
                required: 2,
                actual: vertices.len(),
            });
        }
        Ok(Self {
            vertices,
            is_closed,
            smooth_type: SmoothType::None,
        })
    }

    /// 计算总长度
    pub fn length(&self) -> f64 {
        let count = if self.is_closed {
            self.vertices.len()
        } else {
            self.vertices.len() - 1
        };
        (0..count)
            .map(|i| {
                (self.vertices[(i + 1) % self.vertices.len()] - self.vertices[i]).norm()
            })
            .sum()
    }

    /// 以折线近似，返回 WCS 采样点
    pub fn sample_points(&self, precision: usize) -> Result<Vec<Point3>, GeometryError> {
        match self.smooth_type.degree() {
            Some(degree) => nurbs_evaluate(
                &self.vertices,
                None,
                None,
                degree,
                self.is_closed,
                self.is_closed,
                precision,
            ),
            None => Ok(self.vertices.clone()),
        }
    }

    /// 爆炸为线段实体；平滑多段线转换为样条曲线
    pub fn explode(&self) -> Vec<Geometry> {
        if let Some(degree) = self.smooth_type.degree() {
            if let Ok(spline) = Spline::new(
                self.vertices.clone(),
                None,
                None,
                degree,
                self.is_closed,
                self.is_closed,
            ) {
                return vec![Geometry::Spline(spline)];
            }
        }
        let count = if self.is_closed {
            self.vertices.len()
        } else {
            self.vertices.len() - 1
        };
        (0..count)
            .map(|i| {
                Geometry::Line(Line::new(
                    self.vertices[i],
                    self.vertices[(i + 1) % self.vertices.len()],
                ))
            })
            .collect()
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        for v in &mut self.vertices {
            *v = m * *v + t;
        }
        Ok(())
    }
}
