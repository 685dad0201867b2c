//! 填充
//!
//! 填充由若干闭合回路（边界路径）围成，每条边是 OCS 平面内的
//! 轻量线段描述：线段、圆弧、椭圆弧、多段线或样条。多段线边
//! 可以按凸度再分解成线段边与圆弧边。

use crate::bulge::arc_from_bulge;
use crate::error::GeometryError;
use crate::geometry::ellipse::axes_from_conjugate;
use crate::geometry::{validated_normal, FrameMap};
use crate::math::{
    normalize_angle, vector_angle, BoundingBox3, Matrix3, Point3, Vector2, Vector3, EPSILON,
};
use crate::ocs::arbitrary_axis;
use serde::{Deserialize, Serialize};

/// 填充边界的一条边（OCS 平面内）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HatchEdge {
    /// 线段
    Line { start: Vector2, end: Vector2 },
    /// 圆弧（角度为度，逆时针）
    Arc {
        center: Vector2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    /// 椭圆弧（参数为度）
    Ellipse {
        center: Vector2,
        /// 半长轴向量
        major_axis: Vector2,
        /// 短长轴比例 (0, 1]
        ratio: f64,
        start_param: f64,
        end_param: f64,
    },
    /// 多段线（顶点 + 凸度）
    Polyline {
        vertices: Vec<(Vector2, f64)>,
        is_closed: bool,
    },
    /// 样条
    Spline {
        degree: usize,
        control_points: Vec<Vector2>,
        knots: Vec<f64>,
        weights: Vec<f64>,
    },
}

/// 填充边界路径
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HatchPath {
    /// 边界元素
    pub edges: Vec<HatchEdge>,
    /// 是否为外边界（false 表示孔洞）
    pub is_outer: bool,
}

impl HatchPath {
    pub fn new(edges: Vec<HatchEdge>, is_outer: bool) -> Self {
        Self { edges, is_outer }
    }
}

/// 填充图案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HatchPattern {
    /// 实心填充
    Solid,
    /// 预定义图案
    Predefined {
        name: String,
        /// 图案角度（度）
        angle: f64,
        /// 图案比例
        scale: f64,
    },
}

/// 填充
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hatch {
    /// 边界路径
    pub paths: Vec<HatchPath>,
    /// 图案
    pub pattern: HatchPattern,
    /// OCS 平面的标高
    pub elevation: f64,
    normal: Vector3,
}

impl Hatch {
    /// 创建填充，边界路径不得为空
    pub fn new(paths: Vec<HatchPath>, pattern: HatchPattern) -> Result<Self, GeometryError> {
        if paths.is_empty() {
            return Err(GeometryError::EmptyCollection("hatch boundary paths"));
        }
        Ok(Self {
            paths,
            pattern,
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

    /// 把所有多段线边按凸度分解成线段边与圆弧边
    pub fn explode_polyline_edges(&mut self) {
        for path in &mut self.paths {
            let mut edges = Vec::with_capacity(path.edges.len());
            for edge in path.edges.drain(..) {
                match edge {
                    HatchEdge::Polyline { vertices, is_closed } => {
                        let count = if is_closed {
                            vertices.len()
                        } else {
                            vertices.len().saturating_sub(1)
                        };
                        for i in 0..count {
                            let (p1, bulge) = vertices[i];
                            let (p2, _) = vertices[(i + 1) % vertices.len()];
                            if bulge.abs() < EPSILON {
                                edges.push(HatchEdge::Line { start: p1, end: p2 });
                                continue;
                            }
                            let arc = arc_from_bulge(&p1, &p2, bulge);
                            if arc.radius < EPSILON {
                                edges.push(HatchEdge::Line { start: p1, end: p2 });
                            } else {
                                edges.push(HatchEdge::Arc {
                                    center: arc.center,
                                    radius: arc.radius,
                                    start_angle: arc.start_angle,
                                    end_angle: arc.end_angle,
                                });
                            }
                        }
                    }
                    other => edges.push(other),
                }
            }
            path.edges = edges;
        }
    }

    /// 把 OCS 平面内的点提升到 WCS
    fn lift(&self, p: &Vector2) -> Point3 {
        Point3::from(arbitrary_axis(&self.normal) * Vector3::new(p.x, p.y, self.elevation))
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        let mut bbox = BoundingBox3::empty();
        for path in &self.paths {
            for edge in &path.edges {
                match edge {
                    HatchEdge::Line { start, end } => {
                        bbox.expand_to_include(&self.lift(start));
                        bbox.expand_to_include(&self.lift(end));
                    }
                    HatchEdge::Arc { center, radius, .. } => {
                        bbox.expand_to_include(
                            &self.lift(&(center + Vector2::new(*radius, *radius))),
                        );
                        bbox.expand_to_include(
                            &self.lift(&(center - Vector2::new(*radius, *radius))),
                        );
                    }
                    HatchEdge::Ellipse { center, major_axis, .. } => {
                        let r = major_axis.norm();
                        bbox.expand_to_include(&self.lift(&(center + Vector2::new(r, r))));
                        bbox.expand_to_include(&self.lift(&(center - Vector2::new(r, r))));
                    }
                    HatchEdge::Polyline { vertices, .. } => {
                        for (p, _) in vertices {
                            bbox.expand_to_include(&self.lift(p));
                        }
                    }
                    HatchEdge::Spline { control_points, .. } => {
                        for p in control_points {
                            bbox.expand_to_include(&self.lift(p));
                        }
                    }
                }
            }
        }
        bbox
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        let frame = FrameMap::new(m, t, &self.normal);
        let scale = frame.uniform_scale();
        let mirrored = frame.reflects_plane();
        let elevation = self.elevation;

        let mut new_elevation = elevation;
        let mut map_point = |p: &Vector2| -> Vector2 {
            let q = frame.map_point(&Vector3::new(p.x, p.y, elevation));
            new_elevation = q.z;
            Vector2::new(q.x, q.y)
        };
        let map_dir = |d: &Vector2| -> Vector2 {
            let q = frame.map_direction(&Vector3::new(d.x, d.y, 0.0));
            Vector2::new(q.x, q.y)
        };

        for path in &mut self.paths {
            for edge in &mut path.edges {
                match edge {
                    HatchEdge::Line { start, end } => {
                        *start = map_point(start);
                        *end = map_point(end);
                    }
                    HatchEdge::Arc {
                        center,
                        radius,
                        start_angle,
                        end_angle,
                    } => {
                        // 端点径向参考方向映射后重新取角；镜像时交换
                        let sa = start_angle.to_radians();
                        let ea = end_angle.to_radians();
                        let vs = map_dir(&Vector2::new(*radius * sa.cos(), *radius * sa.sin()));
                        let ve = map_dir(&Vector2::new(*radius * ea.cos(), *radius * ea.sin()));
                        let mut new_start = vector_angle(&vs);
                        let mut new_end = vector_angle(&ve);
                        if mirrored {
                            std::mem::swap(&mut new_start, &mut new_end);
                        }
                        *center = map_point(center);
                        *radius = (*radius * scale).max(EPSILON);
                        *start_angle = new_start;
                        *end_angle = new_end;
                    }
                    HatchEdge::Ellipse {
                        center,
                        major_axis,
                        ratio,
                        start_param,
                        end_param,
                    } => {
                        let minor = Vector2::new(-major_axis.y, major_axis.x) * *ratio;
                        let u = map_dir(major_axis);
                        let v = map_dir(&minor);
                        let (new_major, minor_len) = axes_from_conjugate(&u, &v);
                        let new_ratio = (minor_len / new_major.norm()).clamp(EPSILON, 1.0);

                        let full = (normalize_angle(*start_param)
                            - normalize_angle(*end_param))
                        .abs()
                            < EPSILON;
                        if !full {
                            let e1 = new_major.normalize();
                            let e2 = Vector2::new(-e1.y, e1.x);
                            let a = new_major.norm();
                            let b = a * new_ratio;
                            let old_major = *major_axis;
                            let old_minor = minor;
                            let reparam = |degrees: f64| -> f64 {
                                let rad = degrees.to_radians();
                                let local = old_major * rad.cos() + old_minor * rad.sin();
                                let p = map_dir(&local);
                                normalize_angle(
                                    (p.dot(&e2) / b).atan2(p.dot(&e1) / a).to_degrees(),
                                )
                            };
                            let s = reparam(*start_param);
                            let e = reparam(*end_param);
                            let (s, e) = if mirrored { (e, s) } else { (s, e) };
                            *start_param = s;
                            *end_param = e;
                        }
                        *center = map_point(center);
                        *major_axis = new_major;
                        *ratio = new_ratio;
                    }
                    HatchEdge::Polyline { vertices, .. } => {
                        for (p, bulge) in vertices {
                            *p = map_point(p);
                            if mirrored {
                                *bulge = -*bulge;
                            }
                        }
                    }
                    HatchEdge::Spline { control_points, .. } => {
                        for p in control_points {
                            *p = map_point(p);
                        }
                    }
                }
            }
        }

        // 图案角度跟随平面内旋转
        if let HatchPattern::Predefined { angle, scale: pattern_scale, .. } = &mut self.pattern {
            let dir = map_dir(&Vector2::new(angle.to_radians().cos(), angle.to_radians().sin()));
            if dir.norm() > EPSILON {
                *angle = vector_angle(&dir);
            }
            *pattern_scale *= scale;
        }

        self.elevation = new_elevation;
        self.normal = frame.new_normal;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    fn unit_square_polyline() -> HatchEdge {
        HatchEdge::Polyline {
            vertices: vec![
                (Vector2::new(0.0, 0.0), 0.0),
                (Vector2::new(1.0, 0.0), 0.0),
                (Vector2::new(1.0, 1.0), 0.0),
                (Vector2::new(0.0, 1.0), 0.0),
            ],
            is_closed: true,
        }
    }

    #[test]
    fn test_empty_paths_rejected() {
        assert!(matches!(
            Hatch::new(Vec::new(), HatchPattern::Solid),
            Err(GeometryError::EmptyCollection(_))
        ));
    }

    #[test]
    fn test_explode_polyline_edges() {
        let mut hatch = Hatch::new(
            vec![HatchPath::new(vec![unit_square_polyline()], true)],
            HatchPattern::Solid,
        )
        .unwrap();

        hatch.explode_polyline_edges();
        assert_eq!(hatch.paths[0].edges.len(), 4);
        assert!(hatch.paths[0]
            .edges
            .iter()
            .all(|e| matches!(e, HatchEdge::Line { .. })));
    }

    #[test]
    fn test_explode_polyline_edge_with_bulge() {
        let edge = HatchEdge::Polyline {
            vertices: vec![
                (Vector2::new(1.0, 0.0), (std::f64::consts::PI / 8.0).tan()),
                (Vector2::new(0.0, 1.0), 0.0),
            ],
            is_closed: false,
        };
        let mut hatch = Hatch::new(
            vec![HatchPath::new(vec![edge], true)],
            HatchPattern::Solid,
        )
        .unwrap();

        hatch.explode_polyline_edges();
        assert_eq!(hatch.paths[0].edges.len(), 1);
        match &hatch.paths[0].edges[0] {
            HatchEdge::Arc { center, radius, .. } => {
                assert!(center.norm() < 1e-9);
                assert!(approx_eq(*radius, 1.0));
            }
            other => panic!("expected Arc edge, got {:?}", other),
        }
    }

    #[test]
    fn test_transform_scales_edges() {
        let mut hatch = Hatch::new(
            vec![HatchPath::new(
                vec![HatchEdge::Arc {
                    center: Vector2::new(1.0, 0.0),
                    radius: 2.0,
                    start_angle: 0.0,
                    end_angle: 180.0,
                }],
                true,
            )],
            HatchPattern::Solid,
        )
        .unwrap();

        let m = Matrix3::from_diagonal(&Vector3::new(3.0, 3.0, 3.0));
        hatch.transform_by(&m, &Vector3::zeros()).unwrap();

        match &hatch.paths[0].edges[0] {
            HatchEdge::Arc { center, radius, .. } => {
                assert!((center - Vector2::new(3.0, 0.0)).norm() < 1e-9);
                assert!(approx_eq(*radius, 6.0));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_mirror_negates_polyline_bulges() {
        let mut hatch = Hatch::new(
            vec![HatchPath::new(
                vec![HatchEdge::Polyline {
                    vertices: vec![
                        (Vector2::new(0.0, 0.0), 0.5),
                        (Vector2::new(1.0, 0.0), 0.0),
                    ],
                    is_closed: false,
                }],
                true,
            )],
            HatchPattern::Solid,
        )
        .unwrap();

        let m = Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, 1.0));
        hatch.transform_by(&m, &Vector3::zeros()).unwrap();

        match &hatch.paths[0].edges[0] {
            HatchEdge::Polyline { vertices, .. } => {
                assert!(approx_eq(vertices[0].1, -0.5));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_pattern_angle_follows_rotation() {
        let mut hatch = Hatch::new(
            vec![HatchPath::new(vec![unit_square_polyline()], true)],
            HatchPattern::Predefined {
                name: "ANSI31".to_string(),
                angle: 45.0,
                scale: 1.0,
            },
        )
        .unwrap();

        let tr = crate::transform::Transform3::rotation_z(std::f64::consts::FRAC_PI_2);
        hatch
            .transform_by(&tr.linear(), &tr.translation_part())
            .unwrap();

        match &hatch.pattern {
            HatchPattern::Predefined { angle, .. } => assert!(approx_eq(*angle, 135.0)),
            _ => unreachable!(),
        }
    }
}
