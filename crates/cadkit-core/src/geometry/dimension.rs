//! 尺寸标注
//!
//! 每种标注按自己的定义点集合描述被测几何；变换把同一个 (M, T)
//! 同步传播到全部定义点。两线角度标注在变换后必须重新校验两条
//! 边不平行：一旦退化，整个调用被拒绝，实体保持调用前的状态。
//!
//! 文本高度、间距等标量默认值来自样式对象，取值前一律先经
//! [`DimStyle::resolve`] 过一遍实体级覆盖表。

use crate::dimstyle::{DimStyle, DimStyleOverride, StyleOverrides};
use crate::error::GeometryError;
use crate::geometry::{transformed_normal, validated_normal};
use crate::math::{vector_angle, BoundingBox3, Matrix3, Point3, Vector2, Vector3, EPSILON};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 标注类型及其定义点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DimensionKind {
    /// 对齐标注：沿两点连线方向测量
    Aligned { start: Point3, end: Point3 },
    /// 线性标注：沿指定方向（度）测量两点投影距离
    Linear {
        start: Point3,
        end: Point3,
        /// 标注线方向与X轴的夹角（度）
        rotation: f64,
    },
    /// 半径标注：圆心到圆上参考点
    Radial { center: Point3, reference: Point3 },
    /// 直径标注：圆心到圆上参考点的两倍
    Diametric { center: Point3, reference: Point3 },
    /// 两线角度标注：两条边不得平行
    Angular2Line {
        first_start: Point3,
        first_end: Point3,
        second_start: Point3,
        second_end: Point3,
    },
    /// 坐标标注：相对原点测量 X 或 Y 坐标
    Ordinate {
        origin: Point3,
        feature: Point3,
        /// true 测量X坐标，false 测量Y坐标
        measure_x: bool,
    },
}

/// 尺寸标注
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    /// 标注类型与定义点
    pub kind: DimensionKind,
    /// 标注线位置点（决定标注线的高度/距离）
    pub line_position: Point3,
    /// 覆盖文本（空则显示测量值）
    pub text_override: Option<String>,
    /// 实体级样式覆盖表
    pub style_overrides: StyleOverrides,
    normal: Vector3,
}

impl Dimension {
    pub fn new(kind: DimensionKind, line_position: Point3) -> Self {
        Self {
            kind,
            line_position,
            text_override: None,
            style_overrides: StyleOverrides::new(),
            normal: Vector3::z(),
        }
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

    /// 获取测量值（长度或角度；角度单位为度）
    pub fn measurement(&self) -> f64 {
        match &self.kind {
            DimensionKind::Aligned { start, end } => (end - start).norm(),
            DimensionKind::Linear { start, end, rotation } => {
                let rad = rotation.to_radians();
                let dir = Vector3::new(rad.cos(), rad.sin(), 0.0);
                (end - start).dot(&dir).abs()
            }
            DimensionKind::Radial { center, reference } => (reference - center).norm(),
            DimensionKind::Diametric { center, reference } => 2.0 * (reference - center).norm(),
            DimensionKind::Angular2Line {
                first_start,
                first_end,
                second_start,
                second_end,
            } => {
                let d1 = first_end - first_start;
                let d2 = second_end - second_start;
                let denom = d1.norm() * d2.norm();
                if denom < EPSILON {
                    return 0.0;
                }
                (d1.dot(&d2) / denom).clamp(-1.0, 1.0).acos().to_degrees()
            }
            DimensionKind::Ordinate {
                origin,
                feature,
                measure_x,
            } => {
                if *measure_x {
                    feature.x - origin.x
                } else {
                    feature.y - origin.y
                }
            }
        }
    }

    /// 获取显示的文本
    pub fn display_text(&self) -> String {
        if let Some(text) = &self.text_override {
            return text.clone();
        }
        let value = self.measurement();
        match self.kind {
            DimensionKind::Radial { .. } => format!("R{:.2}", value),
            DimensionKind::Diametric { .. } => format!("%%C{:.2}", value),
            DimensionKind::Angular2Line { .. } => format!("{:.1}°", value),
            _ => format!("{:.2}", value),
        }
    }

    /// 计算默认文本位置。
    ///
    /// 标量默认值一律经 [`DimStyle::resolve`] 解析，覆盖值优先。
    pub fn default_text_position(&self, style: &DimStyle) -> Point3 {
        let text_height = style.resolve(&self.style_overrides, DimStyleOverride::TextHeight);
        let text_gap = style.resolve(&self.style_overrides, DimStyleOverride::TextGap);
        let scale = style.resolve(&self.style_overrides, DimStyleOverride::DimScale);
        let offset = (text_gap + text_height / 2.0) * scale;

        match &self.kind {
            DimensionKind::Aligned { start, end }
            | DimensionKind::Linear { start, end, .. } => {
                let dir = end - start;
                if dir.norm() < EPSILON {
                    return self.line_position;
                }
                let dir = dir.normalize();
                let perp = self.normal.cross(&dir);
                let mid = Point3::from((start.coords + end.coords) / 2.0);
                let side = (self.line_position - mid).dot(&perp);
                let sign = if side.abs() < EPSILON { 1.0 } else { side.signum() };
                mid + perp * (sign * (side.abs() + offset))
            }
            DimensionKind::Angular2Line {
                first_start,
                first_end,
                second_start,
                second_end,
            } => {
                // 文本位于两条边方向的角平分线上
                let d1 = (first_end - first_start).normalize();
                let d2 = (second_end - second_start).normalize();
                let bisector = d1 + d2;
                let apex = Point3::from((first_start.coords + second_start.coords) / 2.0);
                if bisector.norm() < EPSILON {
                    return self.line_position;
                }
                let radius = (self.line_position - apex).norm();
                apex + bisector.normalize() * (radius + offset)
            }
            DimensionKind::Radial { .. }
            | DimensionKind::Diametric { .. }
            | DimensionKind::Ordinate { .. } => self.line_position,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        let mut points = vec![self.line_position];
        match &self.kind {
            DimensionKind::Aligned { start, end }
            | DimensionKind::Linear { start, end, .. } => points.extend([*start, *end]),
            DimensionKind::Radial { center, reference }
            | DimensionKind::Diametric { center, reference } => {
                points.extend([*center, *reference])
            }
            DimensionKind::Angular2Line {
                first_start,
                first_end,
                second_start,
                second_end,
            } => points.extend([*first_start, *first_end, *second_start, *second_end]),
            DimensionKind::Ordinate { origin, feature, .. } => {
                points.extend([*origin, *feature])
            }
        }
        BoundingBox3::from_points(points)
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        let map = |p: &Point3| m * *p + *t;

        // 先把所有新值算入临时量，校验通过后一次性提交
        let new_kind = match &self.kind {
            DimensionKind::Aligned { start, end } => DimensionKind::Aligned {
                start: map(start),
                end: map(end),
            },
            DimensionKind::Linear { start, end, rotation } => {
                // 标注线方向作为参考方向映射后重新取角
                let rad = rotation.to_radians();
                let dir = m * Vector3::new(rad.cos(), rad.sin(), 0.0);
                let new_rotation = if Vector2::new(dir.x, dir.y).norm() < EPSILON {
                    *rotation
                } else {
                    vector_angle(&Vector2::new(dir.x, dir.y))
                };
                DimensionKind::Linear {
                    start: map(start),
                    end: map(end),
                    rotation: new_rotation,
                }
            }
            DimensionKind::Radial { center, reference } => DimensionKind::Radial {
                center: map(center),
                reference: map(reference),
            },
            DimensionKind::Diametric { center, reference } => DimensionKind::Diametric {
                center: map(center),
                reference: map(reference),
            },
            DimensionKind::Angular2Line {
                first_start,
                first_end,
                second_start,
                second_end,
            } => {
                let fs = map(first_start);
                let fe = map(first_end);
                let ss = map(second_start);
                let se = map(second_end);

                // 两条边变换后必须保持不平行，否则拒绝整个调用
                let d1 = fe - fs;
                let d2 = se - ss;
                if d1.cross(&d2).norm() < EPSILON * d1.norm() * d2.norm()
                    || d1.norm() < EPSILON
                    || d2.norm() < EPSILON
                {
                    warn!("angular dimension edges became parallel, transform rejected");
                    return Err(GeometryError::DegenerateReference);
                }

                DimensionKind::Angular2Line {
                    first_start: fs,
                    first_end: fe,
                    second_start: ss,
                    second_end: se,
                }
            }
            DimensionKind::Ordinate {
                origin,
                feature,
                measure_x,
            } => DimensionKind::Ordinate {
                origin: map(origin),
                feature: map(feature),
                measure_x: *measure_x,
            },
        };

        self.kind = new_kind;
        self.line_position = map(&self.line_position);
        self.normal = transformed_normal(m, &self.normal);
        Ok(())
    }
}
