//! 形位公差
//!
//! 公差框的内容是一串控制代码，几何上只有插入点、旋转角和文本
//! 高度参与变换。未显式指定高度时取样式默认值（先过覆盖表）。

use crate::dimstyle::{DimStyle, DimStyleOverride, StyleOverrides};
use crate::error::GeometryError;
use crate::geometry::{validated_normal, FrameMap};
use crate::math::{vector_angle, Matrix3, Point3, Vector2, Vector3, EPSILON};
use serde::{Deserialize, Serialize};

/// 形位公差
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tolerance {
    /// 插入点（WCS）
    pub position: Point3,
    /// 公差内容（控制代码串）
    pub content: String,
    /// 实体级样式覆盖表
    pub style_overrides: StyleOverrides,
    height: Option<f64>,
    rotation: f64,
    normal: Vector3,
}

impl Tolerance {
    pub fn new(position: Point3, content: impl Into<String>) -> Self {
        Self {
            position,
            content: content.into(),
            style_overrides: StyleOverrides::new(),
            height: None,
            rotation: 0.0,
            normal: Vector3::z(),
        }
    }

    /// 显式文本高度（None 表示取样式默认）
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    /// 设置显式文本高度，非正值立即失败
    pub fn set_height(&mut self, height: f64) -> Result<(), GeometryError> {
        if height <= 0.0 {
            return Err(GeometryError::NonPositive("tolerance text height"));
        }
        self.height = Some(height);
        Ok(())
    }

    /// 解析实际使用的文本高度：显式值 → 覆盖表 → 样式默认
    pub fn text_height(&self, style: &DimStyle) -> f64 {
        self.height.unwrap_or_else(|| {
            style.resolve(&self.style_overrides, DimStyleOverride::TextHeight)
                * style.resolve(&self.style_overrides, DimStyleOverride::DimScale)
        })
    }

    /// 旋转角（度），始终在 [0, 360)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// 设置旋转角，自动归一化
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = crate::math::normalize_angle(degrees);
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

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        let frame = FrameMap::new(m, t, &self.normal);

        let rad = self.rotation.to_radians();
        let reference = frame.map_direction(&Vector3::new(rad.cos(), rad.sin(), 0.0));
        let mut w = Vector2::new(reference.x, reference.y);
        if frame.reflects_plane() {
            w = -w;
        }
        let new_rotation = if w.norm() < EPSILON {
            self.rotation
        } else {
            vector_angle(&w)
        };

        // 显式高度按高度参考方向的长度缩放
        let new_height = match self.height {
            Some(h) => {
                let v = frame.map_direction(&Vector3::new(0.0, h, 0.0));
                let len = Vector2::new(v.x, v.y).norm();
                Some(if len < EPSILON { EPSILON } else { len })
            }
            None => None,
        };

        self.position = m * self.position + t;
        self.normal = frame.new_normal;
        self.rotation = new_rotation;
        self.height = new_height;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn test_height_resolution() {
        let style = DimStyle::default();
        let mut tol = Tolerance::new(Point3::origin(), "{\\Fgdt;j}%%v{\\Fgdt;n}0.1");

        // 无显式高度：样式默认 2.5 × 1.0
        assert!(approx_eq(tol.text_height(&style), 2.5));

        tol.style_overrides
            .insert(DimStyleOverride::TextHeight, 5.0);
        assert!(approx_eq(tol.text_height(&style), 5.0));

        tol.set_height(7.0).unwrap();
        assert!(approx_eq(tol.text_height(&style), 7.0));
        assert!(tol.set_height(0.0).is_err());
    }

    #[test]
    fn test_transform_scales_height_and_rotates() {
        let mut tol = Tolerance::new(Point3::origin(), "%%v");
        tol.set_height(2.0).unwrap();

        let tr = crate::transform::Transform3::rotation_z(std::f64::consts::FRAC_PI_2)
            .then(&crate::transform::Transform3::uniform_scale(3.0));
        tol.transform_by(&tr.linear(), &tr.translation_part())
            .unwrap();

        assert!(approx_eq(tol.rotation(), 90.0));
        assert!(approx_eq(tol.height().unwrap(), 6.0));
    }
}
