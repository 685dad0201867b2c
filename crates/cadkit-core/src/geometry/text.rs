//! 文本
//!
//! 文本携带的受约束标量最多：旋转角、宽度因子、倾斜角、高度。
//! 变换时全部从两条参考方向重新推导：
//!
//! - 宽度方向：沿局部X、按旋转角旋转、长度为 宽度因子×高度；
//! - 高度方向：沿局部Y、被倾斜角剪切、竖直分量长度为高度。
//!
//! 两条变换后方向的叉积为负说明映射翻转了文本所在平面。此时若
//! 图纸配置要求镜像字形，翻转 `is_backward`；否则把左右对齐方式
//! 换成镜像对并给旋转角加 180°（居中类对齐自身即镜像对，不受影响）。

use crate::error::GeometryError;
use crate::geometry::{validated_normal, FrameMap};
use crate::math::{normalize_angle, vector_angle, Matrix3, Point3, Vector2, Vector3, EPSILON};
use serde::{Deserialize, Serialize};

/// 实体没有所属文档时使用的镜像文本设置：
/// `false` = 镜像时调换对齐方式，`true` = 镜像时翻转字形
pub const MIRROR_TEXT_DEFAULT: bool = false;

/// 文本对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextAlignment {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    #[default]
    BaselineLeft,
    BaselineCenter,
    BaselineRight,
}

impl TextAlignment {
    /// 镜像对：左右互换，居中自身配对
    pub fn mirrored(self) -> Self {
        match self {
            TextAlignment::TopLeft => TextAlignment::TopRight,
            TextAlignment::TopRight => TextAlignment::TopLeft,
            TextAlignment::MiddleLeft => TextAlignment::MiddleRight,
            TextAlignment::MiddleRight => TextAlignment::MiddleLeft,
            TextAlignment::BottomLeft => TextAlignment::BottomRight,
            TextAlignment::BottomRight => TextAlignment::BottomLeft,
            TextAlignment::BaselineLeft => TextAlignment::BaselineRight,
            TextAlignment::BaselineRight => TextAlignment::BaselineLeft,
            other => other,
        }
    }

    /// 是否方向对称（居中类对齐镜像后无需旋转补偿）
    pub fn is_direction_symmetric(self) -> bool {
        matches!(
            self,
            TextAlignment::TopCenter
                | TextAlignment::MiddleCenter
                | TextAlignment::BottomCenter
                | TextAlignment::BaselineCenter
        )
    }
}

/// 文本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    /// 插入点（WCS）
    pub position: Point3,
    /// 文本内容
    pub content: String,
    /// 对齐方式
    pub alignment: TextAlignment,
    /// 字形是否反向（镜像字形）
    pub is_backward: bool,
    height: f64,
    width_factor: f64,
    oblique_angle: f64,
    rotation: f64,
    normal: Vector3,
}

impl Text {
    /// 创建文本，高度必须为正
    pub fn new(
        position: Point3,
        content: impl Into<String>,
        height: f64,
    ) -> Result<Self, GeometryError> {
        if height <= 0.0 {
            return Err(GeometryError::NonPositive("text height"));
        }
        Ok(Self {
            position,
            content: content.into(),
            alignment: TextAlignment::default(),
            is_backward: false,
            height,
            width_factor: 1.0,
            oblique_angle: 0.0,
            rotation: 0.0,
            normal: Vector3::z(),
        })
    }

    /// 文本高度
    pub fn height(&self) -> f64 {
        self.height
    }

    /// 设置高度，非正值立即失败
    pub fn set_height(&mut self, height: f64) -> Result<(), GeometryError> {
        if height <= 0.0 {
            return Err(GeometryError::NonPositive("text height"));
        }
        self.height = height;
        Ok(())
    }

    /// 宽度因子
    pub fn width_factor(&self) -> f64 {
        self.width_factor
    }

    /// 设置宽度因子，[0.01, 100] 之外立即失败
    pub fn set_width_factor(&mut self, factor: f64) -> Result<(), GeometryError> {
        if !(0.01..=100.0).contains(&factor) {
            return Err(GeometryError::WidthFactorOutOfRange(factor));
        }
        self.width_factor = factor;
        Ok(())
    }

    /// 倾斜角（度）
    pub fn oblique_angle(&self) -> f64 {
        self.oblique_angle
    }

    /// 设置倾斜角，[-85, 85] 之外立即失败
    pub fn set_oblique_angle(&mut self, degrees: f64) -> Result<(), GeometryError> {
        if !(-85.0..=85.0).contains(&degrees) {
            return Err(GeometryError::ObliqueAngleOutOfRange(degrees));
        }
        self.oblique_angle = degrees;
        Ok(())
    }

    /// 旋转角（度），始终在 [0, 360)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// 设置旋转角，自动归一化到 [0, 360)
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_angle(degrees);
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

        // 两条局部参考方向：宽度沿基线，高度被倾斜角剪切
        let rot = self.rotation.to_radians();
        let (sin_r, cos_r) = rot.sin_cos();
        let shear = self.height * self.oblique_angle.to_radians().tan();
        let width_local = Vector2::new(cos_r, sin_r) * (self.width_factor * self.height);
        let height_local = Vector2::new(
            shear * cos_r - self.height * sin_r,
            shear * sin_r + self.height * cos_r,
        );

        let w3 = frame.map_direction(&Vector3::new(width_local.x, width_local.y, 0.0));
        let h3 = frame.map_direction(&Vector3::new(height_local.x, height_local.y, 0.0));
        let mut w = Vector2::new(w3.x, w3.y);
        let h = Vector2::new(h3.x, h3.y);

        // 镜像检测：变换后参考方向的叉积为负
        let mirrored = w.x * h.y - w.y * h.x < 0.0;
        let mut new_backward = self.is_backward;
        let mut new_alignment = self.alignment;
        if mirrored {
            if MIRROR_TEXT_DEFAULT {
                new_backward = !new_backward;
                w = -w;
            } else {
                new_alignment = self.alignment.mirrored();
                // 非方向对称的对齐需要旋转角补偿 180°
                if !self.alignment.is_direction_symmetric() {
                    w = -w;
                }
            }
        }

        let new_rotation = vector_angle(&w);

        // 倾斜角：两条变换后方向的夹角，归一化后收敛到合法区间
        let mut new_oblique = 90.0 - (vector_angle(&h) - new_rotation);
        new_oblique = (new_oblique + 180.0).rem_euclid(360.0) - 180.0;
        new_oblique = new_oblique.clamp(-85.0, 85.0);

        // 高度：变换后高度方向的长度乘以新倾斜角的余弦；退化时代以极小正值
        let mut new_height = h.norm() * new_oblique.to_radians().cos();
        if new_height.abs() < EPSILON {
            new_height = EPSILON;
        }

        let new_width_factor = (w.norm() / new_height).clamp(0.01, 100.0);

        self.position = m * self.position + t;
        self.normal = frame.new_normal;
        self.rotation = new_rotation;
        self.oblique_angle = new_oblique;
        self.height = new_height;
        self.width_factor = new_width_factor;
        self.alignment = new_alignment;
        self.is_backward = new_backward;
        Ok(())
    }
}
