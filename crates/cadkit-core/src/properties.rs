//! 实体属性定义
//!
//! 包含颜色、线型、线宽等视觉属性。

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    // 预定义颜色
    pub const RED: Color = Color::new(255, 0, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const MAGENTA: Color = Color::new(255, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    /// 颜色跟随图层（ByLayer）
    pub const BY_LAYER: Color = Color::with_alpha(0, 0, 0, 0);

    pub fn is_by_layer(&self) -> bool {
        self.a == 0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BY_LAYER
    }
}

/// 线型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineType {
    /// 连续线（实线）
    Continuous,
    /// 虚线
    Dashed,
    /// 点线
    Dotted,
    /// 点划线
    DashDot,
    /// 中心线
    Center,
    /// 隐藏线
    Hidden,
    /// 跟随图层
    ByLayer,
}

impl Default for LineType {
    fn default() -> Self {
        LineType::ByLayer
    }
}

/// 线宽（毫米）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineWeight {
    /// 默认线宽
    Default,
    /// 跟随图层
    ByLayer,
    /// 指定线宽（毫米）
    Width(f64),
}

impl Default for LineWeight {
    fn default() -> Self {
        LineWeight::ByLayer
    }
}

/// 实体的视觉属性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Properties {
    /// 颜色
    pub color: Color,
    /// 线型
    pub line_type: LineType,
    /// 线宽
    pub line_weight: LineWeight,
    /// 线型比例（必须为正）
    linetype_scale: f64,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            color: Color::BY_LAYER,
            line_type: LineType::ByLayer,
            line_weight: LineWeight::ByLayer,
            linetype_scale: 1.0,
        }
    }
}

impl Properties {
    /// 创建带有指定颜色的属性
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// 线型比例
    pub fn linetype_scale(&self) -> f64 {
        self.linetype_scale
    }

    /// 设置线型比例，非正值立即失败
    pub fn set_linetype_scale(&mut self, scale: f64) -> Result<(), GeometryError> {
        if scale <= 0.0 {
            return Err(GeometryError::NonPositive("linetype scale"));
        }
        self.linetype_scale = scale;
        Ok(())
    }
}
