//! 标注样式（Dimension Style）
//!
//! 样式对象只向本内核提供标量默认值（文本高度、箭头大小、整体比例等）。
//! 每个标注类实体可携带按键覆盖表，任何默认值在使用前都必须先经
//! [`DimStyle::resolve`] 统一解析——覆盖值优先于样式默认值。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 可按实体覆盖的样式标量键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimStyleOverride {
    /// 文本高度
    TextHeight,
    /// 文本与标注线的间距
    TextGap,
    /// 箭头大小
    ArrowSize,
    /// 延伸线偏移（与定义点的距离）
    ExtensionLineOffset,
    /// 延伸线超出量
    ExtensionLineExtension,
    /// 整体比例因子
    DimScale,
}

/// 实体级样式覆盖表
pub type StyleOverrides = HashMap<DimStyleOverride, f64>;

/// 标注样式
///
/// 只保留本内核消费的标量字段；文本格式化、单位换算等属于
/// 外部的表/样式对象模型。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimStyle {
    /// 样式名称
    pub name: String,
    /// 文本高度
    pub text_height: f64,
    /// 文本与标注线的间距
    pub text_gap: f64,
    /// 箭头大小
    pub arrow_size: f64,
    /// 延伸线偏移
    pub extension_line_offset: f64,
    /// 延伸线超出量
    pub extension_line_extension: f64,
    /// 整体比例因子
    pub scale: f64,
}

impl Default for DimStyle {
    fn default() -> Self {
        Self {
            name: "Standard".to_string(),
            text_height: 2.5,
            text_gap: 0.625,
            arrow_size: 2.5,
            extension_line_offset: 0.625,
            extension_line_extension: 1.25,
            scale: 1.0,
        }
    }
}

impl DimStyle {
    /// 创建新的标注样式
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// ISO 标准标注样式
    pub fn iso() -> Self {
        Self {
            name: "ISO-25".to_string(),
            ..Default::default()
        }
    }

    /// 解析一个标量值：覆盖表命中则取覆盖值，否则取样式默认值。
    ///
    /// 所有标注/引线/公差计算都必须经由此函数取值，不得直接读字段。
    pub fn resolve(&self, overrides: &StyleOverrides, key: DimStyleOverride) -> f64 {
        if let Some(value) = overrides.get(&key) {
            return *value;
        }
        match key {
            DimStyleOverride::TextHeight => self.text_height,
            DimStyleOverride::TextGap => self.text_gap,
            DimStyleOverride::ArrowSize => self.arrow_size,
            DimStyleOverride::ExtensionLineOffset => self.extension_line_offset,
            DimStyleOverride::ExtensionLineExtension => self.extension_line_extension,
            DimStyleOverride::DimScale => self.scale,
        }
    }
}
