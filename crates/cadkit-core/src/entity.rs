//! 实体标识和包装
//!
//! 实体 = 唯一标识符 + 几何数据 + 视觉属性。
//! 句柄分配、交叉引用等文档级簿记属于外部组件。

use crate::geometry::Geometry;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 全局实体ID生成器
static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 实体唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// 分配新的实体ID
    pub fn next() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// 从指定值创建（用于文件加载）
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

/// CAD实体
///
/// 一个实体包含几何数据和属性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// 唯一标识符
    pub id: EntityId,

    /// 几何类型和数据
    pub geometry: Geometry,

    /// 视觉属性
    pub properties: Properties,
}

impl Entity {
    /// 创建新实体
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: EntityId::next(),
            geometry,
            properties: Properties::default(),
        }
    }

    /// 使用指定的属性
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}
