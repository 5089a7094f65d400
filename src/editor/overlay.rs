/// 变更覆盖层模块
///
/// 以行标识为键记录所有待定修改，是未提交编辑的唯一事实来源。
/// 覆盖层只描述与基础数据集的差异，基础数据集本身永远不被修改。
use indexmap::IndexMap;
use serde::Serialize;

use crate::datatypes::{Row, RowIdentity};

/// 单行的待定修改
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Modification {
    /// 基础数据集中不存在的新行
    Added { data: Row },
    /// 基础数据集中已存在、字段值有变化的行
    Modified { data: Row },
    /// 基础数据集中已存在、被标记删除的行（不携带行数据）
    Deleted,
}

impl Modification {
    /// 修改携带的行数据（Deleted 没有）
    pub fn data(&self) -> Option<&Row> {
        match self {
            Modification::Added { data } | Modification::Modified { data } => Some(data),
            Modification::Deleted => None,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, Modification::Added { .. })
    }

    pub fn is_modified(&self) -> bool {
        matches!(self, Modification::Modified { .. })
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Modification::Deleted)
    }

    /// 修改类型名称
    pub fn kind(&self) -> &'static str {
        match self {
            Modification::Added { .. } => "added",
            Modification::Modified { .. } => "modified",
            Modification::Deleted => "deleted",
        }
    }
}

/// 变更覆盖层
///
/// # 实现细节
/// - 使用 IndexMap 保留插入顺序，新增行按插入顺序追加到投影视图末尾
/// - 覆盖已有键时保留原位置，删除键时保持其余条目的相对顺序
#[derive(Debug, Clone, Default)]
pub struct ChangeOverlay {
    entries: IndexMap<RowIdentity, Modification>,
}

impl ChangeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &RowIdentity) -> Option<&Modification> {
        self.entries.get(id)
    }

    /// 设置修改，返回之前的条目
    pub fn set(&mut self, id: RowIdentity, modification: Modification) -> Option<Modification> {
        self.entries.insert(id, modification)
    }

    /// 移除修改，返回被移除的条目
    pub fn remove(&mut self, id: &RowIdentity) -> Option<Modification> {
        self.entries.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: &RowIdentity) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&RowIdentity, &Modification)> {
        self.entries.iter()
    }

    /// 生成只读快照
    ///
    /// 快照是独立的副本，调用方持有它不会影响引擎内部状态
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            entries: self.entries.clone(),
        }
    }
}

/// 覆盖层的只读快照
///
/// 序列化为 `{ "<id>": {"type": "...", "data": {...}} }`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OverlaySnapshot {
    entries: IndexMap<RowIdentity, Modification>,
}

impl OverlaySnapshot {
    pub fn get(&self, id: &RowIdentity) -> Option<&Modification> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &RowIdentity) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowIdentity, &Modification)> {
        self.entries.iter()
    }

    /// 转换为 JSON 值（用于展示或调试）
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
