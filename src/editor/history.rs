/// 编辑历史模块
///
/// 按指令记录覆盖层条目的变化，支持撤销/重做整条指令。
/// 与单行撤销不同，这里恢复的是指令执行前的条目状态。
use chrono::{DateTime, Local};

use super::reconciler::EntryChange;
use crate::utils::{OverlayError, Result};

/// 编辑历史
///
/// # 实现细节
/// - 使用两个栈实现撤销/重做：undo_stack 和 redo_stack
/// - 所有记录按时间顺序存储在 entries 向量中
/// - 栈中存储的是索引而非实际数据，避免数据拷贝
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    undo_stack: Vec<usize>,
    redo_stack: Vec<usize>,
}

/// 一条指令的历史记录
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// 指令名称
    pub operation: &'static str,
    /// 该指令造成的条目变化（按执行顺序）
    pub changes: Vec<EntryChange>,
    /// 应用时间
    pub applied_at: DateTime<Local>,
}

impl HistoryEntry {
    pub fn new(operation: &'static str, changes: Vec<EntryChange>) -> Self {
        Self {
            operation,
            changes,
            applied_at: Local::now(),
        }
    }

    /// 单行描述，例如 `[14:03:27] delete_rows (2 处变化)`
    pub fn describe(&self) -> String {
        format!(
            "[{}] {} ({} 处变化)",
            self.applied_at.format("%H:%M:%S"),
            self.operation,
            self.changes.len()
        )
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条指令，新记录会使重做栈失效
    pub fn record(&mut self, entry: HistoryEntry) {
        let index = self.entries.len();
        self.entries.push(entry);
        self.undo_stack.push(index);
        self.redo_stack.clear();
    }

    /// 弹出最近一条可撤销的记录
    pub fn undo(&mut self) -> Result<&HistoryEntry> {
        let index = self.undo_stack.pop().ok_or(OverlayError::NothingToUndo)?;
        self.redo_stack.push(index);
        Ok(&self.entries[index])
    }

    /// 弹出最近一条被撤销的记录
    pub fn redo(&mut self) -> Result<&HistoryEntry> {
        let index = self.redo_stack.pop().ok_or(OverlayError::NothingToRedo)?;
        self.undo_stack.push(index);
        Ok(&self.entries[index])
    }

    /// 当前有效记录数（撤销栈大小）
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// 按应用顺序遍历有效记录
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_stack.iter().map(|&index| &self.entries[index])
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "历史记录: {}, 可撤销: {}, 可重做: {}",
            self.entries.len(),
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        if let Some(last) = self.iter().last() {
            summary.push_str(&format!(", 最近: {}", last.describe()));
        }
        summary
    }
}
