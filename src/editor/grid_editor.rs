/// 表格编辑器模块
///
/// 提供有状态的编辑接口。所有修改只记录在覆盖层中，
/// 基础数据集始终保持原样。
use std::sync::Arc;

use tracing::debug;

use super::history::{EditHistory, HistoryEntry};
use super::overlay::{ChangeOverlay, Modification, OverlaySnapshot};
use super::reconciler::{CellEdit, EditInstruction, EntryChange, Reconciler};
use crate::collection::BaseCollection;
use crate::config::EditorConfig;
use crate::datatypes::{Row, RowIdentity, Selection};
use crate::identity::IdentityResolver;
use crate::projection::{self, DisplayState, ProjectedRow};
use crate::stats::OverlayStats;
use crate::utils::Result;

/// 覆盖层变化通知回调，参数是最新的完整快照
pub type ChangeListener = Box<dyn FnMut(&OverlaySnapshot)>;

/// 表格编辑器 - 管理一个基础数据集上的待定修改
///
/// # 核心特性
/// - **不可变基础**: 基础数据集只读，所有编辑都落在覆盖层
/// - **自动还原**: 改回原值的行自动移出覆盖层
/// - **隔离性**: 多个编辑器实例各自拥有独立的覆盖层
///
/// # 使用示例
///
/// ```rust
/// use edit_overlay::{EditorConfig, GridEditor, RowIdentity};
/// use edit_overlay::editor::set_field;
/// use serde_json::json;
///
/// let rows = vec![json!({"id": "1", "age": 28}).as_object().unwrap().clone()];
/// let mut editor = GridEditor::new(rows, EditorConfig::default())?;
///
/// editor.modify_rows([RowIdentity::from("1")], set_field("age", json!(99)))?;
/// assert_eq!(editor.change_count(), 1);
///
/// editor.modify_rows([RowIdentity::from("1")], set_field("age", json!(28)))?;
/// assert!(!editor.has_changes());
/// # Ok::<(), edit_overlay::OverlayError>(())
/// ```
pub struct GridEditor {
    base: BaseCollection,
    resolver: IdentityResolver,
    config: EditorConfig,
    overlay: ChangeOverlay,
    history: EditHistory,
    on_change: Option<ChangeListener>,
}

impl GridEditor {
    /// 创建编辑器
    ///
    /// # 参数
    /// * `rows` - 基础数据集
    /// * `config` - 编辑器配置（标识字段在这里校验一次）
    pub fn new(rows: Vec<Row>, config: EditorConfig) -> Result<Self> {
        Self::with_shared_base(Arc::new(rows), config)
    }

    /// 使用共享的基础数据集创建编辑器
    pub fn with_shared_base(rows: Arc<Vec<Row>>, config: EditorConfig) -> Result<Self> {
        let resolver = config.validate()?;
        let base = BaseCollection::new(rows, &resolver)?;

        debug!(
            identity_field = resolver.field(),
            rows = base.len(),
            "grid editor created"
        );

        Ok(Self {
            base,
            resolver,
            config,
            overlay: ChangeOverlay::new(),
            history: EditHistory::new(),
            on_change: None,
        })
    }

    /// 设置变化通知回调
    pub fn on_change<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&OverlaySnapshot) + 'static,
    {
        self.on_change = Some(Box::new(listener));
        self
    }

    /// 替换变化通知回调
    pub fn set_on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&OverlaySnapshot) + 'static,
    {
        self.on_change = Some(Box::new(listener));
    }

    /// 执行任意编辑指令
    ///
    /// # 返回
    /// 覆盖层中实际发生变化的条目数量
    pub fn apply(&mut self, instruction: EditInstruction<'_>) -> Result<usize> {
        let operation = instruction.name();
        let reconciler = Reconciler::new(&self.base, &self.resolver, self.config.add_collision);
        let changes = reconciler.apply(&mut self.overlay, instruction)?;
        Ok(self.commit(operation, changes))
    }

    /// 新增行
    pub fn add_row(&mut self, row: Row) -> Result<()> {
        self.apply(EditInstruction::AddRow(row)).map(|_| ())
    }

    /// 删除指定标识的行
    pub fn delete_rows<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = RowIdentity>,
    {
        let reconciler = Reconciler::new(&self.base, &self.resolver, self.config.add_collision);
        let changes = reconciler.delete_rows(&mut self.overlay, ids);
        self.commit("delete_rows", changes)
    }

    /// 对指定标识的行应用变换
    ///
    /// 变换接收的是行的独立副本，无法触及基础数据集或覆盖层内部的数据
    pub fn modify_rows<I, F>(&mut self, ids: I, transform: F) -> Result<usize>
    where
        I: IntoIterator<Item = RowIdentity>,
        F: FnMut(Row) -> Row,
    {
        let reconciler = Reconciler::new(&self.base, &self.resolver, self.config.add_collision);
        let changes = reconciler.modify_rows(&mut self.overlay, ids, transform)?;
        Ok(self.commit("modify_rows", changes))
    }

    /// 处理宿主的单元格编辑请求
    pub fn apply_cell_edit(&mut self, edit: CellEdit) -> Result<usize> {
        self.apply(EditInstruction::CellEdit(edit))
    }

    /// 删除宿主当前选中的行
    pub fn delete_selected(&mut self, selection: &Selection) -> usize {
        self.delete_rows(selection.iter().cloned())
    }

    /// 修改宿主当前选中的行
    pub fn modify_selected<F>(&mut self, selection: &Selection, transform: F) -> Result<usize>
    where
        F: FnMut(Row) -> Row,
    {
        self.modify_rows(selection.iter().cloned(), transform)
    }

    /// 撤销单行的待定修改
    ///
    /// # 返回
    /// 该行之前有待定修改时返回 true
    pub fn undo_row(&mut self, id: &RowIdentity) -> bool {
        let reconciler = Reconciler::new(&self.base, &self.resolver, self.config.add_collision);
        let changes = reconciler.undo_row(&mut self.overlay, id);
        self.commit("undo_row", changes) > 0
    }

    /// 清空所有待定修改
    ///
    /// # 返回
    /// 被清除的条目数量
    pub fn reset(&mut self) -> usize {
        let reconciler = Reconciler::new(&self.base, &self.resolver, self.config.add_collision);
        let changes = reconciler.reset(&mut self.overlay);
        self.commit("reset", changes)
    }

    /// 撤销最近一条指令
    pub fn undo_last(&mut self) -> Result<()> {
        let entry = self.history.undo()?.clone();
        for change in &entry.changes {
            restore(&mut self.overlay, &change.id, change.before.clone());
        }

        debug!(op = entry.operation, overlay_len = self.overlay.len(), "undo");
        self.notify();
        Ok(())
    }

    /// 重做最近一条被撤销的指令
    pub fn redo_last(&mut self) -> Result<()> {
        let entry = self.history.redo()?.clone();
        for change in &entry.changes {
            restore(&mut self.overlay, &change.id, change.after.clone());
        }

        debug!(op = entry.operation, overlay_len = self.overlay.len(), "redo");
        self.notify();
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// 获取编辑历史的引用
    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// 获取当前覆盖层快照
    pub fn get_changes(&self) -> OverlaySnapshot {
        self.overlay.snapshot()
    }

    /// 计算投影视图
    pub fn project(&self) -> Vec<ProjectedRow<'_>> {
        projection::project(&self.base, &self.overlay)
    }

    /// 查询单行的显示状态
    pub fn display_state(&self, id: &RowIdentity) -> Option<DisplayState> {
        projection::display_state(&self.base, &self.overlay, id)
    }

    /// 当前显示的行数据
    ///
    /// 新增或修改的行返回覆盖层中的数据，已删除或未变化的行返回原始行
    pub fn effective_row(&self, id: &RowIdentity) -> Option<&Row> {
        match self.overlay.get(id) {
            Some(Modification::Added { data }) | Some(Modification::Modified { data }) => Some(data),
            _ => self.base.get(id),
        }
    }

    /// 基础数据集中的原始行
    pub fn original_row(&self, id: &RowIdentity) -> Option<&Row> {
        self.base.get(id)
    }

    /// 检查是否有待定修改
    pub fn has_changes(&self) -> bool {
        !self.overlay.is_empty()
    }

    /// 待定修改数量
    pub fn change_count(&self) -> usize {
        self.overlay.len()
    }

    pub fn stats(&self) -> OverlayStats {
        OverlayStats::collect(&self.base, &self.overlay)
    }

    pub fn base(&self) -> &BaseCollection {
        &self.base
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn identity_field(&self) -> &str {
        self.resolver.field()
    }

    /// 生成编辑摘要
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "标识字段: {}, 修改状态: {}, 新增: {}, 修改: {}, 删除: {}, {}",
            self.resolver.field(),
            if self.has_changes() { "已修改" } else { "未修改" },
            stats.added,
            stats.modified,
            stats.deleted,
            self.history.summary()
        )
    }

    fn commit(&mut self, operation: &'static str, changes: Vec<EntryChange>) -> usize {
        let affected = changes.len();
        debug!(
            op = operation,
            affected,
            overlay_len = self.overlay.len(),
            "applied edit"
        );

        if changes.is_empty() {
            return 0;
        }

        if self.config.track_history {
            self.history.record(HistoryEntry::new(operation, changes));
        }
        self.notify();
        affected
    }

    fn notify(&mut self) {
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.overlay.snapshot());
        }
    }
}

fn restore(overlay: &mut ChangeOverlay, id: &RowIdentity, entry: Option<Modification>) {
    match entry {
        Some(modification) => {
            overlay.set(id.clone(), modification);
        }
        None => {
            overlay.remove(id);
        }
    }
}
