/// 编辑器层模块
///
/// 该模块提供有状态的编辑接口，在不可变的基础数据集之上追踪待定修改。
/// 遵循"原始数据只读"原则，所有修改只落在覆盖层中。
///
/// # 架构设计
///
/// - **overlay**: 变更覆盖层，标识到修改的映射
/// - **reconciler**: 编辑协调，决定每条指令后的覆盖层条目
/// - **history**: 指令级撤销/重做
/// - **grid_editor**: 编辑器实例，对宿主暴露命令
///
/// # 使用示例
///
/// ```rust,ignore
/// use edit_overlay::{EditorConfig, GridEditor};
///
/// let mut editor = GridEditor::new(rows, EditorConfig::default())?
///     .on_change(|snapshot| println!("{} 处待定修改", snapshot.len()));
///
/// editor.add_row(new_row)?;
/// editor.delete_selected(&selection);
/// println!("{}", editor.summary());
/// ```
pub mod grid_editor;
pub mod history;
pub mod overlay;
pub mod reconciler;

#[cfg(test)]
mod tests;

// === 导出公共接口 ===
pub use grid_editor::{ChangeListener, GridEditor};
pub use history::{EditHistory, HistoryEntry};
pub use overlay::{ChangeOverlay, Modification, OverlaySnapshot};
pub use reconciler::{
    set_field, set_fields, CellEdit, EditInstruction, EntryChange, Reconciler, RowTransform,
};
