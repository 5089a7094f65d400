/// 编辑协调模块
///
/// 根据编辑指令和当前覆盖层决定受影响标识的新修改（或移除）。
/// 每条指令只依赖当前覆盖层、基础数据集与指令负载，不依赖更早的历史。
///
/// # 状态优先级
/// Deleted > Added > Modified > Unchanged：
/// - 删除新增行时条目直接消失，不会变成 Deleted
/// - 修改新增行始终保持 Added
/// - 已删除的行不可编辑
/// - 修改后与原始行深度相等时自动撤销该条目
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use super::overlay::{ChangeOverlay, Modification};
use crate::collection::BaseCollection;
use crate::config::AddCollisionPolicy;
use crate::datatypes::{Row, RowIdentity};
use crate::identity::IdentityResolver;
use crate::utils::{rows_equal, OverlayError, Result};

/// 行变换：接收行的独立副本，返回更新后的行
pub type RowTransform<'a> = Box<dyn FnMut(Row) -> Row + 'a>;

/// 单元格编辑请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellEdit {
    pub id: RowIdentity,
    pub field: String,
    pub value: Value,
}

impl CellEdit {
    pub fn new(id: impl Into<RowIdentity>, field: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            value,
        }
    }
}

/// 编辑指令
pub enum EditInstruction<'a> {
    AddRow(Row),
    DeleteRows(Vec<RowIdentity>),
    ModifyRows {
        ids: Vec<RowIdentity>,
        transform: RowTransform<'a>,
    },
    CellEdit(CellEdit),
    UndoRow(RowIdentity),
    Reset,
}

impl EditInstruction<'_> {
    /// 指令名称（用于日志与历史记录）
    pub fn name(&self) -> &'static str {
        match self {
            EditInstruction::AddRow(_) => "add_row",
            EditInstruction::DeleteRows(_) => "delete_rows",
            EditInstruction::ModifyRows { .. } => "modify_rows",
            EditInstruction::CellEdit(_) => "cell_edit",
            EditInstruction::UndoRow(_) => "undo_row",
            EditInstruction::Reset => "reset",
        }
    }
}

/// 单个标识上的条目变化
#[derive(Debug, Clone, PartialEq)]
pub struct EntryChange {
    pub id: RowIdentity,
    /// 变化前的条目（None 表示未被追踪）
    pub before: Option<Modification>,
    /// 变化后的条目（None 表示条目被移除）
    pub after: Option<Modification>,
}

/// 把单个字段设为新值的变换
pub fn set_field(field: impl Into<String>, value: Value) -> impl FnMut(Row) -> Row {
    let field = field.into();
    move |mut row: Row| {
        row.insert(field.clone(), value.clone());
        row
    }
}

/// 批量设置字段的变换
pub fn set_fields(fields: Row) -> impl FnMut(Row) -> Row {
    move |mut row: Row| {
        for (field, value) in &fields {
            row.insert(field.clone(), value.clone());
        }
        row
    }
}

/// 编辑协调器
///
/// 持有基础数据集与标识解析器的只读引用，对覆盖层进行读写
pub struct Reconciler<'a> {
    base: &'a BaseCollection,
    resolver: &'a IdentityResolver,
    policy: AddCollisionPolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        base: &'a BaseCollection,
        resolver: &'a IdentityResolver,
        policy: AddCollisionPolicy,
    ) -> Self {
        Self {
            base,
            resolver,
            policy,
        }
    }

    /// 执行一条编辑指令，返回实际发生的条目变化
    pub fn apply(
        &self,
        overlay: &mut ChangeOverlay,
        instruction: EditInstruction<'_>,
    ) -> Result<Vec<EntryChange>> {
        match instruction {
            EditInstruction::AddRow(row) => self.add_row(overlay, row),
            EditInstruction::DeleteRows(ids) => Ok(self.delete_rows(overlay, ids)),
            EditInstruction::ModifyRows { ids, transform } => {
                self.modify_rows(overlay, ids, transform)
            }
            EditInstruction::CellEdit(edit) => self.cell_edit(overlay, edit),
            EditInstruction::UndoRow(id) => Ok(self.undo_row(overlay, &id)),
            EditInstruction::Reset => Ok(self.reset(overlay)),
        }
    }

    /// 新增行
    ///
    /// 默认策略下无条件写入 Added，覆盖同标识的任何旧条目（包括 Deleted）
    pub fn add_row(&self, overlay: &mut ChangeOverlay, row: Row) -> Result<Vec<EntryChange>> {
        let id = self.resolver.identity_of(&row).map_err(|err| {
            warn!(error = %err, "rejected add_row");
            err
        })?;

        if self.policy == AddCollisionPolicy::Reject
            && (self.base.contains(&id) || overlay.contains(&id))
        {
            warn!(%id, "rejected add_row: identity already exists");
            return Err(OverlayError::AddCollision(id.to_string()));
        }

        trace!(%id, branch = "added");
        let mut changes = Vec::new();
        write_entry(overlay, id, Some(Modification::Added { data: row }), &mut changes);
        Ok(changes)
    }

    /// 删除行
    ///
    /// 新增行直接移除；原始行（含已修改的）标记为 Deleted 并丢弃修改数据；
    /// 未知标识忽略
    pub fn delete_rows<I>(&self, overlay: &mut ChangeOverlay, ids: I) -> Vec<EntryChange>
    where
        I: IntoIterator<Item = RowIdentity>,
    {
        let mut changes = Vec::new();

        for id in unique(ids) {
            let next = match overlay.get(&id) {
                Some(Modification::Added { .. }) => {
                    trace!(%id, branch = "vanished");
                    None
                }
                Some(Modification::Deleted) => continue,
                _ if self.base.contains(&id) => {
                    trace!(%id, branch = "deleted");
                    Some(Modification::Deleted)
                }
                _ => {
                    trace!(%id, branch = "unknown");
                    continue;
                }
            };
            write_entry(overlay, id, next, &mut changes);
        }

        changes
    }

    /// 修改行
    ///
    /// 单元格编辑与批量修改共用这一条路径。先为所有标识算出结果再统一写入，
    /// 变换若改动或移除了标识字段，整条指令被拒绝，覆盖层保持不变
    pub fn modify_rows<I, F>(
        &self,
        overlay: &mut ChangeOverlay,
        ids: I,
        mut transform: F,
    ) -> Result<Vec<EntryChange>>
    where
        I: IntoIterator<Item = RowIdentity>,
        F: FnMut(Row) -> Row,
    {
        let mut planned = Vec::new();

        for id in unique(ids) {
            let next = match overlay.get(&id) {
                Some(Modification::Deleted) => {
                    trace!(%id, branch = "skipped_deleted");
                    continue;
                }
                Some(Modification::Added { data }) => {
                    let updated = transform(data.clone());
                    self.check_identity(&id, &updated)?;
                    trace!(%id, branch = "added");
                    Some(Modification::Added { data: updated })
                }
                current => {
                    let Some(original) = self.base.get(&id) else {
                        trace!(%id, branch = "unknown");
                        continue;
                    };
                    let effective = match current {
                        Some(Modification::Modified { data }) => data.clone(),
                        _ => original.clone(),
                    };
                    let updated = transform(effective);
                    self.check_identity(&id, &updated)?;

                    if rows_equal(&updated, original) {
                        trace!(%id, branch = "reverted");
                        None
                    } else {
                        trace!(%id, branch = "modified");
                        Some(Modification::Modified { data: updated })
                    }
                }
            };
            planned.push((id, next));
        }

        let mut changes = Vec::new();
        for (id, next) in planned {
            write_entry(overlay, id, next, &mut changes);
        }
        Ok(changes)
    }

    /// 单元格编辑：单行、单字段的修改
    pub fn cell_edit(&self, overlay: &mut ChangeOverlay, edit: CellEdit) -> Result<Vec<EntryChange>> {
        let CellEdit { id, field, value } = edit;
        self.modify_rows(overlay, [id], set_field(field, value))
    }

    /// 撤销单行：无论条目类型，直接移除
    pub fn undo_row(&self, overlay: &mut ChangeOverlay, id: &RowIdentity) -> Vec<EntryChange> {
        let mut changes = Vec::new();
        write_entry(overlay, id.clone(), None, &mut changes);
        changes
    }

    /// 重置：一次性清空覆盖层
    pub fn reset(&self, overlay: &mut ChangeOverlay) -> Vec<EntryChange> {
        let changes = overlay
            .iter()
            .map(|(id, modification)| EntryChange {
                id: id.clone(),
                before: Some(modification.clone()),
                after: None,
            })
            .collect();
        overlay.clear();
        changes
    }

    fn check_identity(&self, id: &RowIdentity, updated: &Row) -> Result<()> {
        let next_id = self.resolver.identity_of(updated)?;
        if &next_id != id {
            warn!(from = %id, to = %next_id, "rejected modify_rows: identity changed");
            return Err(OverlayError::IdentityChanged {
                from: id.to_string(),
                to: next_id.to_string(),
            });
        }
        Ok(())
    }
}

/// 写入（或移除）条目，仅在实际发生变化时记录
fn write_entry(
    overlay: &mut ChangeOverlay,
    id: RowIdentity,
    next: Option<Modification>,
    changes: &mut Vec<EntryChange>,
) {
    let before = overlay.get(&id).cloned();
    if before == next {
        return;
    }

    match &next {
        Some(modification) => {
            overlay.set(id.clone(), modification.clone());
        }
        None => {
            overlay.remove(&id);
        }
    }

    changes.push(EntryChange {
        id,
        before,
        after: next,
    });
}

/// 去重并保留首次出现的顺序
fn unique<I>(ids: I) -> IndexSet<RowIdentity>
where
    I: IntoIterator<Item = RowIdentity>,
{
    ids.into_iter().collect()
}
