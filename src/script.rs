/// 编辑脚本
///
/// 用 JSON 描述的一串编辑指令，供命令行宿主重放：
///
/// ```json
/// [
///   {"op": "modify", "ids": ["1"], "set": {"age": 99}},
///   {"op": "cell", "id": "2", "field": "name", "value": "Ada"},
///   {"op": "add", "row": {"id": "4", "age": 50}},
///   {"op": "delete", "ids": ["3", "4"]},
///   {"op": "undo_row", "id": "1"},
///   {"op": "undo"},
///   {"op": "reset"}
/// ]
/// ```
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::datatypes::{Row, RowIdentity};
use crate::editor::{set_fields, CellEdit, GridEditor};
use crate::utils::Result;

/// 脚本中的一步
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Add { row: Row },
    Delete { ids: Vec<RowIdentity> },
    Modify { ids: Vec<RowIdentity>, set: Row },
    Cell { id: RowIdentity, field: String, value: Value },
    UndoRow { id: RowIdentity },
    Reset,
    Undo,
    Redo,
}

impl ScriptStep {
    /// 在编辑器上执行这一步，返回变化的条目数
    pub fn run(&self, editor: &mut GridEditor) -> Result<usize> {
        match self {
            ScriptStep::Add { row } => editor.add_row(row.clone()).map(|_| 1),
            ScriptStep::Delete { ids } => Ok(editor.delete_rows(ids.iter().cloned())),
            ScriptStep::Modify { ids, set } => {
                editor.modify_rows(ids.iter().cloned(), set_fields(set.clone()))
            }
            ScriptStep::Cell { id, field, value } => {
                editor.apply_cell_edit(CellEdit::new(id.clone(), field.clone(), value.clone()))
            }
            ScriptStep::UndoRow { id } => Ok(usize::from(editor.undo_row(id))),
            ScriptStep::Reset => Ok(editor.reset()),
            ScriptStep::Undo => editor.undo_last().map(|_| 1),
            ScriptStep::Redo => editor.redo_last().map(|_| 1),
        }
    }
}

/// 编辑脚本
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript {
    pub steps: Vec<ScriptStep>,
}

/// 脚本执行报告
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// 执行的步数
    pub steps: usize,
    /// 累计变化的条目数
    pub affected: usize,
}

impl EditScript {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 依次执行所有步骤，遇到错误立即停止
    pub fn run(&self, editor: &mut GridEditor) -> Result<ScriptReport> {
        let mut report = ScriptReport::default();

        for (index, step) in self.steps.iter().enumerate() {
            let affected = step.run(editor)?;
            debug!(step = index, affected, "script step applied");
            report.steps += 1;
            report.affected += affected;
        }

        Ok(report)
    }
}
