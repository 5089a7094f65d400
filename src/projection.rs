/// 视图投影模块
///
/// 把只读的基础数据集与覆盖层合并为要渲染的有序行序列，
/// 并为每行推导显示状态。显示状态从不单独存储，每次都从覆盖层重新计算。
use serde::Serialize;

use crate::collection::BaseCollection;
use crate::datatypes::{Row, RowIdentity};
use crate::editor::overlay::{ChangeOverlay, Modification};

/// 行的显示状态
///
/// 变体顺序即优先级：Deleted > Added > Modified > Unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayState {
    Unchanged,
    Modified,
    Added,
    Deleted,
}

impl DisplayState {
    /// 从覆盖层条目推导显示状态
    pub fn of(modification: Option<&Modification>) -> Self {
        match modification {
            None => DisplayState::Unchanged,
            Some(Modification::Modified { .. }) => DisplayState::Modified,
            Some(Modification::Added { .. }) => DisplayState::Added,
            Some(Modification::Deleted) => DisplayState::Deleted,
        }
    }

    pub fn is_changed(self) -> bool {
        self != DisplayState::Unchanged
    }

    /// 单字符标记，用于文本渲染
    pub fn marker(self) -> char {
        match self {
            DisplayState::Unchanged => ' ',
            DisplayState::Modified => '~',
            DisplayState::Added => '+',
            DisplayState::Deleted => '-',
        }
    }
}

/// 投影视图中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRow<'a> {
    pub id: &'a RowIdentity,
    pub row: &'a Row,
    pub state: DisplayState,
}

/// 计算投影视图
///
/// 1. 按原始顺序遍历基础数据集：无条目保持原样，Modified 替换为修改后的数据，
///    Deleted 保留原始值并标记删除
/// 2. 按插入顺序在末尾追加所有 Added 条目
///
/// 与基础行同标识的 Added 条目只在末尾出现一次，对应的基础行不再渲染
pub fn project<'a>(base: &'a BaseCollection, overlay: &'a ChangeOverlay) -> Vec<ProjectedRow<'a>> {
    let mut view = Vec::with_capacity(base.len() + overlay.len());

    for (id, row) in base.iter() {
        let projected = match overlay.get(id) {
            None => ProjectedRow {
                id,
                row,
                state: DisplayState::Unchanged,
            },
            Some(Modification::Modified { data }) => ProjectedRow {
                id,
                row: data,
                state: DisplayState::Modified,
            },
            Some(Modification::Deleted) => ProjectedRow {
                id,
                row,
                state: DisplayState::Deleted,
            },
            Some(Modification::Added { .. }) => continue,
        };
        view.push(projected);
    }

    view.extend(overlay.iter().filter_map(|(id, modification)| match modification {
        Modification::Added { data } => Some(ProjectedRow {
            id,
            row: data,
            state: DisplayState::Added,
        }),
        _ => None,
    }));

    view
}

/// 查询单个标识的显示状态，标识未知时返回 None
pub fn display_state(
    base: &BaseCollection,
    overlay: &ChangeOverlay,
    id: &RowIdentity,
) -> Option<DisplayState> {
    match overlay.get(id) {
        Some(modification) => Some(DisplayState::of(Some(modification))),
        None if base.contains(id) => Some(DisplayState::Unchanged),
        None => None,
    }
}
