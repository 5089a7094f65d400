use crate::collection::BaseCollection;
use crate::editor::overlay::{ChangeOverlay, Modification};

/// 覆盖层统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayStats {
    pub base_rows: usize,
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub projected_rows: usize,
}

impl OverlayStats {
    /// 从基础数据集与覆盖层统计
    pub fn collect(base: &BaseCollection, overlay: &ChangeOverlay) -> Self {
        let mut stats = OverlayStats {
            base_rows: base.len(),
            ..Default::default()
        };

        let mut shadowed = 0;
        for (id, modification) in overlay.iter() {
            match modification {
                Modification::Added { .. } => {
                    stats.added += 1;
                    if base.contains(id) {
                        shadowed += 1;
                    }
                }
                Modification::Modified { .. } => stats.modified += 1,
                Modification::Deleted => stats.deleted += 1,
            }
        }

        stats.projected_rows = stats.base_rows - shadowed + stats.added;
        stats
    }

    /// 待定修改总数
    pub fn pending(&self) -> usize {
        self.added + self.modified + self.deleted
    }
}

impl std::fmt::Display for OverlayStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 变更统计信息 ===")?;
        writeln!(f, "原始行数: {}", self.base_rows)?;
        writeln!(f, "新增: {}", self.added)?;
        writeln!(f, "修改: {}", self.modified)?;
        writeln!(f, "删除: {}", self.deleted)?;
        writeln!(f, "视图行数: {}", self.projected_rows)?;
        Ok(())
    }
}
