/// 基础数据集
///
/// 调用方提供的原始行序列，是"原始值"的唯一来源。
/// 引擎只读访问：不修改、不重排、不写入。
use std::collections::HashMap;
use std::sync::Arc;

use crate::datatypes::{Row, RowIdentity};
use crate::identity::IdentityResolver;
use crate::utils::{OverlayError, Result};

/// 只读基础数据集，附带按标识的查找索引
#[derive(Debug, Clone)]
pub struct BaseCollection {
    rows: Arc<Vec<Row>>,
    ids: Vec<RowIdentity>,
    index: HashMap<RowIdentity, usize>,
}

impl BaseCollection {
    /// 构建基础数据集
    ///
    /// 每一行都必须带有可用的标识；重复标识视为不变量被破坏，
    /// 直接返回 `DuplicateIdentity`，不会静默合并
    pub fn new(rows: Arc<Vec<Row>>, resolver: &IdentityResolver) -> Result<Self> {
        let mut ids = Vec::with_capacity(rows.len());
        let mut index = HashMap::with_capacity(rows.len());

        for (position, row) in rows.iter().enumerate() {
            let id = resolver.identity_of(row).map_err(|err| match err {
                OverlayError::MissingIdentity { field, context } => OverlayError::MissingIdentity {
                    field,
                    context: format!("base row {}: {}", position, context),
                },
                other => other,
            })?;

            if index.insert(id.clone(), position).is_some() {
                return Err(OverlayError::DuplicateIdentity(id.to_string()));
            }
            ids.push(id);
        }

        Ok(Self { rows, ids, index })
    }

    /// 按标识查找原始行
    pub fn get(&self, id: &RowIdentity) -> Option<&Row> {
        self.index.get(id).map(|&position| &self.rows[position])
    }

    /// 标识是否存在于基础数据集中
    pub fn contains(&self, id: &RowIdentity) -> bool {
        self.index.contains_key(id)
    }

    /// 按原始顺序遍历（标识, 行）
    pub fn iter(&self) -> impl Iterator<Item = (&RowIdentity, &Row)> {
        self.ids.iter().zip(self.rows.iter())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// 共享的底层行序列
    pub fn shared(&self) -> Arc<Vec<Row>> {
        Arc::clone(&self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
