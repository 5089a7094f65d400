/// 行标识解析模块
///
/// 按配置的标识字段从行中投影出 [`RowIdentity`]。
/// 字段名在构造时校验一次，之后每行只做投影。
use crate::datatypes::{Row, RowIdentity};
use crate::utils::{OverlayError, Result};

/// 标识解析器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResolver {
    field: String,
}

impl IdentityResolver {
    /// 创建解析器
    ///
    /// # 参数
    /// * `field` - 标识字段名，不能为空
    pub fn new(field: impl Into<String>) -> Result<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(OverlayError::InvalidIdentityField);
        }
        Ok(Self { field })
    }

    /// 获取标识字段名
    pub fn field(&self) -> &str {
        &self.field
    }

    /// 提取行标识
    ///
    /// 字段缺失或值既不是字符串也不是整数时返回 `MissingIdentity`，
    /// 调用方必须拒绝该行，而不是用空值作为键
    pub fn identity_of(&self, row: &Row) -> Result<RowIdentity> {
        let value = row.get(&self.field).ok_or_else(|| OverlayError::MissingIdentity {
            field: self.field.clone(),
            context: "field is absent".to_string(),
        })?;

        RowIdentity::from_value(value).ok_or_else(|| OverlayError::MissingIdentity {
            field: self.field.clone(),
            context: format!("unsupported identity value {}", value),
        })
    }
}
