use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 行数据
///
/// 表格中的一行，按字段名索引的结构化记录。引擎对行的形状不做任何假设，
/// 唯一会读取的字段是配置的标识字段。
pub type Row = serde_json::Map<String, Value>;

/// 宿主提供的当前选中行标识集合
///
/// 选中状态属于宿主，引擎只在调用时读取，不保存
pub type Selection = BTreeSet<RowIdentity>;

/// 行标识
///
/// 标识字段的值（字符串或整数）。所有标识统一按字符串形式比较，
/// 因此 `"7"` 与 `7` 视为同一个键。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowIdentity(String);

impl RowIdentity {
    /// 从字符串形式创建标识
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// 从 JSON 值投影出标识
    ///
    /// 仅接受字符串与整数，其他类型（null、浮点、对象等）返回 None
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self(text.clone())),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Some(Self(number.to_string()))
            }
            _ => None,
        }
    }

    /// 获取标识的字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RowIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for RowIdentity {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RowIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawIdentity {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawIdentity::deserialize(deserializer)? {
            RawIdentity::Text(text) => Self(text),
            RawIdentity::Signed(number) => Self(number.to_string()),
            RawIdentity::Unsigned(number) => Self(number.to_string()),
        })
    }
}
