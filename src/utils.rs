use serde_json::{Number, Value};
use thiserror::Error;

use crate::datatypes::Row;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Identity field name must not be empty")]
    InvalidIdentityField,

    #[error("Row has no usable identity field '{field}' ({context})")]
    MissingIdentity { field: String, context: String },

    #[error("Duplicate identity in base collection: {0}")]
    DuplicateIdentity(String),

    #[error("Row identity already exists: {0}")]
    AddCollision(String),

    #[error("Edit would change row identity from '{from}' to '{to}'")]
    IdentityChanged { from: String, to: String },

    #[error("Invalid base collection: {0}")]
    InvalidBase(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OverlayError>;

/// 结构化深比较两行
///
/// 逐字段递归比较值，字段顺序不影响结果。
/// 数值按数值比较，`28` 与 `28.0` 视为相等。
pub fn rows_equal(left: &Row, right: &Row) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| values_equal(value, other)))
}

/// 递归比较两个 JSON 值
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => rows_equal(a, b),
        _ => left == right,
    }
}

/// 两边都是整数时按整数比较，否则退回浮点比较
fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a == b;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// 截断过长文本用于显示
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
