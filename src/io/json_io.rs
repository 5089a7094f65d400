/// JSON 文件 IO 实现
///
/// 提供基于文件系统的默认 JSON 读写实现
use std::path::Path;

use serde_json::Value;

use super::traits::{BaseReader, ChangesWriter, ScriptReader};
use crate::datatypes::Row;
use crate::editor::OverlaySnapshot;
use crate::script::EditScript;
use crate::utils::{OverlayError, Result};

/// 默认的基础数据集读取器
///
/// 文件内容必须是对象数组：`[{"id": 1, ...}, ...]`
#[derive(Debug, Clone, Default)]
pub struct JsonBaseReader;

impl JsonBaseReader {
    /// 从 JSON 字符串解析行序列
    pub fn parse(&self, json: &str) -> Result<Vec<Row>> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Array(items) = value else {
            return Err(OverlayError::InvalidBase(
                "expected a JSON array of objects".to_string(),
            ));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(OverlayError::InvalidBase(format!(
                    "element {} is not an object: {}",
                    index, other
                ))),
            })
            .collect()
    }
}

impl BaseReader for JsonBaseReader {
    fn read(&self, path: &Path) -> Result<Vec<Row>> {
        let content = std::fs::read_to_string(path)?;
        self.parse(&content)
    }
}

/// 默认的变更快照写入器（格式化 JSON）
#[derive(Debug, Clone, Default)]
pub struct JsonChangesWriter;

impl ChangesWriter for JsonChangesWriter {
    fn write(&self, snapshot: &OverlaySnapshot, path: &Path) -> Result<()> {
        // 确保父目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// 默认的编辑脚本读取器
#[derive(Debug, Clone, Default)]
pub struct JsonScriptReader;

impl ScriptReader for JsonScriptReader {
    fn read(&self, path: &Path) -> Result<EditScript> {
        let content = std::fs::read_to_string(path)?;
        EditScript::from_json_str(&content)
    }
}
