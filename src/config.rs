/// 编辑器配置
///
/// 构造时设置一次，之后不再变化。可以直接构建，也可以从 JSON 文件加载：
///
/// ```json
/// { "identity_field": "id", "add_collision": "reject", "track_history": true }
/// ```
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityResolver;
use crate::utils::Result;
use crate::DEFAULT_IDENTITY_FIELD;

/// 新增行与已有标识冲突时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddCollisionPolicy {
    /// 无条件覆盖为 Added（后写者胜）
    #[default]
    Overwrite,
    /// 标识已在基础数据集或覆盖层中存在时拒绝
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// 标识字段名
    pub identity_field: String,
    /// 新增行冲突策略
    pub add_collision: AddCollisionPolicy,
    /// 是否记录指令历史（撤销/重做）
    pub track_history: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            add_collision: AddCollisionPolicy::default(),
            track_history: true,
        }
    }
}

impl EditorConfig {
    /// 使用指定标识字段创建配置
    pub fn with_identity_field(field: impl Into<String>) -> Self {
        Self {
            identity_field: field.into(),
            ..Self::default()
        }
    }

    pub fn add_collision(mut self, policy: AddCollisionPolicy) -> Self {
        self.add_collision = policy;
        self
    }

    pub fn track_history(mut self, enabled: bool) -> Self {
        self.track_history = enabled;
        self
    }

    /// 从 JSON 字符串加载
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 校验配置并生成标识解析器
    pub fn validate(&self) -> Result<IdentityResolver> {
        IdentityResolver::new(self.identity_field.clone())
    }
}
