/// IO 抽象层 - trait 定义
///
/// 该模块定义了文件读写的抽象接口，支持依赖注入和测试 mock。
/// 引擎本身不做任何 IO，这些接口只服务于宿主（如命令行工具）。
use std::path::Path;

use crate::datatypes::Row;
use crate::editor::OverlaySnapshot;
use crate::script::EditScript;
use crate::utils::Result;

/// 基础数据集读取 trait
///
/// # 职责
/// - 从文件读取行序列
/// - 不负责标识校验，校验在构造编辑器时进行
pub trait BaseReader {
    /// 读取基础数据集
    ///
    /// # 参数
    /// * `path` - 文件路径
    fn read(&self, path: &Path) -> Result<Vec<Row>>;
}

/// 变更快照写入 trait
///
/// # 职责
/// - 把覆盖层快照导出用于展示或调试
/// - 导出结果不会被重新加载为覆盖层
pub trait ChangesWriter {
    /// 写入快照
    ///
    /// # 参数
    /// * `snapshot` - 覆盖层快照
    /// * `path` - 目标文件路径
    fn write(&self, snapshot: &OverlaySnapshot, path: &Path) -> Result<()>;
}

/// 编辑脚本读取 trait
pub trait ScriptReader {
    fn read(&self, path: &Path) -> Result<EditScript>;
}
