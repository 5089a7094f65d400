/// IO 抽象层模块
///
/// 该模块提供了文件读写的抽象接口，遵循依赖倒置原则。
/// 支持依赖注入、测试 mock 和替换 IO 实现。
///
/// # 架构设计
///
/// - **traits**: 定义 Reader/Writer trait 接口
/// - **json_io**: 基于 JSON 文件的默认实现
///
/// # 使用示例
///
/// ```rust,ignore
/// use edit_overlay::io::{BaseReader, JsonBaseReader};
///
/// let rows = JsonBaseReader.read(Path::new("rows.json"))?;
/// ```
pub mod json_io;
pub mod traits;

// === 导出 trait 定义 ===
pub use traits::{BaseReader, ChangesWriter, ScriptReader};

// === 导出默认实现 ===
pub use json_io::{JsonBaseReader, JsonChangesWriter, JsonScriptReader};
