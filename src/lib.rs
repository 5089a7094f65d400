pub mod collection;
pub mod config;
pub mod datatypes;
pub mod editor;
pub mod identity;
pub mod io;
pub mod projection;
pub mod script;
pub mod stats;
pub mod utils;

// 重新导出主要结构
pub use collection::BaseCollection;
pub use config::{AddCollisionPolicy, EditorConfig};
pub use datatypes::{Row, RowIdentity, Selection};
pub use editor::{CellEdit, GridEditor, Modification, OverlaySnapshot};
pub use identity::IdentityResolver;
pub use projection::{DisplayState, ProjectedRow};
pub use script::EditScript;
pub use stats::OverlayStats;
pub use utils::{OverlayError, Result};

// 常量定义
pub const DEFAULT_IDENTITY_FIELD: &str = "id";
pub const SUPPORTED_EXTENSIONS: &[&str] = &["json"];
