//! 🔧 共享库模块
//!
//! 这个模块包含了在各个crate之间共享的通用代码，包括：
//! - 程序配置加载

pub mod config;

// 重新导出常用类型
pub use config::{AppConfig, StorageConfig};
