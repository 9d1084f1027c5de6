//! 数据库仓库模块
//!
//! 这里定义数据库操作的Repository层：PostgreSQL 实现按聚合拆分在
//! 各自的模块文件里，内存实现集中在 memory 模块，测试用。

pub mod code;
pub mod feedback;
pub mod memory;
pub mod mypage;
pub mod pg;
pub mod project;
pub mod review;
pub mod tag;
pub mod traits;
pub mod user;

// 重新导出具体的类型
pub use memory::MemoryRepository;
pub use pg::PgRepository;
pub use traits::BackendRepository;
