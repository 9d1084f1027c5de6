//! 数据库模型模块
//!
//! 这里定义与数据库表对应的结构体和相关操作

pub mod code;
pub mod feedback;
pub mod project;
pub mod review;
pub mod tag;
pub mod user;

// 重新导出具体的模型
pub use code::{Code, CodeCreate, CodeSearchParams, CodeSearchResult, CodeSortKey, CodeUpdate};
pub use feedback::{Feedback, SelectedFeedback};
pub use project::{
    Project, ProjectCreate, ProjectInfo, ProjectSearchParams, ProjectSearchResult, ProjectSortKey,
    ProjectUpdate,
};
pub use review::{Review, SelectedReview};
pub use tag::{CodeSelectedTag, SelectedTag, Tag};
pub use user::{User, UserStats};
