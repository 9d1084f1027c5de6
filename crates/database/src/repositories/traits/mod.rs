//! 数据库仓库 trait 定义
//!
//! 这里定义了各种数据库仓库的抽象接口
//!
//! ## Repository Trait 设计模式 🎯
//!
//! 所有 Repository trait 都遵循统一的设计模式，实现以下 trait 约束：
//!
//! ```text
//! pub trait XxxRepositoryTrait: Send + Sync + 'static {
//!     // 异步方法定义...
//! }
//! ```
//!
//! ### Trait 约束说明 📚
//!
//! - **`Send`** 🚀 异步方法返回的 `Future` 需要在不同线程间传递
//! - **`Sync`** 🔄 Repository 实例作为共享服务被多个并发请求访问
//! - **`'static`** ⏰ 作为应用服务长期运行，不依赖于短期引用
//!
//! 服务层通过泛型而非 trait object 使用这些接口（Policy Based Design），
//! 零成本抽象，编译时优化。
//!
//! ### 聚合接口 💡
//!
//! 每个业务聚合一个 trait，按表职责划分；[`BackendRepository`] 把它们
//! 捆绑成一个约束，服务层只需要一个泛型参数：
//!
//! ```text
//! #[derive(Clone)]
//! struct ProjectService<R: BackendRepository> {
//!     repo: R,
//! }
//! ```
//!
//! PostgreSQL 实现和测试用的内存实现都满足这个约束。

pub mod code;
pub mod feedback;
pub mod mypage;
pub mod project;
pub mod review;
pub mod tag;
pub mod user;

// 重新导出
pub use code::CodeRepositoryTrait;
pub use feedback::FeedbackRepositoryTrait;
pub use mypage::MypageRepositoryTrait;
pub use project::ProjectRepositoryTrait;
pub use review::ReviewRepositoryTrait;
pub use tag::TagRepositoryTrait;
pub use user::UserRepositoryTrait;

/// 后端仓库聚合约束
///
/// 把各个聚合的仓库接口捆绑在一起，外加 `Clone`，
/// 这样服务层可以持有同一个仓库实例的副本。
pub trait BackendRepository:
    UserRepositoryTrait
    + ProjectRepositoryTrait
    + TagRepositoryTrait
    + FeedbackRepositoryTrait
    + CodeRepositoryTrait
    + ReviewRepositoryTrait
    + MypageRepositoryTrait
    + Clone
{
}

impl<T> BackendRepository for T where
    T: UserRepositoryTrait
        + ProjectRepositoryTrait
        + TagRepositoryTrait
        + FeedbackRepositoryTrait
        + CodeRepositoryTrait
        + ReviewRepositoryTrait
        + MypageRepositoryTrait
        + Clone
{
}
