//! 服务层 trait 定义
//!
//! 定义服务层的抽象接口，遵循六边形架构的端口适配器模式。
//! 路由层只依赖这里的 trait，不关心具体实现。

use crate::models::codes::{CodeDetailRes, CodeInfoRes, CodeReq, CodeSearch, ReviewReq, ReviewUpdateReq};
use crate::models::common::PageQuery;
use crate::models::err::AppError;
use crate::models::projects::{
    FeedbackInfoRes, FeedbackReq, FeedbackUpdateReq, ProjectDetailRes, ProjectInfoRes, ProjectReq,
    ProjectSearch, TagRes,
};

/// 服务层操作结果类型
pub type ServiceResult<T> = Result<T, AppError>;

/// 项目服务接口
///
/// 覆盖项目版本组的登记/升级/修改/删除，以及挂在版本上的
/// 反馈、标签、点赞、收藏等操作。写操作都要求调用者是作者本人。
#[async_trait::async_trait]
pub trait ProjectServiceTrait: Send + Sync + 'static {
    /// 登记新项目或升级已有项目，返回新版本行ID
    ///
    /// `req.project_id` 为 -1 时新开版本组；否则其所在版本组的
    /// 全部旧版本被关闭，新版本号为组内最大版本号加一，点赞数继承。
    async fn insert_project(&self, req: ProjectReq, user_id: i64) -> ServiceResult<i64>;

    /// 修改版本行，只允许改版本组的最新版本，标签和采纳关联整体重建
    async fn update_project(&self, req: ProjectReq, user_id: i64) -> ServiceResult<()>;

    /// 按关键字/标签搜索项目，返回卡片列表和总数
    async fn get_project_list(&self, search: ProjectSearch) -> ServiceResult<(Vec<ProjectInfoRes>, u32)>;

    /// 项目详情，带版本组历史、反馈列表和关联代码
    async fn get_project(&self, project_id: i64, viewer: Option<i64>) -> ServiceResult<ProjectDetailRes>;

    /// 删除版本行及其全部附属数据，删除头部版本会重新打开上一个版本
    async fn delete_project(&self, project_id: i64, user_id: i64) -> ServiceResult<()>;

    /// 上传缩略图，返回对外URL
    async fn update_thumbnail(
        &self,
        project_id: i64,
        user_id: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> ServiceResult<String>;

    /// 把一批代码版本挂到项目版本下，返回关联的数量
    async fn connect_codes(&self, project_id: i64, user_id: i64, code_ids: Vec<i64>) -> ServiceResult<u32>;

    /// 点赞/取消点赞，返回新的点赞数
    async fn like_project(&self, project_id: i64, user_id: i64) -> ServiceResult<i32>;

    /// 收藏/取消收藏，返回新的收藏数
    async fn favorite_project(&self, project_id: i64, user_id: i64) -> ServiceResult<i64>;

    /// 版本是否处于打开状态，返回 1/0
    async fn is_project_open(&self, project_id: i64) -> ServiceResult<i32>;

    /// 探测项目地址是否可访问
    async fn check_project_url(&self, url: &str, user_id: i64) -> ServiceResult<bool>;

    /// 按关键字搜索项目标签词表
    async fn search_project_tags(&self, keyword: &str) -> ServiceResult<Vec<TagRes>>;

    /// 给版本写反馈，匿名也允许，返回版本新的反馈数
    async fn insert_feedback(&self, req: FeedbackReq, viewer: Option<i64>) -> ServiceResult<i32>;

    /// 修改自己的反馈，已被采纳的不允许改
    async fn update_feedback(&self, req: FeedbackUpdateReq, user_id: i64) -> ServiceResult<()>;

    /// 删除自己的反馈，返回版本新的反馈数
    async fn delete_feedback(&self, feedback_id: i64, user_id: i64) -> ServiceResult<i32>;

    /// 作者视角的反馈列表，覆盖整个版本组
    async fn get_feedback_list(&self, project_id: i64, user_id: i64) -> ServiceResult<Vec<FeedbackInfoRes>>;

    /// 反馈点赞/取消点赞，返回新的点赞数
    async fn like_feedback(&self, feedback_id: i64, user_id: i64) -> ServiceResult<i32>;

    /// 投诉反馈，每人一次，返回新的被投诉数
    async fn complain_feedback(&self, feedback_id: i64, user_id: i64) -> ServiceResult<i32>;
}

/// 代码服务接口
///
/// 与项目服务对应：版本组管理、评审、标签、点赞、收藏。
#[async_trait::async_trait]
pub trait CodeServiceTrait: Send + Sync + 'static {
    /// 登记新代码或升级已有代码，返回新版本行ID
    async fn insert_code(&self, req: CodeReq, user_id: i64) -> ServiceResult<i64>;

    /// 修改版本行，只允许改版本组的最新版本
    async fn update_code(&self, req: CodeReq, user_id: i64) -> ServiceResult<()>;

    /// 按关键字/标签搜索代码，返回卡片列表和总数
    async fn get_code_list(&self, search: CodeSearch, viewer: Option<i64>) -> ServiceResult<(Vec<CodeInfoRes>, u32)>;

    /// 代码详情，带版本组历史、评审列表和关联项目
    async fn get_code(&self, code_id: i64, viewer: Option<i64>) -> ServiceResult<CodeDetailRes>;

    /// 删除版本行及其全部附属数据
    async fn delete_code(&self, code_id: i64, user_id: i64) -> ServiceResult<()>;

    /// 点赞/取消点赞，返回新的点赞数
    async fn like_code(&self, code_id: i64, user_id: i64) -> ServiceResult<i32>;

    /// 收藏/取消收藏，返回新的收藏数
    async fn favorite_code(&self, code_id: i64, user_id: i64) -> ServiceResult<i64>;

    /// 按关键字搜索代码标签词表
    async fn search_code_tags(&self, keyword: &str) -> ServiceResult<Vec<TagRes>>;

    /// 给代码写评审，匿名也允许，返回新的评审数
    async fn insert_review(&self, req: ReviewReq, viewer: Option<i64>) -> ServiceResult<i32>;

    /// 修改自己的评审，已被采纳的不允许改
    async fn update_review(&self, req: ReviewUpdateReq, user_id: i64) -> ServiceResult<()>;

    /// 删除自己的评审，返回新的评审数
    async fn delete_review(&self, review_id: i64, user_id: i64) -> ServiceResult<i32>;

    /// 评审点赞/取消点赞，返回新的点赞数
    async fn like_review(&self, review_id: i64, user_id: i64) -> ServiceResult<i32>;
}

/// 个人页服务接口
#[async_trait::async_trait]
pub trait MypageServiceTrait: Send + Sync + 'static {
    /// 我写过的项目
    async fn my_projects(&self, user_id: i64, page: PageQuery) -> ServiceResult<(Vec<ProjectInfoRes>, u32)>;

    /// 我收藏的项目
    async fn my_favorite_projects(&self, user_id: i64, page: PageQuery) -> ServiceResult<(Vec<ProjectInfoRes>, u32)>;

    /// 我反馈过的项目
    async fn my_feedback_projects(&self, user_id: i64, page: PageQuery) -> ServiceResult<(Vec<ProjectInfoRes>, u32)>;

    /// 我写过的代码
    async fn my_codes(&self, user_id: i64, page: PageQuery) -> ServiceResult<(Vec<CodeInfoRes>, u32)>;

    /// 我收藏的代码
    async fn my_favorite_codes(&self, user_id: i64, page: PageQuery) -> ServiceResult<(Vec<CodeInfoRes>, u32)>;

    /// 我评审过的代码
    async fn my_review_codes(&self, user_id: i64, page: PageQuery) -> ServiceResult<(Vec<CodeInfoRes>, u32)>;

    /// 渲染用户的统计卡片SVG
    async fn make_stat_card(&self, user_name: &str) -> ServiceResult<String>;
}

/// 后端服务聚合约束
///
/// 与仓库层的 `BackendRepository` 对应，路由层只需要一个泛型参数。
pub trait BackendService: ProjectServiceTrait + CodeServiceTrait + MypageServiceTrait {}

impl<T> BackendService for T where T: ProjectServiceTrait + CodeServiceTrait + MypageServiceTrait {}
