//! 代码相关的请求/响应DTO

use chrono::{DateTime, Utc};
use database::models::Code;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// 代码登记请求，新建和版本升级共用
///
/// `code_id` 为 -1 表示登记全新代码，否则为要升级的版本行ID。
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CodeReq {
    #[schema(example = -1)]
    #[validate(range(min = -1))]
    pub code_id: i64,

    #[schema(example = "归并排序优化")]
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    /// 代码正文
    #[validate(length(min = 1))]
    pub content: String,

    #[schema(example = "rust")]
    #[validate(length(min = 1, max = 30))]
    pub language: String,

    /// 要关联的项目版本行ID，必须是调用者自己的项目
    pub project_id: Option<i64>,

    /// 选择的标签ID列表
    pub selected_tags_id: Option<Vec<i64>>,

    /// 本次升级采纳的评审ID列表
    pub selected_reviews_id: Option<Vec<i64>>,
}

/// 代码搜索的查询参数
#[derive(Deserialize, Debug, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct CodeSearch {
    /// 标题关键字，忽略大小写
    pub keyword: Option<String>,

    /// 逗号分隔的标签ID列表，命中的代码要带上全部标签
    #[param(example = "2,7")]
    pub tag_ids: Option<String>,

    /// 传1时把已关闭的历史版本也包含进来
    pub closed: Option<i32>,

    /// 排序方式：modifiedDate | likeCnt | reviewCnt
    #[param(example = "modifiedDate")]
    pub sort: Option<String>,

    #[validate(range(min = 1))]
    #[serde(default = "crate::models::common::default_page_index")]
    pub page_index: u32,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "crate::models::common::default_page_size")]
    pub page_size: u32,
}

/// 列表页的代码卡片
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CodeInfoRes {
    pub code_id: i64,
    pub version: i32,
    pub title: String,
    pub language: String,
    pub like_cnt: i32,
    pub review_cnt: i32,
    pub closed: bool,
    /// 当前调用者是否点赞过
    pub liked: bool,
    pub user_name: String,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
}

impl CodeInfoRes {
    pub fn from_parts(code: &Code, user_name: String, tags: Vec<String>, liked: bool) -> Self {
        Self {
            code_id: code.code_id,
            version: code.version,
            title: code.title.clone(),
            language: code.language.clone(),
            like_cnt: code.like_cnt,
            review_cnt: code.review_cnt,
            closed: code.closed,
            liked,
            user_name,
            tags,
            date: code.modified_at,
        }
    }
}

/// 代码详情
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CodeDetailRes {
    pub code_id: i64,
    pub version: i32,
    pub title: String,
    pub content: String,
    pub language: String,
    pub like_cnt: i32,
    pub review_cnt: i32,
    pub closed: bool,
    pub liked: bool,
    pub favorite: bool,
    pub user_id: i64,
    pub user_name: String,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
    /// 同一版本组的全部版本，版本号倒序
    pub versions: Vec<CodeVersionRes>,
    /// 挂在当前版本上的评审，采纳的在前
    pub reviews: Vec<ReviewRes>,
    /// 关联的项目摘要
    pub connected_project: Option<ConnectedProjectRes>,
}

/// 代码版本组里的单个版本
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CodeVersionRes {
    pub code_id: i64,
    pub version: i32,
    /// 这个版本升级时采纳的评审
    pub selected_reviews: Vec<SelectedReviewRes>,
}

/// 版本采纳的评审摘要
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SelectedReviewRes {
    pub review_id: i64,
    pub content: String,
}

/// 代码详情里的评审条目
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ReviewRes {
    pub review_id: i64,
    /// 匿名评审为 None
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub content: String,
    pub selected: i32,
    pub like_cnt: i32,
    pub liked: bool,
    pub date: DateTime<Utc>,
}

/// 代码详情里关联的项目摘要
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ConnectedProjectRes {
    pub project_id: i64,
    pub version: i32,
    pub title: String,
    pub img: String,
}

/// 写评审请求
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ReviewReq {
    /// 收到评审的代码版本行ID
    #[validate(range(min = 1))]
    pub code_id: i64,

    #[validate(length(min = 1, max = 500))]
    pub content: String,
}

/// 修改评审请求
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ReviewUpdateReq {
    #[validate(range(min = 1))]
    pub review_id: i64,

    #[validate(length(min = 1, max = 500))]
    pub content: String,
}
