//! 项目相关的请求/响应DTO

use chrono::{DateTime, Utc};
use database::models::{Project, Tag};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// 项目登记请求，新建和版本升级共用
///
/// `project_id` 为 -1 表示登记全新项目，否则为要升级的版本行ID，
/// 升级会关闭版本组里已有的版本并插入一个新的头部版本。
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ProjectReq {
    #[schema(example = -1)]
    #[validate(range(min = -1))]
    pub project_id: i64,

    #[schema(example = "二手书交易平台")]
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    /// 列表页展示的一句话简介
    #[validate(length(max = 300))]
    pub introduction: String,

    /// 项目的部署/仓库地址
    #[validate(length(min = 1, max = 500))]
    pub url: String,

    /// 本版本的更新公告
    #[validate(length(max = 500))]
    pub notice: String,

    /// 详细介绍正文
    pub content: String,

    /// 选择的标签ID列表
    pub selected_tags_id: Option<Vec<i64>>,

    /// 本次升级采纳的反馈ID列表
    pub selected_feedbacks_id: Option<Vec<i64>>,
}

/// 项目搜索的查询参数
#[derive(Deserialize, Debug, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ProjectSearch {
    /// 标题/简介关键字，忽略大小写
    pub keyword: Option<String>,

    /// 逗号分隔的标签ID列表，命中的项目要带上全部标签
    #[param(example = "1,4")]
    pub tag_ids: Option<String>,

    /// 传1时把已关闭的历史版本也包含进来
    pub closed: Option<i32>,

    /// 排序方式：modifiedDate | likeCnt | feedbackCnt
    #[param(example = "modifiedDate")]
    pub sort: Option<String>,

    #[validate(range(min = 1))]
    #[serde(default = "crate::models::common::default_page_index")]
    pub page_index: u32,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "crate::models::common::default_page_size")]
    pub page_size: u32,
}

/// 列表页的项目卡片
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ProjectInfoRes {
    pub project_id: i64,
    pub version: i32,
    pub title: String,
    pub introduction: String,
    /// 缩略图URL
    pub img: String,
    pub like_cnt: i32,
    pub feedback_cnt: i32,
    pub closed: bool,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
}

impl ProjectInfoRes {
    pub fn from_parts(project: &Project, tags: Vec<String>) -> Self {
        Self {
            project_id: project.project_id,
            version: project.version,
            title: project.title.clone(),
            introduction: project.introduction.clone(),
            img: project.img.clone(),
            like_cnt: project.like_cnt,
            feedback_cnt: project.feedback_cnt,
            closed: project.closed,
            tags,
            date: project.modified_at,
        }
    }
}

/// 项目详情
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ProjectDetailRes {
    pub project_id: i64,
    pub version: i32,
    pub title: String,
    pub introduction: String,
    pub img: String,
    pub url: String,
    pub notice: String,
    pub content: String,
    pub like_cnt: i32,
    pub feedback_cnt: i32,
    pub closed: bool,
    /// 当前调用者是否点赞过
    pub liked: bool,
    /// 当前调用者是否收藏过
    pub favorite: bool,
    pub user_id: i64,
    pub user_name: String,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
    /// 同一版本组的全部版本，版本号倒序
    pub versions: Vec<VersionRes>,
    /// 挂在当前版本上的反馈，采纳的在前
    pub feedbacks: Vec<FeedbackRes>,
    /// 关联到当前版本的代码
    pub connected_codes: Vec<ConnectedCodeRes>,
}

/// 版本组里的单个版本
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct VersionRes {
    pub project_id: i64,
    pub version: i32,
    pub notice: String,
    /// 这个版本升级时采纳的反馈
    pub selected_feedbacks: Vec<SelectedFeedbackRes>,
}

/// 版本采纳的反馈摘要
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SelectedFeedbackRes {
    pub feedback_id: i64,
    pub content: String,
}

/// 项目详情里的反馈条目
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct FeedbackRes {
    pub feedback_id: i64,
    /// 匿名反馈为 None
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub content: String,
    /// 被多少个新版本采纳
    pub selected: i32,
    pub like_cnt: i32,
    /// 当前调用者是否点赞过
    pub liked: bool,
    pub date: DateTime<Utc>,
}

/// 项目详情里关联的代码摘要
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ConnectedCodeRes {
    pub code_id: i64,
    pub version: i32,
    pub title: String,
    pub language: String,
}

/// 写反馈请求
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct FeedbackReq {
    /// 收到反馈的项目版本行ID
    #[validate(range(min = 1))]
    pub project_id: i64,

    #[validate(length(min = 1, max = 500))]
    pub content: String,
}

/// 修改反馈请求
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct FeedbackUpdateReq {
    #[validate(range(min = 1))]
    pub feedback_id: i64,

    #[validate(length(min = 1, max = 500))]
    pub content: String,
}

/// 作者视角的反馈列表条目，按版本组织
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct FeedbackInfoRes {
    pub feedback_id: i64,
    /// 收到这条反馈的版本号
    pub version: i32,
    pub user_name: Option<String>,
    pub content: String,
    pub selected: i32,
    pub like_cnt: i32,
    pub complained: i32,
    pub date: DateTime<Utc>,
}

/// 关联代码请求
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ConnectCodesReq {
    /// 要挂到项目版本下的代码版本行ID列表
    pub code_ids: Vec<i64>,
}

/// URL可达性探测请求
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct UrlCheckReq {
    #[schema(example = "https://hub.example.com")]
    #[validate(length(min = 1, max = 500))]
    pub url: String,
}

/// 标签搜索的查询参数，项目标签和代码标签共用
#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TagSearch {
    /// 标签名关键字，空串返回全部
    pub keyword: Option<String>,
}

/// 标签搜索结果条目
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TagRes {
    pub tag_id: i64,
    pub name: String,
    /// 当前使用该标签的版本数
    pub cnt: i32,
}

impl From<Tag> for TagRes {
    fn from(tag: Tag) -> Self {
        Self {
            tag_id: tag.tag_id,
            name: tag.name,
            cnt: tag.cnt,
        }
    }
}
