//! 题库服务客户端
//!
//! `QuestionCatalog` 是组卷核心唯一依赖的外部协作者：
//! 统计、抽样、搜索、取题、知识点查询以及写入试卷。

pub mod memory_catalog;
pub mod tiku_client;

pub use memory_catalog::MemoryCatalog;
pub use tiku_client::TikuClient;

use crate::error::AppResult;
use crate::models::{
    NewPaper, PaperId, Question, QuestionFilter, QuestionId, SearchQuery, Tag, TagId,
};
use futures::future::try_join_all;

/// 题库服务
///
/// 组卷核心只读取题目；唯一的写操作是 `create_paper`。
#[allow(async_fn_in_trait)]
pub trait QuestionCatalog {
    /// 统计满足条件的启用题目数量
    async fn count_questions(&self, filter: &QuestionFilter) -> AppResult<u32>;

    /// 随机抽取 `n` 道满足条件、且不在 `exclude` 中的题目
    ///
    /// 满足条件的题目少于 `n` 道时返回 `CatalogError::InsufficientQuestions`
    async fn sample_questions(
        &self,
        filter: &QuestionFilter,
        n: u32,
        exclude: &[QuestionId],
    ) -> AppResult<Vec<QuestionId>>;

    /// 按关键字/题型搜索题目（手动加题）
    async fn search_questions(&self, query: &SearchQuery) -> AppResult<Vec<Question>>;

    /// 获取单道题目
    async fn get_question(&self, id: QuestionId) -> AppResult<Question>;

    /// 批量获取题目，结果顺序与 `ids` 一致
    async fn get_questions(&self, ids: &[QuestionId]) -> AppResult<Vec<Question>> {
        try_join_all(ids.iter().map(|id| self.get_question(*id))).await
    }

    /// 一级知识点列表
    async fn list_first_level_tags(&self) -> AppResult<Vec<Tag>>;

    /// 某个知识点的子节点
    async fn list_child_tags(&self, parent_id: TagId) -> AppResult<Vec<Tag>>;

    /// 一次性写入试卷，返回新试卷ID
    async fn create_paper(&self, paper: &NewPaper) -> AppResult<PaperId>;
}
