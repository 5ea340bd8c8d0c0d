//! 预览/编辑会话 - 流程层
//!
//! 组卷结果进入会话后可以分页查看、删除题目、搜索并手动加题。
//! 会话只在内存中修改草稿，提交之前随时可以放弃，不会产生任何写操作。

use crate::clients::QuestionCatalog;
use crate::error::{AppResult, ValidationError};
use crate::models::{
    DraftEntry, DraftPaper, DraftStats, Question, QuestionId, QuestionType, SearchQuery,
};
use crate::utils::truncate_text;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 预览会话
pub struct PreviewSession<C> {
    catalog: Arc<C>,
    draft: DraftPaper,
    page_size: usize,
    /// 当前页（从 0 开始）
    current_page: usize,
}

impl<C: QuestionCatalog> PreviewSession<C> {
    pub fn new(catalog: Arc<C>, draft: DraftPaper, page_size: usize) -> Self {
        Self {
            catalog,
            draft,
            page_size: page_size.max(1),
            current_page: 0,
        }
    }

    pub fn draft(&self) -> &DraftPaper {
        &self.draft
    }

    pub fn into_draft(self) -> DraftPaper {
        self.draft
    }

    pub fn stats(&self) -> DraftStats {
        self.draft.stats()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 总页数（空草稿为 0）
    pub fn page_count(&self) -> usize {
        (self.draft.len() + self.page_size - 1) / self.page_size
    }

    /// 当前页的题目
    pub fn page_items(&self) -> &[DraftEntry] {
        let entries = self.draft.entries();
        let start = (self.current_page * self.page_size).min(entries.len());
        let end = (start + self.page_size).min(entries.len());
        &entries[start..end]
    }

    /// 当前页第一道题在草稿中的序号
    pub fn page_offset(&self) -> usize {
        self.current_page * self.page_size
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<(), ValidationError> {
        let len = self.page_count();
        if page >= len.max(1) {
            return Err(ValidationError::IndexOutOfRange { index: page, len });
        }
        self.current_page = page;
        Ok(())
    }

    /// 删除草稿中第 `index` 道题
    ///
    /// 删除后当前页为空时，回到前一个非空页
    pub fn remove(&mut self, index: usize) -> Result<DraftEntry, ValidationError> {
        let (draft, removed) = self.draft.clone().without(index)?;
        self.draft = draft;

        let last_page = self.page_count().saturating_sub(1);
        if self.current_page > last_page {
            self.current_page = last_page;
        }

        debug!(
            "[预览] 删除题目 {} ({}), 剩余 {} 道",
            removed.id,
            removed.question_type,
            self.draft.len()
        );
        Ok(removed)
    }

    /// 搜索可加入的题目（已在草稿中的题目不会出现在结果里）
    pub async fn search(
        &self,
        keyword: Option<&str>,
        question_type: Option<QuestionType>,
    ) -> AppResult<Vec<Question>> {
        let query = SearchQuery::new(keyword, question_type);
        let present = self.draft.id_set();
        let candidates: Vec<Question> = self
            .catalog
            .search_questions(&query)
            .await?
            .into_iter()
            .filter(|q| !present.contains(&q.id))
            .collect();

        debug!("[预览] 搜索到 {} 道候选题目", candidates.len());
        Ok(candidates)
    }

    /// 手动加题（集合语义：已存在或重复的ID被忽略，已停用的题目不会加入）
    ///
    /// # 返回
    /// 实际加入的题目数量
    pub async fn add(&mut self, ids: &[QuestionId]) -> AppResult<usize> {
        let mut seen = HashSet::new();
        let missing: Vec<QuestionId> = ids
            .iter()
            .copied()
            .filter(|id| !self.draft.contains(*id) && seen.insert(*id))
            .collect();

        if missing.is_empty() {
            return Ok(0);
        }

        let (questions, disabled): (Vec<Question>, Vec<Question>) = self
            .catalog
            .get_questions(&missing)
            .await?
            .into_iter()
            .partition(|q| q.enabled);
        if !disabled.is_empty() {
            warn!(
                "[预览] ⚠️ 跳过 {} 道已停用的题目: {:?}",
                disabled.len(),
                disabled.iter().map(|q| q.id).collect::<Vec<_>>()
            );
        }

        for question in &questions {
            debug!(
                "[预览] + {} {}",
                question.id,
                truncate_text(&question.stem, 30)
            );
        }
        let (draft, added) = self.draft.clone().with_added(&questions);
        self.draft = draft;

        info!(
            "[预览] ✓ 加入 {} 道题, 当前共 {} 道, 总分 {}",
            added,
            self.draft.len(),
            self.draft.total_score()
        );
        Ok(added)
    }
}
