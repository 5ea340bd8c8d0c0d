//! 内存题库
//!
//! 用离线题库文件或测试数据构建，行为与远程题库服务保持一致：
//! 停用的题目对统计/抽样/搜索不可见，抽样为无放回均匀随机。

use crate::clients::QuestionCatalog;
use crate::error::{AppResult, CatalogError};
use crate::models::{
    NewPaper, PaperId, Question, QuestionBank, QuestionFilter, QuestionId, SearchQuery, Tag,
    TagId, TagLevel,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracing::debug;

/// 内存题库
pub struct MemoryCatalog {
    questions: Vec<Question>,
    tags: Vec<Tag>,
    papers: Mutex<Vec<(PaperId, NewPaper)>>,
    rng: Mutex<StdRng>,
}

impl MemoryCatalog {
    /// 使用随机种子创建
    pub fn new(bank: QuestionBank) -> Self {
        Self::with_rng(bank, StdRng::from_entropy())
    }

    /// 使用固定种子创建，抽样结果可复现
    pub fn with_seed(bank: QuestionBank, seed: u64) -> Self {
        Self::with_rng(bank, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bank: QuestionBank, rng: StdRng) -> Self {
        Self {
            questions: bank.questions,
            tags: bank.tags,
            papers: Mutex::new(Vec::new()),
            rng: Mutex::new(rng),
        }
    }

    /// 已写入的试卷
    pub fn papers(&self) -> Vec<(PaperId, NewPaper)> {
        lock(&self.papers).clone()
    }

    fn enabled(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.enabled)
    }

    fn matching(&self, filter: &QuestionFilter) -> impl Iterator<Item = &Question> {
        let filter = filter.clone();
        self.enabled().filter(move |q| filter.matches(q))
    }
}

impl QuestionCatalog for MemoryCatalog {
    async fn count_questions(&self, filter: &QuestionFilter) -> AppResult<u32> {
        Ok(self.matching(filter).count() as u32)
    }

    async fn sample_questions(
        &self,
        filter: &QuestionFilter,
        n: u32,
        exclude: &[QuestionId],
    ) -> AppResult<Vec<QuestionId>> {
        let excluded: HashSet<QuestionId> = exclude.iter().copied().collect();
        let pool: Vec<QuestionId> = self
            .matching(filter)
            .map(|q| q.id)
            .filter(|id| !excluded.contains(id))
            .collect();

        if (pool.len() as u32) < n {
            return Err(CatalogError::InsufficientQuestions {
                requested: n,
                available: pool.len() as u32,
            }
            .into());
        }

        let mut rng = lock(&self.rng);
        let picked: Vec<QuestionId> = pool
            .choose_multiple(&mut *rng, n as usize)
            .copied()
            .collect();

        debug!("内存题库抽样: 池 {} 道, 抽取 {} 道", pool.len(), picked.len());
        Ok(picked)
    }

    async fn search_questions(&self, query: &SearchQuery) -> AppResult<Vec<Question>> {
        let keyword = query.keyword.as_deref().map(str::to_lowercase);
        Ok(self
            .enabled()
            .filter(|q| query.question_type.map_or(true, |t| q.question_type == t))
            .filter(|q| {
                keyword
                    .as_deref()
                    .map_or(true, |k| plain_text(&q.stem).to_lowercase().contains(k))
            })
            .cloned()
            .collect())
    }

    async fn get_question(&self, id: QuestionId) -> AppResult<Question> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::QuestionNotFound { id }.into())
    }

    async fn list_first_level_tags(&self) -> AppResult<Vec<Tag>> {
        Ok(self
            .tags
            .iter()
            .filter(|t| t.level == TagLevel::First)
            .cloned()
            .collect())
    }

    async fn list_child_tags(&self, parent_id: TagId) -> AppResult<Vec<Tag>> {
        Ok(self
            .tags
            .iter()
            .filter(|t| t.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn create_paper(&self, paper: &NewPaper) -> AppResult<PaperId> {
        let mut papers = lock(&self.papers);
        let id = papers.len() as PaperId + 1;
        papers.push((id, paper.clone()));
        Ok(id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 去掉题干中的 HTML 标签
fn plain_text(html: &str) -> String {
    static TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();
    match TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").ok()) {
        Some(re) => re.replace_all(html, "").into_owned(),
        None => html.to_string(),
    }
}
