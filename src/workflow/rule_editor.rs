//! 抽题规则编辑 - 流程层
//!
//! 持有一个 `RuleSet` 快照，每次修改都用纯函数生成新快照后替换。
//! 任何筛选条件（题库、难度、知识点）变化后都会立即重新查询可用题量，
//! 可用题量不足时自动下调抽题数量并通过返回值告知调用方。

use crate::clients::QuestionCatalog;
use crate::error::{AppResult, ValidationError};
use crate::models::{
    BankId, Difficulty, ExtractionRule, QuestionType, RuleSet, Tag, TagId, TagLevel,
};
use crate::services::{validate_rules, Availability, AvailabilityEstimator, TagResolver};
use std::sync::Arc;
use tracing::{info, warn};

/// 选择知识点后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TagChoice {
    pub availability: Availability,
    /// 所选知识点的下一级节点（三级知识点为空）
    pub children: Vec<Tag>,
}

/// 抽题规则编辑器（每个编辑会话一个）
pub struct RuleEditor<C> {
    rules: RuleSet,
    tags: TagResolver<C>,
    estimator: AvailabilityEstimator<C>,
}

impl<C: QuestionCatalog> RuleEditor<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self::with_rules(catalog, RuleSet::new())
    }

    pub fn with_rules(catalog: Arc<C>, rules: RuleSet) -> Self {
        Self {
            rules,
            tags: TagResolver::new(Arc::clone(&catalog)),
            estimator: AvailabilityEstimator::new(catalog),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn into_rules(self) -> RuleSet {
        self.rules
    }

    /// 一级知识点
    pub async fn first_level_tags(&mut self) -> AppResult<Vec<Tag>> {
        self.tags.list_first_level().await
    }

    /// 展开某个知识点
    pub async fn expand(&mut self, parent_id: TagId) -> AppResult<Vec<Tag>> {
        self.tags.list_children(parent_id).await
    }

    /// 新增一条规则并查询其可用题量
    pub async fn add_rule(&mut self, rule: ExtractionRule) -> AppResult<Availability> {
        self.apply(|rules| rules.with_rule(rule))?;
        let index = self.rules.len() - 1;
        self.refresh(index).await
    }

    pub fn remove_rule(&mut self, question_type: QuestionType) {
        self.rules = self.rules.clone().without_type(question_type);
    }

    /// 修改抽题数量
    ///
    /// # 返回
    /// 数量是否因可用题量不足被下调
    pub fn set_count(&mut self, index: usize, count: u32) -> AppResult<bool> {
        let (rules, adjusted) = self.rules.clone().set_count(index, count)?;
        self.rules = rules;

        if adjusted {
            let rule = &self.rules.rules()[index];
            warn!(
                "⚠️ {} 可用题量 {} 少于要求的 {} 道，已自动调整为 {} 道",
                rule.question_type,
                rule.available.unwrap_or_default(),
                count,
                rule.count
            );
        }
        Ok(adjusted)
    }

    pub fn set_score(&mut self, index: usize, score: f64) -> AppResult<()> {
        self.apply(|rules| rules.set_score(index, score))
    }

    pub async fn set_bank(
        &mut self,
        index: usize,
        bank_id: Option<BankId>,
    ) -> AppResult<Availability> {
        self.apply(|rules| rules.set_bank(index, bank_id))?;
        self.refresh(index).await
    }

    pub async fn set_difficulty(
        &mut self,
        index: usize,
        difficulty: Option<Difficulty>,
    ) -> AppResult<Availability> {
        self.apply(|rules| rules.set_difficulty(index, difficulty))?;
        self.refresh(index).await
    }

    /// 选择某一级知识点
    ///
    /// 更深层级的选择会被清空；随后加载所选知识点的子节点，
    /// 并重新查询该规则的可用题量。
    ///
    /// # 参数
    /// - `index`: 规则序号
    /// - `level`: 知识点层级
    /// - `tag_id`: 所选知识点
    pub async fn select_tag(
        &mut self,
        index: usize,
        level: TagLevel,
        tag_id: TagId,
    ) -> AppResult<TagChoice> {
        self.apply(|rules| rules.select_tag(index, level, tag_id))?;

        let children = match level.child() {
            Some(_) => self.tags.list_children(tag_id).await?,
            None => Vec::new(),
        };
        let availability = self.refresh(index).await?;

        Ok(TagChoice {
            availability,
            children,
        })
    }

    /// 清空某一级及更深层级的知识点选择
    pub async fn clear_tags_from(
        &mut self,
        index: usize,
        level: TagLevel,
    ) -> AppResult<Availability> {
        self.apply(|rules| rules.clear_tags_from(index, level))?;
        self.refresh(index).await
    }

    /// 重新查询所有可用题量未知的规则，返回被自动调整过数量的规则序号
    pub async fn refresh_stale(&mut self) -> AppResult<Vec<usize>> {
        let (rules, adjusted) = self.estimator.refresh_stale(self.rules.clone()).await?;
        self.rules = rules;
        Ok(adjusted)
    }

    /// 提交组卷前的校验
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_rules(&self.rules)
    }

    async fn refresh(&mut self, index: usize) -> AppResult<Availability> {
        let rule = self
            .rules
            .get(index)
            .cloned()
            .ok_or(ValidationError::RuleIndexOutOfRange {
                index,
                len: self.rules.len(),
            })?;

        let availability = self.estimator.refresh(rule).await?;
        let refreshed = availability.rule.clone();
        self.apply(|rules| rules.update(index, |_| Ok(refreshed)))?;

        info!(
            "规则 {} ({}) 可用题量: {}, 抽题数量: {}",
            index + 1,
            availability.rule.question_type,
            availability.available,
            availability.rule.count
        );
        Ok(availability)
    }

    /// 出错时保留原规则集
    fn apply<F>(&mut self, f: F) -> AppResult<()>
    where
        F: FnOnce(RuleSet) -> Result<RuleSet, ValidationError>,
    {
        self.rules = f(self.rules.clone())?;
        Ok(())
    }
}
