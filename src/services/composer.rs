//! 组卷引擎 - 业务能力层
//!
//! 两种选题方式共用同一种输出（`DraftPaper`）：
//!
//! - 规则模式：逐条规则抽题，题量不足直接失败
//! - 比例模式：按 (题型, 知识点) 单元抽题，题量不足时尽量填充并记录缺口
//!
//! 规则/单元严格按声明顺序处理，顺序会体现在题目列表和余数分配上。

use crate::clients::QuestionCatalog;
use crate::error::{AppResult, CompositionError, Shortfall};
use crate::models::{
    DraftPaper, QuestionFilter, QuestionId, QuestionType, RatioSpec, RuleSet,
};
use crate::services::availability::ratio_cells;
use crate::services::rule_validator::{validate_ratio, validate_rules};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 组卷引擎
pub struct Composer<C> {
    catalog: Arc<C>,
    /// 手动加题时题型没有声明分值所用的分值
    fallback_score: f64,
}

impl<C: QuestionCatalog> Composer<C> {
    pub fn new(catalog: Arc<C>, fallback_score: f64) -> Self {
        Self {
            catalog,
            fallback_score,
        }
    }

    /// 规则模式组卷
    ///
    /// 每条规则发起一次抽样，排除此前规则已选中的题目；
    /// 任何一条规则抽不满即返回 `InsufficientSupply`，不返回残缺的试卷。
    pub async fn compose_rules(&self, rules: &RuleSet) -> AppResult<DraftPaper> {
        validate_rules(rules)?;

        let mut selected: Vec<QuestionId> = Vec::new();
        for (rule_index, rule) in rules.rules().iter().enumerate() {
            let ids = match self
                .catalog
                .sample_questions(&rule.filter(), rule.count, &selected)
                .await
            {
                Ok(ids) => ids,
                Err(e) => {
                    return Err(match e.insufficient_questions() {
                        Some((requested, available)) => CompositionError::InsufficientSupply {
                            rule_index,
                            question_type: rule.question_type,
                            requested,
                            available,
                        }
                        .into(),
                        None => e,
                    })
                }
            };

            info!(
                "[组卷] ✓ 规则 {}: {} 抽取 {} 道, 每题 {} 分",
                rule_index + 1,
                rule.question_type,
                ids.len(),
                rule.score
            );
            selected.extend(ids);
        }

        let type_scores: BTreeMap<QuestionType, f64> = rules
            .rules()
            .iter()
            .map(|r| (r.question_type, r.score))
            .collect();

        let questions = self.catalog.get_questions(&selected).await?;
        let (draft, _) = DraftPaper::new(type_scores, self.fallback_score).with_added(&questions);

        info!(
            "[组卷] 规则模式完成: {} 道题, 总分 {}",
            draft.len(),
            draft.total_score()
        );
        Ok(draft)
    }

    /// 比例模式组卷
    ///
    /// 单元题量不足时按实际题量填充，缺口记录在草稿中；
    /// 每题分值 = 总分 / 目标题量，草稿总分按实际题量计算。
    pub async fn compose_ratio(&self, spec: &RatioSpec) -> AppResult<DraftPaper> {
        validate_ratio(spec)?;

        let score = spec.score_per_question();
        let mut selected: Vec<QuestionId> = Vec::new();
        let mut shortfalls = Vec::new();

        for (filter, target) in ratio_cells(spec) {
            if target == 0 {
                continue;
            }
            let ids = self.sample_up_to(&filter, target, &selected).await?;
            let filled = ids.len() as u32;
            let tag_id = filter.tags.first().unwrap_or_default();

            if filled < target {
                warn!(
                    "[组卷] ⚠️ {} / 知识点 {} 需要 {} 道, 题库仅有 {} 道",
                    filter.question_type, tag_id, target, filled
                );
                shortfalls.push(Shortfall {
                    question_type: filter.question_type,
                    tag_id,
                    requested: target,
                    filled,
                });
            } else {
                debug!(
                    "[组卷] {} / 知识点 {} 抽取 {} 道",
                    filter.question_type, tag_id, filled
                );
            }
            selected.extend(ids);
        }

        let type_scores: BTreeMap<QuestionType, f64> = spec
            .type_ratio
            .buckets()
            .iter()
            .map(|(t, _)| (*t, score))
            .collect();

        let questions = self.catalog.get_questions(&selected).await?;
        let (draft, _) = DraftPaper::new(type_scores, score).with_added(&questions);
        let draft = draft.with_shortfalls(shortfalls);

        info!(
            "[组卷] 比例模式完成: {}/{} 道题, 总分 {}",
            draft.len(),
            spec.total_count,
            draft.total_score()
        );
        Ok(draft)
    }

    /// 抽取至多 `target` 道题；题库不足时改为抽取全部可用的题
    async fn sample_up_to(
        &self,
        filter: &QuestionFilter,
        target: u32,
        exclude: &[QuestionId],
    ) -> AppResult<Vec<QuestionId>> {
        match self.catalog.sample_questions(filter, target, exclude).await {
            Ok(ids) => Ok(ids),
            Err(e) => match e.insufficient_questions() {
                Some((_, 0)) => Ok(Vec::new()),
                Some((_, available)) => {
                    self.catalog
                        .sample_questions(filter, available, exclude)
                        .await
                }
                None => Err(e),
            },
        }
    }
}
