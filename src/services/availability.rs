//! 可用题量估算 - 业务能力层
//!
//! 只负责"查询某个筛选条件下有多少题"，并把结果写回规则。

use crate::clients::QuestionCatalog;
use crate::error::AppResult;
use crate::models::{
    apportion_grid, ExtractionRule, QuestionFilter, QuestionType, RatioSpec, RuleSet, TagId,
    TagSelection,
};
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// 一次可用题量刷新的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub rule: ExtractionRule,
    pub available: u32,
    /// 抽题数量是否被自动下调
    pub adjusted: bool,
}

/// 比例组卷中一个 (题型, 一级知识点) 单元的供需情况
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSupply {
    pub question_type: QuestionType,
    pub tag_id: TagId,
    /// 按比例推算出的目标题量
    pub target: u32,
    /// 题库中可用的题量
    pub available: u32,
}

impl CellSupply {
    pub fn shortfall(&self) -> u32 {
        self.target.saturating_sub(self.available)
    }
}

/// 可用题量估算器
pub struct AvailabilityEstimator<C> {
    catalog: Arc<C>,
}

impl<C> Clone for AvailabilityEstimator<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<C: QuestionCatalog> AvailabilityEstimator<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    /// 统计筛选条件下的题量
    pub async fn count(&self, filter: &QuestionFilter) -> AppResult<u32> {
        let available = self.catalog.count_questions(filter).await?;
        debug!(
            "可用题量: {} (题型 {}, 知识点 {:?})",
            available,
            filter.question_type,
            filter.tags.ids()
        );
        Ok(available)
    }

    /// 查询规则的可用题量，并按需下调抽题数量
    pub async fn refresh(&self, rule: ExtractionRule) -> AppResult<Availability> {
        let available = self.count(&rule.filter()).await?;
        let requested = rule.count;
        let (rule, adjusted) = crate::models::clamp(rule, available);

        if adjusted {
            warn!(
                "⚠️ {} 可用题量 {} 少于要求的 {} 道，已自动调整为 {} 道",
                rule.question_type, available, requested, rule.count
            );
        }

        Ok(Availability {
            rule,
            available,
            adjusted,
        })
    }

    /// 刷新规则集中所有可用题量未知的规则
    ///
    /// 返回新的规则集以及被自动调整过数量的规则序号
    pub async fn refresh_stale(&self, rules: RuleSet) -> AppResult<(RuleSet, Vec<usize>)> {
        let stale: Vec<(usize, ExtractionRule)> = rules
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.available.is_none())
            .map(|(i, r)| (i, r.clone()))
            .collect();

        let filters: Vec<QuestionFilter> = stale.iter().map(|(_, r)| r.filter()).collect();
        let counts = try_join_all(filters.iter().map(|f| self.catalog.count_questions(f))).await?;

        let mut rules = rules;
        let mut adjusted = Vec::new();
        for ((index, _), available) in stale.into_iter().zip(counts) {
            let (next, changed) = rules.apply_availability(index, available)?;
            rules = next;
            if changed {
                adjusted.push(index);
            }
        }
        Ok((rules, adjusted))
    }

    /// 比例组卷的供需表
    ///
    /// 按声明顺序（题型 → 知识点）列出每个单元的目标题量与可用题量
    pub async fn ratio_supply(&self, spec: &RatioSpec) -> AppResult<Vec<CellSupply>> {
        let cells = ratio_cells(spec);
        let counts = try_join_all(
            cells
                .iter()
                .map(|(filter, _)| self.catalog.count_questions(filter)),
        )
        .await?;

        Ok(cells
            .into_iter()
            .zip(counts)
            .map(|((filter, target), available)| CellSupply {
                question_type: filter.question_type,
                tag_id: filter.tags.first().unwrap_or_default(),
                target,
                available,
            })
            .collect())
    }
}

/// 按比例推算出的所有单元：(筛选条件, 目标题量)
///
/// 题型合计 = round(总数 × 题型比例)，余数归入最后一个题型；
/// 知识点合计 = round(总数 × 知识点比例)，余数归入最后一个知识点。
/// 两组合计都在总数上直接分配，单元题量由 `apportion_grid` 同时满足两者。
pub fn ratio_cells(spec: &RatioSpec) -> Vec<(QuestionFilter, u32)> {
    let buckets = spec.type_ratio.buckets();
    let type_weights: Vec<u32> = buckets.iter().map(|(_, p)| (*p).max(0) as u32).collect();
    let tag_weights: Vec<u32> = spec
        .knowledge_ratio
        .iter()
        .map(|s| s.percent.max(0) as u32)
        .collect();

    let grid = apportion_grid(spec.total_count, &type_weights, &tag_weights);
    let mut cells = Vec::new();
    for ((question_type, _), row) in buckets.iter().zip(grid) {
        for (share, target) in spec.knowledge_ratio.iter().zip(row) {
            let filter = QuestionFilter {
                question_type: *question_type,
                difficulty: spec.difficulty,
                bank_id: spec.bank_id,
                tags: TagSelection::First(share.tag_id),
            };
            cells.push((filter, target));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{apportion, KnowledgeShare, TypeRatio};

    fn spec(total_count: u32, type_ratio: TypeRatio, shares: &[(TagId, i32)]) -> RatioSpec {
        RatioSpec {
            type_ratio,
            knowledge_ratio: shares
                .iter()
                .map(|(tag_id, percent)| KnowledgeShare {
                    tag_id: *tag_id,
                    percent: *percent,
                })
                .collect(),
            total_count,
            total_score: 100.0,
            pass_score: 60.0,
            duration_minutes: 90,
            bank_id: None,
            difficulty: None,
        }
    }

    #[test]
    fn cells_follow_declaration_order() {
        let cells = ratio_cells(&spec(10, TypeRatio::new(30, 30, 40), &[(7, 50), (3, 50)]));
        let order: Vec<(QuestionType, Option<TagId>, u32)> = cells
            .iter()
            .map(|(f, n)| (f.question_type, f.tags.first(), *n))
            .collect();
        assert_eq!(
            order,
            vec![
                (QuestionType::Judge, Some(7), 2),
                (QuestionType::Judge, Some(3), 1),
                (QuestionType::Single, Some(7), 1),
                (QuestionType::Single, Some(3), 2),
                (QuestionType::Multiple, Some(7), 2),
                (QuestionType::Multiple, Some(3), 2),
            ]
        );
    }

    #[test]
    fn cell_targets_sum_to_total() {
        for total in 1..=40 {
            let cells = ratio_cells(&spec(
                total,
                TypeRatio::new(15, 45, 40),
                &[(1, 33), (2, 33), (3, 34)],
            ));
            assert_eq!(cells.iter().map(|(_, n)| n).sum::<u32>(), total);
        }
    }

    #[test]
    fn tag_totals_follow_knowledge_ratio() {
        let cases: [(TypeRatio, &[(TagId, i32)]); 3] = [
            (TypeRatio::new(34, 33, 33), &[(1, 50), (2, 50)]),
            (TypeRatio::new(30, 30, 40), &[(1, 50), (2, 50)]),
            (TypeRatio::new(15, 45, 40), &[(1, 70), (2, 20), (3, 10)]),
        ];
        for total in 1..=40 {
            for (type_ratio, shares) in cases {
                let cells = ratio_cells(&spec(total, type_ratio, shares));
                let per_tag: Vec<u32> = shares
                    .iter()
                    .map(|(tag_id, _)| {
                        cells
                            .iter()
                            .filter(|(f, _)| f.tags.first() == Some(*tag_id))
                            .map(|(_, n)| n)
                            .sum()
                    })
                    .collect();
                let weights: Vec<u32> = shares.iter().map(|(_, p)| *p as u32).collect();
                assert_eq!(per_tag, apportion(total, &weights), "{total} {shares:?}");
            }
        }
    }

    #[test]
    fn small_total_keeps_both_tags() {
        let cells = ratio_cells(&spec(3, TypeRatio::new(34, 33, 33), &[(1, 50), (2, 50)]));
        let tag2: u32 = cells
            .iter()
            .filter(|(f, _)| f.tags.first() == Some(2))
            .map(|(_, n)| n)
            .sum();
        assert_eq!(tag2, 1);
    }
}
