//! 组卷参数校验
//!
//! 纯函数：只看传入的快照，不做 I/O，也没有随机性。

use crate::error::ValidationError;
use crate::models::{RatioKind, RatioSpec, RuleSet};
use std::collections::HashSet;

/// 校验抽题规则
///
/// 每条规则的数量和分值都必须为正；
/// 已知可用题量时，数量不得超过可用题量。
pub fn validate_rules(rules: &RuleSet) -> Result<(), ValidationError> {
    if rules.is_empty() {
        return Err(ValidationError::EmptyRuleSet);
    }

    let mut seen = HashSet::new();
    for (rule_index, rule) in rules.rules().iter().enumerate() {
        if !seen.insert(rule.question_type) {
            return Err(ValidationError::DuplicateRuleType {
                question_type: rule.question_type,
            });
        }
        if rule.count == 0 {
            return Err(ValidationError::NonPositiveCount { rule_index });
        }
        if !(rule.score.is_finite() && rule.score > 0.0) {
            return Err(ValidationError::NonPositiveScore { rule_index });
        }
        if let Some(available) = rule.available {
            if rule.count > available {
                return Err(ValidationError::UnsatisfiedQuantity {
                    rule_index,
                    requested: rule.count,
                    available,
                });
            }
        }
    }
    Ok(())
}

/// 校验比例组卷参数
pub fn validate_ratio(spec: &RatioSpec) -> Result<(), ValidationError> {
    for (question_type, percent) in spec.type_ratio.buckets() {
        if percent < 0 {
            return Err(ValidationError::NegativeRatio {
                kind: RatioKind::Type,
                key: question_type.name().to_string(),
                value: percent,
            });
        }
    }
    let type_sum = spec.type_ratio.sum();
    if type_sum != 100 {
        return Err(ValidationError::RatioSumMismatch {
            kind: RatioKind::Type,
            sum: type_sum,
        });
    }

    let mut seen = HashSet::new();
    for share in &spec.knowledge_ratio {
        if share.percent < 0 {
            return Err(ValidationError::NegativeRatio {
                kind: RatioKind::Knowledge,
                key: share.tag_id.to_string(),
                value: share.percent,
            });
        }
        if !seen.insert(share.tag_id) {
            return Err(ValidationError::DuplicateKnowledgeTag {
                tag_id: share.tag_id,
            });
        }
    }
    let knowledge_sum = spec.knowledge_sum();
    if knowledge_sum != 100 {
        return Err(ValidationError::RatioSumMismatch {
            kind: RatioKind::Knowledge,
            sum: knowledge_sum,
        });
    }

    validate_scores(spec.total_score, spec.pass_score)?;
    if spec.duration_minutes == 0 {
        return Err(ValidationError::NonPositive {
            field: "考试时长",
        });
    }
    if spec.total_count == 0 {
        return Err(ValidationError::NonPositive { field: "题目总数" });
    }
    Ok(())
}

/// 总分为正，及格分为正且不超过总分
pub fn validate_scores(total_score: f64, pass_score: f64) -> Result<(), ValidationError> {
    if !(total_score.is_finite() && total_score > 0.0) {
        return Err(ValidationError::NonPositive { field: "总分" });
    }
    if !(pass_score.is_finite() && pass_score > 0.0) {
        return Err(ValidationError::NonPositive { field: "及格分" });
    }
    if pass_score > total_score {
        return Err(ValidationError::PassScoreExceedsTotal {
            pass_score,
            total_score,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractionRule, KnowledgeShare, QuestionType, TypeRatio};

    fn ratio_spec() -> RatioSpec {
        RatioSpec {
            type_ratio: TypeRatio::new(20, 70, 10),
            knowledge_ratio: vec![
                KnowledgeShare {
                    tag_id: 1,
                    percent: 60,
                },
                KnowledgeShare {
                    tag_id: 2,
                    percent: 40,
                },
            ],
            total_count: 100,
            total_score: 100.0,
            pass_score: 60.0,
            duration_minutes: 120,
            bank_id: None,
            difficulty: None,
        }
    }

    #[test]
    fn empty_rule_set_is_rejected() {
        assert_eq!(
            validate_rules(&RuleSet::new()),
            Err(ValidationError::EmptyRuleSet)
        );
    }

    #[test]
    fn rule_count_and_score_must_be_positive() {
        let set = RuleSet::from_rules(vec![
            ExtractionRule::new(QuestionType::Single, 3, 2.0),
            ExtractionRule::new(QuestionType::Judge, 0, 2.0),
        ])
        .unwrap();
        assert_eq!(
            validate_rules(&set),
            Err(ValidationError::NonPositiveCount { rule_index: 1 })
        );

        let set = RuleSet::from_rules(vec![ExtractionRule::new(QuestionType::Single, 3, 0.0)])
            .unwrap();
        assert_eq!(
            validate_rules(&set),
            Err(ValidationError::NonPositiveScore { rule_index: 0 })
        );
    }

    #[test]
    fn count_above_known_availability_is_unsatisfied() {
        let mut rule = ExtractionRule::new(QuestionType::Multiple, 8, 3.0);
        rule.available = Some(5);
        let set = RuleSet::from_rules(vec![rule]).unwrap();
        assert_eq!(
            validate_rules(&set),
            Err(ValidationError::UnsatisfiedQuantity {
                rule_index: 0,
                requested: 8,
                available: 5
            })
        );
    }

    #[test]
    fn unknown_availability_passes() {
        let set = RuleSet::from_rules(vec![ExtractionRule::new(QuestionType::Fill, 8, 3.0)])
            .unwrap();
        assert_eq!(validate_rules(&set), Ok(()));
    }

    #[test]
    fn valid_ratio_passes() {
        assert_eq!(validate_ratio(&ratio_spec()), Ok(()));
    }

    #[test]
    fn ratio_sum_mismatch_reports_actual_sum() {
        let mut spec = ratio_spec();
        spec.type_ratio = TypeRatio::new(20, 70, 20);
        let err = validate_ratio(&spec).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RatioSumMismatch {
                kind: RatioKind::Type,
                sum: 110
            }
        );
        assert!(err.to_string().contains("当前合计: 110%"));

        let mut spec = ratio_spec();
        spec.knowledge_ratio.pop();
        assert_eq!(
            validate_ratio(&spec),
            Err(ValidationError::RatioSumMismatch {
                kind: RatioKind::Knowledge,
                sum: 60
            })
        );
    }

    #[test]
    fn negative_percentages_are_rejected() {
        let mut spec = ratio_spec();
        spec.type_ratio = TypeRatio::new(-10, 100, 10);
        assert!(matches!(
            validate_ratio(&spec),
            Err(ValidationError::NegativeRatio {
                kind: RatioKind::Type,
                value: -10,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_knowledge_tag_is_rejected() {
        let mut spec = ratio_spec();
        spec.knowledge_ratio[1].tag_id = 1;
        assert_eq!(
            validate_ratio(&spec),
            Err(ValidationError::DuplicateKnowledgeTag { tag_id: 1 })
        );
    }

    #[test]
    fn pass_score_bounds() {
        let mut spec = ratio_spec();
        spec.pass_score = 120.0;
        assert_eq!(
            validate_ratio(&spec),
            Err(ValidationError::PassScoreExceedsTotal {
                pass_score: 120.0,
                total_score: 100.0
            })
        );

        spec.pass_score = 0.0;
        assert_eq!(
            validate_ratio(&spec),
            Err(ValidationError::NonPositive { field: "及格分" })
        );
    }

    #[test]
    fn duration_and_count_must_be_positive() {
        let mut spec = ratio_spec();
        spec.duration_minutes = 0;
        assert_eq!(
            validate_ratio(&spec),
            Err(ValidationError::NonPositive { field: "考试时长" })
        );

        let mut spec = ratio_spec();
        spec.total_count = 0;
        assert_eq!(
            validate_ratio(&spec),
            Err(ValidationError::NonPositive { field: "题目总数" })
        );
    }
}
