//! 抽题规则
//!
//! 规则集合是不可变值：每个修改操作都消费旧值并返回新值，
//! 任何筛选条件的变化都会使该规则缓存的可用题量失效。

use crate::error::ValidationError;
use crate::models::question::{BankId, Difficulty, QuestionFilter, QuestionType};
use crate::models::tag::{TagId, TagLevel, TagSelection};
use serde::{Deserialize, Serialize};

/// 单个题型的抽题规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRule {
    pub question_type: QuestionType,
    /// 要求抽取的数量
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<BankId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub tags: TagSelection,
    /// 每题分值
    pub score: f64,
    /// 最近一次查询到的可用题量，`None` 表示尚未查询或已失效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<u32>,
}

impl ExtractionRule {
    pub fn new(question_type: QuestionType, count: u32, score: f64) -> Self {
        Self {
            question_type,
            count,
            bank_id: None,
            difficulty: None,
            tags: TagSelection::None,
            score,
            available: None,
        }
    }

    /// 规则对应的题目筛选条件
    pub fn filter(&self) -> QuestionFilter {
        QuestionFilter {
            question_type: self.question_type,
            difficulty: self.difficulty,
            bank_id: self.bank_id,
            tags: self.tags,
        }
    }

    /// 本规则贡献的总分
    pub fn total_score(&self) -> f64 {
        f64::from(self.count) * self.score
    }

    /// 可用题量已知且为 0，在筛选条件变化前无法满足
    pub fn is_unsatisfiable(&self) -> bool {
        self.available == Some(0)
    }

    pub fn with_bank(self, bank_id: Option<BankId>) -> Self {
        Self {
            bank_id,
            available: None,
            ..self
        }
    }

    pub fn with_difficulty(self, difficulty: Option<Difficulty>) -> Self {
        Self {
            difficulty,
            available: None,
            ..self
        }
    }

    /// 选择第 `level` 级知识点，清空更深层级并使可用题量失效
    pub fn with_tag(self, level: TagLevel, tag_id: TagId) -> Result<Self, ValidationError> {
        let tags = self.tags.select(level, tag_id)?;
        Ok(Self {
            tags,
            available: None,
            ..self
        })
    }

    /// 清空 `level` 及以下的知识点选择
    pub fn without_tags_from(self, level: TagLevel) -> Self {
        Self {
            tags: self.tags.clear_from(level),
            available: None,
            ..self
        }
    }
}

/// 按可用题量修正抽题数量
///
/// 返回修正后的规则以及是否发生了自动调整。
/// 可用题量为 0 时数量归零；超过可用题量时下调到可用题量。
pub fn clamp(rule: ExtractionRule, available: u32) -> (ExtractionRule, bool) {
    let count = rule.count.min(available);
    let adjusted = count != rule.count;
    (
        ExtractionRule {
            count,
            available: Some(available),
            ..rule
        },
        adjusted,
    )
}

/// 抽题规则集合（每个题型至多一条）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<ExtractionRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由现成规则构建，题型重复时报错
    pub fn from_rules(rules: Vec<ExtractionRule>) -> Result<Self, ValidationError> {
        rules
            .into_iter()
            .try_fold(RuleSet::new(), |set, rule| set.with_rule(rule))
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ExtractionRule> {
        self.rules.get(index)
    }

    pub fn position(&self, question_type: QuestionType) -> Option<usize> {
        self.rules
            .iter()
            .position(|r| r.question_type == question_type)
    }

    /// 规则模式下的声明总分
    pub fn total_score(&self) -> f64 {
        self.rules.iter().map(ExtractionRule::total_score).sum()
    }

    pub fn total_count(&self) -> u32 {
        self.rules.iter().map(|r| r.count).sum()
    }

    /// 追加一条规则
    pub fn with_rule(mut self, rule: ExtractionRule) -> Result<Self, ValidationError> {
        if self.position(rule.question_type).is_some() {
            return Err(ValidationError::DuplicateRuleType {
                question_type: rule.question_type,
            });
        }
        self.rules.push(rule);
        Ok(self)
    }

    /// 移除某个题型的规则（不存在时原样返回）
    pub fn without_type(mut self, question_type: QuestionType) -> Self {
        self.rules.retain(|r| r.question_type != question_type);
        self
    }

    /// 对指定规则做一次变换
    pub fn update<F>(mut self, index: usize, f: F) -> Result<Self, ValidationError>
    where
        F: FnOnce(ExtractionRule) -> Result<ExtractionRule, ValidationError>,
    {
        let len = self.rules.len();
        if index >= len {
            return Err(ValidationError::RuleIndexOutOfRange { index, len });
        }
        let rule = self.rules.remove(index);
        self.rules.insert(index, f(rule)?);
        Ok(self)
    }

    /// 修改抽题数量，已知可用题量时不超过可用题量
    ///
    /// # 返回
    /// 新集合以及数量是否被下调
    pub fn set_count(self, index: usize, count: u32) -> Result<(Self, bool), ValidationError> {
        let mut adjusted = false;
        let set = self.update(index, |r| {
            let rule = ExtractionRule { count, ..r };
            Ok(match rule.available {
                Some(available) => {
                    let (rule, changed) = clamp(rule, available);
                    adjusted = changed;
                    rule
                }
                None => rule,
            })
        })?;
        Ok((set, adjusted))
    }

    pub fn set_score(self, index: usize, score: f64) -> Result<Self, ValidationError> {
        self.update(index, |r| Ok(ExtractionRule { score, ..r }))
    }

    pub fn set_bank(self, index: usize, bank_id: Option<BankId>) -> Result<Self, ValidationError> {
        self.update(index, |r| Ok(r.with_bank(bank_id)))
    }

    pub fn set_difficulty(
        self,
        index: usize,
        difficulty: Option<Difficulty>,
    ) -> Result<Self, ValidationError> {
        self.update(index, |r| Ok(r.with_difficulty(difficulty)))
    }

    pub fn select_tag(
        self,
        index: usize,
        level: TagLevel,
        tag_id: TagId,
    ) -> Result<Self, ValidationError> {
        self.update(index, |r| r.with_tag(level, tag_id))
    }

    pub fn clear_tags_from(self, index: usize, level: TagLevel) -> Result<Self, ValidationError> {
        self.update(index, |r| Ok(r.without_tags_from(level)))
    }

    /// 写入可用题量并按需下调数量，返回新集合及是否发生调整
    pub fn apply_availability(
        self,
        index: usize,
        available: u32,
    ) -> Result<(Self, bool), ValidationError> {
        let mut adjusted = false;
        let set = self.update(index, |r| {
            let (rule, changed) = clamp(r, available);
            adjusted = changed;
            Ok(rule)
        })?;
        Ok((set, adjusted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_lowers_count_and_flags() {
        let rule = ExtractionRule::new(QuestionType::Single, 10, 2.0);
        let (rule, adjusted) = clamp(rule, 6);
        assert!(adjusted);
        assert_eq!(rule.count, 6);
        assert_eq!(rule.available, Some(6));

        let (rule, adjusted) = clamp(rule, 20);
        assert!(!adjusted);
        assert_eq!(rule.count, 6);
    }

    #[test]
    fn clamp_to_zero_marks_unsatisfiable() {
        let (rule, adjusted) = clamp(ExtractionRule::new(QuestionType::Judge, 3, 1.0), 0);
        assert!(adjusted);
        assert_eq!(rule.count, 0);
        assert!(rule.is_unsatisfiable());
    }

    #[test]
    fn filter_changes_invalidate_availability() {
        let (rule, _) = clamp(ExtractionRule::new(QuestionType::Single, 1, 1.0), 5);
        assert!(rule.clone().with_bank(Some(2)).available.is_none());
        assert!(rule
            .clone()
            .with_difficulty(Some(Difficulty::Hard))
            .available
            .is_none());
        let tagged = rule.with_tag(TagLevel::First, 1).unwrap();
        assert!(tagged.available.is_none());
    }

    #[test]
    fn one_rule_per_type() {
        let set = RuleSet::new()
            .with_rule(ExtractionRule::new(QuestionType::Single, 1, 1.0))
            .unwrap();
        assert_eq!(
            set.clone()
                .with_rule(ExtractionRule::new(QuestionType::Single, 2, 1.0)),
            Err(ValidationError::DuplicateRuleType {
                question_type: QuestionType::Single
            })
        );
        assert!(set.without_type(QuestionType::Single).is_empty());
    }

    #[test]
    fn set_count_respects_known_availability() {
        let set = RuleSet::from_rules(vec![ExtractionRule::new(QuestionType::Judge, 5, 2.0)])
            .unwrap()
            .apply_availability(0, 8)
            .unwrap()
            .0;

        let (set, adjusted) = set.set_count(0, 12).unwrap();
        assert!(adjusted);
        assert_eq!(set.rules()[0].count, 8);

        let (set, adjusted) = set.set_count(0, 3).unwrap();
        assert!(!adjusted);
        assert_eq!(set.rules()[0].count, 3);
    }

    #[test]
    fn set_count_without_availability_is_kept() {
        let set = RuleSet::from_rules(vec![ExtractionRule::new(QuestionType::Judge, 5, 2.0)])
            .unwrap();
        let (set, adjusted) = set.set_count(0, 500).unwrap();
        assert!(!adjusted);
        assert_eq!(set.rules()[0].count, 500);
    }

    #[test]
    fn update_out_of_range() {
        assert_eq!(
            RuleSet::new().set_count(0, 1).map(|(set, _)| set),
            Err(ValidationError::RuleIndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn declared_total_score() {
        let set = RuleSet::from_rules(vec![
            ExtractionRule::new(QuestionType::Single, 10, 10.0),
            ExtractionRule::new(QuestionType::Judge, 5, 4.0),
        ])
        .unwrap();
        assert_eq!(set.total_score(), 120.0);
        assert_eq!(set.total_count(), 15);
    }
}
