//! 试卷草稿与持久化试卷
//!
//! `DraftPaper` 只存在于预览/编辑阶段，所有修改都返回新值；
//! 提交时转换为 `NewPaper` 一次性写入。

use crate::error::{CompositionError, Shortfall, ValidationError};
use crate::models::question::{Question, QuestionId, QuestionType};
use crate::models::ratio::apportion;
use crate::models::tag::TagId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// 试卷ID
pub type PaperId = i64;

/// 草稿中的一道题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEntry {
    pub id: QuestionId,
    pub question_type: QuestionType,
    /// 一级知识点，用于知识点分布统计
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_tag: Option<TagId>,
    pub score: f64,
}

impl DraftEntry {
    pub fn from_question(question: &Question, score: f64) -> Self {
        Self {
            id: question.id,
            question_type: question.question_type,
            first_tag: question.tag_level1,
            score,
        }
    }
}

/// 单个题型的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub count: u32,
    pub score: f64,
}

/// 草稿汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStats {
    pub question_count: u32,
    pub total_score: f64,
    pub by_type: BTreeMap<QuestionType, TypeBreakdown>,
    pub by_tag: BTreeMap<TagId, u32>,
    /// 没有一级知识点的题目数量
    pub untagged: u32,
}

/// 试卷草稿
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPaper {
    entries: Vec<DraftEntry>,
    /// 各题型的每题分值
    type_scores: BTreeMap<QuestionType, f64>,
    /// 题型未声明分值时，手动加入的题目使用此分值
    fallback_score: f64,
    shortfalls: Vec<Shortfall>,
}

impl DraftPaper {
    pub fn new(type_scores: BTreeMap<QuestionType, f64>, fallback_score: f64) -> Self {
        Self {
            entries: Vec::new(),
            type_scores,
            fallback_score,
            shortfalls: Vec::new(),
        }
    }

    /// 记录比例组卷中的缺口
    pub fn with_shortfalls(self, shortfalls: Vec<Shortfall>) -> Self {
        Self { shortfalls, ..self }
    }

    pub fn entries(&self) -> &[DraftEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<QuestionId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn id_set(&self) -> HashSet<QuestionId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn shortfalls(&self) -> &[Shortfall] {
        &self.shortfalls
    }

    /// 比例组卷未填满时的警告
    pub fn partial_fill_warning(&self) -> Option<CompositionError> {
        if self.shortfalls.is_empty() {
            None
        } else {
            Some(CompositionError::PartialFill {
                shortfalls: self.shortfalls.clone(),
            })
        }
    }

    /// 某题型的每题分值
    pub fn score_for(&self, question_type: QuestionType) -> f64 {
        self.type_scores
            .get(&question_type)
            .copied()
            .unwrap_or(self.fallback_score)
    }

    /// 按实际题目计算的总分
    pub fn total_score(&self) -> f64 {
        round2(self.entries.iter().map(|e| e.score).sum())
    }

    pub fn count_by_type(&self) -> BTreeMap<QuestionType, u32> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.question_type).or_insert(0) += 1;
        }
        counts
    }

    pub fn score_by_type(&self) -> BTreeMap<QuestionType, f64> {
        let mut scores = BTreeMap::new();
        for entry in &self.entries {
            *scores.entry(entry.question_type).or_insert(0.0) += entry.score;
        }
        scores.into_iter().map(|(t, s)| (t, round2(s))).collect()
    }

    pub fn count_by_tag(&self) -> BTreeMap<TagId, u32> {
        let mut counts = BTreeMap::new();
        for tag in self.entries.iter().filter_map(|e| e.first_tag) {
            *counts.entry(tag).or_insert(0) += 1;
        }
        counts
    }

    pub fn stats(&self) -> DraftStats {
        let scores = self.score_by_type();
        let by_type = self
            .count_by_type()
            .into_iter()
            .map(|(t, count)| {
                let score = scores.get(&t).copied().unwrap_or_default();
                (t, TypeBreakdown { count, score })
            })
            .collect();

        DraftStats {
            question_count: self.entries.len() as u32,
            total_score: self.total_score(),
            by_type,
            by_tag: self.count_by_tag(),
            untagged: self.entries.iter().filter(|e| e.first_tag.is_none()).count() as u32,
        }
    }

    /// 追加题目（集合语义，已存在或重复传入的题目被忽略）
    ///
    /// 返回新草稿以及实际加入的数量
    pub fn with_added(mut self, questions: &[Question]) -> (Self, usize) {
        let mut present = self.id_set();
        let before = self.entries.len();
        for question in questions {
            if present.insert(question.id) {
                let score = self.score_for(question.question_type);
                self.entries.push(DraftEntry::from_question(question, score));
            }
        }
        let added = self.entries.len() - before;
        (self, added)
    }

    /// 移除第 `index` 道题，返回新草稿和被移除的题
    pub fn without(mut self, index: usize) -> Result<(Self, DraftEntry), ValidationError> {
        let len = self.entries.len();
        if index >= len {
            return Err(ValidationError::IndexOutOfRange { index, len });
        }
        let removed = self.entries.remove(index);
        Ok((self, removed))
    }

    /// 题型分布百分比（按实际题目计算，合计 100）
    pub fn type_ratio_snapshot(&self) -> BTreeMap<QuestionType, u32> {
        percentages(self.count_by_type())
    }

    /// 一级知识点分布百分比（只统计带知识点的题目）
    pub fn knowledge_ratio_snapshot(&self) -> BTreeMap<TagId, u32> {
        percentages(self.count_by_tag())
    }
}

fn percentages<K: Ord + Copy>(counts: BTreeMap<K, u32>) -> BTreeMap<K, u32> {
    let weights: Vec<u32> = counts.values().copied().collect();
    counts
        .keys()
        .copied()
        .zip(apportion(100, &weights))
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 试卷类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperType {
    /// 正式考试
    #[default]
    Exam,
    /// 练习
    Practice,
    /// 模拟考试
    Mock,
}

impl fmt::Display for PaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaperType::Exam => "考试",
            PaperType::Practice => "练习",
            PaperType::Mock => "模拟",
        };
        write!(f, "{}", name)
    }
}

/// 试卷状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperStatus {
    #[default]
    Enabled,
    Disabled,
}

/// 提交时由调用方填写的试卷信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub paper_type: PaperType,
    pub pass_score: f64,
    pub duration_minutes: u32,
    #[serde(default)]
    pub status: PaperStatus,
}

/// 写入题库服务的试卷记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaper {
    pub name: String,
    pub description: String,
    pub paper_type: PaperType,
    pub total_score: f64,
    pub pass_score: f64,
    pub duration_minutes: u32,
    /// 题目ID列表（JSON 数组）
    pub question_ids: String,
    /// 题型比例快照（JSON 对象）
    pub type_ratio: String,
    /// 知识点比例快照（JSON 对象）
    pub knowledge_ratio: String,
    pub status: PaperStatus,
}
