use crate::models::question::{BankId, Difficulty, QuestionType};
use crate::models::tag::TagId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 比例种类（用于报错）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioKind {
    /// 题型比例
    Type,
    /// 知识点比例
    Knowledge,
}

impl fmt::Display for RatioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioKind::Type => write!(f, "题型比例"),
            RatioKind::Knowledge => write!(f, "知识点比例"),
        }
    }
}

/// 题型比例（百分比）
///
/// 声明顺序为 判断 → 单选 → 多选，取整余数归入最后一项（多选）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRatio {
    pub judge: i32,
    pub single: i32,
    pub multiple: i32,
}

impl TypeRatio {
    pub fn new(judge: i32, single: i32, multiple: i32) -> Self {
        Self {
            judge,
            single,
            multiple,
        }
    }

    /// 按声明顺序列出 (题型, 百分比)
    pub fn buckets(&self) -> [(QuestionType, i32); 3] {
        [
            (QuestionType::Judge, self.judge),
            (QuestionType::Single, self.single),
            (QuestionType::Multiple, self.multiple),
        ]
    }

    pub fn sum(&self) -> i64 {
        self.buckets().iter().map(|(_, p)| i64::from(*p)).sum()
    }
}

/// 单个一级知识点所占百分比
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeShare {
    pub tag_id: TagId,
    pub percent: i32,
}

/// 比例组卷参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioSpec {
    pub type_ratio: TypeRatio,
    /// 按声明顺序排列，余数归入最后一个知识点
    pub knowledge_ratio: Vec<KnowledgeShare>,
    pub total_count: u32,
    pub total_score: f64,
    pub pass_score: f64,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<BankId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl RatioSpec {
    pub fn knowledge_sum(&self) -> i64 {
        self.knowledge_ratio
            .iter()
            .map(|s| i64::from(s.percent))
            .sum()
    }

    /// 每题分值：总分平均分配到目标题量上
    pub fn score_per_question(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.total_score / f64::from(self.total_count)
    }
}

/// 按权重把 `total` 个名额分配到各桶
///
/// 除最后一桶外，每桶取 `round(total × w / Σw)`（且不超过剩余名额），
/// 剩余名额全部归入最后一桶，因此结果之和恒等于 `total`。
/// 权重全为 0 时所有名额归入最后一桶。
pub fn apportion(total: u32, weights: &[u32]) -> Vec<u32> {
    if weights.is_empty() {
        return Vec::new();
    }
    let weight_sum: u64 = weights.iter().map(|w| u64::from(*w)).sum();
    let last = weights.len() - 1;
    let mut remaining = total;
    let mut counts = Vec::with_capacity(weights.len());

    for weight in &weights[..last] {
        let share = if weight_sum == 0 {
            0
        } else {
            let scaled = u64::from(total) * u64::from(*weight);
            // 四舍五入: floor(x / s + 0.5)
            ((2 * scaled + weight_sum) / (2 * weight_sum)) as u32
        };
        let share = share.min(remaining);
        remaining -= share;
        counts.push(share);
    }
    counts.push(remaining);
    counts
}

/// 按行、列两组权重把 `total` 个名额分配到二维表格
///
/// 行合计为 `apportion(total, row_weights)`，列合计为 `apportion(total, col_weights)`。
/// 逐行按各列剩余名额再做一次 `apportion`，超出某列余量的部分按声明顺序挪到仍有余量的列，
/// 因此行合计与列合计同时成立。
pub fn apportion_grid(total: u32, row_weights: &[u32], col_weights: &[u32]) -> Vec<Vec<u32>> {
    let mut remaining = apportion(total, col_weights);

    apportion(total, row_weights)
        .into_iter()
        .map(|row_total| {
            let mut cells = apportion(row_total, &remaining);

            let mut excess = 0;
            for (cell, cap) in cells.iter_mut().zip(&remaining) {
                if *cell > *cap {
                    excess += *cell - *cap;
                    *cell = *cap;
                }
            }
            for (cell, cap) in cells.iter_mut().zip(&remaining) {
                let room = (*cap - *cell).min(excess);
                *cell += room;
                excess -= room;
            }

            for (cap, cell) in remaining.iter_mut().zip(&cells) {
                *cap -= *cell;
            }
            cells
        })
        .collect()
}
