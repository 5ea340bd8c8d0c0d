use crate::models::tag::{TagId, TagSelection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 题目ID
pub type QuestionId = i64;

/// 题库ID
pub type BankId = i64;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// 判断题
    Judge,
    /// 单选题
    Single,
    /// 多选题
    Multiple,
    /// 填空题
    Fill,
}

impl QuestionType {
    /// 全部题型（按声明顺序）
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Judge,
        QuestionType::Single,
        QuestionType::Multiple,
        QuestionType::Fill,
    ];

    /// 获取题型代码
    pub fn code(self) -> u8 {
        match self {
            QuestionType::Judge => 1,
            QuestionType::Single => 2,
            QuestionType::Multiple => 3,
            QuestionType::Fill => 4,
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            QuestionType::Judge => "判断题",
            QuestionType::Single => "单选题",
            QuestionType::Multiple => "多选题",
            QuestionType::Fill => "填空题",
        }
    }

    /// 从代码解析题型
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(QuestionType::Judge),
            2 => Some(QuestionType::Single),
            3 => Some(QuestionType::Multiple),
            4 => Some(QuestionType::Fill),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 简单
    Easy,
    /// 中等
    Medium,
    /// 困难
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "简单",
            Difficulty::Medium => "中等",
            Difficulty::Hard => "困难",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 题库中的一道题目
///
/// 组卷过程只读取题目，从不修改题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub bank_id: BankId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_level1: Option<TagId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_level2: Option<TagId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_level3: Option<TagId>,
    /// 题干（可能包含 HTML）
    pub stem: String,
    /// 选项列表（序列化后的 JSON 字符串）
    #[serde(default)]
    pub options: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Question {
    /// 题目的知识点路径
    ///
    /// 三级需要二级、二级需要一级；遇到第一个空缺即截断
    pub fn tags(&self) -> TagSelection {
        match (self.tag_level1, self.tag_level2, self.tag_level3) {
            (Some(a), Some(b), Some(c)) => TagSelection::Third(a, b, c),
            (Some(a), Some(b), None) => TagSelection::Second(a, b),
            (Some(a), None, _) => TagSelection::First(a),
            (None, _, _) => TagSelection::None,
        }
    }

    /// 解析选项列表（选项为空时返回空列表）
    ///
    /// # 返回
    /// 选项不是合法的 JSON 字符串数组时返回解析错误
    pub fn option_list(&self) -> Result<Vec<String>, serde_json::Error> {
        if self.options.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&self.options)
    }
}

/// 题目筛选条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFilter {
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<BankId>,
    #[serde(default)]
    pub tags: TagSelection,
}

impl QuestionFilter {
    /// 只按题型筛选
    pub fn of_type(question_type: QuestionType) -> Self {
        Self {
            question_type,
            difficulty: None,
            bank_id: None,
            tags: TagSelection::None,
        }
    }

    /// 判断题目是否满足筛选条件（不检查启用状态）
    pub fn matches(&self, question: &Question) -> bool {
        question.question_type == self.question_type
            && self.difficulty.map_or(true, |d| question.difficulty == d)
            && self.bank_id.map_or(true, |b| question.bank_id == b)
            && self.tags.matches(&question.tags())
    }
}

/// 手动加题时的搜索条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
}

impl SearchQuery {
    pub fn new(keyword: Option<&str>, question_type: Option<QuestionType>) -> Self {
        Self {
            keyword: keyword
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            question_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(tag1: Option<TagId>, tag2: Option<TagId>, tag3: Option<TagId>) -> Question {
        Question {
            id: 1,
            question_type: QuestionType::Single,
            difficulty: Difficulty::Easy,
            bank_id: 7,
            tag_level1: tag1,
            tag_level2: tag2,
            tag_level3: tag3,
            stem: "1+1=?".to_string(),
            options: r#"["1","2"]"#.to_string(),
            answer: "B".to_string(),
            analysis: None,
            enabled: true,
        }
    }

    #[test]
    fn tag_path_stops_at_first_gap() {
        assert_eq!(
            question(Some(1), Some(2), Some(3)).tags(),
            TagSelection::Third(1, 2, 3)
        );
        assert_eq!(question(Some(1), None, Some(3)).tags(), TagSelection::First(1));
        assert_eq!(question(None, Some(2), None).tags(), TagSelection::None);
    }

    #[test]
    fn filter_matches_optional_fields() {
        let q = question(Some(1), Some(2), None);
        let mut filter = QuestionFilter::of_type(QuestionType::Single);
        assert!(filter.matches(&q));

        filter.bank_id = Some(8);
        assert!(!filter.matches(&q));

        filter.bank_id = Some(7);
        filter.tags = TagSelection::Second(1, 2);
        assert!(filter.matches(&q));

        filter.tags = TagSelection::Third(1, 2, 3);
        assert!(!filter.matches(&q));
    }

    #[test]
    fn option_list_parses_json() {
        assert_eq!(question(None, None, None).option_list().unwrap(), vec!["1", "2"]);

        let mut q = question(None, None, None);
        q.options = "  ".to_string();
        assert!(q.option_list().unwrap().is_empty());
    }

    #[test]
    fn malformed_options_are_reported() {
        let mut q = question(None, None, None);
        q.options = r#"["A", "B""#.to_string();
        assert!(q.option_list().is_err());

        q.options = r#"{"A": 1}"#.to_string();
        assert!(q.option_list().is_err());
    }

    #[test]
    fn type_codes_round_trip() {
        for t in QuestionType::ALL {
            assert_eq!(QuestionType::from_code(t.code()), Some(t));
        }
        assert_eq!(QuestionType::from_code(9), None);
    }
}
