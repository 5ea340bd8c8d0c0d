use crate::models::question::{QuestionId, QuestionType};
use crate::models::ratio::RatioKind;
use crate::models::tag::TagId;
use std::fmt;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验错误（可恢复，重新输入即可）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 组卷错误
    #[error("组卷错误: {0}")]
    Composition(#[from] CompositionError),
    /// 提交试卷错误
    #[error("提交错误: {0}")]
    Commit(#[from] CommitError),
    /// 题库服务错误
    #[error("题库服务错误: {0}")]
    Catalog(#[from] CatalogError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// 没有任何抽题规则
    #[error("至少需要一条抽题规则")]
    EmptyRuleSet,
    /// 同一题型出现多条规则
    #[error("题型 {question_type} 已存在抽题规则")]
    DuplicateRuleType { question_type: QuestionType },
    /// 规则序号越界
    #[error("规则序号 {index} 超出范围 (共 {len} 条)")]
    RuleIndexOutOfRange { index: usize, len: usize },
    /// 抽题数量必须为正
    #[error("第 {} 条规则的抽题数量必须大于 0", .rule_index + 1)]
    NonPositiveCount { rule_index: usize },
    /// 每题分值必须为正
    #[error("第 {} 条规则的每题分值必须大于 0", .rule_index + 1)]
    NonPositiveScore { rule_index: usize },
    /// 抽题数量超过可用题量
    #[error(
        "第 {} 条规则要求 {requested} 道题，但当前只有 {available} 道可用",
        .rule_index + 1
    )]
    UnsatisfiedQuantity {
        rule_index: usize,
        requested: u32,
        available: u32,
    },
    /// 比例合计不等于 100
    #[error("{kind}合计必须等于 100%，当前合计: {sum}%")]
    RatioSumMismatch { kind: RatioKind, sum: i64 },
    /// 比例为负数
    #[error("{kind}中 {key} 的比例不能为负数: {value}%")]
    NegativeRatio {
        kind: RatioKind,
        key: String,
        value: i32,
    },
    /// 知识点比例中重复的标签
    #[error("知识点 {tag_id} 在比例中重复出现")]
    DuplicateKnowledgeTag { tag_id: TagId },
    /// 数值字段必须为正
    #[error("{field} 必须大于 0")]
    NonPositive { field: &'static str },
    /// 及格分超过总分
    #[error("及格分 {pass_score} 不能超过总分 {total_score}")]
    PassScoreExceedsTotal { pass_score: f64, total_score: f64 },
    /// 必填字段为空
    #[error("{field} 不能为空")]
    MissingField { field: &'static str },
    /// 跳级选择知识点（例如未选一级就选二级）
    #[error("选择第 {level} 级知识点前必须先选择上一级")]
    TagOutOfOrder { level: u8 },
    /// 题目序号越界
    #[error("题目序号 {index} 超出范围 (共 {len} 道)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// 比例组卷中某个 (题型, 知识点) 单元的缺口
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Shortfall {
    pub question_type: QuestionType,
    pub tag_id: TagId,
    pub requested: u32,
    pub filled: u32,
}

impl Shortfall {
    /// 缺少的题目数量
    pub fn missing(&self) -> u32 {
        self.requested.saturating_sub(self.filled)
    }
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/知识点 {}: 需要 {} 道，实际 {} 道",
            self.question_type, self.tag_id, self.requested, self.filled
        )
    }
}

/// 组卷错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositionError {
    /// 规则模式下题库无法满足某条规则的数量（致命）
    #[error(
        "第 {} 条规则 ({question_type}) 需要 {requested} 道题，题库仅有 {available} 道",
        .rule_index + 1
    )]
    InsufficientSupply {
        rule_index: usize,
        question_type: QuestionType,
        requested: u32,
        available: u32,
    },
    /// 比例模式下部分单元题量不足（非致命，仅作为警告）
    #[error("部分单元题量不足，共缺 {} 道: {}", total_missing(.shortfalls), describe(.shortfalls))]
    PartialFill { shortfalls: Vec<Shortfall> },
}

fn total_missing(shortfalls: &[Shortfall]) -> u32 {
    shortfalls.iter().map(Shortfall::missing).sum()
}

fn describe(shortfalls: &[Shortfall]) -> String {
    shortfalls
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 提交试卷错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitError {
    /// 试卷中没有题目
    #[error("试卷中没有任何题目")]
    EmptyPaper,
    /// 分数设置不合法
    #[error("分数设置不合法: 及格分 {pass_score}, 总分 {total_score}")]
    InvalidScores { pass_score: f64, total_score: f64 },
}

/// 题库服务错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回错误响应
    #[error("服务返回错误响应 ({endpoint}): code={code}, message={message:?}")]
    BadResponse {
        endpoint: String,
        code: u64,
        message: Option<String>,
    },
    /// 服务返回空数据
    #[error("服务返回空结果: {endpoint}")]
    EmptyResponse { endpoint: String },
    /// 重试后仍被限流
    #[error("请求频率限制 ({endpoint})，已重试 {attempts} 次")]
    RateLimited { endpoint: String, attempts: usize },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
    /// 题目不存在
    #[error("题目不存在: {id}")]
    QuestionNotFound { id: QuestionId },
    /// 满足条件的题目不足
    #[error("满足条件的题目不足: 需要 {requested} 道，仅有 {available} 道")]
    InsufficientQuestions { requested: u32, available: u32 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Catalog(CatalogError::JsonParseFailed(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Catalog(CatalogError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为题库题量不足
    pub fn insufficient_questions(&self) -> Option<(u32, u32)> {
        match self {
            AppError::Catalog(CatalogError::InsufficientQuestions {
                requested,
                available,
            }) => Some((*requested, *available)),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
