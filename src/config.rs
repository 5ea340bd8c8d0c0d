use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 题库 API 配置 ---
    pub tiku_api_base_url: String,
    pub tiku_token: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 被限流时的最大重试次数
    pub max_retries: usize,
    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,
    // --- 组卷配置 ---
    /// 预览时每页显示的题目数
    pub preview_page_size: usize,
    /// 题型未声明分值时手动加题使用的分值
    pub default_question_score: f64,
    /// 离线题库文件（设置后使用内存题库）
    pub question_bank_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tiku_api_base_url: "http://127.0.0.1:8080/api".to_string(),
            tiku_token: String::new(),
            request_timeout_secs: 30,
            max_retries: 5,
            retry_delay_ms: 2000,
            preview_page_size: 10,
            default_question_score: 2.0,
            question_bank_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> AppResult<Self> {
        let default = Self::default();
        Ok(Self {
            tiku_api_base_url: std::env::var("TIKU_API_BASE_URL")
                .unwrap_or(default.tiku_api_base_url),
            tiku_token: std::env::var("TIKU_TOKEN").unwrap_or(default.tiku_token),
            request_timeout_secs: env_parse(
                "REQUEST_TIMEOUT_SECS",
                default.request_timeout_secs,
                "u64",
            )?,
            max_retries: env_parse("MAX_RETRIES", default.max_retries, "usize")?,
            retry_delay_ms: env_parse("RETRY_DELAY_MS", default.retry_delay_ms, "u64")?,
            preview_page_size: env_parse("PREVIEW_PAGE_SIZE", default.preview_page_size, "usize")?,
            default_question_score: env_parse(
                "DEFAULT_QUESTION_SCORE",
                default.default_question_score,
                "f64",
            )?,
            question_bank_file: std::env::var("QUESTION_BANK_FILE")
                .ok()
                .or(default.question_bank_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging, "bool")?,
        })
    }

    /// 从 TOML 文件读取配置
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let path_str = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(&path_str, e))?;
        toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(&path_str, e))
    }
}

fn env_parse<T: FromStr>(var_name: &str, default: T, expected_type: &str) -> AppResult<T> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(default),
    }
}
