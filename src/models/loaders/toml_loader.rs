use crate::error::{AppError, AppResult, FileError};
use crate::models::question::Question;
use crate::models::tag::Tag;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 离线题库文件内容
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// 合并另一个题库（ID 重复时保留先加载的）
    pub fn merge(&mut self, other: QuestionBank) {
        for tag in other.tags {
            if !self.tags.iter().any(|t| t.id == tag.id) {
                self.tags.push(tag);
            }
        }
        for question in other.questions {
            if !self.questions.iter().any(|q| q.id == question.id) {
                self.questions.push(question);
            }
        }
    }
}

/// 从 TOML 文件加载题库
pub async fn load_question_bank(toml_file_path: &Path) -> AppResult<QuestionBank> {
    let path_str = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let bank: QuestionBank =
        toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(&path_str, e))?;

    tracing::debug!(
        "题库文件 {} 包含 {} 个知识点, {} 道题目",
        path_str,
        bank.tags.len(),
        bank.questions.len()
    );

    Ok(bank)
}

/// 加载文件夹中所有 TOML 题库并合并
///
/// 单个文件解析失败只记录警告，不影响其他文件
pub async fn load_question_banks(folder_path: &str) -> AppResult<QuestionBank> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::NotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut merged = QuestionBank::default();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载题库: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_question_bank(&path).await {
                Ok(bank) => {
                    tracing::info!("成功加载 {} 道题目", bank.questions.len());
                    merged.merge(bank);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(merged)
}
