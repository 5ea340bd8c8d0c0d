//! 流程层（Workflow Layer）
//!
//! - `RuleEditor`：编辑抽题规则，知识点级联清空，筛选变化即刷新可用题量
//! - `PreviewSession`：组卷结果的分页预览、删题、搜索加题

pub mod preview_session;
pub mod rule_editor;

pub use preview_session::PreviewSession;
pub use rule_editor::{RuleEditor, TagChoice};
