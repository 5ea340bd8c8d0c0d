//! # Paper Compose
//!
//! 按抽题规则或题型/知识点比例从题库中组卷，预览编辑后一次性保存试卷
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 题库服务层（Clients）
//! - `clients/` - 唯一的外部协作者 `QuestionCatalog`
//! - `TikuClient` - 远程题库服务（HTTP JSON）
//! - `MemoryCatalog` - 内存题库（离线题库文件 / 测试）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `TagResolver` - 知识点层级按需加载与缓存
//! - `AvailabilityEstimator` - 可用题量查询与自动下调
//! - `rule_validator` - 组卷参数校验（纯函数）
//! - `Composer` - 规则模式 / 比例模式抽题
//! - `PaperService` - 提交试卷
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 组卷前后的交互流程
//! - `RuleEditor` - 抽题规则编辑
//! - `PreviewSession` - 预览、删题、搜索加题
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/paper_builder` - 组卷 → 预览 → 提交
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{MemoryCatalog, QuestionCatalog, TikuClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    DraftPaper, ExtractionRule, PaperMeta, Question, QuestionType, RatioSpec, RuleSet,
    TagSelection,
};
pub use orchestrator::PaperBuilder;
pub use workflow::{PreviewSession, RuleEditor};
