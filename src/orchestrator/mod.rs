//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::PaperBuilder (组卷 → 预览 → 提交)
//!     ↓
//! workflow (RuleEditor / PreviewSession)
//!     ↓
//! services (能力层：标签 / 题量 / 校验 / 抽题 / 提交)
//!     ↓
//! clients (题库服务：TikuClient / MemoryCatalog)
//! ```
//!
//! 编排层只做调度和日志，不做具体业务判断。

pub mod paper_builder;

pub use paper_builder::PaperBuilder;
