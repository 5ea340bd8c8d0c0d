//! 业务能力层
//!
//! 每个服务只描述"我能做什么"，不关心调用顺序。

pub mod availability;
pub mod composer;
pub mod paper_service;
pub mod rule_validator;
pub mod tag_resolver;

pub use availability::{ratio_cells, Availability, AvailabilityEstimator, CellSupply};
pub use composer::Composer;
pub use paper_service::{build_paper, PaperService};
pub use rule_validator::{validate_ratio, validate_rules, validate_scores};
pub use tag_resolver::TagResolver;
