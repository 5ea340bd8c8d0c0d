pub mod loaders;
pub mod paper;
pub mod question;
pub mod ratio;
pub mod rule;
pub mod tag;

pub use loaders::{load_question_bank, load_question_banks, QuestionBank};
pub use paper::{
    DraftEntry, DraftPaper, DraftStats, NewPaper, PaperId, PaperMeta, PaperStatus, PaperType,
    TypeBreakdown,
};
pub use question::{
    BankId, Difficulty, Question, QuestionFilter, QuestionId, QuestionType, SearchQuery,
};
pub use ratio::{apportion, apportion_grid, KnowledgeShare, RatioKind, RatioSpec, TypeRatio};
pub use rule::{clamp, ExtractionRule, RuleSet};
pub use tag::{Tag, TagId, TagLevel, TagSelection};
