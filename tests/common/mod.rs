#![allow(dead_code)]

use paper_compose::models::{
    Difficulty, PaperMeta, PaperStatus, PaperType, Question, QuestionBank, QuestionType, Tag,
    TagId, TagLevel,
};
use paper_compose::{Config, MemoryCatalog};
use std::sync::Arc;

/// 每个 (题型, 一级知识点) 的题量
pub const PER_CELL: u32 = 40;
/// 一级知识点 3 下只有 2 道判断题
pub const SPARSE_TAG: TagId = 3;

pub fn config() -> Config {
    Config {
        preview_page_size: 10,
        ..Config::default()
    }
}

fn tag(id: TagId, name: &str, level: TagLevel, parent_id: Option<TagId>) -> Tag {
    Tag {
        id,
        name: name.to_string(),
        level,
        parent_id,
    }
}

pub fn question(
    id: i64,
    question_type: QuestionType,
    tags: (Option<TagId>, Option<TagId>, Option<TagId>),
) -> Question {
    let difficulty = match id % 3 {
        0 => Difficulty::Easy,
        1 => Difficulty::Medium,
        _ => Difficulty::Hard,
    };
    Question {
        id,
        question_type,
        difficulty,
        bank_id: 1,
        tag_level1: tags.0,
        tag_level2: tags.1,
        tag_level3: tags.2,
        stem: format!("<p>第 {} 题（{}）</p>", id, question_type.name()),
        options: String::new(),
        answer: "A".to_string(),
        analysis: None,
        enabled: true,
    }
}

/// 测试题库
///
/// - 知识点：1 力学（11 牛顿定律、12 能量）、2 电学（21 电路）、3 光学
/// - 每种题型在知识点 1、2 下各 40 道；知识点 1 下 11、12 各 20 道
/// - 知识点 3 下只有 2 道判断题
/// - 另有 1 道停用的单选题
pub fn sample_bank() -> QuestionBank {
    let tags = vec![
        tag(1, "力学", TagLevel::First, None),
        tag(2, "电学", TagLevel::First, None),
        tag(3, "光学", TagLevel::First, None),
        tag(11, "牛顿定律", TagLevel::Second, Some(1)),
        tag(12, "能量", TagLevel::Second, Some(1)),
        tag(21, "电路", TagLevel::Second, Some(2)),
    ];

    let mut questions = Vec::new();
    let mut id = 0;
    for question_type in QuestionType::ALL {
        for first in [1, 2] {
            for i in 0..PER_CELL {
                id += 1;
                let second = match (first, i < PER_CELL / 2) {
                    (1, true) => 11,
                    (1, false) => 12,
                    _ => 21,
                };
                questions.push(question(id, question_type, (Some(first), Some(second), None)));
            }
        }
    }
    for _ in 0..2 {
        id += 1;
        questions.push(question(id, QuestionType::Judge, (Some(SPARSE_TAG), None, None)));
    }

    id += 1;
    let mut disabled = question(id, QuestionType::Single, (Some(1), Some(11), None));
    disabled.enabled = false;
    questions.push(disabled);

    QuestionBank { tags, questions }
}

pub fn catalog() -> Arc<MemoryCatalog> {
    Arc::new(MemoryCatalog::with_seed(sample_bank(), 42))
}

pub fn meta(name: &str, pass_score: f64) -> PaperMeta {
    PaperMeta {
        name: name.to_string(),
        description: "单元测验".to_string(),
        paper_type: PaperType::Exam,
        pass_score,
        duration_minutes: 90,
        status: PaperStatus::Enabled,
    }
}

/// 测试题库中已停用题目的ID
pub fn disabled_question_id() -> i64 {
    sample_bank()
        .questions
        .iter()
        .find(|q| !q.enabled)
        .map(|q| q.id)
        .expect("测试题库应包含停用题目")
}
