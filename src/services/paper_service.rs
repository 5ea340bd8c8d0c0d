/// 试卷提交服务
///
/// 把预览确认后的草稿一次性写入题库服务。
/// 所有校验都在写入之前完成，校验失败时不会产生任何写操作。
use crate::clients::QuestionCatalog;
use crate::error::{AppResult, CommitError, ValidationError};
use crate::models::{DraftPaper, NewPaper, PaperId, PaperMeta};
use std::sync::Arc;
use tracing::info;

/// 试卷提交服务
pub struct PaperService<C> {
    catalog: Arc<C>,
}

impl<C: QuestionCatalog> PaperService<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    /// 提交试卷
    ///
    /// # 参数
    /// - `draft`: 预览确认后的草稿（不会被修改）
    /// - `meta`: 试卷名称、及格分、考试时长等信息
    ///
    /// # 返回
    /// 返回新试卷ID
    pub async fn commit(&self, draft: &DraftPaper, meta: &PaperMeta) -> AppResult<PaperId> {
        let paper = build_paper(draft, meta)?;

        info!(
            "[提交] 📝 {}: {} 道题, 总分 {}, 及格分 {}",
            paper.name,
            draft.len(),
            paper.total_score,
            paper.pass_score
        );

        let paper_id = self.catalog.create_paper(&paper).await?;
        info!("[提交] ✅ 试卷已保存, ID: {}", paper_id);
        Ok(paper_id)
    }
}

/// 校验草稿和试卷信息，生成待写入的试卷记录
pub fn build_paper(draft: &DraftPaper, meta: &PaperMeta) -> AppResult<NewPaper> {
    if draft.is_empty() {
        return Err(CommitError::EmptyPaper.into());
    }

    let name = meta.name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingField { field: "试卷名称" }.into());
    }
    if meta.duration_minutes == 0 {
        return Err(ValidationError::NonPositive { field: "考试时长" }.into());
    }

    let total_score = draft.total_score();
    if !(meta.pass_score.is_finite() && meta.pass_score > 0.0) || meta.pass_score > total_score {
        return Err(CommitError::InvalidScores {
            pass_score: meta.pass_score,
            total_score,
        }
        .into());
    }

    Ok(NewPaper {
        name: name.to_string(),
        description: meta.description.trim().to_string(),
        paper_type: meta.paper_type,
        total_score,
        pass_score: meta.pass_score,
        duration_minutes: meta.duration_minutes,
        question_ids: serde_json::to_string(&draft.ids())?,
        type_ratio: serde_json::to_string(&draft.type_ratio_snapshot())?,
        knowledge_ratio: serde_json::to_string(&draft.knowledge_ratio_snapshot())?,
        status: meta.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Difficulty, PaperStatus, PaperType, Question, QuestionType};
    use std::collections::BTreeMap;

    fn meta(pass_score: f64) -> PaperMeta {
        PaperMeta {
            name: "  期中测验 ".to_string(),
            description: String::new(),
            paper_type: PaperType::Exam,
            pass_score,
            duration_minutes: 60,
            status: PaperStatus::Enabled,
        }
    }

    fn draft() -> DraftPaper {
        let questions: Vec<Question> = (1..=4)
            .map(|id| Question {
                id,
                question_type: if id % 2 == 0 {
                    QuestionType::Judge
                } else {
                    QuestionType::Single
                },
                difficulty: Difficulty::Easy,
                bank_id: 1,
                tag_level1: Some(100),
                tag_level2: None,
                tag_level3: None,
                stem: String::new(),
                options: String::new(),
                answer: String::new(),
                analysis: None,
                enabled: true,
            })
            .collect();
        let scores = BTreeMap::from([(QuestionType::Single, 10.0), (QuestionType::Judge, 5.0)]);
        DraftPaper::new(scores, 2.0).with_added(&questions).0
    }

    #[test]
    fn builds_paper_with_json_snapshots() {
        let paper = build_paper(&draft(), &meta(18.0)).unwrap();
        assert_eq!(paper.name, "期中测验");
        assert_eq!(paper.total_score, 30.0);
        assert_eq!(paper.question_ids, "[1,2,3,4]");
        assert_eq!(paper.type_ratio, r#"{"judge":50,"single":50}"#);
        assert_eq!(paper.knowledge_ratio, r#"{"100":100}"#);
    }

    #[test]
    fn empty_draft_cannot_be_committed() {
        let err = build_paper(&DraftPaper::default(), &meta(1.0)).unwrap_err();
        assert!(matches!(err, AppError::Commit(CommitError::EmptyPaper)));
    }

    #[test]
    fn pass_score_must_fit_total() {
        let err = build_paper(&draft(), &meta(31.0)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Commit(CommitError::InvalidScores { .. })
        ));
        let err = build_paper(&draft(), &meta(0.0)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Commit(CommitError::InvalidScores { .. })
        ));
        assert!(build_paper(&draft(), &meta(30.0)).is_ok());
    }

    #[test]
    fn name_is_required() {
        let mut m = meta(10.0);
        m.name = "   ".to_string();
        assert!(matches!(
            build_paper(&draft(), &m),
            Err(AppError::Validation(ValidationError::MissingField { .. }))
        ));
    }
}
