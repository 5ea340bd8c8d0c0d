//! 组卷编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **组卷**：校验 → 抽题 → 生成预览会话
//! 2. **供需查询**：比例组卷前的单元题量
//! 3. **提交**：把预览会话中的草稿一次性写入题库服务
//! 4. **统计输出**：组卷与提交的汇总日志

use crate::clients::{MemoryCatalog, QuestionCatalog, TikuClient};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{load_question_bank, PaperId, PaperMeta, RatioSpec, RuleSet};
use crate::services::{AvailabilityEstimator, CellSupply, Composer, PaperService};
use crate::utils::logging::{log_committed, log_draft_summary, log_ratio_start, log_rules_start};
use crate::workflow::{PreviewSession, RuleEditor};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 组卷编排器
pub struct PaperBuilder<C> {
    catalog: Arc<C>,
    composer: Composer<C>,
    paper_service: PaperService<C>,
    page_size: usize,
    verbose_logging: bool,
}

impl PaperBuilder<TikuClient> {
    /// 连接远程题库服务
    pub fn remote(config: &Config) -> Result<Self> {
        let client = TikuClient::new(config).context("创建题库客户端失败")?;
        Ok(Self::new(Arc::new(client), config))
    }
}

impl PaperBuilder<MemoryCatalog> {
    /// 使用配置中的离线题库文件
    pub async fn offline(config: &Config) -> Result<Self> {
        let path = config
            .question_bank_file
            .as_deref()
            .context("未配置离线题库文件 (QUESTION_BANK_FILE)")?;
        let bank = load_question_bank(Path::new(path))
            .await
            .with_context(|| format!("加载离线题库失败: {}", path))?;

        info!(
            "📁 已加载离线题库: {} 道题, {} 个知识点",
            bank.questions.len(),
            bank.tags.len()
        );
        Ok(Self::new(Arc::new(MemoryCatalog::new(bank)), config))
    }
}

impl<C: QuestionCatalog> PaperBuilder<C> {
    pub fn new(catalog: Arc<C>, config: &Config) -> Self {
        Self {
            composer: Composer::new(Arc::clone(&catalog), config.default_question_score),
            paper_service: PaperService::new(Arc::clone(&catalog)),
            catalog,
            page_size: config.preview_page_size,
            verbose_logging: config.verbose_logging,
        }
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    /// 新建规则编辑器
    pub fn rule_editor(&self) -> RuleEditor<C> {
        RuleEditor::new(Arc::clone(&self.catalog))
    }

    /// 比例组卷前的单元供需表
    pub async fn ratio_supply(&self, spec: &RatioSpec) -> Result<Vec<CellSupply>> {
        AvailabilityEstimator::new(Arc::clone(&self.catalog))
            .ratio_supply(spec)
            .await
            .context("查询比例组卷题量失败")
    }

    /// 规则模式组卷
    ///
    /// # 参数
    /// - `rules`: 已编辑好的抽题规则
    ///
    /// # 返回
    /// 返回可继续编辑的预览会话
    pub async fn compose_rules(&self, rules: &RuleSet) -> Result<PreviewSession<C>> {
        log_rules_start(rules);

        let draft = match self.composer.compose_rules(rules).await {
            Ok(draft) => draft,
            Err(e) => {
                error!("❌ [组卷] 规则模式组卷失败: {}", e);
                return Err(e).context("规则模式组卷失败");
            }
        };

        if self.verbose_logging {
            log_draft_summary(&draft);
        }
        Ok(PreviewSession::new(
            Arc::clone(&self.catalog),
            draft,
            self.page_size,
        ))
    }

    /// 比例模式组卷
    ///
    /// 题量不足不会失败，缺口通过 `DraftPaper::partial_fill_warning` 给出
    pub async fn compose_ratio(&self, spec: &RatioSpec) -> Result<PreviewSession<C>> {
        log_ratio_start(spec);

        let draft = match self.composer.compose_ratio(spec).await {
            Ok(draft) => draft,
            Err(e) => {
                error!("❌ [组卷] 比例模式组卷失败: {}", e);
                return Err(e).context("比例模式组卷失败");
            }
        };

        if let Some(warning) = draft.partial_fill_warning() {
            warn!("⚠️ {}", AppError::from(warning));
        }
        if self.verbose_logging {
            log_draft_summary(&draft);
        }
        Ok(PreviewSession::new(
            Arc::clone(&self.catalog),
            draft,
            self.page_size,
        ))
    }

    /// 提交预览会话中的草稿
    ///
    /// 失败时会话保持不变，可以继续编辑后重试
    pub async fn commit(&self, session: &PreviewSession<C>, meta: &PaperMeta) -> Result<PaperId> {
        match self.paper_service.commit(session.draft(), meta).await {
            Ok(paper_id) => {
                log_committed(meta.name.trim(), paper_id);
                Ok(paper_id)
            }
            Err(e) => {
                error!("❌ [提交] 试卷提交失败: {}", e);
                Err(e).with_context(|| format!("提交试卷失败: {}", meta.name))
            }
        }
    }
}
