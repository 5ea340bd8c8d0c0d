/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use crate::models::{DraftPaper, PaperId, RatioSpec, RuleSet};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 日志级别从 `LOG_LEVEL` 读取，未设置时为 `info`；重复调用不会报错。
pub fn init() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录规则模式组卷开始
pub fn log_rules_start(rules: &RuleSet) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 [组卷] 规则模式: {} 条规则, 共 {} 道题, 总分 {}",
        rules.len(),
        rules.total_count(),
        rules.total_score()
    );
    info!("{}", "=".repeat(60));
}

/// 记录比例模式组卷开始
pub fn log_ratio_start(spec: &RatioSpec) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 [组卷] 比例模式: 共 {} 道题, 总分 {}, 题型比例 判断 {}% / 单选 {}% / 多选 {}%",
        spec.total_count,
        spec.total_score,
        spec.type_ratio.judge,
        spec.type_ratio.single,
        spec.type_ratio.multiple
    );
    info!("{}", "=".repeat(60));
}

/// 打印草稿汇总
///
/// # 参数
/// - `draft`: 试卷草稿
pub fn log_draft_summary(draft: &DraftPaper) {
    let stats = draft.stats();
    info!("\n{}", "─".repeat(60));
    info!(
        "📊 [预览] 共 {} 道题, 总分 {}",
        stats.question_count, stats.total_score
    );
    for (question_type, breakdown) in &stats.by_type {
        info!(
            "   {}: {} 道, {} 分",
            question_type, breakdown.count, breakdown.score
        );
    }
    for (tag_id, count) in &stats.by_tag {
        info!("   知识点 {}: {} 道", tag_id, count);
    }
    if stats.untagged > 0 {
        info!("   未标注知识点: {} 道", stats.untagged);
    }
    info!("{}", "─".repeat(60));
}

/// 记录提交完成
pub fn log_committed(name: &str, paper_id: PaperId) {
    info!("\n{}", "=".repeat(60));
    info!("✅ [提交] 试卷《{}》已创建, ID: {}", name, paper_id);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_by_chars() {
        assert_eq!(truncate_text("光合作用的场所", 4), "光合作用...");
        assert_eq!(truncate_text("短", 4), "短");
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
