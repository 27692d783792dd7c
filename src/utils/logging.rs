/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::DateStats;

/// 初始化 tracing 日志，`RUST_LOG` 未设置时默认 `info`
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 arXiv 每日论文推送启动");
    info!("📚 分类: {}", config.selection.categories.join(", "));
    info!(
        "📊 最多 {} 篇，每个分类至少 {} 篇",
        config.selection.max_results, config.selection.min_per_category
    );
    info!("🌐 邮件语言: {}", config.email_language);
    if config.dry_run {
        info!("🧪 DRY RUN 模式：不发送邮件，输出到 {}", config.output_html_file);
    }
    info!("{}", "=".repeat(60));
}

/// 记录各分类入选数量
pub fn log_category_distribution(distribution: &BTreeMap<&str, usize>) {
    info!("📂 分类分布:");
    for (category, count) in distribution {
        info!("   {}: {} 篇", category, count);
    }
}

/// 记录发布日期统计
pub fn log_date_stats(stats: &DateStats, today: NaiveDate) {
    info!(
        "📅 发布日期: 今天 {} 篇 / 昨天 {} 篇 / 更早 {} 篇",
        stats.today, stats.yesterday, stats.older
    );
    for (date, count) in stats.distribution.iter().rev() {
        let days = (today - *date).num_days();
        info!("   {} ({} 天前): {} 篇", date, days.max(0), count);
    }
}

/// 打印最终统计信息
pub fn print_final_stats(fetched: usize, selected: usize, duplicates: usize, delivered_to: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📥 抓取候选: {}", fetched);
    info!("🔁 重复剔除: {}", duplicates);
    info!("✅ 入选推送: {}", selected);
    info!("📮 输出位置: {}", delivered_to);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
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
