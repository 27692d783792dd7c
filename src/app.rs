//! 应用主流程 - 编排层
//!
//! ## 职责
//!
//! 一次运行就是一条线性的批处理：
//!
//! ```text
//! 抓取 (ArxivClient) → 筛选 (SelectionFlow) → 摘要 (SummaryService)
//!     → 渲染 (Renderer) → 投递 (MailClient / DRY RUN 写文件)
//! ```
//!
//! 只做调度和统计，不做具体业务判断。

use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::clients::{ArxivClient, LlmClient, MailClient};
use crate::config::{Config, EmailLanguage};
use crate::error::AppError;
use crate::models::{Paper, RawEntry, SummarizedPaper};
use crate::services::{DateStats, Renderer, SummaryService};
use crate::utils::logging::{
    log_category_distribution, log_date_stats, log_startup, print_final_stats, truncate_text,
};
use crate::workflow::SelectionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    arxiv: ArxivClient,
    summarizer: SummaryService,
}

/// 写入 `REPORT_FILE` 的运行报告
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    date: NaiveDate,
    language: EmailLanguage,
    fetched: usize,
    duplicates: usize,
    short_abstracts: usize,
    papers: &'a [SummarizedPaper],
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let arxiv = ArxivClient::new(&config).context("创建 arXiv 客户端失败")?;
        let summarizer =
            SummaryService::new(LlmClient::new(&config), config.email_language);

        Ok(Self {
            config,
            arxiv,
            summarizer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let today = reference_date(&Local::now());

        let candidates = self.fetch_candidates().await;
        let fetched = candidates.len();
        info!("📥 共抓取 {} 篇候选论文", fetched);

        let selection = SelectionFlow::new(&self.config.selection, today).run(candidates);
        if selection.papers.is_empty() {
            warn!("⚠️ 没有可推送的论文，程序结束");
            return Ok(());
        }

        info!("✅ 入选 {} 篇论文", selection.papers.len());
        log_category_distribution(&selection.category_distribution());
        log_date_stats(&DateStats::analyze(&selection.papers, today), today);

        info!("\n🤖 正在生成 AI 摘要...");
        let summarized = self.summarizer.summarize_all(selection.papers).await;

        let renderer = Renderer::new(self.config.email_language, today);
        let subject = renderer.subject();
        let html = renderer.render(&summarized);

        let delivered_to = self.deliver(&subject, &html).await?;

        if let Some(path) = &self.config.report_file {
            let report = RunReport {
                date: today,
                language: self.config.email_language,
                fetched,
                duplicates: selection.duplicates.len(),
                short_abstracts: selection.short_abstracts,
                papers: &summarized,
            };
            write_report(path, &report)?;
            info!("📝 运行报告已写入 {}", path);
        }

        print_final_stats(
            fetched,
            summarized.len(),
            selection.duplicates.len(),
            &delivered_to,
        );

        Ok(())
    }

    /// 逐个分类抓取候选论文
    ///
    /// 单个分类失败只记录错误，不影响其他分类。
    async fn fetch_candidates(&self) -> Vec<Paper> {
        let limit = self.config.selection.fetch_limit();
        let mut batches = Vec::new();

        for category in &self.config.selection.categories {
            info!("\n📡 正在抓取 {} (最多 {} 篇)...", category, limit);
            match self.arxiv.fetch_category(category, limit).await {
                Ok(entries) => {
                    info!("  ✓ {} 返回 {} 条", category, entries.len());
                    batches.push((category.clone(), entries));
                }
                Err(e) => error!("  ❌ 抓取 {} 失败: {}", category, e),
            }
        }

        assemble_candidates(batches)
    }

    /// 投递邮件，返回投递位置用于统计输出
    async fn deliver(&self, subject: &str, html: &str) -> Result<String> {
        if self.config.dry_run {
            let path = &self.config.output_html_file;
            fs::write(path, html).map_err(|e| AppError::file_write_failed(path, e))?;
            info!("🧪 DRY RUN：邮件已写入 {}", path);
            return Ok(path.clone());
        }

        let mailer = MailClient::new(&self.config);
        info!("\n📧 正在发送邮件到 {}...", mailer.receiver());
        match mailer.send(subject, html).await {
            Ok(()) => {
                info!("✅ 邮件发送成功");
                Ok(mailer.receiver().to_string())
            }
            Err(e) => {
                error!("❌ 邮件发送失败: {}", e);
                Err(AppError::from(e)).context("邮件投递失败")
            }
        }
    }
}

/// 把各分类的原始条目转换为候选论文
///
/// - 缺少标题或日期的条目跳过并记录警告
/// - 同一 id 只保留第一次出现的分类
/// - `fetch_order` 全局递增
pub fn assemble_candidates(batches: Vec<(String, Vec<RawEntry>)>) -> Vec<Paper> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for (category, entries) in batches {
        for entry in entries {
            if seen.contains(&entry.id_url) {
                continue;
            }
            let id = entry.id_url.clone();
            let title = truncate_text(&entry.title, 60);
            match Paper::from_entry(entry, &category, candidates.len()) {
                Ok(paper) => {
                    seen.insert(id);
                    candidates.push(paper);
                }
                Err(reason) => warn!("  ⚠️ 跳过条目 {} ({}): {}", id, title, reason),
            }
        }
    }

    candidates
}

/// 评分和日期统计使用的"今天"
///
/// 论文发布日期按 UTC 取日历日，这里也换算到 UTC，结果与主机时区无关。
pub fn reference_date<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.with_timezone(&Utc).date_naive()
}

fn write_report(path: &str, report: &RunReport<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("序列化运行报告失败")?;
    fs::write(path, json).map_err(|e| AppError::file_write_failed(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, title: &str, published: Option<&str>) -> RawEntry {
        RawEntry {
            id_url: format!("http://arxiv.org/abs/{}", id),
            title: title.to_string(),
            summary: "abstract".to_string(),
            authors: vec!["Alice".to_string()],
            published: published.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_assemble_skips_malformed_and_cross_category_duplicates() {
        let batches = vec![
            (
                "math.OC".to_string(),
                vec![
                    entry("2503.00001", "First", Some("2025-03-10T08:00:00Z")),
                    entry("2503.00002", "  ", Some("2025-03-10T08:00:00Z")),
                    entry("2503.00003", "No date", None),
                ],
            ),
            (
                "eess.SY".to_string(),
                vec![
                    entry("2503.00001", "First", Some("2025-03-10T08:00:00Z")),
                    entry("2503.00004", "Second", Some("2025-03-09T08:00:00Z")),
                ],
            ),
        ];

        let papers = assemble_candidates(batches);
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].category, "math.OC");
        assert_eq!(papers[1].category, "eess.SY");
        assert_eq!(papers[1].title, "Second");
        assert_eq!(
            papers.iter().map(|p| p.fetch_order).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_reference_date_ignores_host_offset() {
        use crate::config::SelectionConfig;
        use crate::services::Scorer;
        use chrono::FixedOffset;

        // 同一时刻：UTC 3 月 9 日 23:00，东八区已是 3 月 10 日 07:00
        let utc_now = Utc.with_ymd_and_hms(2025, 3, 9, 23, 0, 0).unwrap();
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();
        let local_now = utc_now.with_timezone(&shanghai);

        assert_eq!(reference_date(&utc_now), reference_date(&local_now));
        assert_eq!(
            reference_date(&local_now),
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
        );

        let raw = RawEntry {
            published: Some("2025-03-09T10:00:00Z".to_string()),
            ..entry("2503.00009", "Fresh paper", None)
        };
        let paper = Paper::from_entry(raw, "math.OC", 0).unwrap();

        let config = SelectionConfig::default();
        let from_utc = Scorer::new(&config, reference_date(&utc_now)).score(&paper);
        let from_local = Scorer::new(&config, reference_date(&local_now)).score(&paper);
        let naive_local = Scorer::new(&config, local_now.date_naive()).score(&paper);

        assert_eq!(from_utc, from_local);
        assert_eq!(from_local - naive_local, 1.5);
    }

    #[test]
    fn test_assemble_empty() {
        assert!(assemble_candidates(Vec::new()).is_empty());
    }
}
