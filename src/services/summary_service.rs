//! 摘要服务 - 业务能力层
//!
//! 只负责"为单篇论文生成 AI 摘要"能力，失败时给出兜底文本，不中断整体流程

use tracing::{error, info, warn};

use crate::clients::LlmClient;
use crate::config::EmailLanguage;
use crate::error::LlmError;
use crate::models::summary::fallback_text;
use crate::models::{Paper, SummarizedPaper, Summary};
use crate::utils::logging::truncate_text;

/// 摘要服务
pub struct SummaryService {
    client: LlmClient,
    language: EmailLanguage,
}

impl SummaryService {
    pub fn new(client: LlmClient, language: EmailLanguage) -> Self {
        Self { client, language }
    }

    /// 依次为所有论文生成摘要
    pub async fn summarize_all(&self, papers: Vec<Paper>) -> Vec<SummarizedPaper> {
        let total = papers.len();
        let mut results = Vec::with_capacity(total);

        for (i, paper) in papers.into_iter().enumerate() {
            info!("[{}/{}] 🤖 生成摘要: {}", i + 1, total, truncate_text(&paper.title, 70));
            let summary = self.summarize(&paper).await;
            results.push(SummarizedPaper { paper, summary });
        }

        results
    }

    /// 为单篇论文生成摘要
    ///
    /// 双语模式下每种语言单独请求一次；任一语言失败只替换该语言的文本。
    pub async fn summarize(&self, paper: &Paper) -> Summary {
        match self.language {
            EmailLanguage::Both => Summary::Bilingual {
                zh: self.summarize_in(paper, EmailLanguage::Zh).await,
                en: self.summarize_in(paper, EmailLanguage::En).await,
            },
            single => Summary::Single(self.summarize_in(paper, single).await),
        }
    }

    async fn summarize_in(&self, paper: &Paper, language: EmailLanguage) -> String {
        let prompt = build_prompt(paper, language);
        match self.client.chat(&prompt, None).await {
            Ok(summary) => {
                info!("   ✅ {} 摘要完成", language.code());
                summary
            }
            Err(e @ LlmError::Timeout { .. }) => {
                warn!("   ⏱️ {} 摘要超时: {}", language.code(), e);
                fallback_text(language).to_string()
            }
            Err(e) => {
                error!("   ❌ {} 摘要生成失败: {}", language.code(), e);
                fallback_text(language).to_string()
            }
        }
    }
}

/// 构建摘要提示词
pub fn build_prompt(paper: &Paper, language: EmailLanguage) -> String {
    match language {
        EmailLanguage::En => format!(
            "Please summarize the following academic paper in English, including these aspects:\n\
             1. Research background and motivation (1-2 sentences)\n\
             2. Main methods and innovations (2-3 sentences)\n\
             3. Experimental results and conclusions (1-2 sentences)\n\
             4. Potential application value (1 sentence)\n\
             \n\
             Paper title: {}\n\
             \n\
             Paper abstract:\n\
             {}\n\
             \n\
             Please use concise professional language suitable for quick reading.",
            paper.title, paper.abstract_text
        ),
        EmailLanguage::Zh | EmailLanguage::Both => format!(
            "请用中文总结以下学术论文，包括以下几个方面：\n\
             1. 研究背景和动机（1-2句话）\n\
             2. 主要方法和创新点（2-3句话）\n\
             3. 实验结果和结论（1-2句话）\n\
             4. 潜在应用价值（1句话）\n\
             \n\
             论文标题：{}\n\
             \n\
             论文摘要：\n\
             {}\n\
             \n\
             请用简洁专业的语言总结，适合快速阅读理解。",
            paper.title, paper.abstract_text
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::{TimeZone, Utc};

    fn paper() -> Paper {
        Paper {
            id: "http://arxiv.org/abs/2503.00001v1".to_string(),
            title: "Robust MPC for Power Grids".to_string(),
            abstract_text: "We propose a robust model predictive controller.".to_string(),
            authors: vec!["Alice".to_string()],
            category: "eess.SY".to_string(),
            categories: vec!["eess.SY".to_string()],
            published: Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap(),
            pdf_url: "https://arxiv.org/pdf/2503.00001v1".to_string(),
            fetch_order: 0,
            quality_score: 0.0,
            duplicate_of: None,
        }
    }

    #[test]
    fn test_prompt_contains_title_and_abstract() {
        let zh = build_prompt(&paper(), EmailLanguage::Zh);
        assert!(zh.starts_with("请用中文总结"));
        assert!(zh.contains("论文标题：Robust MPC for Power Grids"));
        assert!(zh.contains("论文摘要：\nWe propose a robust model predictive controller."));

        let en = build_prompt(&paper(), EmailLanguage::En);
        assert!(en.contains("4. Potential application value (1 sentence)\n\nPaper title: Robust MPC"));
        assert!(en.ends_with("suitable for quick reading."));
    }

    /// 指向不可达地址，所有请求都会失败，应回退到兜底文本
    #[tokio::test]
    async fn test_failure_falls_back_per_language() {
        // 绑定随机端口后立即释放，保证该地址无人监听
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = Config {
            llm_api_key: "invalid".to_string(),
            llm_api_base_url: format!("http://127.0.0.1:{}/v1", port),
            llm_timeout_secs: 5,
            ..Default::default()
        };
        let service = SummaryService::new(LlmClient::new(&config), EmailLanguage::Both);

        let summary = service.summarize(&paper()).await;
        assert_eq!(summary, Summary::fallback(EmailLanguage::Both));
    }
}
