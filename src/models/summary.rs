use serde::Serialize;

use crate::config::EmailLanguage;
use crate::models::paper::Paper;

/// AI 生成的论文摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    /// 单语摘要
    Single(String),
    /// 中英双语摘要
    Bilingual { zh: String, en: String },
}

impl Summary {
    /// 按语言取出摘要文本
    pub fn text(&self, language: EmailLanguage) -> &str {
        match (self, language) {
            (Summary::Single(text), _) => text,
            (Summary::Bilingual { en, .. }, EmailLanguage::En) => en,
            (Summary::Bilingual { zh, .. }, _) => zh,
        }
    }

    /// 摘要生成失败时的兜底文本
    pub fn fallback(language: EmailLanguage) -> Self {
        match language {
            EmailLanguage::Both => Summary::Bilingual {
                zh: fallback_text(EmailLanguage::Zh).to_string(),
                en: fallback_text(EmailLanguage::En).to_string(),
            },
            single => Summary::Single(fallback_text(single).to_string()),
        }
    }
}

pub fn fallback_text(language: EmailLanguage) -> &'static str {
    match language {
        EmailLanguage::Zh => "摘要生成失败，请直接查看原文。",
        EmailLanguage::En | EmailLanguage::Both => {
            "Summary generation failed. Please read the original paper."
        }
    }
}

/// 附带摘要的入选论文
#[derive(Debug, Clone, Serialize)]
pub struct SummarizedPaper {
    pub paper: Paper,
    pub summary: Summary,
}
