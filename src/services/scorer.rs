//! 论文质量评分 - 业务能力层
//!
//! 只根据论文元数据计算分数，是一个纯函数：相同输入永远得到相同分数。
//!
//! 分数由四部分组成：
//! - 摘要长度：0 ~ 2 分，低于最短长度为 0，超过饱和长度封顶
//! - 作者数量：0 ~ 1 分，随作者数量单调不减
//! - 标题关键词：每命中一个关键词加 `keyword_bonus`
//! - 新鲜度：0 ~ 3 分，每过一天减半，超过窗口为 0

use chrono::NaiveDate;

use crate::config::SelectionConfig;
use crate::models::Paper;

const MAX_LENGTH_SCORE: f64 = 2.0;
const MAX_AUTHOR_SCORE: f64 = 1.0;
const MAX_RECENCY_SCORE: f64 = 3.0;

/// 论文评分器
pub struct Scorer<'a> {
    config: &'a SelectionConfig,
    today: NaiveDate,
    keywords: Vec<String>,
}

impl<'a> Scorer<'a> {
    /// 创建评分器
    ///
    /// `today` 显式传入，保证同一天内的评分可复现。
    pub fn new(config: &'a SelectionConfig, today: NaiveDate) -> Self {
        let keywords = config
            .keywords
            .iter()
            .map(|k| normalize_title(k))
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            config,
            today,
            keywords,
        }
    }

    /// 计算论文的质量评分
    pub fn score(&self, paper: &Paper) -> f64 {
        self.length_score(&paper.abstract_text)
            + self.author_score(paper.authors.len())
            + self.keyword_score(&paper.title)
            + self.recency_score(paper.published_date())
    }

    /// 为所有论文写入评分
    pub fn annotate(&self, papers: &mut [Paper]) {
        for paper in papers.iter_mut() {
            paper.quality_score = self.score(paper);
        }
    }

    fn length_score(&self, abstract_text: &str) -> f64 {
        let length = abstract_text.trim().chars().count();
        let min = self.config.min_abstract_length;
        if length < min {
            return 0.0;
        }
        let span = self.config.abstract_saturation_length.saturating_sub(min).max(1);
        let ratio = (length - min) as f64 / span as f64;
        (ratio * MAX_LENGTH_SCORE).min(MAX_LENGTH_SCORE)
    }

    fn author_score(&self, author_count: usize) -> f64 {
        // 没有作者的条目按单作者处理
        let count = author_count.max(1);
        let cap = self.config.author_cap.max(1);
        if cap == 1 {
            return MAX_AUTHOR_SCORE;
        }
        let steps = (count - 1).min(cap - 1);
        MAX_AUTHOR_SCORE * steps as f64 / (cap - 1) as f64
    }

    fn keyword_score(&self, title: &str) -> f64 {
        let title = normalize_title(title);
        let hits = self
            .keywords
            .iter()
            .filter(|keyword| title.contains(keyword.as_str()))
            .count();
        hits as f64 * self.config.keyword_bonus
    }

    fn recency_score(&self, published: NaiveDate) -> f64 {
        let days = (self.today - published).num_days().max(0);
        if days >= i64::from(self.config.recency_window_days) {
            return 0.0;
        }
        MAX_RECENCY_SCORE * 0.5_f64.powi(days as i32)
    }
}

/// 小写并折叠空白，用于关键词匹配
fn normalize_title(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
