//! 论文筛选流程 - 流程层
//!
//! 核心职责：把一次抓取得到的候选论文变成最终推送列表
//!
//! 流程顺序：
//! 1. 评分（Scorer）
//! 2. 摘要过短过滤（可选）
//! 3. 标题去重（Deduplicator）
//! 4. 分类平衡 + 补位（Balancer）
//! 5. 按发布日期排序
//!
//! 整个流程是纯内存计算，不做任何 I/O。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::config::SelectionConfig;
use crate::models::Paper;
use crate::services::{Balancer, Deduplicator, Scorer};

/// 筛选结果
#[derive(Debug, Default)]
pub struct Selection {
    /// 最终入选论文（发布日期从新到旧）
    pub papers: Vec<Paper>,
    /// 被去重丢弃的论文
    pub duplicates: Vec<Paper>,
    /// 因摘要过短被剔除的数量
    pub short_abstracts: usize,
}

impl Selection {
    /// 各分类入选数量（按分类名排序）
    pub fn category_distribution(&self) -> BTreeMap<&str, usize> {
        let mut dist = BTreeMap::new();
        for paper in &self.papers {
            *dist.entry(paper.category.as_str()).or_insert(0) += 1;
        }
        dist
    }
}

/// 论文筛选流程
pub struct SelectionFlow<'a> {
    config: &'a SelectionConfig,
    today: NaiveDate,
}

impl<'a> SelectionFlow<'a> {
    pub fn new(config: &'a SelectionConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    /// 运行完整的筛选流程
    ///
    /// 空输入返回空结果，不视为错误。
    pub fn run(&self, mut candidates: Vec<Paper>) -> Selection {
        if candidates.is_empty() {
            return Selection::default();
        }

        Scorer::new(self.config, self.today).annotate(&mut candidates);

        let mut short_abstracts = 0;
        if self.config.exclude_short_abstracts {
            let min = self.config.min_abstract_length;
            let before = candidates.len();
            candidates.retain(|p| p.abstract_text.trim().chars().count() >= min);
            short_abstracts = before - candidates.len();
            if short_abstracts > 0 {
                info!("✂️ 剔除 {} 篇摘要少于 {} 字符的论文", short_abstracts, min);
            }
        }

        info!("\n🔍 正在检查重复/相似论文...");
        let deduplicated = Deduplicator::new(self.config.similarity_threshold).deduplicate(candidates);
        if !deduplicated.duplicates.is_empty() {
            info!("  共去除 {} 篇相似论文", deduplicated.duplicates.len());
        }

        info!("\n⚖️ 正在平衡分类...");
        let papers = Balancer::new(
            &self.config.categories,
            self.config.max_results,
            self.config.min_per_category,
        )
        .select(deduplicated.kept);

        Selection {
            papers,
            duplicates: deduplicated.duplicates,
            short_abstracts,
        }
    }
}
