//! 分类平衡与最终挑选 - 业务能力层
//!
//! 1. 保底层：每个非空分类按评分取前 `min_per_category` 篇
//! 2. 补位层：剩余论文按评分从高到低补足 `max_results`
//! 3. 按发布日期从新到旧排序（同日按评分，再按抓取顺序）
//!
//! 当保底数量之和超过总数时，保底层按分类枚举顺序轮流取（每轮每个分类一篇），
//! 直到名额用完。

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::models::Paper;

/// 分类平衡器
pub struct Balancer<'a> {
    categories: &'a [String],
    max_results: usize,
    min_per_category: usize,
}

impl<'a> Balancer<'a> {
    /// 创建平衡器
    ///
    /// `categories` 的顺序即分类枚举顺序，决定保底层截断时的优先级。
    pub fn new(categories: &'a [String], max_results: usize, min_per_category: usize) -> Self {
        Self {
            categories,
            max_results,
            min_per_category,
        }
    }

    /// 挑选最终推送的论文
    ///
    /// 返回 `min(max_results, papers.len())` 篇论文。
    pub fn select(&self, papers: Vec<Paper>) -> Vec<Paper> {
        let mut buckets = self.partition(papers);
        for (category, bucket) in buckets.iter_mut() {
            bucket.sort_by(by_score);
            debug!("分类 {} 共 {} 篇候选", category, bucket.len());
        }

        // 保底层：每轮每个分类取下一名，被取走的总是该分类排名靠前的一段
        let mut quota = vec![0usize; buckets.len()];
        let mut guaranteed = 0;
        'rounds: for round in 0..self.min_per_category {
            for (i, (_, bucket)) in buckets.iter().enumerate() {
                if guaranteed >= self.max_results {
                    break 'rounds;
                }
                if round < bucket.len() {
                    quota[i] += 1;
                    guaranteed += 1;
                }
            }
        }

        let mut selected: Vec<Paper> = Vec::new();
        let mut rest: Vec<Paper> = Vec::new();
        for ((category, mut bucket), take) in buckets.into_iter().zip(quota) {
            if take > 0 {
                info!("  分类 {} 保底入选 {} 篇", category, take);
            }
            rest.extend(bucket.split_off(take));
            selected.extend(bucket);
        }

        // 补位层：剩余论文全局按评分排序
        rest.sort_by(by_score);
        rest.truncate(self.max_results.saturating_sub(guaranteed));
        if !rest.is_empty() {
            info!("📊 保底 {} 篇，按质量补充 {} 篇", guaranteed, rest.len());
        }
        selected.extend(rest);

        selected.sort_by(by_date);
        selected
    }

    /// 按分类分桶，顺序为配置中的分类顺序，未配置的分类按首次出现顺序排在后面
    fn partition(&self, papers: Vec<Paper>) -> Vec<(String, Vec<Paper>)> {
        let mut buckets: Vec<(String, Vec<Paper>)> = self
            .categories
            .iter()
            .map(|c| (c.clone(), Vec::new()))
            .collect();

        for paper in papers {
            match buckets.iter_mut().find(|(c, _)| *c == paper.category) {
                Some((_, bucket)) => bucket.push(paper),
                None => buckets.push((paper.category.clone(), vec![paper])),
            }
        }
        buckets
    }
}

/// 评分从高到低，同分按抓取顺序
fn by_score(a: &Paper, b: &Paper) -> Ordering {
    b.quality_score
        .total_cmp(&a.quality_score)
        .then(a.fetch_order.cmp(&b.fetch_order))
}

/// 发布日期从新到旧，同日按评分，再按抓取顺序
fn by_date(a: &Paper, b: &Paper) -> Ordering {
    b.published_date()
        .cmp(&a.published_date())
        .then_with(|| by_score(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn paper(order: usize, category: &str, score: f64, day: u32) -> Paper {
        Paper {
            id: format!("http://arxiv.org/abs/2503.{:05}", order),
            title: format!("Paper {}", order),
            abstract_text: String::new(),
            authors: vec!["A".to_string()],
            category: category.to_string(),
            categories: vec![category.to_string()],
            published: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
            pdf_url: String::new(),
            fetch_order: order,
            quality_score: score,
            duplicate_of: None,
        }
    }

    fn cats(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn count(papers: &[Paper], category: &str) -> usize {
        papers.iter().filter(|p| p.category == category).count()
    }

    #[test]
    fn test_minimum_then_fill_by_score() {
        let categories = cats(&["A", "B", "C"]);
        let papers = vec![
            paper(0, "A", 9.0, 5),
            paper(1, "A", 8.0, 5),
            paper(2, "A", 7.0, 5),
            paper(3, "A", 6.0, 5),
            paper(4, "A", 5.0, 5),
            paper(5, "C", 1.0, 5),
            paper(6, "C", 0.5, 5),
            paper(7, "C", 0.2, 5),
        ];
        let selected = Balancer::new(&categories, 5, 1).select(papers);
        assert_eq!(selected.len(), 5);
        assert_eq!(count(&selected, "A"), 4);
        assert_eq!(count(&selected, "B"), 0);
        assert_eq!(count(&selected, "C"), 1);
        let mut orders: Vec<usize> = selected.iter().map(|p| p.fetch_order).collect();
        orders.sort();
        assert_eq!(orders, vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn test_fewer_than_max_returns_all() {
        let categories = cats(&["A", "B"]);
        let papers = vec![paper(0, "A", 1.0, 1), paper(1, "B", 2.0, 2)];
        let selected = Balancer::new(&categories, 10, 3).select(papers);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_guaranteed_tier_round_robin_truncation() {
        let categories = cats(&["A", "B", "C"]);
        let papers = vec![
            paper(0, "A", 9.0, 1),
            paper(1, "A", 8.0, 1),
            paper(2, "B", 1.0, 1),
            paper(3, "B", 0.9, 1),
            paper(4, "C", 0.1, 1),
            paper(5, "C", 0.05, 1),
        ];
        // 2 × 3 = 6 > 4：第一轮 A、B、C 各一篇，第二轮只剩 A
        let selected = Balancer::new(&categories, 4, 2).select(papers);
        let mut orders: Vec<usize> = selected.iter().map(|p| p.fetch_order).collect();
        orders.sort();
        assert_eq!(orders, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_sorted_by_date_then_score_then_order() {
        let categories = cats(&["A"]);
        let papers = vec![
            paper(0, "A", 1.0, 3),
            paper(1, "A", 5.0, 1),
            paper(2, "A", 2.0, 3),
            paper(3, "A", 2.0, 3),
            paper(4, "A", 9.0, 2),
        ];
        let selected = Balancer::new(&categories, 5, 0).select(papers);
        let orders: Vec<usize> = selected.iter().map(|p| p.fetch_order).collect();
        assert_eq!(orders, vec![2, 3, 0, 4, 1]);
    }

    #[test]
    fn test_unknown_category_still_eligible() {
        let categories = cats(&["A"]);
        let papers = vec![paper(0, "A", 1.0, 1), paper(1, "Z", 3.0, 1)];
        let selected = Balancer::new(&categories, 1, 1).select(papers);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].category, "A");
    }

    #[test]
    fn test_empty_input() {
        let categories = cats(&["A"]);
        assert!(Balancer::new(&categories, 5, 1).select(Vec::new()).is_empty());
    }
}
