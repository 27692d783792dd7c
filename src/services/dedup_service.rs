//! 标题去重服务 - 业务能力层
//!
//! 两两比较标题相似度，相似度达到阈值的论文只保留评分更高的那篇。

use similar::TextDiff;
use tracing::info;

use crate::models::Paper;
use crate::utils::logging::truncate_text;

/// 去重结果
#[derive(Debug, Default)]
pub struct Deduplicated {
    /// 保留的论文，保持输入顺序
    pub kept: Vec<Paper>,
    /// 被丢弃的论文，`duplicate_of` 指向保留的那篇
    pub duplicates: Vec<Paper>,
}

/// 标题去重器
pub struct Deduplicator {
    threshold: f64,
}

impl Deduplicator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// 折叠近似重复的论文
    ///
    /// 按评分从高到低（同分保持输入顺序）依次访问，与已保留论文都不重复才保留。
    /// 因此任意两篇保留论文的相似度都低于阈值，被丢弃的总是评分更低
    /// 或同分但出现更晚的那篇。
    pub fn deduplicate(&self, papers: Vec<Paper>) -> Deduplicated {
        if papers.is_empty() {
            return Deduplicated::default();
        }

        let normalized: Vec<String> = papers.iter().map(|p| normalize_title(&p.title)).collect();

        let mut order: Vec<usize> = (0..papers.len()).collect();
        order.sort_by(|&a, &b| {
            papers[b]
                .quality_score
                .total_cmp(&papers[a].quality_score)
                .then(a.cmp(&b))
        });

        let mut kept_idx: Vec<usize> = Vec::new();
        let mut duplicate_of: Vec<Option<usize>> = vec![None; papers.len()];

        for &candidate in &order {
            let hit = kept_idx.iter().copied().find_map(|retained| {
                let similarity = ratio(&normalized[candidate], &normalized[retained]);
                (similarity >= self.threshold).then_some((retained, similarity))
            });

            match hit {
                Some((retained, similarity)) => {
                    info!("  🔄 检测到相似论文 (相似度: {:.2}):", similarity);
                    info!("     保留: {}", truncate_text(&papers[retained].title, 60));
                    info!("     丢弃: {}", truncate_text(&papers[candidate].title, 60));
                    duplicate_of[candidate] = Some(retained);
                }
                None => kept_idx.push(candidate),
            }
        }

        let ids: Vec<String> = papers.iter().map(|p| p.id.clone()).collect();
        let mut result = Deduplicated::default();
        for (idx, mut paper) in papers.into_iter().enumerate() {
            match duplicate_of[idx] {
                Some(retained) => {
                    paper.duplicate_of = Some(ids[retained].clone());
                    result.duplicates.push(paper);
                }
                None => result.kept.push(paper),
            }
        }
        result
    }
}

/// 计算两个标题的相似度（0.0 ~ 1.0）
pub fn title_similarity(a: &str, b: &str) -> f64 {
    ratio(&normalize_title(a), &normalize_title(b))
}

/// 小写、去掉标点、折叠空白
fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    f64::from(TextDiff::from_chars(a, b).ratio())
}
