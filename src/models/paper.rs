use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// arXiv Atom 接口返回的原始条目
///
/// 字段全部可能缺失，转换成 [`Paper`] 时再做校验。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub id_url: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub published: Option<String>,
    pub categories: Vec<String>,
    pub primary_category: Option<String>,
    pub pdf_url: Option<String>,
}

/// 条目无法转换为候选论文的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedEntry {
    MissingTitle,
    MissingDate,
}

impl std::fmt::Display for MalformedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedEntry::MissingTitle => write!(f, "缺少标题"),
            MalformedEntry::MissingDate => write!(f, "缺少或无法解析发布日期"),
        }
    }
}

/// 候选论文
///
/// 每次运行从抓取结果新建，只会被打分和标记重复两种方式修改，进程退出即丢弃。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// arXiv 条目地址，同时作为唯一标识
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<String>,
    /// 抓取时所属的分类（用于分类平衡）
    pub category: String,
    /// 论文自带的全部分类标签
    pub categories: Vec<String>,
    pub published: DateTime<Utc>,
    pub pdf_url: String,
    /// 全局抓取顺序，作为最终排序的兜底条件
    pub fetch_order: usize,
    /// 质量评分
    #[serde(default)]
    pub quality_score: f64,
    /// 被判定为重复时，保留下来的那篇论文的 id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<String>,
}

impl Paper {
    /// 从原始条目构建候选论文
    pub fn from_entry(
        entry: RawEntry,
        category: &str,
        fetch_order: usize,
    ) -> Result<Self, MalformedEntry> {
        let title = normalize_whitespace(&entry.title);
        if title.is_empty() {
            return Err(MalformedEntry::MissingTitle);
        }

        let published = entry
            .published
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or(MalformedEntry::MissingDate)?;

        let pdf_url = entry
            .pdf_url
            .clone()
            .unwrap_or_else(|| pdf_url_for(&entry.id_url));

        let mut categories = entry.categories;
        if let Some(primary) = entry.primary_category {
            if !categories.contains(&primary) {
                categories.insert(0, primary);
            }
        }

        Ok(Self {
            id: entry.id_url.trim().to_string(),
            title,
            abstract_text: normalize_whitespace(&entry.summary),
            authors: entry
                .authors
                .iter()
                .map(|a| normalize_whitespace(a))
                .filter(|a| !a.is_empty())
                .collect(),
            category: category.to_string(),
            categories,
            published,
            pdf_url,
            fetch_order,
            quality_score: 0.0,
            duplicate_of: None,
        })
    }

    /// 发布日期（UTC 日历日）
    pub fn published_date(&self) -> NaiveDate {
        self.published.date_naive()
    }

    /// 作者列表（逗号分隔）
    pub fn authors_joined(&self) -> String {
        self.authors.join(", ")
    }
}

/// 折叠连续空白
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 由 abs 地址推导 PDF 地址
fn pdf_url_for(id_url: &str) -> String {
    let id = id_url
        .trim()
        .rsplit_once("/abs/")
        .map(|(_, tail)| tail.trim_matches('/'))
        .unwrap_or_else(|| id_url.trim());
    format!("https://arxiv.org/pdf/{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> RawEntry {
        RawEntry {
            id_url: "http://arxiv.org/abs/2501.01234v1".to_string(),
            title: "  Efficient   Transformer\n for Vision ".to_string(),
            summary: "We propose\n a method.".to_string(),
            authors: vec!["Alice".to_string(), " ".to_string(), "Bob".to_string()],
            published: Some("2025-01-02T18:00:00Z".to_string()),
            categories: vec!["cs.CV".to_string()],
            primary_category: Some("cs.LG".to_string()),
            pdf_url: None,
        }
    }

    #[test]
    fn test_from_entry_normalizes_fields() {
        let paper = Paper::from_entry(entry(), "cs.LG", 7).unwrap();
        assert_eq!(paper.title, "Efficient Transformer for Vision");
        assert_eq!(paper.abstract_text, "We propose a method.");
        assert_eq!(paper.authors, vec!["Alice", "Bob"]);
        assert_eq!(paper.categories, vec!["cs.LG", "cs.CV"]);
        assert_eq!(paper.pdf_url, "https://arxiv.org/pdf/2501.01234v1");
        assert_eq!(paper.published_date(), NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(paper.fetch_order, 7);
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let mut raw = entry();
        raw.title = "   ".to_string();
        assert_eq!(
            Paper::from_entry(raw, "cs.LG", 0).unwrap_err(),
            MalformedEntry::MissingTitle
        );
    }

    #[test]
    fn test_bad_date_is_malformed() {
        let mut raw = entry();
        raw.published = Some("yesterday".to_string());
        assert_eq!(
            Paper::from_entry(raw, "cs.LG", 0).unwrap_err(),
            MalformedEntry::MissingDate
        );
    }
}
