//! 邮件渲染服务 - 业务能力层
//!
//! 把入选论文和 AI 摘要渲染成 HTML 邮件正文

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use regex::Regex;

use crate::config::EmailLanguage;
use crate::models::{Paper, SummarizedPaper, Summary};
use crate::services::templates::text;

/// 高质量徽章的评分门槛
const HIGH_QUALITY_SCORE: f64 = 5.0;
/// 作者列表显示的最大字符数
const MAX_AUTHORS_CHARS: usize = 200;
/// 每篇论文最多显示的分类标签数
const MAX_CATEGORY_TAGS: usize = 3;

const STYLE: &str = r#"
        body {
            font-family: 'Segoe UI', Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f5f5f5;
        }
        .header {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 30px;
            border-radius: 10px;
            text-align: center;
            margin-bottom: 30px;
        }
        .header h1 { margin: 0; font-size: 28px; }
        .date { font-size: 14px; opacity: 0.9; margin-top: 10px; }
        .paper {
            background: white;
            padding: 25px;
            margin-bottom: 25px;
            border-radius: 8px;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
        }
        .paper-title {
            color: #667eea;
            font-size: 20px;
            font-weight: bold;
            margin-bottom: 10px;
            line-height: 1.4;
        }
        .quality-badge, .date-badge {
            display: inline-block;
            padding: 2px 8px;
            border-radius: 3px;
            font-size: 11px;
            font-weight: bold;
            margin-left: 8px;
        }
        .quality-badge { background: #ffd700; color: #856404; }
        .date-today { background: #d4edda; color: #155724; }
        .date-yesterday { background: #d1ecf1; color: #0c5460; }
        .date-older { background: #f8d7da; color: #721c24; }
        .meta {
            color: #666;
            font-size: 14px;
            margin-bottom: 15px;
            padding-bottom: 15px;
            border-bottom: 2px solid #f0f0f0;
        }
        .meta-item { margin: 5px 0; }
        .categories { display: inline-block; }
        .category-tag {
            background: #e8eaf6;
            color: #5c6bc0;
            padding: 3px 10px;
            border-radius: 12px;
            font-size: 12px;
            margin-right: 5px;
            display: inline-block;
        }
        .summary {
            background: #f8f9ff;
            padding: 15px;
            border-left: 4px solid #667eea;
            margin: 15px 0;
            border-radius: 4px;
        }
        .summary-title { font-weight: bold; color: #667eea; margin-bottom: 10px; }
        .links { margin-top: 15px; }
        .link-button {
            display: inline-block;
            background: #667eea;
            color: white;
            padding: 10px 20px;
            text-decoration: none;
            border-radius: 5px;
            margin-right: 10px;
            font-size: 14px;
        }
        .footer {
            text-align: center;
            color: #999;
            font-size: 12px;
            margin-top: 40px;
            padding-top: 20px;
            border-top: 1px solid #ddd;
        }
"#;

/// 发布日期统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DateStats {
    pub today: usize,
    pub yesterday: usize,
    pub older: usize,
    /// 每个发布日期的论文数量
    pub distribution: BTreeMap<NaiveDate, usize>,
}

impl DateStats {
    /// 相对 `today` 统计论文的发布日期
    pub fn analyze<'a>(papers: impl IntoIterator<Item = &'a Paper>, today: NaiveDate) -> Self {
        let mut stats = DateStats::default();
        for paper in papers {
            let date = paper.published_date();
            *stats.distribution.entry(date).or_insert(0) += 1;
            match (today - date).num_days() {
                d if d <= 0 => stats.today += 1,
                1 => stats.yesterday += 1,
                _ => stats.older += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.today + self.yesterday + self.older
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.distribution.keys().next().copied()
    }
}

/// 邮件渲染器
pub struct Renderer {
    language: EmailLanguage,
    today: NaiveDate,
}

impl Renderer {
    pub fn new(language: EmailLanguage, today: NaiveDate) -> Self {
        Self { language, today }
    }

    /// 邮件标题
    pub fn subject(&self) -> String {
        format!("📚 arXiv Daily Paper Digest - {}", self.today.format("%Y-%m-%d"))
    }

    /// 渲染完整的 HTML 邮件
    pub fn render(&self, items: &[SummarizedPaper]) -> String {
        let stats = DateStats::analyze(items.iter().map(|i| &i.paper), self.today);

        let mut html = String::new();
        let _ = write!(
            html,
            r#"<html>
<head>
    <meta charset="utf-8">
    <style>{style}</style>
</head>
<body>
    <div class="header">
        <h1>📚 {title}</h1>
        <div class="date">{date}</div>
    </div>
    {notice}
"#,
            style = STYLE,
            title = self.t("title"),
            date = self.today.format("%Y-%m-%d"),
            notice = self.date_notice(&stats),
        );

        for (i, item) in items.iter().enumerate() {
            html.push_str(&self.render_paper(i + 1, item));
        }

        let _ = write!(
            html,
            r#"
    <div class="footer">
        <p>{}</p>
        <p>{}</p>
    </div>
</body>
</html>
"#,
            self.t("footer_auto"),
            self.t("footer_powered"),
        );

        html
    }

    /// 日期提醒块
    ///
    /// 没有旧论文且至少有一篇今天发布时不显示。
    pub fn date_notice(&self, stats: &DateStats) -> String {
        if stats.older == 0 && stats.today > 0 {
            return String::new();
        }
        let total = stats.total();
        if total == 0 {
            return String::new();
        }

        let mut parts = Vec::new();
        if stats.today > 0 {
            parts.push(self.t("published_today").replace("{count}", &stats.today.to_string()));
        }
        if stats.yesterday > 0 {
            parts.push(
                self.t("published_yesterday")
                    .replace("{count}", &stats.yesterday.to_string()),
            );
        }
        if stats.older > 0 {
            let template = if stats.older == 1 {
                let days = stats
                    .earliest()
                    .map(|d| (self.today - d).num_days())
                    .unwrap_or_default();
                self.t("published_older_single")
                    .replace("{days}", &days.to_string())
            } else {
                self.t("published_older_multi").to_string()
            };
            parts.push(template.replace("{count}", &stats.older.to_string()));
        }

        let message = self
            .t("notice_text")
            .replace("{total}", &total.to_string())
            .replace("{parts}", &parts.join(self.t("notice_separator")));

        let (icon, bg_color, border_color, text_color) = if stats.older * 2 >= total {
            ("⚠️", "#fff3cd", "#ffc107", "#856404")
        } else if stats.older > 0 {
            ("ℹ️", "#d1ecf1", "#17a2b8", "#0c5460")
        } else {
            ("✨", "#d4edda", "#28a745", "#155724")
        };

        format!(
            r#"
    <div style="background: {bg_color}; border-left: 4px solid {border_color}; padding: 15px 20px; margin-bottom: 25px; border-radius: 5px;">
        <div style="color: {text_color}; font-size: 15px; line-height: 1.6;">
            <span style="font-size: 20px; margin-right: 8px;">{icon}</span>
            <strong>{label}:</strong> {message}
        </div>
    </div>
"#,
            label = self.t("date_notice"),
        )
    }

    fn render_paper(&self, index: usize, item: &SummarizedPaper) -> String {
        let paper = &item.paper;

        let quality_badge = if paper.quality_score >= HIGH_QUALITY_SCORE {
            format!(r#"<span class="quality-badge">{}</span>"#, self.t("high_quality"))
        } else {
            String::new()
        };

        let categories_html: String = paper
            .categories
            .iter()
            .take(MAX_CATEGORY_TAGS)
            .map(|c| format!(r#"<span class="category-tag">{}</span>"#, escape_html(c)))
            .collect();

        let authors = paper.authors_joined();
        let authors_display = if authors.chars().count() > MAX_AUTHORS_CHARS {
            authors.chars().take(MAX_AUTHORS_CHARS).collect::<String>() + "..."
        } else {
            authors
        };

        format!(
            r#"
    <div class="paper">
        <div class="paper-title">{index}. {title}{date_badge}{quality_badge}</div>
        <div class="meta">
            <div class="meta-item"><strong>👥 {authors_label}:</strong> {authors}</div>
            <div class="meta-item"><strong>📅 {published_label}:</strong> {published}</div>
            <div class="meta-item"><strong>🏷️ {categories_label}:</strong> <div class="categories">{categories_html}</div></div>
            <div class="meta-item"><strong>📊 {score_label}:</strong> {score:.1}</div>
        </div>
        <div class="summary">
            <div class="summary-title">🤖 {summary_label}</div>
            <div>{summary}</div>
        </div>
        <div class="links">
            <a href="{pdf_url}" class="link-button">📄 {view_pdf}</a>
        </div>
    </div>
"#,
            title = escape_html(&paper.title),
            date_badge = self.date_badge(paper.published_date()),
            authors_label = self.t("authors"),
            authors = escape_html(&authors_display),
            published_label = self.t("published"),
            published = paper.published.format("%Y-%m-%d %H:%M"),
            categories_label = self.t("categories"),
            score_label = self.t("quality_score"),
            score = paper.quality_score,
            summary_label = self.t("ai_summary"),
            summary = self.render_summary(&item.summary),
            pdf_url = escape_html(&paper.pdf_url),
            view_pdf = self.t("view_pdf"),
        )
    }

    fn date_badge(&self, date: NaiveDate) -> String {
        let (class, label) = match (self.today - date).num_days() {
            d if d <= 0 => ("date-today", self.t("new_today").to_string()),
            1 => ("date-yesterday", self.t("yesterday_label").to_string()),
            d => (
                "date-older",
                self.t("days_ago_label").replace("{days}", &d.to_string()),
            ),
        };
        format!(r#"<span class="date-badge {}">{}</span>"#, class, label)
    }

    fn render_summary(&self, summary: &Summary) -> String {
        match (self.language, summary) {
            (EmailLanguage::Both, Summary::Bilingual { zh, en }) => format!(
                r#"
                <div style="margin-bottom: 15px;">
                    <div style="font-weight: bold; color: #667eea; margin-bottom: 8px;">🇨🇳 中文摘要</div>
                    <div>{}</div>
                </div>
                <div>
                    <div style="font-weight: bold; color: #667eea; margin-bottom: 8px;">🇬🇧 English Summary</div>
                    <div>{}</div>
                </div>"#,
                summary_to_html(zh),
                summary_to_html(en)
            ),
            (language, summary) => summary_to_html(summary.text(language)),
        }
    }

    fn t(&self, key: &'static str) -> &'static str {
        text(self.language, key)
    }
}

/// HTML 转义
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 摘要文本转 HTML：转义、`**粗体**` 转 `<strong>`、换行转 `<br>`
pub fn summary_to_html(summary: &str) -> String {
    let mut html = escape_html(summary.trim());
    if let Ok(re) = Regex::new(r"\*\*(.+?)\*\*") {
        html = re.replace_all(&html, "<strong>$1</strong>").into_owned();
    }
    html.replace('\n', "<br>")
}
