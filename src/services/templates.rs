//! 邮件界面文本
//!
//! 中英文各一张编译期查找表，占位符 `{count}` / `{days}` / `{total}` / `{parts}`
//! 由调用方替换。

use phf::phf_map;

use crate::config::EmailLanguage;

static ZH: phf::Map<&'static str, &'static str> = phf_map! {
    "title" => "arXiv 每日论文推送",
    "date_notice" => "论文日期提醒",
    "published_today" => "<strong>{count} 篇</strong>是今天发布",
    "published_yesterday" => "<strong>{count} 篇</strong>是昨天发布",
    "published_older_single" => "<strong>{count} 篇</strong>是 {days} 天前发布（可能已读过）",
    "published_older_multi" => "<strong>{count} 篇</strong>是 2 天及更早前发布（可能已读过）",
    "notice_text" => "本次推送的 {total} 篇论文中，{parts}。",
    "notice_separator" => "、",
    "new_today" => "今日新发布",
    "yesterday_label" => "昨日发布",
    "days_ago_label" => "{days} 天前",
    "high_quality" => "⭐ 高质量",
    "authors" => "作者",
    "published" => "发布日期",
    "categories" => "分类",
    "quality_score" => "质量评分",
    "ai_summary" => "AI 摘要",
    "view_pdf" => "查看 PDF",
    "footer_auto" => "本邮件由 arXiv Daily Summarizer 自动生成",
    "footer_powered" => "由 DeepSeek AI 提供摘要服务",
};

static EN: phf::Map<&'static str, &'static str> = phf_map! {
    "title" => "arXiv Daily Paper Digest",
    "date_notice" => "Date Notice",
    "published_today" => "<strong>{count} papers</strong> published today",
    "published_yesterday" => "<strong>{count} papers</strong> published yesterday",
    "published_older_single" => "<strong>{count} paper</strong> published {days} days ago (may have been read)",
    "published_older_multi" => "<strong>{count} papers</strong> published 2+ days ago (may have been read)",
    "notice_text" => "Of the {total} papers in this digest, {parts}.",
    "notice_separator" => ", ",
    "new_today" => "NEW TODAY",
    "yesterday_label" => "YESTERDAY",
    "days_ago_label" => "{days} DAYS AGO",
    "high_quality" => "⭐ HIGH QUALITY",
    "authors" => "Authors",
    "published" => "Published",
    "categories" => "Categories",
    "quality_score" => "Quality Score",
    "ai_summary" => "AI Summary",
    "view_pdf" => "View PDF",
    "footer_auto" => "Generated automatically by arXiv Daily Summarizer",
    "footer_powered" => "Powered by DeepSeek AI",
};

/// 按语言查找界面文本，缺失的键回退到英文，再回退到键名本身
pub fn text(language: EmailLanguage, key: &'static str) -> &'static str {
    let table = match language.chrome_language() {
        EmailLanguage::Zh => &ZH,
        _ => &EN,
    };
    table
        .get(key)
        .or_else(|| EN.get(key))
        .copied()
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_have_same_keys() {
        for key in ZH.keys() {
            assert!(EN.contains_key(key), "英文缺少 {}", key);
        }
        assert_eq!(ZH.len(), EN.len());
    }

    #[test]
    fn test_bilingual_uses_english_chrome() {
        assert_eq!(text(EmailLanguage::Both, "title"), "arXiv Daily Paper Digest");
        assert_eq!(text(EmailLanguage::Zh, "title"), "arXiv 每日论文推送");
        assert_eq!(text(EmailLanguage::En, "missing_key"), "missing_key");
    }
}
