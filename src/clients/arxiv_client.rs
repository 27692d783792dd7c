/// arXiv API 客户端
///
/// 通过 Atom 接口按分类拉取最新论文
use std::time::Duration;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{normalize_whitespace, RawEntry};

/// arXiv 客户端
pub struct ArxivClient {
    http: reqwest::Client,
    api_url: String,
}

impl ArxivClient {
    /// 创建新的 arXiv 客户端
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!("arxiv-digest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::request_failed(&config.arxiv_api_url, e))?;

        Ok(Self {
            http,
            api_url: config.arxiv_api_url.clone(),
        })
    }

    /// 拉取某个分类下最新提交的论文
    ///
    /// 网络错误或临时性的 HTTP 错误（5xx / 429）会重试一次。
    pub async fn fetch_category(
        &self,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<RawEntry>, ApiError> {
        match self.query(category, max_results).await {
            Ok(entries) => Ok(entries),
            Err(e) if e.is_transient() => {
                warn!("  ⚠️ 请求 {} 失败 ({})，重试一次...", category, e);
                self.query(category, max_results).await
            }
            Err(e) => Err(e),
        }
    }

    async fn query(&self, category: &str, max_results: usize) -> Result<Vec<RawEntry>, ApiError> {
        let search_query = format!("cat:{}", category);
        let max_results = max_results.to_string();
        debug!("请求 arXiv API: {} {}", self.api_url, search_query);

        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("search_query", search_query.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::request_failed(&self.api_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::BadResponse {
                endpoint: self.api_url.clone(),
                status: Some(status.as_u16()),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::request_failed(&self.api_url, e))?;

        let entries = parse_feed(&body)?;

        // arXiv 的错误以一个特殊 entry 的形式返回
        if let Some(error_entry) = entries.iter().find(|e| e.id_url.contains("/api/errors")) {
            return Err(ApiError::BadResponse {
                endpoint: self.api_url.clone(),
                status: Some(status.as_u16()),
                message: error_entry.summary.clone(),
            });
        }

        Ok(entries)
    }
}

/// 当前正在读取的文本字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// 解析 Atom feed，返回所有 entry
pub fn parse_feed(body: &str) -> Result<Vec<RawEntry>, ApiError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut in_author = false;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| ApiError::XmlParseFailed { source })?;

        match event {
            Event::Eof => break,
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => current = Some(RawEntry::default()),
                    b"author" => in_author = true,
                    _ => {}
                }
                if let Some(entry) = current.as_mut() {
                    field = match name.as_ref() {
                        b"id" => Some(Field::Id),
                        b"title" => Some(Field::Title),
                        b"summary" => Some(Field::Summary),
                        b"published" => Some(Field::Published),
                        b"name" if in_author => Some(Field::AuthorName),
                        _ => None,
                    };
                    text.clear();
                    read_attributes(&e, entry);
                }
            }
            Event::Empty(e) => {
                if let Some(entry) = current.as_mut() {
                    read_attributes(&e, entry);
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    let value = t
                        .unescape()
                        .map_err(|source| ApiError::XmlParseFailed { source })?;
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&value);
                }
            }
            Event::CData(t) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let value = normalize_whitespace(&text);
                    match f {
                        Field::Id => entry.id_url = value,
                        Field::Title => entry.title = value,
                        Field::Summary => entry.summary = value,
                        Field::Published => entry.published = (!value.is_empty()).then_some(value),
                        Field::AuthorName => {
                            if !value.is_empty() {
                                entry.authors.push(value);
                            }
                        }
                    }
                    field = None;
                    text.clear();
                }
                match name.as_ref() {
                    b"author" => in_author = false,
                    b"entry" => {
                        if let Some(entry) = current.take() {
                            entries.push(entry);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

/// 读取 category / primary_category / link 标签上的属性
fn read_attributes(e: &BytesStart<'_>, entry: &mut RawEntry) {
    let attr = |key: &[u8]| -> Option<String> {
        e.attributes()
            .flatten()
            .find(|a| a.key.local_name().as_ref() == key)
            .and_then(|a| a.unescape_value().ok().map(|v| v.trim().to_string()))
            .filter(|v| !v.is_empty())
    };

    match e.local_name().as_ref() {
        b"category" => {
            if let Some(term) = attr(b"term") {
                if !entry.categories.contains(&term) {
                    entry.categories.push(term);
                }
            }
        }
        b"primary_category" => entry.primary_category = attr(b"term"),
        b"link" => {
            let is_pdf = attr(b"title").as_deref() == Some("pdf")
                || attr(b"type").as_deref() == Some("application/pdf");
            if is_pdf {
                entry.pdf_url = attr(b"href");
            }
        }
        _ => {}
    }
}
