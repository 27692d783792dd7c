use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 邮件语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailLanguage {
    /// 中文
    Zh,
    /// 英文
    En,
    /// 中英双语
    Both,
}

impl EmailLanguage {
    /// 需要生成摘要的语言列表
    pub fn summary_languages(self) -> &'static [EmailLanguage] {
        match self {
            EmailLanguage::Zh => &[EmailLanguage::Zh],
            EmailLanguage::En => &[EmailLanguage::En],
            EmailLanguage::Both => &[EmailLanguage::Zh, EmailLanguage::En],
        }
    }

    /// 界面文本使用的语言（双语模式使用英文界面）
    pub fn chrome_language(self) -> EmailLanguage {
        match self {
            EmailLanguage::Zh => EmailLanguage::Zh,
            EmailLanguage::En | EmailLanguage::Both => EmailLanguage::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            EmailLanguage::Zh => "zh",
            EmailLanguage::En => "en",
            EmailLanguage::Both => "both",
        }
    }
}

impl FromStr for EmailLanguage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zh" => Ok(EmailLanguage::Zh),
            "en" => Ok(EmailLanguage::En),
            "both" => Ok(EmailLanguage::Both),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "EMAIL_LANGUAGE".to_string(),
                value: other.to_string(),
                expected_type: "zh | en | both".to_string(),
            }),
        }
    }
}

impl fmt::Display for EmailLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 论文筛选配置
///
/// 评分、去重、分类平衡三个阶段共用的参数，全部显式传入各个服务，
/// 可以通过 `SELECTION_CONFIG` 指向的 TOML 文件覆盖任意字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// 关注的 arXiv 分类，顺序即分类枚举顺序
    pub categories: Vec<String>,
    /// 每日推送的论文数量上限
    pub max_results: usize,
    /// 每个分类至少推送的论文数量
    pub min_per_category: usize,
    /// 每个分类从 API 拉取的候选数量，缺省为 `max_results * 2`
    pub fetch_per_category: Option<usize>,
    /// 标题相似度阈值，达到即视为重复
    pub similarity_threshold: f64,
    /// 摘要最短长度（字符）
    pub min_abstract_length: usize,
    /// 摘要长度得分饱和的长度（字符）
    pub abstract_saturation_length: usize,
    /// 是否直接剔除摘要过短的论文
    pub exclude_short_abstracts: bool,
    /// 作者数量得分封顶的人数
    pub author_cap: usize,
    /// 标题关键词
    pub keywords: Vec<String>,
    /// 每命中一个关键词的加分
    pub keyword_bonus: f64,
    /// 新鲜度加分窗口（天）
    pub recency_window_days: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            categories: vec!["math.OC".to_string(), "eess.SY".to_string()],
            max_results: 50,
            min_per_category: 1,
            fetch_per_category: None,
            similarity_threshold: 0.85,
            min_abstract_length: 100,
            abstract_saturation_length: 500,
            exclude_short_abstracts: false,
            author_cap: 3,
            keywords: [
                "novel",
                "efficient",
                "state-of-the-art",
                "breakthrough",
                "improved",
                "transformer",
                "attention",
                "neural",
                "deep learning",
                "framework",
                "benchmark",
                "dataset",
                "evaluation",
                "survey",
                "review",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            keyword_bonus: 0.5,
            recency_window_days: 3,
        }
    }
}

impl SelectionConfig {
    /// 从 TOML 文件加载，未出现的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: String::new(),
            source,
        })
    }

    /// 每个分类实际拉取的数量
    pub fn fetch_limit(&self) -> usize {
        self.fetch_per_category
            .unwrap_or(self.max_results.saturating_mul(2))
    }

    /// 启动时校验配置，避免在流水线中途才发现问题
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_results",
                reason: "必须大于等于 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "similarity_threshold",
                reason: format!("{} 不在 [0, 1] 区间内", self.similarity_threshold),
            });
        }
        if self.categories.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "categories",
                reason: "至少需要一个分类".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "categories",
                    reason: "分类名不能为空".to_string(),
                });
            }
            if !seen.insert(category.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "categories",
                    reason: format!("分类 {} 重复", category),
                });
            }
        }
        if self.author_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "author_cap",
                reason: "必须大于等于 1".to_string(),
            });
        }
        if self.abstract_saturation_length <= self.min_abstract_length {
            return Err(ConfigError::InvalidValue {
                field: "abstract_saturation_length",
                reason: format!(
                    "{} 必须大于 min_abstract_length ({})",
                    self.abstract_saturation_length, self.min_abstract_length
                ),
            });
        }
        if self.fetch_limit() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_per_category",
                reason: "必须大于等于 1".to_string(),
            });
        }
        if self.min_per_category.saturating_mul(self.categories.len()) > self.max_results {
            return Err(ConfigError::MinimumExceedsMaximum {
                min_per_category: self.min_per_category,
                category_count: self.categories.len(),
                max_results: self.max_results,
            });
        }
        Ok(())
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 筛选配置
    pub selection: SelectionConfig,
    /// 邮件语言
    pub email_language: EmailLanguage,
    /// arXiv API 地址
    pub arxiv_api_url: String,
    /// 单次 HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_timeout_secs: u64,
    // --- 邮件配置 ---
    pub sender_email: String,
    pub sender_password: String,
    pub receiver_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    /// 只生成 HTML 文件，不发送邮件
    pub dry_run: bool,
    /// dry run 时 HTML 的输出路径
    pub output_html_file: String,
    /// 入选论文的 JSON 报告路径（可选）
    pub report_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            email_language: EmailLanguage::Zh,
            arxiv_api_url: "http://export.arxiv.org/api/query".to_string(),
            http_timeout_secs: 30,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api-inference.modelscope.cn/v1".to_string(),
            llm_model_name: "deepseek-ai/DeepSeek-V3.2".to_string(),
            llm_timeout_secs: 120,
            sender_email: String::new(),
            sender_password: String::new(),
            receiver_email: String::new(),
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            dry_run: false,
            output_html_file: "digest.html".to_string(),
            report_file: None,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，并校验筛选参数
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源加载配置（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let selection = match get("SELECTION_CONFIG") {
            Some(path) => SelectionConfig::from_toml_file(path)?,
            None => default.selection,
        };
        selection.validate()?;

        let dry_run = parse_var(&get, "DRY_RUN", default.dry_run)?;

        let llm_api_key = get("LLM_API_KEY").or_else(|| get("DEEPSEEK_API_KEY"));
        let require = |name: &str, value: Option<String>| -> Result<String, ConfigError> {
            match value {
                Some(v) => Ok(v),
                None if dry_run => Ok(String::new()),
                None => Err(ConfigError::EnvVarNotFound {
                    var_name: name.to_string(),
                }),
            }
        };

        Ok(Self {
            selection,
            email_language: match get("EMAIL_LANGUAGE") {
                Some(v) => v.parse()?,
                None => default.email_language,
            },
            arxiv_api_url: get("ARXIV_API_URL").unwrap_or(default.arxiv_api_url),
            http_timeout_secs: parse_var(&get, "HTTP_TIMEOUT_SECS", default.http_timeout_secs)?,
            llm_api_key: require("LLM_API_KEY", llm_api_key)?,
            llm_api_base_url: get("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: get("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_timeout_secs: parse_var(&get, "LLM_TIMEOUT_SECS", default.llm_timeout_secs)?,
            sender_email: require("SENDER_EMAIL", get("SENDER_EMAIL"))?,
            sender_password: require("SENDER_PASSWORD", get("SENDER_PASSWORD"))?,
            receiver_email: require("RECEIVER_EMAIL", get("RECEIVER_EMAIL"))?,
            smtp_server: get("SMTP_SERVER").unwrap_or(default.smtp_server),
            smtp_port: parse_var(&get, "SMTP_PORT", default.smtp_port)?,
            dry_run,
            output_html_file: get("OUTPUT_HTML_FILE").unwrap_or(default.output_html_file),
            report_file: get("REPORT_FILE"),
        })
    }
}

fn parse_var<T, G>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DEEPSEEK_API_KEY", "sk-test"),
            ("SENDER_EMAIL", "bot@example.com"),
            ("SENDER_PASSWORD", "secret"),
            ("RECEIVER_EMAIL", "me@example.com"),
        ]
    }

    #[test]
    fn test_default_selection_is_valid() {
        assert!(SelectionConfig::default().validate().is_ok());
        assert_eq!(SelectionConfig::default().fetch_limit(), 100);
    }

    #[test]
    fn test_from_lookup_uses_defaults() {
        let config = Config::from_lookup(lookup(&required())).unwrap();
        assert_eq!(config.llm_api_key, "sk-test");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.email_language, EmailLanguage::Zh);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_missing_required_var() {
        let err = Config::from_lookup(lookup(&[("DEEPSEEK_API_KEY", "sk-test")])).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { ref var_name } if var_name == "SENDER_EMAIL"));
    }

    #[test]
    fn test_dry_run_skips_credentials() {
        let config = Config::from_lookup(lookup(&[("DRY_RUN", "true")])).unwrap();
        assert!(config.dry_run);
        assert!(config.sender_email.is_empty());
    }

    #[test]
    fn test_bad_port_is_reported() {
        let mut vars = required();
        vars.push(("SMTP_PORT", "abc"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { ref var_name, .. } if var_name == "SMTP_PORT"));
    }

    #[test]
    fn test_email_language_parse() {
        assert_eq!("Both".parse::<EmailLanguage>().unwrap(), EmailLanguage::Both);
        assert_eq!(EmailLanguage::Both.chrome_language(), EmailLanguage::En);
        assert_eq!(EmailLanguage::Both.summary_languages().len(), 2);
        assert!("fr".parse::<EmailLanguage>().is_err());
    }

    #[test]
    fn test_minimum_exceeds_maximum() {
        let config = SelectionConfig {
            categories: vec!["cs.LG".into(), "cs.CV".into(), "cs.CL".into()],
            max_results: 5,
            min_per_category: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MinimumExceedsMaximum { category_count: 3, .. })
        ));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = SelectionConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let config = SelectionConfig {
            categories: vec!["math.OC".into(), "math.OC".into()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_overrides_keep_defaults() {
        let config = SelectionConfig::from_toml_str(
            r#"
            categories = ["cs.LG", "cs.AI", "stat.ML"]
            max_results = 10
            keywords = ["diffusion"]
            "#,
        )
        .unwrap();
        assert_eq!(config.categories.len(), 3);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.keywords, vec!["diffusion".to_string()]);
        assert_eq!(config.similarity_threshold, 0.85);
        assert_eq!(config.fetch_limit(), 20);
    }
}
