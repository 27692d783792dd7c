use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// arXiv API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 邮件发送错误
    #[error("邮件错误: {0}")]
    Mail(#[from] MailError),
    /// 文件读写错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 选择配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 选择配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 配置项取值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// 每个分类的保底数量之和超过了推送总数
    #[error(
        "每个分类至少 {min_per_category} 篇 × {category_count} 个分类超过了推送上限 {max_results}"
    )]
    MinimumExceedsMaximum {
        min_per_category: usize,
        category_count: usize,
        max_results: usize,
    },
}

/// arXiv API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP 状态码异常或 arXiv 返回错误条目
    #[error("API返回错误响应 ({endpoint}): status={status:?}, message={message}")]
    BadResponse {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// Atom XML 解析失败
    #[error("XML解析失败: {source}")]
    XmlParseFailed {
        #[source]
        source: quick_xml::Error,
    },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("LLM 请求构建失败: {source}")]
    RequestBuildFailed {
        #[source]
        source: async_openai::error::OpenAIError,
    },

    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },

    /// 调用超时
    #[error("LLM API调用超时 (模型: {model}, {timeout_secs}秒)")]
    Timeout { model: String, timeout_secs: u64 },

    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 邮件发送错误
#[derive(Debug, Error)]
pub enum MailError {
    /// 邮箱地址非法
    #[error("邮箱地址非法 ({address}): {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// 构建邮件失败
    #[error("构建邮件失败: {0}")]
    BuildFailed(#[from] lettre::error::Error),

    /// SMTP 传输失败
    #[error("SMTP 发送失败 ({server}): {source}")]
    SmtpFailed {
        server: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }
}

impl ApiError {
    /// 创建API请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 是否值得重试：网络错误、5xx 和 429
    ///
    /// arXiv 的错误条目随 200 返回，不会被重试。
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::RequestFailed { .. } => true,
            ApiError::BadResponse {
                status: Some(status),
                ..
            } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl LlmError {
    /// 创建LLM API调用错误
    pub fn api_failed(model: impl Into<String>, source: async_openai::error::OpenAIError) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
