//! # arXiv Digest
//!
//! 每日抓取 arXiv 指定分类的最新论文，筛选后生成 AI 摘要并以邮件推送
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 所有对外 I/O：arXiv Atom API、OpenAI 兼容的对话 API、SMTP
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只有一种能力
//! - `Scorer` - 质量评分
//! - `Deduplicator` - 标题相似度去重
//! - `Balancer` - 分类保底 + 按分数补位
//! - `SummaryService` - AI 摘要
//! - `Renderer` - HTML 邮件渲染
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - `SelectionFlow`：评分 → 去重 → 平衡 → 排序，纯内存计算
//!
//! ### ④ 编排层（App）
//! - `app` - 抓取 → 筛选 → 摘要 → 渲染 → 投递，输出统计信息
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, EmailLanguage, SelectionConfig};
pub use error::{AppError, AppResult};
pub use models::{Paper, RawEntry, SummarizedPaper, Summary};
pub use workflow::{Selection, SelectionFlow};
