pub mod balance_service;
pub mod dedup_service;
pub mod render_service;
pub mod scorer;
pub mod summary_service;
pub mod templates;

pub use balance_service::Balancer;
pub use dedup_service::{title_similarity, Deduplicated, Deduplicator};
pub use render_service::{DateStats, Renderer};
pub use scorer::Scorer;
pub use summary_service::SummaryService;
