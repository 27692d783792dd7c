pub mod paper;
pub mod summary;

pub use paper::{normalize_whitespace, MalformedEntry, Paper, RawEntry};
pub use summary::{SummarizedPaper, Summary};
