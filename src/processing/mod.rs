//! Location history processing

pub mod compactor;

pub use compactor::{fold_sample, merge_entries, CompactorLimits, HistoryChange, HistoryCompactor};
