//! Statistics module - Summary of the brushed selection

mod summary;

pub use summary::SelectionSummary;
