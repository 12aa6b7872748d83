//! Data module - JSON loading, vote table and time ranges

mod loader;
mod processor;
mod range;

pub use loader::{
    DataLoader, Dataset, DayRecord, MetaData, AGE_BUCKETS, METADATA_FILE, PER_DAY_FILE,
    PRIORITY_COUNT,
};
pub use processor::{ProcessorError, VoteTable};
pub use range::{day_number, format_day, TimeRange};
