//! JSON Data Loader Module
//! Reads the per-day vote export and the priority metadata document.

use crate::config::AppConfig;
use crate::data::processor::{ProcessorError, VoteTable};
use crate::data::range::DATE_FORMAT;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of priorities voted on in the survey.
pub const PRIORITY_COUNT: usize = 15;
/// Age buckets 0..=99.
pub const AGE_BUCKETS: usize = 100;

pub const PER_DAY_FILE: &str = "perDayData.json";
pub const METADATA_FILE: &str = "myWorldFields.json";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {what}: {source}")]
    Json {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    JsonFile {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Invalid number for {field} on {day}: {value}")]
    InvalidNumber {
        field: String,
        day: String,
        value: String,
    },
    #[error("Failed to build vote table: {0}")]
    Table(#[from] ProcessorError),
    #[error("No data loaded")]
    NoData,
}

impl LoaderError {
    /// Attach the file a parse error came from.
    fn in_file(self, path: &Path) -> Self {
        match self {
            LoaderError::Json { source, .. } => LoaderError::JsonFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}

/// Votes recorded on a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    /// Daily vote count, including the configured offset.
    pub count: i64,
    /// Votes per priority, `PRIORITY_COUNT` entries.
    pub priorities: Vec<i64>,
    /// Votes per age, `AGE_BUCKETS` entries.
    pub ages: Vec<i64>,
}

/// Priority descriptions from the metadata document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaData {
    #[serde(default)]
    pub priorities: Vec<PriorityField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriorityField {
    #[serde(rename = "item-title", default)]
    pub item_title: String,
}

impl MetaData {
    /// Title for a priority index, or a generic label when metadata is missing.
    pub fn priority_title(&self, index: usize) -> String {
        self.priorities
            .get(index)
            .map(|p| p.item_title.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Priority {}", index + 1))
    }

    pub fn priority_titles(&self) -> Vec<String> {
        (0..PRIORITY_COUNT).map(|i| self.priority_title(i)).collect()
    }
}

/// Everything the charts need, built once per load.
pub struct Dataset {
    pub table: VoteTable,
    pub meta: MetaData,
    pub source_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawDay {
    day: String,
    #[serde(rename = "count(*)")]
    count: Value,
    #[serde(default)]
    age: Vec<RawAge>,
    /// `sum(p0)` .. `sum(p14)` plus anything else the export carries.
    #[serde(flatten)]
    sums: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawAge {
    age: Value,
    #[serde(rename = "count(*)")]
    count: Value,
}

/// Accepts JSON numbers and numeric strings.
fn number_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            })
        }
        _ => None,
    }
}

/// Handles reading and converting the two input documents.
pub struct DataLoader {
    count_offset: i64,
    per_day_file: String,
    metadata_file: String,
}

impl DataLoader {
    pub fn new(count_offset: i64) -> Self {
        Self {
            count_offset,
            per_day_file: PER_DAY_FILE.to_string(),
            metadata_file: METADATA_FILE.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            per_day_file: config.per_day_file.clone(),
            metadata_file: config.metadata_file.clone(),
            ..Self::new(config.count_offset)
        }
    }

    /// Load both documents from a directory and build the vote table.
    pub fn load_dir(&self, dir: &Path) -> Result<Dataset, LoaderError> {
        let per_day_path = dir.join(&self.per_day_file);
        let records = self
            .parse_per_day(&Self::read(&per_day_path)?)
            .map_err(|e| e.in_file(&per_day_path))?;
        if records.is_empty() {
            return Err(LoaderError::NoData);
        }
        let metadata_path = dir.join(&self.metadata_file);
        let meta = Self::parse_metadata(&Self::read(&metadata_path)?)
            .map_err(|e| e.in_file(&metadata_path))?;
        let table = VoteTable::from_records(&records)?;

        log::info!(
            "Loaded {} days and {} priority titles from {}",
            records.len(),
            meta.priorities.len(),
            dir.display()
        );

        Ok(Dataset {
            table,
            meta,
            source_dir: dir.to_path_buf(),
        })
    }

    /// Parse the per-day export into records sorted by date.
    pub fn parse_per_day(&self, json: &str) -> Result<Vec<DayRecord>, LoaderError> {
        let raw: Vec<RawDay> = serde_json::from_str(json).map_err(|source| LoaderError::Json {
            what: "per-day data",
            source,
        })?;

        let mut records = raw
            .par_iter()
            .map(|day| self.convert(day))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    pub fn parse_metadata(json: &str) -> Result<MetaData, LoaderError> {
        serde_json::from_str(json).map_err(|source| LoaderError::Json {
            what: "metadata",
            source,
        })
    }

    fn read(path: &Path) -> Result<String, LoaderError> {
        std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn number(value: &Value, field: &str, day: &str) -> Result<i64, LoaderError> {
        number_from_value(value).ok_or_else(|| LoaderError::InvalidNumber {
            field: field.to_string(),
            day: day.to_string(),
            value: value.to_string(),
        })
    }

    fn convert(&self, raw: &RawDay) -> Result<DayRecord, LoaderError> {
        let date = NaiveDate::parse_from_str(raw.day.trim(), DATE_FORMAT)
            .map_err(|_| LoaderError::InvalidDate(raw.day.clone()))?;

        let count = Self::number(&raw.count, "count(*)", &raw.day)?;

        let priorities = (0..PRIORITY_COUNT)
            .map(|i| {
                let key = format!("sum(p{i})");
                match raw.sums.get(&key) {
                    None | Some(Value::Null) => Ok(0),
                    Some(v) => Self::number(v, &key, &raw.day),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Later entries for the same age overwrite earlier ones
        let mut ages = vec![0; AGE_BUCKETS];
        for entry in &raw.age {
            let age = Self::number(&entry.age, "age", &raw.day)?;
            if (0..AGE_BUCKETS as i64).contains(&age) {
                ages[age as usize] = Self::number(&entry.count, "age count(*)", &raw.day)?;
            }
        }

        let count = count
            .checked_add(self.count_offset)
            .ok_or_else(|| LoaderError::InvalidNumber {
                field: "count(*)".to_string(),
                day: raw.day.clone(),
                value: count.to_string(),
            })?;

        Ok(DayRecord {
            date,
            count,
            priorities,
            ages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PER_DAY: &str = r#"[
        {"day": "2015-01-02", "count(*)": 4, "sum(p0)": 1, "sum(p14)": 3,
         "age": [{"age": 30, "count(*)": 2}, {"age": 120, "count(*)": 9}]},
        {"day": "2015-01-01", "count(*)": "10", "sum(p0)": "5", "sum(p1)": 2.0,
         "age": [{"age": 18, "count(*)": 7}, {"age": 99, "count(*)": 1}]}
    ]"#;

    const META: &str = r#"{"priorities": [
        {"item-title": "A good education", "item-content": "..."},
        {"item-title": "Better healthcare"}
    ]}"#;

    #[test]
    fn test_parse_per_day_sorts_and_offsets() {
        let records = DataLoader::new(1).parse_per_day(PER_DAY).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
        assert_eq!(records[0].count, 11);
        assert_eq!(records[1].count, 5);
    }

    #[test]
    fn test_parse_priorities_default_to_zero() {
        let records = DataLoader::new(0).parse_per_day(PER_DAY).unwrap();
        assert_eq!(records[0].priorities.len(), PRIORITY_COUNT);
        assert_eq!(records[0].priorities[0], 5);
        assert_eq!(records[0].priorities[1], 2);
        assert_eq!(records[0].priorities[2], 0);
        assert_eq!(records[1].priorities[14], 3);
    }

    #[test]
    fn test_parse_ages_ignores_out_of_range() {
        let records = DataLoader::new(0).parse_per_day(PER_DAY).unwrap();
        let jan1 = &records[0];
        assert_eq!(jan1.ages.len(), AGE_BUCKETS);
        assert_eq!(jan1.ages[18], 7);
        assert_eq!(jan1.ages[99], 1);

        let jan2 = &records[1];
        assert_eq!(jan2.ages[30], 2);
        assert_eq!(jan2.ages.iter().sum::<i64>(), 2);
    }

    #[test]
    fn test_repeated_age_overwrites() {
        let json = r#"[{"day": "2015-02-01", "count(*)": 1,
            "age": [{"age": 40, "count(*)": 3}, {"age": 40, "count(*)": 8}]}]"#;
        let records = DataLoader::new(0).parse_per_day(json).unwrap();
        assert_eq!(records[0].ages[40], 8);
    }

    #[test]
    fn test_invalid_date_is_reported() {
        let json = r#"[{"day": "01/02/2015", "count(*)": 1}]"#;
        let err = DataLoader::new(1).parse_per_day(json).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDate(ref d) if d == "01/02/2015"));
    }

    #[test]
    fn test_invalid_count_is_reported() {
        let json = r#"[{"day": "2015-01-01", "count(*)": "lots"}]"#;
        let err = DataLoader::new(1).parse_per_day(json).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidNumber { .. }));
    }

    #[test]
    fn test_count_overflow_is_reported() {
        let json = r#"[{"day": "2015-01-01", "count(*)": 9223372036854775807}]"#;
        let err = DataLoader::new(1).parse_per_day(json).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidNumber { ref field, .. } if field == "count(*)"));

        let records = DataLoader::new(0).parse_per_day(json).unwrap();
        assert_eq!(records[0].count, i64::MAX);
    }

    #[test]
    fn test_non_numeric_age_is_reported() {
        let json = r#"[{"day": "2015-01-01", "count(*)": 1,
            "age": [{"age": "thirty", "count(*)": 4}]}]"#;
        let err = DataLoader::new(1).parse_per_day(json).unwrap_err();
        match err {
            LoaderError::InvalidNumber { field, day, value } => {
                assert_eq!(field, "age");
                assert_eq!(day, "2015-01-01");
                assert!(value.contains("thirty"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_metadata_titles_with_fallback() {
        let meta = DataLoader::parse_metadata(META).unwrap();
        assert_eq!(meta.priority_title(0), "A good education");
        assert_eq!(meta.priority_title(1), "Better healthcare");
        assert_eq!(meta.priority_title(5), "Priority 6");
        assert_eq!(meta.priority_titles().len(), PRIORITY_COUNT);
    }

    #[test]
    fn test_load_dir_reads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PER_DAY_FILE), PER_DAY).unwrap();
        fs::write(dir.path().join(METADATA_FILE), META).unwrap();

        let dataset = DataLoader::new(1).load_dir(dir.path()).unwrap();
        assert_eq!(dataset.table.len(), 2);
        assert_eq!(dataset.meta.priorities.len(), 2);
        assert_eq!(dataset.source_dir, dir.path());
    }

    #[test]
    fn test_load_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PER_DAY_FILE), PER_DAY).unwrap();

        let err = DataLoader::new(1).load_dir(dir.path()).err().unwrap();
        match err {
            LoaderError::Io { path, .. } => assert!(path.ends_with(METADATA_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_dir_malformed_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PER_DAY_FILE), PER_DAY).unwrap();
        fs::write(dir.path().join(METADATA_FILE), "{ not json").unwrap();

        let err = DataLoader::new(1).load_dir(dir.path()).err().unwrap();
        match &err {
            LoaderError::JsonFile { path, .. } => assert!(path.ends_with(METADATA_FILE)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains(METADATA_FILE));

        fs::write(dir.path().join(PER_DAY_FILE), "[{").unwrap();
        let err = DataLoader::new(1).load_dir(dir.path()).err().unwrap();
        assert!(matches!(err, LoaderError::JsonFile { ref path, .. } if path.ends_with(PER_DAY_FILE)));
    }

    #[test]
    fn test_load_dir_empty_export() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PER_DAY_FILE), "[]").unwrap();
        fs::write(dir.path().join(METADATA_FILE), META).unwrap();

        let err = DataLoader::new(1).load_dir(dir.path()).err().unwrap();
        assert!(matches!(err, LoaderError::NoData));
    }
}
