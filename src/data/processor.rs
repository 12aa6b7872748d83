//! Data Processor Module
//! Columnar vote table and the filter + aggregate step behind every linked view.

use crate::data::loader::{DayRecord, AGE_BUCKETS, PRIORITY_COUNT};
use crate::data::range::{day_number, TimeRange};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Day {day} has {found} {kind} values, expected {expected}")]
    RaggedRecord {
        day: String,
        kind: &'static str,
        found: usize,
        expected: usize,
    },
}

const DAY_COL: &str = "day";
const COUNT_COL: &str = "count";
const PRIORITY_PREFIX: &str = "p";
const AGE_PREFIX: &str = "a";

fn column_names(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

/// All per-day votes in one DataFrame:
/// `day` (days since epoch), `count`, `p0..p14`, `a0..a99`.
#[derive(Clone)]
pub struct VoteTable {
    df: DataFrame,
}

impl VoteTable {
    /// Build the table from parsed records.
    pub fn from_records(records: &[DayRecord]) -> Result<Self, ProcessorError> {
        for r in records {
            Self::check_width(r, "priority", r.priorities.len(), PRIORITY_COUNT)?;
            Self::check_width(r, "age", r.ages.len(), AGE_BUCKETS)?;
        }

        let mut columns = Vec::with_capacity(2 + PRIORITY_COUNT + AGE_BUCKETS);
        columns.push(Column::new(
            DAY_COL.into(),
            records.iter().map(|r| day_number(r.date)).collect::<Vec<i32>>(),
        ));
        columns.push(Column::new(
            COUNT_COL.into(),
            records.iter().map(|r| r.count).collect::<Vec<i64>>(),
        ));

        for (i, name) in column_names(PRIORITY_PREFIX, PRIORITY_COUNT).into_iter().enumerate() {
            let values: Vec<i64> = records.iter().map(|r| r.priorities[i]).collect();
            columns.push(Column::new(name.into(), values));
        }
        for (i, name) in column_names(AGE_PREFIX, AGE_BUCKETS).into_iter().enumerate() {
            let values: Vec<i64> = records.iter().map(|r| r.ages[i]).collect();
            columns.push(Column::new(name.into(), values));
        }

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    fn check_width(
        record: &DayRecord,
        kind: &'static str,
        found: usize,
        expected: usize,
    ) -> Result<(), ProcessorError> {
        if found == expected {
            Ok(())
        } else {
            Err(ProcessorError::RaggedRecord {
                day: record.date.to_string(),
                kind,
                found,
                expected,
            })
        }
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// First and last day present in the table.
    pub fn day_extent(&self) -> Option<(i32, i32)> {
        let days = self.df.column(DAY_COL).ok()?.i32().ok()?;
        Some((days.min()?, days.max()?))
    }

    /// `(day, count)` points for the whole table.
    pub fn daily_counts(&self) -> Result<Vec<[f64; 2]>, ProcessorError> {
        Self::day_count_points(&self.df)
    }

    /// Daily counts of the days inside the selection.
    pub fn daily_counts_in(
        &self,
        selection: Option<&TimeRange>,
    ) -> Result<Vec<f64>, ProcessorError> {
        let filtered = self.filtered(selection)?;
        Ok(Self::day_count_points(&filtered)?
            .into_iter()
            .map(|[_, count]| count)
            .collect())
    }

    /// Rows whose day lies inside the selection (inclusive); all rows for `None`.
    ///
    /// Always filters the full table, never a previous result.
    pub fn filtered(&self, selection: Option<&TimeRange>) -> Result<DataFrame, ProcessorError> {
        let Some(range) = selection else {
            return Ok(self.df.clone());
        };
        let (lo, hi) = range.day_bounds();
        let filtered = self
            .df
            .clone()
            .lazy()
            .filter(col(DAY_COL).gt_eq(lit(lo)).and(col(DAY_COL).lt_eq(lit(hi))))
            .collect()?;
        Ok(filtered)
    }

    /// Total votes per priority over the selected days.
    pub fn votes_per_priority(
        &self,
        selection: Option<&TimeRange>,
    ) -> Result<Vec<f64>, ProcessorError> {
        self.column_sums(selection, &column_names(PRIORITY_PREFIX, PRIORITY_COUNT))
    }

    /// Total votes per age over the selected days.
    pub fn votes_per_age(&self, selection: Option<&TimeRange>) -> Result<Vec<f64>, ProcessorError> {
        self.column_sums(selection, &column_names(AGE_PREFIX, AGE_BUCKETS))
    }

    fn column_sums(
        &self,
        selection: Option<&TimeRange>,
        names: &[String],
    ) -> Result<Vec<f64>, ProcessorError> {
        let exprs: Vec<Expr> = names.iter().map(|n| col(n.as_str()).sum()).collect();
        let totals = self.filtered(selection)?.lazy().select(exprs).collect()?;

        let mut sums = Vec::with_capacity(names.len());
        for name in names {
            let column = totals.column(name)?.cast(&DataType::Float64)?;
            sums.push(column.f64()?.get(0).unwrap_or(0.0));
        }
        Ok(sums)
    }

    fn day_count_points(df: &DataFrame) -> Result<Vec<[f64; 2]>, ProcessorError> {
        let days = df.column(DAY_COL)?.cast(&DataType::Float64)?;
        let counts = df.column(COUNT_COL)?.cast(&DataType::Float64)?;

        Ok(days
            .f64()?
            .into_iter()
            .zip(counts.f64()?.into_iter())
            .filter_map(|(d, c)| Some([d?, c?]))
            .collect())
    }
}
