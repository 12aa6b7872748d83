//! Selection Summary Module
//! Descriptive statistics of whatever the brush currently covers.

use statrs::statistics::{Data, Distribution, Median, OrderStatistics};

/// Statistics for the selected days.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSummary {
    pub days: usize,
    pub total_votes: f64,
    pub mean_per_day: Option<f64>,
    pub median_per_day: Option<f64>,
    pub std_per_day: Option<f64>,
    pub p05_per_day: Option<f64>,
    pub p95_per_day: Option<f64>,
    pub mean_age: Option<f64>,
    pub median_age: Option<usize>,
    /// Index of the most voted priority.
    pub top_priority: Option<usize>,
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl SelectionSummary {
    /// Build from the daily counts, the age histogram and the priority totals
    /// of the current selection.
    pub fn from_parts(daily_counts: &[f64], ages: &[f64], priorities: &[f64]) -> Self {
        let mut summary = SelectionSummary {
            days: daily_counts.len(),
            total_votes: daily_counts.iter().sum(),
            ..Default::default()
        };

        if !daily_counts.is_empty() {
            let mut data = Data::new(daily_counts.to_vec());
            summary.mean_per_day = data.mean().and_then(finite);
            summary.median_per_day = finite(data.median());
            summary.std_per_day = data.std_dev().and_then(finite);
            summary.p05_per_day = finite(data.percentile(5));
            summary.p95_per_day = finite(data.percentile(95));
        }

        summary.mean_age = Self::histogram_mean(ages);
        summary.median_age = Self::histogram_median(ages);
        summary.top_priority = priorities
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > 0.0)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i);

        summary
    }

    /// Mean of a histogram whose bucket index is the value.
    fn histogram_mean(counts: &[f64]) -> Option<f64> {
        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let weighted: f64 = counts.iter().enumerate().map(|(i, c)| i as f64 * c).sum();
        Some(weighted / total)
    }

    /// Smallest bucket at which the cumulative count reaches half the total.
    fn histogram_median(counts: &[f64]) -> Option<usize> {
        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let mut cumulative = 0.0;
        for (i, c) in counts.iter().enumerate() {
            cumulative += c;
            if cumulative >= total / 2.0 {
                return Some(i);
            }
        }
        None
    }
}
