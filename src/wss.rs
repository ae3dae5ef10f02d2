//! Working set size distribution
//!
//! A snapshot's working set size is the total size of its regions that saw at
//! least one access. Percentiles use the nearest-rank estimator
//! `idx = floor(len * p / 100)`, clamped to the last element.

use crate::error::{ReportError, Result};
use crate::interval::parse_u64;
use crate::record::{Record, Snapshot};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Order of the series before percentiles are taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Keep snapshot order (percent of runtime)
    Time,
    /// Ascending size (true percentiles)
    #[default]
    Size,
}

/// Requested percentiles as `begin..end` stepping by `interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentileRange {
    pub begin: u64,
    pub end: u64,
    pub interval: u64,
}

impl Default for PercentileRange {
    fn default() -> Self {
        Self {
            begin: 0,
            end: 101,
            interval: 5,
        }
    }
}

impl PercentileRange {
    /// Parse `"begin,end,interval"`
    pub fn parse(input: &str) -> Result<Self> {
        let values: Vec<&str> = input.split(',').map(str::trim).collect();
        if values.len() != 3 {
            return Err(ReportError::malformed_range(
                input,
                format!("expected begin,end,interval, got {} values", values.len()),
            ));
        }
        let range = Self {
            begin: parse_u64(input, values[0])?,
            end: parse_u64(input, values[1])?,
            interval: parse_u64(input, values[2])?,
        };
        range.validate().map_err(|reason| ReportError::malformed_range(input, reason))?;
        Ok(range)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.interval == 0 {
            return Err("interval must be positive".to_string());
        }
        if self.begin > self.end {
            return Err(format!("begin {} is above end {}", self.begin, self.end));
        }
        Ok(())
    }

    /// The percentile points, end exclusive
    pub fn points(&self) -> Vec<u64> {
        if self.interval == 0 {
            return Vec::new();
        }
        (self.begin..self.end).step_by(self.interval as usize).collect()
    }
}

/// Working set size of one snapshot in bytes
pub fn snapshot_wss(snapshot: &Snapshot) -> u64 {
    snapshot
        .regions()
        .iter()
        .filter(|r| r.is_accessed())
        .map(|r| r.size())
        .sum()
}

/// One working set size per snapshot, in record order
pub fn working_set_series(record: &Record) -> Vec<u64> {
    record.snapshots.iter().map(snapshot_wss).collect()
}

/// Nearest-rank percentiles of `series`
///
/// # Example
/// ```
/// use damon_report::wss::{percentiles, SortMode};
///
/// let dist = percentiles(&[30, 10, 20], SortMode::Size, &[50]);
/// assert_eq!(dist, vec![(50, 20)]);
/// ```
pub fn percentiles(series: &[u64], sort: SortMode, points: &[u64]) -> Vec<(u64, u64)> {
    if series.is_empty() {
        return Vec::new();
    }
    let mut sizes = series.to_vec();
    if sort == SortMode::Size {
        sizes.sort_unstable();
    }

    let len = sizes.len() as u128;
    points
        .iter()
        .map(|&p| {
            // u128 so huge percentiles clamp instead of overflowing
            let idx = (len * u128::from(p) / 100).min(len - 1) as usize;
            (p, sizes[idx])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Region;

    #[test]
    fn test_wss_counts_only_accessed_regions() {
        let snapshot = Snapshot::from_regions(
            0,
            0,
            vec![Region::new(0, 10, 1).unwrap(), Region::new(10, 20, 0).unwrap()],
        );
        assert_eq!(snapshot_wss(&snapshot), 10);
    }

    #[test]
    fn test_series_follows_snapshot_order() {
        let mut record = Record::new(0);
        record.snapshots.push(Snapshot::from_regions(
            0,
            0,
            vec![Region::new(0, 100, 3).unwrap()],
        ));
        record.snapshots.push(Snapshot::from_regions(
            5,
            0,
            vec![Region::new(0, 40, 0).unwrap(), Region::new(40, 60, 9).unwrap()],
        ));
        assert_eq!(working_set_series(&record), vec![100, 20]);
    }

    #[test]
    fn test_median_of_sorted_series() {
        assert_eq!(percentiles(&[30, 10, 20], SortMode::Size, &[50]), vec![(50, 20)]);
    }

    #[test]
    fn test_time_sort_keeps_order() {
        assert_eq!(
            percentiles(&[30, 10, 20], SortMode::Time, &[0, 50]),
            vec![(0, 30), (50, 10)]
        );
    }

    #[test]
    fn test_overflowing_index_clamps_to_last() {
        assert_eq!(
            percentiles(&[5, 1, 3], SortMode::Size, &[100, 150]),
            vec![(100, 5), (150, 5)]
        );
    }

    #[test]
    fn test_huge_percentile_clamps_to_last() {
        assert_eq!(
            percentiles(&[1, 2, 3], SortMode::Size, &[u64::MAX / 2, u64::MAX]),
            vec![(u64::MAX / 2, 3), (u64::MAX, 3)]
        );
        let range = PercentileRange::parse("0,18446744073709551615,9223372036854775807").unwrap();
        let dist = percentiles(&[7, 9], SortMode::Time, &range.points());
        assert_eq!(
            dist,
            vec![(0, 7), (9223372036854775807, 9), (18446744073709551614, 9)]
        );
    }

    #[test]
    fn test_empty_series() {
        assert!(percentiles(&[], SortMode::Size, &[50]).is_empty());
    }

    #[test]
    fn test_default_range_points() {
        let points = PercentileRange::default().points();
        assert_eq!(points.len(), 21);
        assert_eq!(points.first(), Some(&0));
        assert_eq!(points.last(), Some(&100));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            PercentileRange::parse("10,50,20").unwrap().points(),
            vec![10, 30]
        );
        assert!(PercentileRange::parse("0,101").is_err());
        assert!(PercentileRange::parse("0,101,5,1").is_err());
        assert!(PercentileRange::parse("0,x,5").is_err());
        assert!(PercentileRange::parse("0,100,0").is_err());
        assert!(PercentileRange::parse("50,10,5").is_err());
    }
}
