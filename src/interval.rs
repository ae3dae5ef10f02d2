//! Half-open `[start, end)` intervals over addresses or nanosecond timestamps

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// True when the interval covers nothing (`start >= end`)
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Overlap test used for gap intersection
    ///
    /// Endpoints are inclusive, so intervals that merely touch overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.end >= other.start && other.end >= self.start
    }

    /// `[max(starts), min(ends)]`; only meaningful when [`Self::overlaps`] holds
    pub fn overlap(&self, other: &Interval) -> Interval {
        Interval::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Portion of `self` inside `bounds`, `None` if that portion is empty
    pub fn clip(&self, bounds: &Interval) -> Option<Interval> {
        let clipped = self.overlap(bounds);
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Parse `"start,end"` (also accepts whitespace as separator)
    pub fn parse_pair(input: &str) -> Result<Interval> {
        let values: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if values.len() != 2 {
            return Err(ReportError::malformed_range(
                input,
                format!("expected 2 values, got {}", values.len()),
            ));
        }
        let start = parse_u64(input, values[0])?;
        let end = parse_u64(input, values[1])?;
        if start >= end {
            return Err(ReportError::malformed_range(input, "start must be below end"));
        }
        Ok(Interval::new(start, end))
    }
}

pub(crate) fn parse_u64(input: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|e| ReportError::malformed_range(input, format!("'{}': {}", value, e)))
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_intervals_overlap() {
        let a = Interval::new(0, 10);
        let b = Interval::new(10, 20);
        assert!(a.overlaps(&b));
        assert_eq!(a.overlap(&b), Interval::new(10, 10));
        assert!(!a.overlaps(&Interval::new(11, 20)));
    }

    #[test]
    fn test_clip() {
        let bounds = Interval::new(100, 200);
        assert_eq!(
            Interval::new(50, 150).clip(&bounds),
            Some(Interval::new(100, 150))
        );
        assert_eq!(Interval::new(200, 300).clip(&bounds), None);
        assert_eq!(Interval::new(0, 50).clip(&bounds), None);
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(Interval::parse_pair("10,20").unwrap(), Interval::new(10, 20));
        assert_eq!(Interval::parse_pair("10 20").unwrap(), Interval::new(10, 20));
        assert!(Interval::parse_pair("10").is_err());
        assert!(Interval::parse_pair("10,20,30").is_err());
        assert!(Interval::parse_pair("a,b").is_err());
        assert!(Interval::parse_pair("20,10").is_err());
    }

    #[test]
    fn test_len_saturates() {
        assert_eq!(Interval::new(10, 5).len(), 0);
        assert!(Interval::new(10, 5).is_empty());
    }
}
