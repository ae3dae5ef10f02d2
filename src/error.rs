//! Error taxonomy for trace reconstruction and report generation
//!
//! Library code returns these typed errors; the binary wraps them in
//! `anyhow` at the boundary.

use crate::record::TargetId;
use thiserror::Error;

/// Errors raised while grouping events into snapshots
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconstructError {
    #[error("event declares a snapshot of zero regions (target {target_id})")]
    ZeroRegionCount { target_id: TargetId },

    #[error("region start {start:#x} is above its end {end:#x}")]
    InvertedRegion { start: u64, end: u64 },

    #[error("event for target {found} arrived inside an open snapshot of target {expected}")]
    TargetMismatch { expected: TargetId, found: TargetId },

    #[error("event declares {found} regions inside a snapshot opened with {expected}")]
    RegionCountMismatch { expected: u32, found: u32 },
}

/// Errors that can occur while reading traces or producing reports
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("malformed range '{input}': {reason}")]
    MalformedRange { input: String, reason: String },

    #[error("unsupported plot file type '{0}'. Use one in [pdf, jpeg, png, svg]")]
    UnsupportedPlotFormat(String),

    #[error("line {line}: cannot parse damon_aggregated event: {reason}")]
    EventParse { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Reconstruct {
        line: usize,
        #[source]
        source: ReconstructError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("plotter failed: {0}")]
    Plotter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub(crate) fn malformed_range(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
