//! Report configuration
//!
//! Values only: the CLI or a TOML file fills a [`ReportConfig`], which is
//! validated before any trace is read so that bad ranges or plot targets fail
//! fast.

use crate::error::{ReportError, Result};
use crate::heatmap::{HeatmapRequest, Resolution};
use crate::interval::Interval;
use crate::plot::PlotFormat;
use crate::record::TargetId;
use crate::report::{AsciiColor, Report};
use crate::wss::{PercentileRange, SortMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Address resolution above which ASCII output falls back to a terminal-sized grid
const ASCII_MAX_SPACE_RESOLUTION: usize = 300;
const ASCII_RESOLUTION: Resolution = Resolution {
    time: 40,
    space: 80,
};

/// Heatmap-specific settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Target to draw (default: widest target)
    pub target: Option<TargetId>,
    /// Time range in ns (default: the target's whole record)
    pub time_range: Option<Interval>,
    /// Address range (default: the target's largest contiguous span)
    pub addr_range: Option<Interval>,
    pub resolution: Resolution,
    /// Render as coloured terminal text instead of pixel lines
    pub ascii: bool,
    pub ascii_color: AsciiColor,
    /// Print absolute times instead of offsets from the range start
    pub abs_time: bool,
    /// Print absolute addresses instead of offsets from the range start
    pub abs_addr: bool,
}

impl HeatmapConfig {
    pub fn request(&self) -> HeatmapRequest {
        HeatmapRequest {
            target_id: self.target,
            time_range: self.time_range,
            addr_range: self.addr_range,
        }
    }
}

/// Complete configuration of one report invocation
///
/// # Example
/// ```
/// use damon_report::config::ReportConfig;
///
/// let config = ReportConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.heatmap.resolution.time, 800);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub report: Report,
    /// Trace file (stdin when absent)
    pub input: Option<PathBuf>,
    /// Print sizes in bytes instead of human-readable units
    pub sz_bytes: bool,
    /// Image file to plot into with gnuplot
    pub plot: Option<PathBuf>,
    pub wss_sort: SortMode,
    pub wss_range: PercentileRange,
    pub heatmap: HeatmapConfig,
    /// Reject events that disagree with the open snapshot's target or size
    pub strict: bool,
}

impl ReportConfig {
    /// Load from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.wss_range.validate().map_err(|reason| ReportError::MalformedRange {
            input: format!(
                "{},{},{}",
                self.wss_range.begin, self.wss_range.end, self.wss_range.interval
            ),
            reason,
        })?;

        for range in [self.heatmap.time_range, self.heatmap.addr_range]
            .into_iter()
            .flatten()
        {
            if range.is_empty() {
                return Err(ReportError::malformed_range(
                    &range.to_string(),
                    "start must be below end",
                ));
            }
        }

        let resolution = self.heatmap.resolution;
        if resolution.time == 0 || resolution.space == 0 {
            return Err(ReportError::InvalidConfig(format!(
                "heatmap resolution must be positive, got {}x{}",
                resolution.time, resolution.space
            )));
        }

        if let Some(path) = self.plot.as_deref().filter(|_| self.report.is_plottable()) {
            PlotFormat::from_path(path)?;
            if self.report == Report::Heatmap && self.heatmap.ascii {
                return Err(ReportError::InvalidConfig(
                    "ascii heatmaps cannot be plotted; drop --plot or --heatmap-plot-ascii"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Plot format for plottable reports
    ///
    /// Returns `Ok(None)` when no plot was requested or the report has no
    /// plot; an unknown extension is an error.
    pub fn plot_format(&self) -> Result<Option<PlotFormat>> {
        match &self.plot {
            Some(path) if self.report.is_plottable() => PlotFormat::from_path(path).map(Some),
            Some(path) => {
                warn!(
                    report = ?self.report,
                    plot = %path.display(),
                    "report cannot be plotted; ignoring plot file"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Apply the settings other options imply
    ///
    /// Plotting forces byte sizes; ASCII heatmaps shrink an oversized
    /// resolution to fit a terminal.
    pub fn normalized(mut self) -> Self {
        if self.plot.is_some() && self.report.is_plottable() {
            self.sz_bytes = true;
        }
        if self.report == Report::Heatmap
            && self.heatmap.ascii
            && self.heatmap.resolution.space > ASCII_MAX_SPACE_RESOLUTION
        {
            self.heatmap.resolution = ASCII_RESOLUTION;
        }
        self
    }
}
