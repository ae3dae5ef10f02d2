//! CLI argument parsing for damon-report

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::heatmap::Resolution;
use crate::interval::Interval;
use crate::report::{AsciiColor, Report};
use crate::wss::{PercentileRange, SortMode};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "damon-report")]
#[command(version)]
#[command(about = "Analyze DAMON damon_aggregated traces", long_about = None)]
pub struct Cli {
    /// Report type
    #[arg(value_enum)]
    pub report: Report,

    /// Trace file: `perf script` output or JSON lines (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// TOML file with default settings; command-line flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report sizes in bytes
    #[arg(long)]
    pub sz_bytes: bool,

    /// Visualize the wss distribution or heatmap into this image file
    #[arg(long, value_name = "OUTPUT_FILE")]
    pub plot: Option<PathBuf>,

    /// Sort working set sizes by
    #[arg(long, value_enum)]
    pub wss_sort: Option<SortMode>,

    /// Percentile range
    #[arg(long, value_name = "BEGIN,END,INTERVAL")]
    pub wss_range: Option<String>,

    /// Id of monitoring target for heatmap
    #[arg(long, value_name = "TARGET_ID")]
    pub heatmap_target: Option<u64>,

    /// Visualize in ascii art
    #[arg(long)]
    pub heatmap_plot_ascii: bool,

    /// Color theme for temperatures
    #[arg(long, value_enum)]
    pub heatmap_ascii_color: Option<AsciiColor>,

    /// Resolutions for time and space axes
    #[arg(long, num_args = 2, value_names = ["TIME", "SPACE"])]
    pub heatmap_res: Option<Vec<usize>>,

    /// Start and end time of the heatmap (ns)
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    pub heatmap_time_range: Option<Vec<u64>>,

    /// Start and end address of the heatmap
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    pub heatmap_space_range: Option<Vec<u64>>,

    /// Display in absolute addresses
    #[arg(long)]
    pub heatmap_abs_addr: bool,

    /// Display in absolute time
    #[arg(long)]
    pub heatmap_abs_time: bool,

    /// Reject events whose target or region count disagrees with the open snapshot
    #[arg(long)]
    pub strict: bool,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}

fn pair_interval(flag: &str, values: &[u64]) -> Result<Interval> {
    let input = format!(
        "{} {}",
        flag,
        values
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );
    match *values {
        [start, end] if start < end => Ok(Interval::new(start, end)),
        [_, _] => Err(ReportError::malformed_range(&input, "start must be below end")),
        _ => Err(ReportError::malformed_range(&input, "expected 2 values")),
    }
}

impl Cli {
    /// Merge flags over the config file (or defaults)
    pub fn into_config(self) -> Result<ReportConfig> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_toml_file(path)?,
            None => ReportConfig::default(),
        };

        config.report = self.report;
        if self.input.is_some() {
            config.input = self.input;
        }
        if self.plot.is_some() {
            config.plot = self.plot;
        }
        config.sz_bytes |= self.sz_bytes;
        config.strict |= self.strict;

        if let Some(sort) = self.wss_sort {
            config.wss_sort = sort;
        }
        if let Some(range) = &self.wss_range {
            config.wss_range = PercentileRange::parse(range)?;
        }

        let hm = &mut config.heatmap;
        if self.heatmap_target.is_some() {
            hm.target = self.heatmap_target;
        }
        if let Some(color) = self.heatmap_ascii_color {
            hm.ascii_color = color;
        }
        if let Some(res) = &self.heatmap_res {
            if let [time, space] = res[..] {
                hm.resolution = Resolution::new(time, space);
            }
        }
        if let Some(range) = &self.heatmap_time_range {
            hm.time_range = Some(pair_interval("--heatmap-time-range", range)?);
        }
        if let Some(range) = &self.heatmap_space_range {
            hm.addr_range = Some(pair_interval("--heatmap-space-range", range)?);
        }
        hm.ascii |= self.heatmap_plot_ascii;
        hm.abs_addr |= self.heatmap_abs_addr;
        hm.abs_time |= self.heatmap_abs_time;

        Ok(config)
    }
}
