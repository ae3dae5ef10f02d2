//! Text reports over a reconstructed record
//!
//! [`Report`] is selected once at the boundary; each variant maps to a pure
//! function from the record and configuration to report text.

mod ascii;
mod format;

pub use ascii::{render_ascii, AsciiColor};
pub use format::format_size;

use crate::config::ReportConfig;
use crate::heatmap::{heatmap, resolve_attrs, HeatGrid, HeatmapAttrs};
use crate::profile::profile;
use crate::record::Record;
use crate::wss::{percentiles, working_set_series, PercentileRange, SortMode};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::warn;

/// Report type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Report {
    /// Every snapshot and region as recorded
    #[default]
    Raw,
    /// Working set size distribution
    Wss,
    /// Per-target time/address span and persistent gaps
    RecordProfile,
    /// Time-by-address access heat
    Heatmap,
}

/// Rendered report text plus what a plotter needs to know about it
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput {
    pub text: String,
    /// Target and ranges the heatmap was drawn for
    pub heatmap: Option<HeatmapAttrs>,
}

impl ReportOutput {
    fn text(text: String) -> Self {
        Self {
            text,
            heatmap: None,
        }
    }
}

impl Report {
    /// Whether the report can be handed to gnuplot
    pub fn is_plottable(self) -> bool {
        matches!(self, Report::Wss | Report::Heatmap)
    }

    pub fn render(self, record: &Record, config: &ReportConfig) -> ReportOutput {
        match self {
            Report::Raw => ReportOutput::text(raw_report(record, config.sz_bytes)),
            Report::Wss => ReportOutput::text(wss_report(
                record,
                config.wss_sort,
                &config.wss_range,
                config.sz_bytes,
            )),
            Report::RecordProfile => ReportOutput::text(record_profile_report(record)),
            Report::Heatmap => heatmap_report(record, config),
        }
    }
}

/// Every snapshot with its regions, times relative to the record start
pub fn raw_report(record: &Record, sz_bytes: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "start_time: {}", record.start_time);
    for snapshot in &record.snapshots {
        let _ = writeln!(
            out,
            "relative_time: {}",
            snapshot.monitored_time.saturating_sub(record.start_time)
        );
        let _ = writeln!(out, "target_id: {}", snapshot.target_id);
        let _ = writeln!(out, "nr_regions: {}", snapshot.regions().len());
        for region in snapshot.regions() {
            let _ = writeln!(
                out,
                "{:x}-{:x} ({}): {}",
                region.start(),
                region.end(),
                format_size(region.size(), sz_bytes),
                region.nr_accesses()
            );
        }
        out.push('\n');
    }
    out
}

/// `percentile size` lines
pub fn wss_report(
    record: &Record,
    sort: SortMode,
    range: &PercentileRange,
    sz_bytes: bool,
) -> String {
    let series = working_set_series(record);
    percentiles(&series, sort, &range.points())
        .into_iter()
        .fold(String::new(), |mut out, (p, size)| {
            let _ = writeln!(out, "{} {}", p, format_size(size, sz_bytes));
            out
        })
}

/// One block per target with at least two snapshots, end time extrapolated
pub fn record_profile_report(record: &Record) -> String {
    let mut out = String::new();
    for prof in profile(record).values() {
        match prof.extrapolated() {
            Some(prof) => {
                let _ = writeln!(out, "{}", prof);
            }
            None => warn!(
                target_id = prof.target_id,
                nr_snapshots = prof.nr_snapshots,
                "skipping target without enough snapshots to profile"
            ),
        }
    }
    out
}

fn heatmap_report(record: &Record, config: &ReportConfig) -> ReportOutput {
    let hm = &config.heatmap;
    let Some(attrs) = resolve_attrs(record, &hm.request()) else {
        warn!("no heatmap target or range could be derived from the record");
        return ReportOutput::text(String::new());
    };
    let grid = heatmap(record, &attrs, hm.resolution);

    let text = if hm.ascii {
        render_ascii(&grid, hm.ascii_color)
    } else {
        heat_lines(&grid, hm.abs_time, hm.abs_addr)
    };
    ReportOutput {
        text,
        heatmap: Some(attrs),
    }
}

/// `time\taddr\theat` per pixel, row-major; coordinates relative to the
/// range starts unless absolute output is requested
pub fn heat_lines(grid: &HeatGrid, abs_time: bool, abs_addr: bool) -> String {
    let time_base = if abs_time { 0 } else { grid.time_range.start };
    let addr_base = if abs_addr { 0 } else { grid.addr_range.start };

    let mut out = String::new();
    for pixel in grid.pixels() {
        let _ = writeln!(
            out,
            "{}\t{}\t{}",
            pixel.time.saturating_sub(time_base),
            pixel.addr.saturating_sub(addr_base),
            pixel.heat
        );
    }
    out
}
