//! damon-report - offline analytics for DAMON memory-access monitoring traces
//!
//! This library turns a stream of `damon:damon_aggregated` trace events into
//! a reconstructed record of monitoring snapshots, and derives from it a
//! per-target coverage profile, a working set size distribution, and a
//! time-by-address heat raster.

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod heatmap;
pub mod interval;
pub mod plot;
pub mod profile;
pub mod record;
pub mod report;
pub mod wss;
