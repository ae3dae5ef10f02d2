use anyhow::{Context, Result};
use clap::Parser;
use damon_report::cli::Cli;
use damon_report::config::ReportConfig;
use damon_report::plot::{self, PlotFormat};
use damon_report::record::{read_record, Record};
use damon_report::report::{Report, ReportOutput};
use std::fs::File;
use std::io::{self, BufReader, Write};
use tracing_subscriber::EnvFilter;

/// Log filter: `RUST_LOG` when set, otherwise DEBUG with `--debug` and WARN without
fn log_filter(debug: bool, rust_log: Option<&str>) -> EnvFilter {
    match rust_log.map(str::trim).filter(|dirs| !dirs.is_empty()) {
        Some(dirs) => EnvFilter::builder().parse_lossy(dirs),
        None if debug => EnvFilter::new("debug"),
        None => EnvFilter::new("warn"),
    }
}

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

/// Read the trace named by the config, or stdin
fn load_record(config: &ReportConfig) -> Result<Option<Record>> {
    match &config.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open trace {}", path.display()))?;
            Ok(read_record(BufReader::new(file), config.strict)?)
        }
        None => Ok(read_record(io::stdin().lock(), config.strict)?),
    }
}

/// Hand the report text to gnuplot
fn plot_output(
    config: &ReportConfig,
    format: PlotFormat,
    output: &ReportOutput,
) -> Result<()> {
    let Some(target) = &config.plot else {
        return Ok(());
    };
    match config.report {
        Report::Wss => plot::run_gnuplot(&output.text, |data| {
            plot::wss_script(format, target, data, config.wss_sort)
        })?,
        Report::Heatmap => {
            let Some(attrs) = output.heatmap else {
                anyhow::bail!("nothing to plot: no heatmap could be derived from the trace");
            };
            let hm = &config.heatmap;
            let (time, addr) = (attrs.time_range, attrs.addr_range);
            let time_base = if hm.abs_time { 0 } else { time.start };
            let addr_base = if hm.abs_addr { 0 } else { addr.start };
            let xrange = ((time.start - time_base) as f64, (time.end - time_base) as f64);
            let yrange = ((addr.start - addr_base) as f64, (addr.end - addr_base) as f64);
            plot::run_gnuplot(&output.text, |data| {
                plot::heatmap_script(format, target, data, xrange, yrange)
            })?
        }
        Report::Raw | Report::RecordProfile => {}
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    // Validate before reading the trace so bad options fail fast
    let config = args.into_config()?.normalized();
    config.validate()?;
    let plot_format = config.plot_format()?;

    let Some(record) = load_record(&config)? else {
        tracing::warn!("trace contains no damon_aggregated events");
        return Ok(());
    };

    let output = config.report.render(&record, &config);

    match plot_format {
        Some(format) => plot_output(&config, format, &output)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
