//! gnuplot pass-through
//!
//! Report text is written to a temporary data file and a one-shot gnuplot
//! script renders it into the requested image. The terminal type comes from
//! the output file extension.

use crate::error::{ReportError, Result};
use crate::wss::SortMode;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

/// Supported image formats, named after their gnuplot terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    Pdf,
    Jpeg,
    Png,
    Svg,
}

impl PlotFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match ext {
            "pdf" => Ok(PlotFormat::Pdf),
            "jpeg" => Ok(PlotFormat::Jpeg),
            "png" => Ok(PlotFormat::Png),
            "svg" => Ok(PlotFormat::Svg),
            other => Err(ReportError::UnsupportedPlotFormat(other.to_string())),
        }
    }

    pub fn terminal(self) -> &'static str {
        match self {
            PlotFormat::Pdf => "pdf",
            PlotFormat::Jpeg => "jpeg",
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

/// Script for a working set size distribution plot
pub fn wss_script(format: PlotFormat, output: &Path, data: &Path, sort: SortMode) -> String {
    let xlabel = match sort {
        SortMode::Time => "runtime (percent)",
        SortMode::Size => "percentile",
    };
    format!(
        "set term {}; set output '{}'; set key off; \
         set xlabel '{}'; set ylabel 'working set size (bytes)'; \
         plot '{}' with linespoints;",
        format.terminal(),
        output.display(),
        xlabel,
        data.display()
    )
}

/// Script for a heatmap image; ranges as already offset for printing
pub fn heatmap_script(
    format: PlotFormat,
    output: &Path,
    data: &Path,
    xrange: (f64, f64),
    yrange: (f64, f64),
) -> String {
    format!(
        "set term {}; set output '{}'; set key off; \
         set xrange [{:.6}:{:.6}]; set yrange [{:.6}:{:.6}]; \
         set xlabel 'Time (ns)'; set ylabel 'Address (bytes)'; \
         plot '{}' using 1:2:3 with image;",
        format.terminal(),
        output.display(),
        xrange.0,
        xrange.1,
        yrange.0,
        yrange.1,
        data.display()
    )
}

/// Write `data` to a temporary file and run gnuplot with the script `build`
/// produces for that file's path
pub fn run_gnuplot<F>(data: &str, build: F) -> Result<()>
where
    F: FnOnce(&Path) -> String,
{
    let mut file = NamedTempFile::new()?;
    file.write_all(data.as_bytes())?;
    file.flush()?;

    let script = build(file.path());
    debug!(script = %script, "invoking gnuplot");

    let status = Command::new("gnuplot")
        .arg("-e")
        .arg(&script)
        .status()
        .map_err(|e| ReportError::Plotter(format!("cannot run gnuplot: {}", e)))?;
    if !status.success() {
        return Err(ReportError::Plotter(format!("gnuplot exited with {}", status)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_supported_extensions() {
        assert_eq!(
            PlotFormat::from_path(Path::new("a/b/out.png")).unwrap(),
            PlotFormat::Png
        );
        assert_eq!(
            PlotFormat::from_path(Path::new("x.svg")).unwrap(),
            PlotFormat::Svg
        );
        assert_eq!(PlotFormat::Jpeg.terminal(), "jpeg");
    }

    #[test]
    fn test_unsupported_extensions() {
        assert!(matches!(
            PlotFormat::from_path(Path::new("out.gif")),
            Err(ReportError::UnsupportedPlotFormat(ext)) if ext == "gif"
        ));
        assert!(PlotFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_wss_script_labels() {
        let script = wss_script(
            PlotFormat::Png,
            &PathBuf::from("wss.png"),
            &PathBuf::from("/tmp/data"),
            SortMode::Time,
        );
        assert!(script.starts_with("set term png; set output 'wss.png';"));
        assert!(script.contains("set xlabel 'runtime (percent)'"));
        assert!(script.ends_with("plot '/tmp/data' with linespoints;"));
    }

    #[test]
    fn test_heatmap_script_ranges() {
        let script = heatmap_script(
            PlotFormat::Svg,
            &PathBuf::from("hm.svg"),
            &PathBuf::from("/tmp/data"),
            (0.0, 100.0),
            (0.0, 4096.0),
        );
        assert!(script.contains("set xrange [0.000000:100.000000]"));
        assert!(script.contains("set yrange [0.000000:4096.000000]"));
        assert!(script.contains("using 1:2:3 with image"));
    }
}
