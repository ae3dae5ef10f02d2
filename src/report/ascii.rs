//! Terminal rendering of a heat grid
//!
//! Heats are banded into ten levels and painted with 256-colour ANSI escapes,
//! one terminal row per time bucket, followed by a legend.

use crate::heatmap::HeatGrid;
use crate::report::format::format_size;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const LEVELS: usize = 10;
const RESET: &str = "\u{1b}[0m";

/// Colour theme for temperature levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsciiColor {
    #[default]
    Gray,
    Flame,
    Emotion,
}

impl AsciiColor {
    /// (background, foreground) colour per level
    fn palette(self) -> ([u8; LEVELS], [u8; LEVELS]) {
        match self {
            AsciiColor::Gray => (
                [232; LEVELS],
                [237, 239, 241, 243, 245, 247, 249, 251, 253, 255],
            ),
            AsciiColor::Flame => (
                [232, 1, 1, 2, 3, 3, 20, 21, 26, 27],
                [239, 235, 237, 239, 243, 245, 247, 249, 251, 255],
            ),
            AsciiColor::Emotion => (
                [232, 234, 20, 21, 26, 2, 3, 1, 1, 1],
                [239, 235, 237, 239, 243, 245, 247, 249, 251, 255],
            ),
        }
    }
}

fn cell(bg: u8, fg: u8, text: &str) -> String {
    format!("\u{1b}[48;5;{}m\u{1b}[38;5;{}m{}", bg, fg, text)
}

/// Render `grid` as coloured digits; an all-zero or empty grid renders nothing
pub fn render_ascii(grid: &HeatGrid, color: AsciiColor) -> String {
    if grid.is_all_zero() {
        return String::new();
    }
    let Some((lowest, highest)) = grid.heat_bounds() else {
        return String::new();
    };
    let heat_unit = (highest + 1.0 - lowest) / (LEVELS - 1) as f64;
    let (bg, fg) = color.palette();

    let mut out = String::new();
    for row in &grid.rows {
        for pixel in row {
            let level = (((pixel.heat - lowest) / heat_unit) as usize).min(LEVELS - 1);
            out.push_str(&cell(bg[level], fg[level], &level.to_string()));
        }
        out.push_str(RESET);
        out.push('\n');
    }

    let samples: String = (0..LEVELS)
        .map(|i| cell(bg[i], fg[i], &format!(" {} ", i)))
        .collect();
    out.push_str(&format!("# temperature: {}{}\n", samples, RESET));

    let (addr, time) = (grid.addr_range, grid.time_range);
    out.push_str(&format!(
        "# x-axis: space ({}-{}: {})\n",
        addr.start,
        addr.end,
        format_size(addr.len(), false)
    ));
    out.push_str(&format!(
        "# y-axis: time ({}-{}: {:.6}s)\n",
        time.start,
        time.end,
        time.len() as f64 / 1e9
    ));
    let resolution = grid.resolution();
    out.push_str(&format!(
        "# resolution: {}x{}\n",
        resolution.space, resolution.time
    ));
    out
}
