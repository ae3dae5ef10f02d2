// Heat rasterization
//
// Each consecutive snapshot pair (prev, shot) says that `shot`'s regions were
// the best known sample during [prev.time, shot.time). That duration is split
// over the time buckets it overlaps, and each region over the address buckets
// it overlaps. A bucket stores heat as a density: accumulated
// `nr_accesses * duration * length` divided by the full bucket area.

use crate::interval::Interval;
use crate::record::Snapshot;
use serde::{Deserialize, Serialize};

/// Grid size as (time buckets, address buckets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub time: usize,
    pub space: usize,
}

impl Resolution {
    pub fn new(time: usize, space: usize) -> Self {
        Self { time, space }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            time: 800,
            space: 600,
        }
    }
}

/// One raster cell; `time`/`addr` are the bucket's lower bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatPixel {
    pub time: u64,
    pub addr: u64,
    pub heat: f64,
}

/// Time-by-address heat raster, one row per time bucket
#[derive(Debug, Clone, PartialEq)]
pub struct HeatGrid {
    pub time_range: Interval,
    pub addr_range: Interval,
    pub rows: Vec<Vec<HeatPixel>>,
}

impl HeatGrid {
    /// All-zero grid with pixel coordinates filled in
    pub fn zeroed(time_range: Interval, addr_range: Interval, resolution: Resolution) -> Self {
        let time_unit = unit(time_range, resolution.time);
        let space_unit = unit(addr_range, resolution.space);

        let rows = (0..resolution.time)
            .map(|i| {
                let time = time_range.start + (i as f64 * time_unit) as u64;
                (0..resolution.space)
                    .map(|j| HeatPixel {
                        time,
                        addr: addr_range.start + (j as f64 * space_unit) as u64,
                        heat: 0.0,
                    })
                    .collect()
            })
            .collect();

        Self {
            time_range,
            addr_range,
            rows,
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.rows.len(), self.rows.first().map_or(0, Vec::len))
    }

    /// Width of one time bucket in nanoseconds
    pub fn time_unit(&self) -> f64 {
        unit(self.time_range, self.rows.len())
    }

    /// Width of one address bucket in bytes
    pub fn space_unit(&self) -> f64 {
        unit(self.addr_range, self.resolution().space)
    }

    /// Row-major pixel iterator
    pub fn pixels(&self) -> impl Iterator<Item = &HeatPixel> {
        self.rows.iter().flatten()
    }

    /// Accumulated quantum over the grid: sum of `heat * bucket area`
    pub fn total_heat(&self) -> f64 {
        let area = self.time_unit() * self.space_unit();
        self.pixels().map(|p| p.heat * area).sum()
    }

    /// `(lowest, highest)` heat, `None` for an empty grid
    pub fn heat_bounds(&self) -> Option<(f64, f64)> {
        self.pixels().fold(None, |acc, p| match acc {
            None => Some((p.heat, p.heat)),
            Some((lo, hi)) => Some((lo.min(p.heat), hi.max(p.heat))),
        })
    }

    pub fn is_all_zero(&self) -> bool {
        self.pixels().all(|p| p.heat == 0.0)
    }

    fn is_degenerate(&self) -> bool {
        self.time_range.is_empty()
            || self.addr_range.is_empty()
            || self.resolution().time == 0
            || self.resolution().space == 0
    }
}

fn unit(range: Interval, buckets: usize) -> f64 {
    if buckets == 0 {
        return 0.0;
    }
    range.len() as f64 / buckets as f64
}

/// Rasterize the snapshots of one target
///
/// `snapshots` must be in time order. Fewer than two snapshots, or a
/// degenerate range, yield an all-zero grid.
pub fn rasterize(
    snapshots: &[&Snapshot],
    time_range: Interval,
    addr_range: Interval,
    resolution: Resolution,
) -> HeatGrid {
    let mut grid = HeatGrid::zeroed(time_range, addr_range, resolution);
    if snapshots.len() < 2 || grid.is_degenerate() {
        return grid;
    }

    let axes = Axes {
        time_unit: grid.time_unit(),
        addr_range,
        space_unit: grid.space_unit(),
    };

    for pair in snapshots.windows(2) {
        let (prev, shot) = (pair[0], pair[1]);
        let start = prev.monitored_time.max(time_range.start);
        let end = shot.monitored_time.min(time_range.end);
        if start >= end {
            continue;
        }
        // Offsets from the range start keep wall-clock nanoseconds exact
        let start = (start - time_range.start) as f64;
        let end = (end - time_range.start) as f64;
        axes.spread_duration(shot, start, end, &mut grid.rows);
    }
    grid
}

/// Bucket widths; positions passed in are offsets from the range starts
struct Axes {
    time_unit: f64,
    addr_range: Interval,
    space_unit: f64,
}

impl Axes {
    /// Split `[start, end)` over time buckets and add `shot`'s heat to each row
    fn spread_duration(&self, shot: &Snapshot, start: f64, end: f64, rows: &mut [Vec<HeatPixel>]) {
        let mut fraction_start = start;
        let mut idx = (fraction_start / self.time_unit) as usize;

        while fraction_start < end && idx < rows.len() {
            let fraction_end = ((idx + 1) as f64 * self.time_unit)
                .min(end)
                .max(fraction_start);
            self.add_heats(shot, fraction_end - fraction_start, &mut rows[idx]);
            fraction_start = fraction_end;
            idx += 1;
        }
    }

    /// Add the heat of `shot` over `duration` to one row of pixels
    fn add_heats(&self, shot: &Snapshot, duration: f64, row: &mut [HeatPixel]) {
        if duration <= 0.0 {
            return;
        }
        let pixel_area = self.time_unit * self.space_unit;

        for region in shot.regions() {
            let Some(clipped) = Interval::new(region.start(), region.end()).clip(&self.addr_range)
            else {
                continue;
            };
            let end = (clipped.end - self.addr_range.start) as f64;
            let mut fraction_start = (clipped.start - self.addr_range.start) as f64;
            let mut idx = (fraction_start / self.space_unit) as usize;

            while fraction_start < end && idx < row.len() {
                let fraction_end = ((idx + 1) as f64 * self.space_unit)
                    .min(end)
                    .max(fraction_start);
                let quantum =
                    f64::from(region.nr_accesses()) * duration * (fraction_end - fraction_start);

                let pixel = &mut row[idx];
                pixel.heat = (quantum + pixel.heat * pixel_area) / pixel_area;

                fraction_start = fraction_end;
                idx += 1;
            }
        }
    }
}
