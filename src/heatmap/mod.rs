// Time-by-address access heatmaps
//
// The raster conserves heat: for every input (region, duration) pair, the sum
// of `heat * bucket area` over the touched pixels equals
// `nr_accesses * duration * region length` (clipped to the requested ranges),
// up to floating-point error.

mod attrs;
mod raster;

pub use attrs::{default_attrs, resolve_attrs, HeatmapAttrs, HeatmapRequest};
pub use raster::{rasterize, HeatGrid, HeatPixel, Resolution};

use crate::record::Record;

/// Rasterize the target and ranges described by `attrs`
pub fn heatmap(record: &Record, attrs: &HeatmapAttrs, resolution: Resolution) -> HeatGrid {
    let snapshots: Vec<_> = record.snapshots_of(attrs.target_id).collect();
    tracing::debug!(
        target_id = attrs.target_id,
        snapshots = snapshots.len(),
        "rasterizing heatmap"
    );
    rasterize(&snapshots, attrs.time_range, attrs.addr_range, resolution)
}
