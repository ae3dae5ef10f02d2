// Per-target record profiling
//
// Summarizes each monitoring target of a record: time span, address span,
// number of snapshots, and the address ranges no snapshot ever covered
// (persistent gaps). The heatmap uses the gap complement to pick a default
// address range.

mod gaps;
mod target;

pub use gaps::{intersect_gaps, snapshot_gaps};
pub use target::{profile, RecordProfile};
