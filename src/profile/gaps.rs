// Gap extraction and intersection
//
// A snapshot gap is an adjacency break between consecutive regions. A target's
// persistent gaps are what survives intersecting the gap lists of all of its
// snapshots.

use crate::interval::Interval;
use crate::record::Snapshot;

/// Adjacency breaks of one snapshot, in region order
///
/// Regions are expected left-to-right. A region that starts at or below the
/// previous end (touching or overlapping) produces no gap.
pub fn snapshot_gaps(snapshot: &Snapshot) -> Vec<Interval> {
    let mut gaps = Vec::new();
    let mut last_end: Option<u64> = None;

    for region in snapshot.regions() {
        if let Some(end) = last_end {
            if region.start() > end {
                gaps.push(Interval::new(end, region.start()));
            }
        }
        last_end = Some(region.end());
    }
    gaps
}

/// Pairwise overlaps of two ordered gap lists
///
/// Each cumulative gap survives once per gap of `gaps` it overlaps, narrowed
/// to that overlap. A cumulative gap overlapping nothing is dropped, so the
/// result never covers more than `cumulative`.
///
/// # Example
/// ```
/// use damon_report::interval::Interval;
/// use damon_report::profile::intersect_gaps;
///
/// let cumulative = vec![Interval::new(40, 70)];
/// let current = vec![Interval::new(50, 60), Interval::new(90, 95)];
/// assert_eq!(intersect_gaps(&cumulative, &current), vec![Interval::new(50, 60)]);
/// ```
pub fn intersect_gaps(cumulative: &[Interval], gaps: &[Interval]) -> Vec<Interval> {
    cumulative
        .iter()
        .flat_map(|kept| {
            gaps.iter()
                .filter(move |gap| kept.overlaps(gap))
                .map(move |gap| kept.overlap(gap))
        })
        .collect()
}
