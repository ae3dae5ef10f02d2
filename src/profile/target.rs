// RecordProfile: per-target summary folded snapshot by snapshot

use crate::interval::Interval;
use crate::profile::gaps::{intersect_gaps, snapshot_gaps};
use crate::record::{Record, Snapshot, TargetId};
use std::collections::BTreeMap;
use std::fmt;

/// Summary of one monitoring target across a record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordProfile {
    pub target_id: TargetId,
    /// Time of the first snapshot (ns)
    pub time_start: u64,
    /// Time of the last snapshot (ns)
    pub time_end: u64,
    /// Lowest region start seen
    pub addr_start: u64,
    /// Highest region end seen
    pub addr_end: u64,
    /// Address ranges uncovered in every snapshot, ordered
    pub gaps: Vec<Interval>,
    pub nr_snapshots: usize,
    seen_region: bool,
    gaps_seeded: bool,
}

impl RecordProfile {
    pub fn new(target_id: TargetId, time_start: u64) -> Self {
        Self {
            target_id,
            time_start,
            time_end: time_start,
            addr_start: 0,
            addr_end: 0,
            gaps: Vec::new(),
            nr_snapshots: 0,
            seen_region: false,
            gaps_seeded: false,
        }
    }

    /// Fold one more snapshot of this target into the profile
    pub fn fold(&mut self, snapshot: &Snapshot) {
        self.nr_snapshots += 1;
        self.time_end = snapshot.monitored_time;

        for region in snapshot.regions() {
            if self.seen_region {
                self.addr_start = self.addr_start.min(region.start());
                self.addr_end = self.addr_end.max(region.end());
            } else {
                self.addr_start = region.start();
                self.addr_end = region.end();
                self.seen_region = true;
            }
        }

        // The first snapshot with any gap seeds the list; after that it only narrows
        let gaps = snapshot_gaps(snapshot);
        if self.gaps_seeded {
            self.gaps = intersect_gaps(&self.gaps, &gaps);
        } else if !gaps.is_empty() {
            self.gaps = gaps;
            self.gaps_seeded = true;
        }
    }

    /// End time extended by one mean sampling interval
    ///
    /// `None` when fewer than two snapshots exist, since no spacing is known.
    pub fn extrapolated_end(&self) -> Option<u64> {
        if self.nr_snapshots <= 1 {
            return None;
        }
        let elapsed = self.time_end.saturating_sub(self.time_start);
        Some(self.time_end + elapsed / (self.nr_snapshots as u64 - 1))
    }

    /// Copy with `time_end` replaced by [`Self::extrapolated_end`]
    pub fn extrapolated(&self) -> Option<RecordProfile> {
        let time_end = self.extrapolated_end()?;
        Some(RecordProfile {
            time_end,
            ..self.clone()
        })
    }

    /// Whether any snapshot of this target carried a region
    pub fn has_regions(&self) -> bool {
        self.seen_region
    }

    pub fn addr_space(&self) -> Interval {
        Interval::new(self.addr_start, self.addr_end)
    }

    /// Contiguous covered address ranges: the gap complement within the address span
    pub fn spans(&self) -> Vec<Interval> {
        if !self.has_regions() {
            return Vec::new();
        }
        let mut spans = Vec::with_capacity(self.gaps.len() + 1);
        let mut cursor = self.addr_start;
        for gap in &self.gaps {
            spans.push(Interval::new(cursor, gap.start));
            cursor = gap.end;
        }
        spans.push(Interval::new(cursor, self.addr_end));
        spans
    }

    /// Biggest span; the earlier one wins ties
    pub fn largest_span(&self) -> Option<Interval> {
        self.spans().into_iter().fold(None, |best, span| match best {
            Some(b) if b.len() >= span.len() => Some(b),
            _ => Some(span),
        })
    }
}

impl fmt::Display for RecordProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {}", self.target_id)?;
        writeln!(
            f,
            "time: {}-{} ({})",
            self.time_start,
            self.time_end,
            self.time_end.saturating_sub(self.time_start)
        )?;
        writeln!(f, "nr_snapshots: {}", self.nr_snapshots)?;
        let space = self.addr_space();
        write!(f, "addr_space: {} ({})", space, space.len())?;
        for (idx, gap) in self.gaps.iter().enumerate() {
            write!(f, "\nspace_gap{}: {}-{}", idx, gap.start, gap.end)?;
        }
        Ok(())
    }
}

/// Profile every target of a record, keyed by ascending target id
pub fn profile(record: &Record) -> BTreeMap<TargetId, RecordProfile> {
    let mut profiles: BTreeMap<TargetId, RecordProfile> = BTreeMap::new();
    for snapshot in &record.snapshots {
        profiles
            .entry(snapshot.target_id)
            .or_insert_with(|| RecordProfile::new(snapshot.target_id, snapshot.monitored_time))
            .fold(snapshot);
    }
    profiles
}
