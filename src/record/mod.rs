//! Monitoring record data model
//!
//! A [`Record`] is the whole monitoring session: a time-ordered list of
//! [`Snapshot`]s, each holding the [`Region`]s one target reported at one
//! aggregation instant. Records are built by the streaming
//! [`Reconstructor`] and are never mutated by the analyses that consume them.

mod reconstruct;

pub use reconstruct::Reconstructor;

use crate::error::{ReconstructError, ReportError, Result};
use crate::event::{DamonEvent, EventReader};
use std::io::BufRead;
use tracing::info;

/// Opaque identifier of a monitoring target
pub type TargetId = u64;

/// One contiguous address interval with its access-frequency sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    start: u64,
    end: u64,
    nr_accesses: u32,
}

impl Region {
    /// Create a region, rejecting `start > end`
    pub fn new(
        start: u64,
        end: u64,
        nr_accesses: u32,
    ) -> std::result::Result<Self, ReconstructError> {
        if start > end {
            return Err(ReconstructError::InvertedRegion { start, end });
        }
        Ok(Self {
            start,
            end,
            nr_accesses,
        })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn nr_accesses(&self) -> u32 {
        self.nr_accesses
    }

    /// Length of the interval in bytes
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the region was accessed at all during the aggregation interval
    pub fn is_accessed(&self) -> bool {
        self.nr_accesses > 0
    }
}

/// All regions observed for one target at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Timestamp of the aggregation, in nanoseconds
    pub monitored_time: u64,
    pub target_id: TargetId,
    regions: Vec<Region>,
}

impl Snapshot {
    pub(crate) fn new(monitored_time: u64, target_id: TargetId) -> Self {
        Self {
            monitored_time,
            target_id,
            regions: Vec::new(),
        }
    }

    /// Build a complete snapshot from already-validated regions
    pub fn from_regions(monitored_time: u64, target_id: TargetId, regions: Vec<Region>) -> Self {
        Self {
            monitored_time,
            target_id,
            regions,
        }
    }

    /// Regions in arrival order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub(crate) fn push(&mut self, region: Region) {
        self.regions.push(region);
    }
}

/// The complete monitoring session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Timestamp of the first event, in nanoseconds
    pub start_time: u64,
    pub snapshots: Vec<Snapshot>,
}

impl Record {
    pub fn new(start_time: u64) -> Self {
        Self {
            start_time,
            snapshots: Vec::new(),
        }
    }

    /// Reconstruct a record from a finite event sequence (lenient grouping)
    ///
    /// Returns `Ok(None)` when the sequence is empty.
    ///
    /// # Example
    /// ```
    /// use damon_report::event::DamonEvent;
    /// use damon_report::record::Record;
    ///
    /// let events = vec![
    ///     DamonEvent::new(0, 2, 0, 4096, 3, 1_000),
    ///     DamonEvent::new(0, 2, 4096, 8192, 0, 1_000),
    /// ];
    /// let record = Record::from_events(events).unwrap().unwrap();
    /// assert_eq!(record.snapshots.len(), 1);
    /// assert_eq!(record.snapshots[0].regions().len(), 2);
    /// ```
    pub fn from_events<I>(events: I) -> std::result::Result<Option<Self>, ReconstructError>
    where
        I: IntoIterator<Item = DamonEvent>,
    {
        let mut reconstructor = Reconstructor::new();
        for event in events {
            reconstructor.ingest(&event)?;
        }
        Ok(reconstructor.finish())
    }

    /// Snapshots of a single target, in time order
    pub fn snapshots_of(&self, target_id: TargetId) -> impl Iterator<Item = &Snapshot> {
        self.snapshots
            .iter()
            .filter(move |s| s.target_id == target_id)
    }

    /// Distinct target ids, ascending
    pub fn targets(&self) -> Vec<TargetId> {
        let mut ids: Vec<TargetId> = self.snapshots.iter().map(|s| s.target_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Read a trace and reconstruct its record in one pass
///
/// Returns `Ok(None)` for a trace without events. Parse and reconstruction
/// errors carry the offending line number.
pub fn read_record<R: BufRead>(reader: R, strict: bool) -> Result<Option<Record>> {
    let mut reconstructor = if strict {
        Reconstructor::strict()
    } else {
        Reconstructor::new()
    };
    let mut events = EventReader::new(reader)?;

    while let Some(event) = events.next() {
        let event = event?;
        reconstructor
            .ingest(&event)
            .map_err(|source| ReportError::Reconstruct {
                line: events.line_no(),
                source,
            })?;
    }

    info!(
        snapshots = reconstructor.completed_snapshots(),
        targets = reconstructor.record().map_or(0, |r| r.targets().len()),
        lines = events.line_no(),
        "trace read"
    );
    Ok(reconstructor.finish())
}
