//! Streaming snapshot reconstruction
//!
//! The tracepoint stream has no snapshot delimiters: every event only says how
//! many regions its snapshot holds. The reconstructor counts regions and opens
//! a new snapshot whenever the previous one is complete, one event at a time.

use crate::error::ReconstructError;
use crate::event::DamonEvent;
use crate::record::{Record, Region, Snapshot};
use tracing::{debug, warn};

/// Incremental event-to-snapshot grouper
///
/// The default mode appends each event to the most recently opened snapshot
/// whatever target it names. [`Reconstructor::strict`] instead rejects events
/// whose target or declared region count disagrees with the open snapshot.
#[derive(Debug, Default)]
pub struct Reconstructor {
    record: Option<Record>,
    regions_seen: u32,
    expected_regions: u32,
    completed: usize,
    strict: bool,
}

impl Reconstructor {
    /// Lenient reconstructor
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructor that validates single-target snapshots
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Consume one event
    ///
    /// Returns the snapshot this event completed, if any. A rejected event
    /// leaves the reconstructor state untouched.
    pub fn ingest(&mut self, event: &DamonEvent) -> Result<Option<&Snapshot>, ReconstructError> {
        if event.nr_regions == 0 {
            return Err(ReconstructError::ZeroRegionCount {
                target_id: event.target_id,
            });
        }
        let region = Region::new(event.start, event.end, event.nr_accesses)?;

        if self.regions_seen == 0 {
            let record = self
                .record
                .get_or_insert_with(|| Record::new(event.timestamp));
            record
                .snapshots
                .push(Snapshot::new(event.timestamp, event.target_id));
            self.expected_regions = event.nr_regions;
        } else if self.strict {
            self.check_open_snapshot(event)?;
        }

        let Some(snapshot) = self.open_snapshot_mut() else {
            return Ok(None);
        };
        snapshot.push(region);
        self.regions_seen += 1;

        // Lenient mode compares against the count the current event declares
        if self.regions_seen >= event.nr_regions {
            self.regions_seen = 0;
            self.completed += 1;
            return Ok(self.record.as_ref().and_then(|r| r.snapshots.last()));
        }
        Ok(None)
    }

    fn check_open_snapshot(&self, event: &DamonEvent) -> Result<(), ReconstructError> {
        if let Some(open) = self.record.as_ref().and_then(|r| r.snapshots.last()) {
            if open.target_id != event.target_id {
                return Err(ReconstructError::TargetMismatch {
                    expected: open.target_id,
                    found: event.target_id,
                });
            }
        }
        if event.nr_regions != self.expected_regions {
            return Err(ReconstructError::RegionCountMismatch {
                expected: self.expected_regions,
                found: event.nr_regions,
            });
        }
        Ok(())
    }

    fn open_snapshot_mut(&mut self) -> Option<&mut Snapshot> {
        self.record.as_mut().and_then(|r| r.snapshots.last_mut())
    }

    /// Whether the last snapshot is still waiting for regions
    pub fn is_mid_snapshot(&self) -> bool {
        self.regions_seen != 0
    }

    /// Number of snapshots completed so far
    pub fn completed_snapshots(&self) -> usize {
        self.completed
    }

    /// The record built so far
    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// Finish reconstruction; a trailing partial snapshot is kept as-is
    pub fn finish(self) -> Option<Record> {
        if self.is_mid_snapshot() {
            warn!(
                regions_seen = self.regions_seen,
                expected = self.expected_regions,
                "event stream ended inside a snapshot; keeping it partial"
            );
        }
        debug!(completed = self.completed, "reconstruction finished");
        self.record
    }
}
