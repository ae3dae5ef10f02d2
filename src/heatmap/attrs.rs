// Heatmap target and range selection
//
// Anything the caller leaves unset is filled from the record profile. Without
// a target, the one with the biggest contiguous covered address span wins.

use crate::interval::Interval;
use crate::profile::{profile, RecordProfile};
use crate::record::{Record, TargetId};
use std::collections::BTreeMap;

/// What to rasterize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapAttrs {
    pub target_id: TargetId,
    pub time_range: Interval,
    pub addr_range: Interval,
}

/// Caller overrides; `None` fields are defaulted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeatmapRequest {
    pub target_id: Option<TargetId>,
    pub time_range: Option<Interval>,
    pub addr_range: Option<Interval>,
}

/// Target with the biggest largest-span, and that span
///
/// Ties go to the higher target id.
fn widest_target(profiles: &BTreeMap<TargetId, RecordProfile>) -> Option<(&RecordProfile, Interval)> {
    profiles
        .values()
        .filter_map(|prof| prof.largest_span().map(|span| (prof, span)))
        .fold(None, |best, (prof, span)| match best {
            Some((_, b)) if b.len() > span.len() => best,
            _ => Some((prof, span)),
        })
}

/// Default attributes: widest target, its whole time span and largest span
pub fn default_attrs(record: &Record) -> Option<HeatmapAttrs> {
    let profiles = profile(record);
    let (prof, span) = widest_target(&profiles)?;
    Some(HeatmapAttrs {
        target_id: prof.target_id,
        time_range: Interval::new(prof.time_start, prof.time_end),
        addr_range: span,
    })
}

/// Fill unset request fields from the record
///
/// When only the target is given, its own profile supplies the ranges.
/// Returns `None` if a needed default cannot be derived (empty record, or
/// a target without regions).
pub fn resolve_attrs(record: &Record, request: &HeatmapRequest) -> Option<HeatmapAttrs> {
    if let HeatmapRequest {
        target_id: Some(target_id),
        time_range: Some(time_range),
        addr_range: Some(addr_range),
    } = *request
    {
        return Some(HeatmapAttrs {
            target_id,
            time_range,
            addr_range,
        });
    }

    let profiles = profile(record);
    let (prof, span) = match request.target_id {
        Some(id) => {
            let prof = profiles.get(&id)?;
            let span = match request.addr_range {
                Some(range) => range,
                None => prof.largest_span()?,
            };
            (prof, span)
        }
        None => widest_target(&profiles)?,
    };

    Some(HeatmapAttrs {
        target_id: prof.target_id,
        time_range: request
            .time_range
            .unwrap_or_else(|| Interval::new(prof.time_start, prof.time_end)),
        addr_range: request.addr_range.unwrap_or(span),
    })
}
