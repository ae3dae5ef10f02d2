//! `damon:damon_aggregated` trace events
//!
//! Two line formats are accepted and detected per line:
//! - `perf script` text output of the tracepoint
//! - JSON lines carrying the same fields
//!
//! Lines of other tracepoints, blank lines and `#` comments are skipped.

use crate::error::{ReportError, Result};
use crate::record::TargetId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::debug;

const TRACEPOINT: &str = "damon:damon_aggregated:";

/// One aggregated region observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamonEvent {
    pub target_id: TargetId,
    /// Number of regions in the snapshot this event belongs to
    pub nr_regions: u32,
    pub start: u64,
    pub end: u64,
    pub nr_accesses: u32,
    /// Nanoseconds
    pub timestamp: u64,
}

impl DamonEvent {
    pub fn new(
        target_id: TargetId,
        nr_regions: u32,
        start: u64,
        end: u64,
        nr_accesses: u32,
        timestamp: u64,
    ) -> Self {
        Self {
            target_id,
            nr_regions,
            start,
            end,
            nr_accesses,
            timestamp,
        }
    }
}

/// Parser for single trace lines
#[derive(Debug, Clone)]
pub struct LineParser {
    aggregated: Regex,
}

impl LineParser {
    pub fn new() -> Result<Self> {
        let aggregated = Regex::new(
            r"(?x)
            (?P<secs>\d+)\.(?P<frac>\d{1,9}):\s+
            damon:damon_aggregated:\s+
            target_id=(?P<target>\d+)\s+
            nr_regions=(?P<nr>\d+)\s+
            (?P<start>\d+)-(?P<end>\d+):\s+
            (?P<acc>\d+)
            (?:\s+\d+)?\s*$",
        )?;
        Ok(Self { aggregated })
    }

    /// Parse one line
    ///
    /// Returns `Ok(None)` for lines that carry no `damon_aggregated` event.
    pub fn parse(&self, line: &str) -> std::result::Result<Option<DamonEvent>, String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        if trimmed.starts_with('{') {
            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|e| e.to_string());
        }
        if !trimmed.contains(TRACEPOINT) {
            return Ok(None);
        }

        let caps = self
            .aggregated
            .captures(trimmed)
            .ok_or_else(|| "line does not match the tracepoint format".to_string())?;

        let field = |name: &str| -> std::result::Result<u64, String> {
            caps[name]
                .parse::<u64>()
                .map_err(|e| format!("field {}: {}", name, e))
        };
        let narrow = |name: &str| -> std::result::Result<u32, String> {
            caps[name]
                .parse::<u32>()
                .map_err(|e| format!("field {}: {}", name, e))
        };

        Ok(Some(DamonEvent {
            target_id: field("target")?,
            nr_regions: narrow("nr")?,
            start: field("start")?,
            end: field("end")?,
            nr_accesses: narrow("acc")?,
            timestamp: timestamp_nanos(&caps["secs"], &caps["frac"])?,
        }))
    }
}

/// Convert perf's `secs.frac` into nanoseconds; `frac` may be us or ns precision
fn timestamp_nanos(secs: &str, frac: &str) -> std::result::Result<u64, String> {
    let secs: u64 = secs.parse().map_err(|e| format!("timestamp: {}", e))?;
    let digits: u64 = frac.parse().map_err(|e| format!("timestamp: {}", e))?;
    let scale = 10u64.pow(9 - frac.len() as u32);
    secs.checked_mul(1_000_000_000)
        .and_then(|ns| ns.checked_add(digits * scale))
        .ok_or_else(|| "timestamp overflows u64 nanoseconds".to_string())
}

/// Iterator of events read line by line from a buffered source
pub struct EventReader<R> {
    reader: R,
    parser: LineParser,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            reader,
            parser: LineParser::new()?,
            line_no: 0,
            buf: String::new(),
        })
    }

    /// 1-based number of the last line read
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<DamonEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(ReportError::Io(e))),
            }
            self.line_no += 1;

            match self.parser.parse(&self.buf) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => {
                    debug!(line = self.line_no, "skipping non-event line");
                }
                Err(reason) => {
                    return Some(Err(ReportError::EventParse {
                        line: self.line_no,
                        reason,
                    }))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const PERF_LINE: &str = "        kdamond.0  4114 [001]  1234.567890123: damon:damon_aggregated: target_id=0 nr_regions=3 140737488347136-140737488351232: 5 2";

    #[test]
    fn test_parse_perf_script_line() {
        let parser = LineParser::new().unwrap();
        let event = parser.parse(PERF_LINE).unwrap().unwrap();
        assert_eq!(event.target_id, 0);
        assert_eq!(event.nr_regions, 3);
        assert_eq!(event.start, 140737488347136);
        assert_eq!(event.end, 140737488351232);
        assert_eq!(event.nr_accesses, 5);
        assert_eq!(event.timestamp, 1_234_567_890_123);
    }

    #[test]
    fn test_parse_microsecond_timestamp() {
        let parser = LineParser::new().unwrap();
        let line = "kdamond.0 99 [000] 10.000002: damon:damon_aggregated: target_id=7 nr_regions=1 0-4096: 0";
        let event = parser.parse(line).unwrap().unwrap();
        assert_eq!(event.timestamp, 10_000_002_000);
        assert_eq!(event.target_id, 7);
    }

    #[test]
    fn test_parse_json_line() {
        let parser = LineParser::new().unwrap();
        let line = r#"{"target_id":1,"nr_regions":2,"start":0,"end":8192,"nr_accesses":4,"timestamp":500}"#;
        let event = parser.parse(line).unwrap().unwrap();
        assert_eq!(event, DamonEvent::new(1, 2, 0, 8192, 4, 500));
    }

    #[test]
    fn test_skips_other_lines() {
        let parser = LineParser::new().unwrap();
        assert_eq!(parser.parse("").unwrap(), None);
        assert_eq!(parser.parse("# comment").unwrap(), None);
        assert_eq!(
            parser
                .parse("bash 12 [000] 1.0: sched:sched_switch: prev_comm=bash")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_tracepoint_line_is_error() {
        let parser = LineParser::new().unwrap();
        let line = "kdamond.0 1 [000] 1.0: damon:damon_aggregated: target_id=x";
        assert!(parser.parse(line).is_err());
    }

    #[test]
    fn test_reader_reports_line_numbers() {
        let input = format!(
            "# header\n{}\nkdamond.0 1 [000] 1.0: damon:damon_aggregated: garbage\n",
            PERF_LINE
        );
        let mut reader = EventReader::new(Cursor::new(input)).unwrap();
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(ReportError::EventParse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }
}
