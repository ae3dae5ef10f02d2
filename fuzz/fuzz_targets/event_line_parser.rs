#![no_main]

use damon_report::event::LineParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary trace lines must parse or fail, never panic
    if let Ok(line) = std::str::from_utf8(data) {
        if let Ok(parser) = LineParser::new() {
            if let Ok(Some(event)) = parser.parse(line) {
                let _ = damon_report::record::Record::from_events([event]);
            }
        }
    }
});
