#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sift::matcher::{score, score_with_positions, Query};
use sift::store::{Record, DEFAULT_ESCAPE_SCAN_LIMIT};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    query: &'a [u8],
    line: &'a [u8],
}

fuzz_target!(|input: Input| {
    // Scoring arbitrary records must not panic, and positions must agree
    // with the score
    let record = Record::new(0, b"", input.line, DEFAULT_ESCAPE_SCAN_LIMIT);
    let query = Query::new(input.query);
    let mut positions = Vec::new();

    let with_positions = score_with_positions(&record, &query, &mut positions);
    assert_eq!(with_positions, score(&record, &query));
    if with_positions.is_some() {
        assert_eq!(positions.len(), query.len());
        assert!(positions.iter().all(|&p| !record.is_ignored(p as usize)));
    }
});
