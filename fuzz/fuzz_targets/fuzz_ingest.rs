#![no_main]

use libfuzzer_sys::fuzz_target;
use sift::store::{IngestOptions, RecordStore};

fuzz_target!(|data: &[u8]| {
    // Ingest arbitrary bytes with labels and a short escape limit; every
    // record's content must come back unchanged
    let options = IngestOptions {
        labels: true,
        escape_scan_limit: 4,
        ..Default::default()
    };
    let store = RecordStore::from_bytes(data, options);

    let mut rebuilt = Vec::new();
    for record in store.iter() {
        assert_eq!(record.ignore_mask().len(), record.len());
        rebuilt.extend_from_slice(record.content());
        rebuilt.push(b'\n');
    }
    if !data.is_empty() && data.last() != Some(&b'\n') {
        rebuilt.pop();
    }
    assert_eq!(rebuilt, data);
});
