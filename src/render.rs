//! Splitting a record into plain and highlighted runs for display.

use crate::store::Record;
use std::borrow::Cow;

/// A run of bytes `start..end` of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    /// Every byte of the run is a matched position
    pub highlighted: bool,
}

impl Segment {
    pub fn bytes<'a>(&self, record: &'a Record) -> &'a [u8] {
        &record.bytes()[self.start..self.end]
    }
}

/// Split `record` from byte `from` onwards into runs that alternate between
/// matched and unmatched bytes.
///
/// `positions` must be strictly increasing. Unless `keep_ignored` is set,
/// ignored bytes are left out: they end the current run and never start one.
pub fn segments(record: &Record, positions: &[u32], from: usize, keep_ignored: bool) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    let mut next = positions.iter().map(|&p| p as usize).skip_while(|&p| p < from).peekable();

    for i in from..record.len() {
        let highlighted = next.next_if_eq(&i).is_some();
        if !keep_ignored && record.is_ignored(i) {
            continue;
        }

        match out.last_mut() {
            Some(last) if last.end == i && last.highlighted == highlighted => last.end = i + 1,
            _ => out.push(Segment {
                start: i,
                end: i + 1,
                highlighted,
            }),
        }
    }

    out
}

/// Text for a run drawn inside the terminal UI
pub fn display_text(bytes: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    if text.contains(['\t', '\0', '\u{1f}']) {
        Cow::Owned(text.replace(['\t', '\0', '\u{1f}'], " "))
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_ESCAPE_SCAN_LIMIT;

    fn record(line: &[u8]) -> Record {
        Record::new(0, b"", line, DEFAULT_ESCAPE_SCAN_LIMIT)
    }

    fn runs(record: &Record, positions: &[u32], keep_ignored: bool) -> Vec<(String, bool)> {
        segments(record, positions, 0, keep_ignored)
            .iter()
            .map(|s| (String::from_utf8_lossy(s.bytes(record)).into_owned(), s.highlighted))
            .collect()
    }

    #[test]
    fn test_no_positions_is_one_run() {
        let r = record(b"apple.txt");
        assert_eq!(runs(&r, &[], false), vec![("apple.txt".to_string(), false)]);
    }

    #[test]
    fn test_positions_split_runs() {
        let r = record(b"apple.txt");
        assert_eq!(
            runs(&r, &[0, 1, 6], false),
            vec![
                ("ap".to_string(), true),
                ("ple.".to_string(), false),
                ("t".to_string(), true),
                ("xt".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_ignored_bytes_are_dropped() {
        let r = record(b"\x1b[1mbold\x1b[0m!");
        assert_eq!(
            runs(&r, &[4], false),
            vec![("b".to_string(), true), ("old".to_string(), false), ("!".to_string(), false)]
        );
    }

    #[test]
    fn test_ignored_bytes_kept_on_request() {
        let r = record(b"\x1b[1mab");
        let all = runs(&r, &[4], true);
        assert_eq!(all[0], ("\x1b[1m".to_string(), false));
        assert_eq!(all[1], ("a".to_string(), true));
        assert_eq!(all[2], ("b".to_string(), false));
    }

    #[test]
    fn test_from_skips_label() {
        let r = Record::new(0, b"A\t", b"xy", DEFAULT_ESCAPE_SCAN_LIMIT);
        let segs = segments(&r, &[0, 3], 2, false);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], Segment { start: 2, end: 3, highlighted: false });
        assert_eq!(segs[1], Segment { start: 3, end: 4, highlighted: true });
    }

    #[test]
    fn test_display_text_blanks_field_breaks() {
        assert_eq!(display_text(b"A\tapple"), "A apple");
        assert_eq!(display_text(b"plain"), "plain");
    }
}
