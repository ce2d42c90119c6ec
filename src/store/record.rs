use crate::matcher::class::{class, ByteClass};
use crate::utils::bitset::BitSet;

/// Stable identifier of a record: its ingestion order
pub type RecordId = u32;

/// Default upper bound on the length of a single CSI escape sequence
pub const DEFAULT_ESCAPE_SCAN_LIMIT: usize = 32;

const ESC: u8 = 0x1b;

/// One ingested candidate line.
///
/// Content and ignore mask are fixed at ingestion; scores live in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    index: RecordId,
    /// Length of the generated label prefix (including its separator)
    label_len: u32,
    bytes: Box<[u8]>,
    /// Bytes skipped by the matcher and by gap accounting
    ignore: BitSet,
}

impl Record {
    /// Build a record from an optional label prefix and the line content
    pub fn new(index: RecordId, label: &[u8], line: &[u8], escape_scan_limit: usize) -> Self {
        let mut bytes = Vec::with_capacity(label.len() + line.len());
        bytes.extend_from_slice(label);
        bytes.extend_from_slice(line);

        let ignore = ignore_mask(&bytes, escape_scan_limit);

        Self {
            index,
            label_len: label.len() as u32,
            bytes: bytes.into_boxed_slice(),
            ignore,
        }
    }

    pub fn index(&self) -> RecordId {
        self.index
    }

    /// All bytes, label included
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes with the label stripped (the output form)
    pub fn content(&self) -> &[u8] {
        &self.bytes[self.label_len as usize..]
    }

    pub fn label_len(&self) -> usize {
        self.label_len as usize
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn is_ignored(&self, i: usize) -> bool {
        self.ignore.contains(i)
    }

    pub fn ignore_mask(&self) -> &BitSet {
        &self.ignore
    }
}

/// Escape scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    Text,
    /// Just saw ESC
    Introducer,
    /// Inside `ESC [`, with the number of bytes consumed so far
    Csi(usize),
}

/// Compute the per-byte ignore mask in one left-to-right pass.
///
/// Ignored: control bytes other than field breaks, every byte of an escape
/// sequence, and everything before a carriage return that has content after
/// it. A CSI sequence ends at its final byte (`0x40..=0x7e`, which includes
/// the SGR `m`) or after `escape_scan_limit` bytes.
pub fn ignore_mask(bytes: &[u8], escape_scan_limit: usize) -> BitSet {
    let mut mask = BitSet::new(bytes.len());
    let mut state = Escape::Text;

    for (i, &c) in bytes.iter().enumerate() {
        let ignored = if c == ESC {
            state = Escape::Introducer;
            true
        } else {
            match state {
                Escape::Text => c < b' ' && class(c) != ByteClass::FieldBreak,
                Escape::Introducer => {
                    state = if c == b'[' {
                        Escape::Csi(2)
                    } else {
                        Escape::Text
                    };
                    true
                }
                Escape::Csi(len) => {
                    state = if (0x40..=0x7e).contains(&c) || len + 1 >= escape_scan_limit {
                        Escape::Text
                    } else {
                        Escape::Csi(len + 1)
                    };
                    true
                }
            }
        };

        if ignored {
            mask.insert(i);
        }

        // The terminal overwrites the line from its start
        if c == b'\r' && i + 1 < bytes.len() {
            mask.insert_prefix(i);
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignored(bytes: &[u8]) -> Vec<usize> {
        let mask = ignore_mask(bytes, DEFAULT_ESCAPE_SCAN_LIMIT);
        (0..bytes.len()).filter(|&i| mask.contains(i)).collect()
    }

    #[test]
    fn test_plain_text_has_no_ignored_bytes() {
        assert!(ignored(b"src/main.rs").is_empty());
    }

    #[test]
    fn test_sgr_sequence_is_ignored() {
        // "\x1b[31mred\x1b[0m"
        let bytes = b"\x1b[31mred\x1b[0m";
        assert_eq!(ignored(bytes), vec![0, 1, 2, 3, 4, 8, 9, 10, 11]);
    }

    #[test]
    fn test_other_csi_final_bytes_terminate() {
        // Erase-line "ESC [ K" ends at K, not at a later 'm'
        let bytes = b"\x1b[Kmore";
        assert_eq!(ignored(bytes), vec![0, 1, 2]);
    }

    #[test]
    fn test_two_byte_escape() {
        let bytes = b"\x1b7ab";
        assert_eq!(ignored(bytes), vec![0, 1]);
    }

    #[test]
    fn test_unterminated_escape_is_bounded() {
        let mut bytes = b"\x1b[".to_vec();
        bytes.extend(std::iter::repeat_n(b'1', 100));
        let mask = ignore_mask(&bytes, 8);
        assert_eq!(mask.count_ones(), 8);
        assert!(!mask.contains(8));
    }

    #[test]
    fn test_control_bytes_ignored_except_field_breaks() {
        let bytes = b"a\x01b\tc\x00d\x1fe";
        assert_eq!(ignored(bytes), vec![1]);
    }

    #[test]
    fn test_carriage_return_overwrites_line() {
        let bytes = b"50%\r100%";
        assert_eq!(ignored(bytes), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_trailing_carriage_return_keeps_line() {
        let bytes = b"line\r";
        assert_eq!(ignored(bytes), vec![4]);
    }

    #[test]
    fn test_record_label_and_content() {
        let record = Record::new(3, b"D\t", b"apple", DEFAULT_ESCAPE_SCAN_LIMIT);
        assert_eq!(record.index(), 3);
        assert_eq!(record.bytes(), b"D\tapple");
        assert_eq!(record.content(), b"apple");
        assert_eq!(record.label_len(), 2);
        assert_eq!(record.len(), 7);
        // The tab is a field break, not ignored
        assert!(!record.is_ignored(1));
    }

    #[test]
    fn test_ignore_mask_is_stable_across_reingestion() {
        let record = Record::new(0, b"AB\t", b"\x1b[1mbold\x1b[m x", DEFAULT_ESCAPE_SCAN_LIMIT);
        let again = Record::new(0, b"", record.content(), DEFAULT_ESCAPE_SCAN_LIMIT);
        assert_eq!(
            again.ignore_mask(),
            &record.ignore_mask().slice_from(record.label_len())
        );
    }
}
