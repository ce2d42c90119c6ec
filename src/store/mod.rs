//! Record storage.
//!
//! - [`record`] - A single ingested line and its ignore mask
//! - [`label`] - Generated alphabetic labels
//! - [`reader`] - Delimited input reading and line sources

pub mod label;
pub mod reader;
pub mod record;

pub use record::{Record, RecordId, DEFAULT_ESCAPE_SCAN_LIMIT};

/// How input is split and decorated at ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Byte terminating each record
    pub delimiter: u8,
    /// Prefix each record with a generated label
    pub labels: bool,
    /// Upper bound on a single escape sequence
    pub escape_scan_limit: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\n',
            labels: false,
            escape_scan_limit: DEFAULT_ESCAPE_SCAN_LIMIT,
        }
    }
}

/// Append-only array of records, indexed by [`RecordId`]
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    options: IngestOptions,
}

impl RecordStore {
    pub fn new(options: IngestOptions) -> Self {
        Self {
            records: Vec::new(),
            options,
        }
    }

    /// Build a store from a delimited byte buffer
    pub fn from_bytes(bytes: &[u8], options: IngestOptions) -> Self {
        let mut store = Self::new(options);
        for line in reader::split_records(bytes, store.options.delimiter) {
            store.push(line);
        }
        store
    }

    /// Ingest one line, assigning the next index
    pub fn push(&mut self, line: &[u8]) -> RecordId {
        let index = self.records.len() as RecordId;
        let label = if self.options.labels {
            label::label_prefix(index)
        } else {
            Vec::new()
        };

        self.records.push(Record::new(
            index,
            &label,
            line,
            self.options.escape_scan_limit,
        ));
        index
    }

    #[inline]
    pub fn get(&self, id: RecordId) -> &Record {
        &self.records[id as usize]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Ids of every record, in ingestion order
    pub fn ids(&self) -> Vec<RecordId> {
        (0..self.records.len() as RecordId).collect()
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }
}
