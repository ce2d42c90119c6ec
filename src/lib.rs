//! # sift - interactive fuzzy finder
//!
//! sift reads candidate lines, ranks them against an incrementally typed
//! query by subsequence match quality, and lets the user narrow, re-query,
//! edit, or pick candidates in real time.
//!
//! ## Architecture
//!
//! - [`store`] - Record ingestion, labels, and escape-aware ignore masks
//! - [`matcher`] - Byte classes, queries, and the alignment scorer
//! - [`session`] - The universe/matches state machine, ranking, and caching
//! - [`render`] - Splitting records into highlighted runs
//! - [`output`] - Printing accepted and emitted records
//! - [`editor`] - Round trips through an external editor
//! - [`tui`] - Interactive terminal front end
//! - [`utils`] - Configuration, logging, and bit sets
//!
//! ## Quick Start
//!
//! ```
//! use sift::matcher::Query;
//! use sift::session::{Session, SessionOptions};
//! use sift::store::{IngestOptions, RecordStore};
//!
//! let store = RecordStore::from_bytes(b"apple.txt\ngrape.txt\n", IngestOptions::default());
//! let mut session = Session::new(store, SessionOptions::default()).unwrap();
//!
//! session.set_query(Query::new("ap"));
//! let best = session.matches()[0];
//! assert_eq!(session.store().get(best.id).content(), b"apple.txt");
//! ```

pub mod editor;
pub mod matcher;
pub mod output;
pub mod render;
pub mod session;
pub mod store;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;
