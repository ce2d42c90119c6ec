//! Fuzzy matching.
//!
//! - [`class`] - Byte classes and the transition bonus table
//! - [`query`] - Truncated, case-folded queries
//! - [`scorer`] - Feasibility test and the alignment pass

pub mod class;
pub mod query;
pub mod scorer;

pub use query::{Query, QUERY_SIZE_MAX};
pub use scorer::{score, score_with_positions, Match, EMPTY_QUERY_SCORE};
