//! Ranking session: the `(total, universe, matches)` state machine.
//!
//! - `total` is every record in the store
//! - `universe` is the subset eligible for matching
//! - `matches` is the scored, ranked subset of the universe for the last query
//!
//! Query changes rescore in parallel on a bounded rayon pool. Results for
//! recent queries are kept in an LRU cache that is dropped whenever the
//! universe changes.

pub mod command;

pub use command::{Command, UnknownCommand};

use crate::editor::{EditError, EditSession};
use crate::matcher::{score, score_with_positions, Query, EMPTY_QUERY_SCORE};
use crate::store::{RecordId, RecordStore};
use anyhow::{Context, Result};
use lru::LruCache;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A record that matches the current query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: RecordId,
    pub score: u32,
    pub trail: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Rank matches; when off they keep universe order
    pub sort: bool,
    /// Scoring threads, 0 for one per CPU
    pub threads: usize,
    /// Queries remembered per universe, 0 disables the cache
    pub cache_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sort: true,
            threads: 0,
            cache_size: 64,
        }
    }
}

/// What the caller should do after a command
#[derive(Debug)]
pub enum Outcome {
    /// Nothing visible beyond a redraw
    Continue,
    /// The universe changed and the query text was cleared
    QueryCleared,
    /// Print these records and keep going
    Emit(Vec<RecordId>),
    /// Print these records and end successfully
    Accept(Vec<RecordId>),
    /// End with a failure status: nothing to accept
    NoMatch,
    /// End with this status
    Quit(u8),
    /// The edit round trip failed; state is unchanged
    EditFailed(EditError),
}

pub struct Session {
    store: RecordStore,
    universe: Vec<RecordId>,
    matches: Vec<Hit>,
    /// Query `matches` was computed for
    query: Query,
    /// Universe changed since `matches` was computed
    stale: bool,
    cache: Option<LruCache<Vec<u8>, Vec<Hit>>>,
    options: SessionOptions,
    pool: rayon::ThreadPool,
}

impl Session {
    /// Start a session over every record of `store`, matching the empty query
    pub fn new(store: RecordStore, options: SessionOptions) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .thread_name(|i| format!("sift-score-{}", i))
            .build()
            .context("Failed to build scoring thread pool")?;
        let cache = NonZeroUsize::new(options.cache_size).map(LruCache::new);

        let mut session = Self {
            universe: store.ids(),
            store,
            matches: Vec::new(),
            query: Query::empty(),
            stale: true,
            cache,
            options,
            pool,
        };
        session.set_query(Query::empty());
        Ok(session)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn universe(&self) -> &[RecordId] {
        &self.universe
    }

    pub fn matches(&self) -> &[Hit] {
        &self.matches
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn total_len(&self) -> usize {
        self.store.len()
    }

    /// Rescore for `query`.
    ///
    /// Repeating the current query is a no-op. A query extending the previous
    /// one only rescores the current matches, unless the universe changed.
    pub fn set_query(&mut self, query: Query) {
        if !self.stale && query == self.query {
            return;
        }

        if !self.stale {
            if let Some(hits) = self.cache.as_mut().and_then(|c| c.get(query.folded())) {
                debug!(query = ?query, matches = hits.len(), "query cache hit");
                self.matches = hits.clone();
                self.query = query;
                return;
            }
        }

        let start = Instant::now();
        let restrict = !self.stale && query.refines(&self.query);
        let scope: Vec<RecordId> = if restrict {
            self.matches.iter().map(|hit| hit.id).collect()
        } else {
            self.universe.clone()
        };

        let mut hits = score_scope(&self.pool, &self.store, &scope, &query);
        if self.options.sort {
            let store = &self.store;
            self.pool
                .install(|| hits.par_sort_unstable_by(|a, b| rank(store, a, b)));
        }

        debug!(
            query = ?query,
            scope = scope.len(),
            matches = hits.len(),
            restricted = restrict,
            elapsed_us = start.elapsed().as_micros() as u64,
            "rescored"
        );

        if let Some(cache) = self.cache.as_mut() {
            cache.put(query.folded().to_vec(), hits.clone());
        }
        self.matches = hits;
        self.query = query;
        self.stale = false;
    }

    /// Make the current matches the new universe and clear the query
    pub fn narrow_to_matches(&mut self) {
        let universe = self.matches.iter().map(|hit| hit.id).collect();
        self.replace_universe(universe);
    }

    /// Make every record eligible again and clear the query
    pub fn reset_universe(&mut self) {
        let universe = self.store.ids();
        self.replace_universe(universe);
    }

    fn replace_universe(&mut self, universe: Vec<RecordId>) {
        self.universe = universe;
        self.invalidate();
        self.set_query(Query::empty());
        info!(universe = self.universe.len(), "universe replaced");
    }

    fn invalidate(&mut self) {
        self.stale = true;
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    /// Output form of the universe, one delimiter-terminated record each
    pub fn universe_bytes(&self) -> Vec<u8> {
        let delimiter = self.store.options().delimiter;
        let mut out = Vec::new();
        for &id in &self.universe {
            out.extend_from_slice(self.store.get(id).content());
            out.push(delimiter);
        }
        out
    }

    /// Round-trip the universe through `editor` and ingest the result as the
    /// new total. On failure nothing changes.
    pub fn edit(&mut self, editor: &mut dyn EditSession) -> Result<usize, EditError> {
        let edited = editor.edit(&self.universe_bytes())?;

        self.store = RecordStore::from_bytes(&edited, self.store.options().clone());
        self.universe = self.store.ids();
        self.invalidate();

        let query = std::mem::replace(&mut self.query, Query::empty());
        self.set_query(query);

        info!(records = self.store.len(), "replaced records from editor");
        Ok(self.store.len())
    }

    /// Matched byte offsets of `hit` under the current query
    pub fn positions(&self, hit: &Hit, out: &mut Vec<u32>) {
        score_with_positions(self.store.get(hit.id), &self.query, out);
    }

    pub fn accept_one(&self) -> Outcome {
        match self.matches.first() {
            Some(hit) => Outcome::Accept(vec![hit.id]),
            None => Outcome::NoMatch,
        }
    }

    pub fn accept_all(&self) -> Outcome {
        if self.matches.is_empty() {
            Outcome::Continue
        } else {
            Outcome::Accept(self.match_ids())
        }
    }

    /// Accept the sole member of the universe, if there is exactly one
    pub fn accept_only(&self) -> Outcome {
        if self.universe.len() == 1 {
            self.accept_one()
        } else {
            Outcome::Continue
        }
    }

    pub fn emit_one(&self) -> Outcome {
        match self.matches.first() {
            Some(hit) => Outcome::Emit(vec![hit.id]),
            None => Outcome::Continue,
        }
    }

    pub fn emit_all(&self) -> Outcome {
        if self.matches.is_empty() {
            Outcome::Continue
        } else {
            Outcome::Emit(self.match_ids())
        }
    }

    pub fn match_ids(&self) -> Vec<RecordId> {
        self.matches.iter().map(|hit| hit.id).collect()
    }

    /// Run a named command
    pub fn apply(&mut self, command: Command, editor: &mut dyn EditSession) -> Outcome {
        debug!(%command, "command");
        match command {
            Command::NarrowToMatches => {
                self.narrow_to_matches();
                // A single survivor is taken right away
                match self.accept_only() {
                    Outcome::Accept(ids) => Outcome::Accept(ids),
                    _ => Outcome::QueryCleared,
                }
            }
            Command::ResetUniverse => {
                self.reset_universe();
                Outcome::QueryCleared
            }
            Command::AcceptOne => self.accept_one(),
            Command::AcceptAll => self.accept_all(),
            Command::AcceptOnly => self.accept_only(),
            Command::EmitOne => self.emit_one(),
            Command::EmitAll => self.emit_all(),
            Command::Edit => match self.edit(editor) {
                Ok(_) => Outcome::Continue,
                Err(err) => {
                    warn!(error = %err, "edit failed, keeping records");
                    Outcome::EditFailed(err)
                }
            },
            Command::QuitWithCode(code) => Outcome::Quit(code),
        }
    }
}

fn score_scope(
    pool: &rayon::ThreadPool,
    store: &RecordStore,
    scope: &[RecordId],
    query: &Query,
) -> Vec<Hit> {
    pool.install(|| {
        scope
            .par_iter()
            .filter_map(|&id| {
                score(store.get(id), query).map(|m| Hit {
                    id,
                    score: m.score,
                    trail: m.trail,
                })
            })
            .collect()
    })
}

/// Total ranking order: score desc, trail asc, length asc, then index.
/// Length is not compared under the empty query.
fn rank(store: &RecordStore, a: &Hit, b: &Hit) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.trail.cmp(&b.trail))
        .then_with(|| {
            if a.score == EMPTY_QUERY_SCORE {
                Ordering::Equal
            } else {
                store.get(a.id).len().cmp(&store.get(b.id).len())
            }
        })
        .then(a.id.cmp(&b.id))
}
