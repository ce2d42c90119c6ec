//! Bit-parallel alignment scorer.
//!
//! A record is scored in two steps. A cheap feasibility test rejects records
//! that do not contain the query as a case-insensitive subsequence of visible
//! bytes. Survivors get one left-to-right alignment pass that keeps, per query
//! prefix length, the best decayed score and the path that produced it.

use super::class::{bonus, class, is_run_continuation, ByteClass};
use super::query::{Query, QUERY_SIZE_MAX};
use crate::store::Record;
use memchr::{memchr, memchr2};

/// Score of every record under the empty query
pub const EMPTY_QUERY_SCORE: u32 = u32::MAX;

/// Penalty per visible byte between two matched bytes
const GAP_PENALTY: u32 = 1;

/// Class bonuses are scaled so a break is worth a few dozen skipped bytes
const BONUS_SCALE: u32 = 32 * GAP_PENALTY;

/// Outcome of scoring one record against a non-rejecting query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Always > 0
    pub score: u32,
    /// Bytes after the last matched byte of the best alignment
    pub trail: u32,
}

impl Match {
    /// The match every record gets under the empty query
    pub const fn everything() -> Self {
        Self {
            score: EMPTY_QUERY_SCORE,
            trail: 0,
        }
    }

    pub fn is_everything(&self) -> bool {
        self.score == EMPTY_QUERY_SCORE
    }
}

/// Best complete alignment found by [`align`]
struct Alignment {
    score: u32,
    /// Offset of the last matched byte
    end: usize,
    path: [u32; QUERY_SIZE_MAX],
}

impl Alignment {
    fn to_match(&self, record_len: usize) -> Match {
        Match {
            score: self.score,
            trail: (record_len - (self.end + 1)) as u32,
        }
    }
}

/// Score `record` against `query`; `None` means no match
pub fn score(record: &Record, query: &Query) -> Option<Match> {
    if query.is_empty() {
        return Some(Match::everything());
    }
    if !is_feasible(record, query) {
        return None;
    }

    align(record, query).map(|alignment| alignment.to_match(record.len()))
}

/// Like [`score`], also filling `positions` with the matched byte offsets.
///
/// `positions` is cleared first and stays empty for the empty query or a
/// rejected record. Offsets are strictly increasing.
pub fn score_with_positions(
    record: &Record,
    query: &Query,
    positions: &mut Vec<u32>,
) -> Option<Match> {
    positions.clear();
    if query.is_empty() {
        return Some(Match::everything());
    }
    if !is_feasible(record, query) {
        return None;
    }

    let alignment = align(record, query)?;
    positions.extend_from_slice(&alignment.path[..query.len()]);
    Some(alignment.to_match(record.len()))
}

/// Whether the folded query occurs as a subsequence of the visible bytes
pub fn is_feasible(record: &Record, query: &Query) -> bool {
    let bytes = record.bytes();
    let mut from = 0;

    'query: for &q in query.folded() {
        while from < bytes.len() {
            let haystack = &bytes[from..];
            let found = if q.is_ascii_lowercase() {
                memchr2(q, q.to_ascii_uppercase(), haystack)
            } else {
                memchr(q, haystack)
            };
            let Some(offset) = found else {
                return false;
            };

            let i = from + offset;
            from = i + 1;
            if !record.is_ignored(i) {
                continue 'query;
            }
        }
        return false;
    }

    true
}

#[inline]
fn prefix_mask(len: usize) -> u32 {
    if len >= 32 { u32::MAX } else { (1u32 << len) - 1 }
}

/// Partial matches whose last matched byte is one particular visible byte
struct Frontier {
    /// Bit `j` set when `query[..=j]` can end here
    mask: u32,
    score: [u32; QUERY_SIZE_MAX],
    /// Contiguous-run bonus carried by `score[j]`
    run: [u32; QUERY_SIZE_MAX],
    paths: [[u32; QUERY_SIZE_MAX]; QUERY_SIZE_MAX],
}

impl Frontier {
    const EMPTY: Self = Self {
        mask: 0,
        score: [0; QUERY_SIZE_MAX],
        run: [0; QUERY_SIZE_MAX],
        paths: [[0; QUERY_SIZE_MAX]; QUERY_SIZE_MAX],
    };
}

/// Single alignment pass over the visible bytes of `record`.
///
/// `cells[j]` holds the best score of a partial match covering `query[..j]`,
/// decayed by the visible distance since it was set. Positions are visited
/// from the highest prefix down so every cell still reads the previous
/// byte's state. Run continuations may only extend a partial match ending at
/// the previous visible byte, which the frontiers track separately.
fn align(record: &Record, query: &Query) -> Option<Alignment> {
    let m = query.len();
    debug_assert!(m > 0 && m <= QUERY_SIZE_MAX);

    let mut cells = [0u32; QUERY_SIZE_MAX + 1];
    // Bonus that produced cells[j]
    let mut cell_bonus = [0u32; QUERY_SIZE_MAX + 1];
    // paths[j][..=j] are the offsets behind cells[j + 1]
    let mut paths = [[0u32; QUERY_SIZE_MAX]; QUERY_SIZE_MAX];
    // Highest j with cells[j] set
    let mut filled = 0usize;

    // Matches ending at the previous and at the current visible byte
    let mut frontiers = [Frontier::EMPTY, Frontier::EMPTY];
    let mut cur = 0usize;

    let mut best: Option<Alignment> = None;
    let mut gap = 0u32;
    let mut prev_class = ByteClass::FieldBreak;

    for (i, &c) in record.bytes().iter().enumerate() {
        if record.is_ignored(i) {
            continue;
        }

        let cur_class = class(c);
        let transition = bonus(prev_class, cur_class) * BONUS_SCALE;
        let boring = is_run_continuation(prev_class, cur_class);
        prev_class = cur_class;

        gap += GAP_PENALTY;

        let reachable = (filled + 1).min(m);
        let candidates = query.positions_of(c) & prefix_mask(reachable);
        if candidates == 0 {
            frontiers[cur ^ 1].mask = 0;
            continue;
        }

        for cell in &mut cells[..=filled] {
            *cell = cell.saturating_sub(gap);
        }
        gap = 0;

        let (left, right) = frontiers.split_at_mut(1);
        let (prev, here) = if cur == 0 {
            (&right[0], &mut left[0])
        } else {
            (&left[0], &mut right[0])
        };
        here.mask = 0;

        let mut pending = candidates;
        while pending != 0 {
            let j = (31 - pending.leading_zeros()) as usize;
            pending &= !(1u32 << j);

            let repeat = if cell_bonus[j + 1] == transition {
                transition
            } else {
                0
            };

            // Extend the match that ended at the previous visible byte
            let contiguous = (j > 0 && prev.mask & (1 << (j - 1)) != 0).then(|| {
                let run = transition.max(prev.run[j - 1]);
                let score =
                    prev.score[j - 1].saturating_sub(GAP_PENALTY) + transition + repeat + run;
                (score, run)
            });
            // Jump from the best match of the shorter prefix
            let gapped = (!boring).then(|| cells[j] + transition + repeat);

            let (score, run, from_prev) = match (contiguous, gapped) {
                (Some((joined, _)), Some(jumped)) if jumped > joined => (jumped, transition, false),
                (Some((joined, run)), _) => (joined, run, true),
                (None, Some(jumped)) => (jumped, transition, false),
                (None, None) => continue,
            };

            here.mask |= 1 << j;
            here.score[j] = score;
            here.run[j] = run;
            if j > 0 {
                let source = if from_prev { &prev.paths[j - 1] } else { &paths[j - 1] };
                here.paths[j][..j].copy_from_slice(&source[..j]);
            }
            here.paths[j][j] = i as u32;

            let fresh = j + 1 > filled;
            if fresh || score > cells[j + 1] {
                cells[j + 1] = score;
                cell_bonus[j + 1] = transition;
                paths[j][..=j].copy_from_slice(&here.paths[j][..=j]);
                filled = filled.max(j + 1);
            }

            // Ties go to the later completion
            if j + 1 == m && best.as_ref().is_none_or(|b| score >= b.score) {
                let mut path = [0u32; QUERY_SIZE_MAX];
                path[..m].copy_from_slice(&here.paths[j][..m]);
                best = Some(Alignment {
                    score,
                    end: i,
                    path,
                });
            }
        }

        cur ^= 1;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_ESCAPE_SCAN_LIMIT;

    fn record(line: &[u8]) -> Record {
        Record::new(0, b"", line, DEFAULT_ESCAPE_SCAN_LIMIT)
    }

    fn positions(line: &[u8], query: &str) -> Option<Vec<u32>> {
        let mut out = Vec::new();
        score_with_positions(&record(line), &Query::new(query), &mut out).map(|_| out)
    }

    fn score_of(line: &[u8], query: &str) -> u32 {
        score(&record(line), &Query::new(query)).map_or(0, |m| m.score)
    }

    #[test]
    fn test_prefix_match() {
        assert_eq!(positions(b"apple.txt", "ap"), Some(vec![0, 1]));
    }

    #[test]
    fn test_mid_word_start_is_rejected() {
        assert!(is_feasible(&record(b"grape"), &Query::new("ap")));
        assert_eq!(positions(b"grape", "ap"), None);
        assert_eq!(positions(b"Banana.TXT", "ap"), None);
    }

    #[test]
    fn test_run_continuation_needs_adjacent_predecessor() {
        // b follows a lowercase byte, so it must extend the a right before it
        assert_eq!(positions(b"a-ab", "ab"), Some(vec![2, 3]));
        assert_eq!(positions(b"a-xb", "ab"), None);
        assert_eq!(positions(b"ab_xab", "ab"), Some(vec![0, 1]));
    }

    #[test]
    fn test_boring_positions_follow_their_predecessor() {
        for (line, text) in [
            (&b"a-ab"[..], "ab"),
            (b"src/session/mod.rs", "ssmo"),
            (b"foo_bar_baz.rs", "fbaz"),
            (b"x1-x12", "x12"),
            (b"lib/Session/RankingState.rs", "sesta"),
        ] {
            let record = record(line);
            let query = Query::new(text);
            let mut out = Vec::new();
            if score_with_positions(&record, &query, &mut out).is_none() {
                continue;
            }
            for pair in out.windows(2) {
                let (before, at) = (pair[0] as usize, pair[1] as usize);
                if is_run_continuation(class(line[at - 1]), class(line[at])) {
                    assert_eq!(before, at - 1, "{:?} in {:?}", text, line);
                }
            }
        }
    }

    #[test]
    fn test_case_folded_query_uses_extension() {
        assert_eq!(positions(b"apple.txt", "APT"), Some(vec![0, 1, 6]));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let mut out = vec![7];
        let result = score_with_positions(&record(b"anything"), &Query::empty(), &mut out);
        assert_eq!(result, Some(Match::everything()));
        assert!(out.is_empty());
        assert_eq!(score(&record(b""), &Query::empty()), Some(Match::everything()));
    }

    #[test]
    fn test_infeasible_record() {
        assert_eq!(positions(b"apple", "z"), None);
        assert_eq!(positions(b"pa", "ap"), None);
        assert_eq!(positions(b"", "a"), None);
    }

    #[test]
    fn test_ignored_bytes_do_not_match() {
        // The 'm' of the SGR sequence is not matchable
        assert_eq!(positions(b"\x1b[1mx", "m"), None);
        assert_eq!(positions(b"\x1b[1mmake", "m"), Some(vec![4]));
    }

    #[test]
    fn test_decoration_does_not_cost_score() {
        let plain = score_of(b"foo bar", "fb");
        let decorated = score_of(b"\x1b[31mfoo\x1b[0m bar", "fb");
        assert!(plain > 0);
        assert_eq!(plain, decorated);
    }

    #[test]
    fn test_word_starts_beat_scattered_letters() {
        assert!(score_of(b"src/main.rs", "sm") > score_of(b"some/thing/m", "sm"));
        assert!(score_of(b"fooBar", "fb") > 0);
        assert!(score_of(b"foo_bar", "fb") > score_of(b"foo.bar", "fb"));
    }

    #[test]
    fn test_contiguous_beats_gapped() {
        assert!(score_of(b"foo bar", "foo") > score_of(b"f o o bar", "foo"));
    }

    #[test]
    fn test_trail_measures_bytes_after_match() {
        let m = score(&record(b"apple.txt"), &Query::new("ap")).unwrap();
        assert_eq!(m.trail, 7);
        let m = score(&record(b"apple.txt"), &Query::new("txt")).unwrap();
        assert_eq!(m.trail, 0);
    }

    #[test]
    fn test_positions_are_subsequence() {
        let line = b"lib/Session/RankingState.rs";
        let query = Query::new("srs");
        let mut out = Vec::new();
        let result = score_with_positions(&record(line), &query, &mut out);

        assert!(result.is_some());
        assert_eq!(out.len(), 3);
        assert!(out.windows(2).all(|w| w[0] < w[1]));
        for (&p, &q) in out.iter().zip(query.folded()) {
            assert_eq!(line[p as usize].to_ascii_lowercase(), q);
        }
    }

    #[test]
    fn test_full_length_query() {
        let line = b"abcdefghijklmnopqrstuvwxyz012345";
        let query = std::str::from_utf8(line).unwrap();
        let found = positions(line, query).unwrap();
        assert_eq!(found, (0..32).collect::<Vec<u32>>());
    }

    #[test]
    fn test_prefix_query_matches_when_extension_does() {
        for line in [&b"src/tui/app.rs"[..], b"Cargo.toml", b"the_quick_brown"] {
            for len in 1..=5 {
                let full = "stapq";
                let longer = score_of(line, &full[..len]);
                if len > 1 && longer > 0 {
                    assert!(score_of(line, &full[..len - 1]) > 0);
                }
            }
        }
    }
}
