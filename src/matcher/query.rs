/// Longest query the matcher accepts; longer input is truncated
pub const QUERY_SIZE_MAX: usize = 32;

/// A search query, truncated to [`QUERY_SIZE_MAX`] bytes.
///
/// The literal bytes are kept for display; matching uses the ASCII-folded
/// form and a per-byte table of the query positions each byte can satisfy.
#[derive(Clone)]
pub struct Query {
    literal: Vec<u8>,
    folded: Vec<u8>,
    /// `positions[b]` has bit `j` set when query byte `j` matches byte `b`
    positions: Box<[u32; 256]>,
}

impl Query {
    pub fn new(text: impl AsRef<[u8]>) -> Self {
        let text = text.as_ref();
        let literal = text[..text.len().min(QUERY_SIZE_MAX)].to_vec();
        let folded: Vec<u8> = literal.iter().map(u8::to_ascii_lowercase).collect();

        let mut positions = Box::new([0u32; 256]);
        for (j, &q) in folded.iter().enumerate() {
            positions[q as usize] |= 1 << j;
            if q.is_ascii_lowercase() {
                positions[q.to_ascii_uppercase() as usize] |= 1 << j;
            }
        }

        Self {
            literal,
            folded,
            positions,
        }
    }

    pub fn empty() -> Self {
        Self::new(b"")
    }

    /// Literal bytes as typed (after truncation)
    pub fn as_bytes(&self) -> &[u8] {
        &self.literal
    }

    /// Case-folded bytes used for matching
    pub fn folded(&self) -> &[u8] {
        &self.folded
    }

    pub fn len(&self) -> usize {
        self.folded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    /// Bitmask of query positions that `byte` can satisfy
    #[inline]
    pub fn positions_of(&self, byte: u8) -> u32 {
        self.positions[byte as usize]
    }

    /// Whether every record matching `self` must also match `previous`.
    ///
    /// Holds when `self` extends `previous`: the alignment state for the
    /// shared prefix is identical, so a completed match for `self` passes
    /// through a completed match for `previous`. Infix refinements do not
    /// qualify because a run-continuation byte may be eligible only through
    /// a query byte that `previous` lacks.
    pub fn refines(&self, previous: &Query) -> bool {
        self.folded.starts_with(&previous.folded)
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Query {}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Query")
            .field(&String::from_utf8_lossy(&self.literal))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_long_query() {
        let long = "x".repeat(40);
        let query = Query::new(&long);
        assert_eq!(query.len(), QUERY_SIZE_MAX);
        assert_eq!(query.as_bytes(), &long.as_bytes()[..QUERY_SIZE_MAX]);
    }

    #[test]
    fn test_folding_keeps_literal() {
        let query = Query::new("ApT");
        assert_eq!(query.as_bytes(), b"ApT");
        assert_eq!(query.folded(), b"apt");
    }

    #[test]
    fn test_positions_are_case_insensitive() {
        let query = Query::new("aPa");
        assert_eq!(query.positions_of(b'a'), 0b101);
        assert_eq!(query.positions_of(b'A'), 0b101);
        assert_eq!(query.positions_of(b'p'), 0b010);
        assert_eq!(query.positions_of(b'P'), 0b010);
        assert_eq!(query.positions_of(b'x'), 0);
    }

    #[test]
    fn test_non_letters_match_exactly() {
        let query = Query::new("_1");
        assert_eq!(query.positions_of(b'_'), 0b01);
        assert_eq!(query.positions_of(b'1'), 0b10);
        assert_eq!(query.positions_of(b'-'), 0);
    }

    #[test]
    fn test_refines() {
        let previous = Query::new("an");
        assert!(Query::new("ant").refines(&previous));
        assert!(Query::new("AN").refines(&previous));
        assert!(Query::new("an").refines(&previous));
        assert!(!Query::new("ban").refines(&previous));
        assert!(!Query::new("a").refines(&previous));
        assert!(Query::new("anything").refines(&Query::empty()));
    }

    #[test]
    fn test_equality_ignores_case() {
        assert_eq!(Query::new("Foo"), Query::new("fOO"));
        assert_ne!(Query::new("foo"), Query::new("fo"));
    }
}
