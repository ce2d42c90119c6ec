//! Fixed-size bit set used for per-byte record masks.
//!
//! Bits are packed into `u64` words; the length is fixed at construction and
//! every accessor is bounds-checked against it.

/// A fixed-length set of bits
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BitSet {
    /// Bit array stored as u64 words for efficient access
    words: Box<[u64]>,
    /// Number of addressable bits
    len: usize,
}

impl BitSet {
    /// Create a bit set of `len` bits, all clear
    pub fn new(len: usize) -> Self {
        let num_words = len.div_ceil(64);
        Self {
            words: vec![0u64; num_words].into_boxed_slice(),
            len,
        }
    }

    /// Number of addressable bits
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Test bit `i`. Panics if `i` is out of range.
    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        assert!(i < self.len, "bit {} out of range for set of {}", i, self.len);
        self.words[i / 64] & (1u64 << (i % 64)) != 0
    }

    /// Set bit `i`. Panics if `i` is out of range.
    #[inline]
    pub fn insert(&mut self, i: usize) {
        assert!(i < self.len, "bit {} out of range for set of {}", i, self.len);
        self.words[i / 64] |= 1u64 << (i % 64);
    }

    /// Set every bit in `0..end`
    pub fn insert_prefix(&mut self, end: usize) {
        assert!(end <= self.len, "prefix {} out of range for set of {}", end, self.len);
        let full = end / 64;
        for word in &mut self.words[..full] {
            *word = u64::MAX;
        }
        let rest = end % 64;
        if rest > 0 {
            self.words[full] |= (1u64 << rest) - 1;
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Copy of bits `start..self.len()` as a new set
    pub fn slice_from(&self, start: usize) -> Self {
        assert!(start <= self.len);
        let mut out = Self::new(self.len - start);
        for i in start..self.len {
            if self.contains(i) {
                out.insert(i - start);
            }
        }
        out
    }
}
