//! Byte classification and the class-transition bonus table.
//!
//! Both tables are built at compile time and are immutable.

/// Character class of a single byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ByteClass {
    None = 0,
    FieldBreak = 1,
    WordBreak = 2,
    SubwordBreak = 3,
    Special = 4,
    Lower = 5,
    Upper = 6,
    Digit = 7,
}

const CLASS_COUNT: usize = 8;

const fn classify_byte(c: u8) -> ByteClass {
    match c {
        0x00 | b'\t' | 0x1f => ByteClass::FieldBreak,
        b' ' | b'"' | b'\'' | b'`' | b'/' => ByteClass::WordBreak,
        b'_' | b'-' => ByteClass::SubwordBreak,
        b'#' | b'$' | b'(' | b'.' | b':' | b'[' => ByteClass::Special,
        b'a'..=b'z' => ByteClass::Lower,
        b'A'..=b'Z' => ByteClass::Upper,
        b'0'..=b'9' => ByteClass::Digit,
        _ => ByteClass::None,
    }
}

const fn build_class_table() -> [ByteClass; 256] {
    let mut table = [ByteClass::None; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = classify_byte(i as u8);
        i += 1;
    }
    table
}

static CLASSES: [ByteClass; 256] = build_class_table();

/// Map a byte to its class. Total over all byte values.
#[inline]
pub fn class(byte: u8) -> ByteClass {
    CLASSES[byte as usize]
}

/// Bonus for entering class `[current]` from class `[previous]`.
///
/// Ordering: field/word/subword breaks > special > case transition >
/// same-case run. An uppercase letter right after a break scores highest.
const BONUS: [[u8; CLASS_COUNT]; CLASS_COUNT] = {
    use ByteClass as C;

    let mut table = [[1u8; CLASS_COUNT]; CLASS_COUNT];

    let breaks = [(C::FieldBreak, 10u8), (C::WordBreak, 8), (C::SubwordBreak, 6)];
    let mut b = 0;
    while b < breaks.len() {
        let (prev, base) = breaks[b];
        let mut cur = 0;
        while cur < CLASS_COUNT {
            table[prev as usize][cur] = base;
            cur += 1;
        }
        table[prev as usize][C::Upper as usize] = base + 2;
        b += 1;
    }

    let mut cur = 0;
    while cur < CLASS_COUNT {
        table[C::Special as usize][cur] = 4;
        cur += 1;
    }

    // camelCase, Digit2Upper, x86Foo
    table[C::None as usize][C::Upper as usize] = 3;
    table[C::Lower as usize][C::Upper as usize] = 3;
    table[C::Digit as usize][C::Upper as usize] = 3;
    table[C::Lower as usize][C::Digit as usize] = 2;
    table[C::Upper as usize][C::Digit as usize] = 2;
    table[C::Digit as usize][C::Lower as usize] = 2;

    table
};

/// Bonus for the transition `previous -> current`, unscaled
#[inline]
pub fn bonus(previous: ByteClass, current: ByteClass) -> u32 {
    BONUS[previous as usize][current as usize] as u32
}

/// Transitions inside a plain run of lowercase letters or digits.
///
/// Matches on these are only kept when they continue a contiguous match.
#[inline]
pub fn is_run_continuation(previous: ByteClass, current: ByteClass) -> bool {
    matches!(
        (previous, current),
        (ByteClass::Lower, ByteClass::Lower)
            | (ByteClass::Upper, ByteClass::Lower)
            | (ByteClass::Digit, ByteClass::Digit)
    )
}
