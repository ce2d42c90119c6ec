/// Byte separating a generated label from the record content
pub const LABEL_SEPARATOR: u8 = b'\t';

/// Append the alphabetic label for `index` to `out`.
///
/// Labels count in bijective base 26: `A`..`Z`, `AA`..`ZZ`, `AAA`, ...
pub fn write_label(index: u32, out: &mut Vec<u8>) {
    // 26^7 > u32::MAX, so seven letters always suffice
    let mut digits = [0u8; 7];
    let mut pos = digits.len();
    let mut n = index as u64;

    loop {
        pos -= 1;
        digits[pos] = b'A' + (n % 26) as u8;
        n /= 26;
        if n == 0 {
            break;
        }
        n -= 1;
    }

    out.extend_from_slice(&digits[pos..]);
}

/// Label for `index` followed by [`LABEL_SEPARATOR`]
pub fn label_prefix(index: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(8);
    write_label(index, &mut out);
    out.push(LABEL_SEPARATOR);
    out
}
