//! Permissive numeric parsing for endpoint input
//!
//! Endpoint writes follow the text conventions of a kernel attribute file:
//! the value is read from the longest valid prefix and anything after it
//! (typically the trailing newline) is ignored. Input with no valid digits
//! parses to zero. This is not a validator; it never fails.
//!
//! Accumulation wraps on overflow, so callers mask the result to the width
//! of the register they are addressing.

/// Parse base-16 text the permissive way
///
/// An optional `0x`/`0X` prefix is skipped when a hex digit follows it.
/// Parsing stops at the first character that is not a hex digit.
///
/// ```
/// use fwdt::parse::parse_hex_permissive;
///
/// assert_eq!(parse_hex_permissive("0x3f8\n"), 0x3F8);
/// assert_eq!(parse_hex_permissive("41"), 0x41);
/// assert_eq!(parse_hex_permissive("zz"), 0);
/// ```
pub fn parse_hex_permissive(input: &str) -> u64 {
    let bytes = input.as_bytes();
    let digits = match bytes {
        [b'0', b'x' | b'X', next, ..] if next.is_ascii_hexdigit() => &bytes[2..],
        _ => bytes,
    };

    let mut value: u64 = 0;
    for &b in digits {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => break,
        };
        value = value.wrapping_mul(16).wrapping_add(digit as u64);
    }
    value
}

/// Parse base-10 text the permissive way
///
/// Parsing stops at the first character that is not a decimal digit.
pub fn parse_dec_permissive(input: &str) -> u64 {
    let mut value: u64 = 0;
    for &b in input.as_bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as u64);
    }
    value
}
