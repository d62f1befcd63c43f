//! Permissive integer coercion shared by the integer and boolean accessors.

/// Parses the leading integer of `value`, returning `0` when there is none.
///
/// Leading ASCII whitespace is skipped, one optional `+` or `-` sign is
/// accepted, and then the longest run of ASCII digits is consumed. Anything
/// after the digits is ignored. Values outside the `i64` range saturate.
///
/// # Examples
///
/// ```
/// use argmap_core::parse_leading_int;
///
/// assert_eq!(parse_leading_int("42"), 42);
/// assert_eq!(parse_leading_int("12abc"), 12);
/// assert_eq!(parse_leading_int("  -7"), -7);
/// assert_eq!(parse_leading_int("NaN"), 0);
/// assert_eq!(parse_leading_int(""), 0);
/// ```
pub fn parse_leading_int(value: &str) -> i64 {
    let trimmed = value.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut result: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        // Accumulate toward the sign so i64::MIN is reachable.
        result = if negative {
            result.saturating_mul(10).saturating_sub(digit)
        } else {
            result.saturating_mul(10).saturating_add(digit)
        };
    }
    result
}

/// Boolean interpretation of a stored option value.
///
/// The empty string (flag given without `=value`) is `true`; any other value
/// is `true` iff its leading integer is nonzero.
pub(crate) fn value_as_bool(value: &str) -> bool {
    value.is_empty() || parse_leading_int(value) != 0
}
