//! National ID (CPF) checksum validation and formatting.
//!
//! A national ID is 11 digits: nine base digits followed by two check digits.
//! Each check digit is derived from a weighted sum of the preceding digits
//! modulo 11. Sequences made of a single repeated digit pass the arithmetic
//! but are never issued, so they are rejected explicitly.

/// Number of digits in a national ID.
pub const NATIONAL_ID_LEN: usize = 11;

/// Remove every non-digit character (`"529.982.247-25"` -> `"52998224725"`).
pub fn strip(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Check whether `raw` is a valid national ID.
///
/// Formatting characters are ignored, so both `52998224725` and
/// `529.982.247-25` are accepted.
pub fn is_valid(raw: &str) -> bool {
    let digits: Vec<u32> = strip(raw).chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != NATIONAL_ID_LEN {
        return false;
    }

    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Format a national ID for display as `XXX.XXX.XXX-XX`.
///
/// Input that does not contain exactly 11 digits is returned stripped but
/// otherwise unchanged.
pub fn format(raw: &str) -> String {
    let digits = strip(raw);
    if digits.len() != NATIONAL_ID_LEN {
        return digits;
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// Compute the check digit for `digits`, weighting from `len + 1` down to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let top_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top_weight - i as u32))
        .sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}
