//! National identity number (RUT) checksum validation

use crate::entities::conversions::normalize_identity;

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 9;

/// Expected check character for a string of body digits, or `None` if a non-digit is present
pub fn check_character(body: &str) -> Option<char> {
    let mut sum = 0u32;
    let mut weight = 2u32;

    for c in body.chars().rev() {
        sum += c.to_digit(10)? * weight;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }

    match sum % 11 {
        0 => Some('0'),
        1 => Some('k'),
        r => char::from_digit(11 - r, 10),
    }
}

/// Validate a national identity number.
///
/// Accepts `12.345.678-5`, `12345678-5` or `123456785`; the check character is
/// case-insensitive. Malformed input is simply invalid.
pub fn validate_identity(raw: &str) -> bool {
    let normalized = normalize_identity(raw);
    let length = normalized.chars().count();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return false;
    }

    let mut chars = normalized.chars();
    let supplied = match chars.next_back() {
        Some(c) => c,
        None => return false,
    };

    check_character(chars.as_str()) == Some(supplied)
}
