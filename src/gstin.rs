//! Validation of 15-character GST registration identifiers: a two-digit
//! state code, a ten-character entity id (PAN), an entity-count code, the
//! literal `Z`, and a base-36 check character.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidGstin;

/// State and union-territory codes that may prefix a registration.
const STATE_CODES: &[(u8, &str)] = &[
    (1, "Jammu and Kashmir"),
    (2, "Himachal Pradesh"),
    (3, "Punjab"),
    (4, "Chandigarh"),
    (5, "Uttarakhand"),
    (6, "Haryana"),
    (7, "Delhi"),
    (8, "Rajasthan"),
    (9, "Uttar Pradesh"),
    (10, "Bihar"),
    (11, "Sikkim"),
    (12, "Arunachal Pradesh"),
    (13, "Nagaland"),
    (14, "Manipur"),
    (15, "Mizoram"),
    (16, "Tripura"),
    (17, "Meghalaya"),
    (18, "Assam"),
    (19, "West Bengal"),
    (20, "Jharkhand"),
    (21, "Odisha"),
    (22, "Chhattisgarh"),
    (23, "Madhya Pradesh"),
    (24, "Gujarat"),
    (25, "Daman and Diu"),
    (26, "Dadra and Nagar Haveli"),
    (27, "Maharashtra"),
    (28, "Andhra Pradesh"),
    (29, "Karnataka"),
    (30, "Goa"),
    (31, "Lakshadweep"),
    (32, "Kerala"),
    (33, "Tamil Nadu"),
    (34, "Puducherry"),
    (35, "Andaman and Nicobar Islands"),
    (36, "Telangana"),
    (37, "Andhra Pradesh"),
    (38, "Ladakh"),
];

/// A validated registration identifier. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gstin {
    value: String,
}

impl Gstin {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn state_code(&self) -> &str {
        &self.value[..2]
    }

    pub fn state_name(&self) -> &'static str {
        let code: u8 = self.value[..2].parse().unwrap_or(0);
        state_name(code).unwrap_or("Unknown State")
    }

    /// The embedded ten-character entity identifier (PAN).
    pub fn entity_id(&self) -> &str {
        &self.value[2..12]
    }

    /// Registration count code for the entity within the state.
    pub fn entity_code(&self) -> char {
        self.value.as_bytes()[12] as char
    }

    pub fn check_char(&self) -> char {
        self.value.as_bytes()[14] as char
    }
}

impl fmt::Display for Gstin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

fn format_error(index: usize, expected: &'static str) -> InvalidGstin {
    InvalidGstin::Format {
        position: index + 1,
        expected,
    }
}

fn state_name(code: u8) -> Option<&'static str> {
    STATE_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// Validates format, state code, and check character. Input is trimmed
/// and upper-cased before checking. Deterministic and side-effect free.
pub fn validate(raw: &str) -> Result<Gstin, InvalidGstin> {
    let value = raw.trim().to_ascii_uppercase();
    let chars: Vec<char> = value.chars().collect();
    if chars.len() != 15 {
        return Err(InvalidGstin::Length(chars.len()));
    }

    let state: String = chars[..2].iter().collect();
    if !chars[0].is_ascii_digit() || !chars[1].is_ascii_digit() {
        return Err(InvalidGstin::StateCode(state));
    }
    let code: u8 = state
        .parse()
        .map_err(|_| InvalidGstin::StateCode(state.clone()))?;
    if state_name(code).is_none() {
        return Err(InvalidGstin::StateCode(state));
    }

    for index in 2..=6 {
        if !chars[index].is_ascii_uppercase() {
            return Err(format_error(index, "alphabetic"));
        }
    }
    for index in 7..=10 {
        if !chars[index].is_ascii_digit() {
            return Err(format_error(index, "numeric"));
        }
    }
    if !chars[11].is_ascii_uppercase() {
        return Err(format_error(11, "alphabetic"));
    }
    if !chars[12].is_ascii_alphanumeric() {
        return Err(format_error(12, "alphanumeric"));
    }
    if chars[13] != 'Z' {
        return Err(format_error(13, "the literal 'Z'"));
    }
    if !chars[14].is_ascii_alphanumeric() {
        return Err(format_error(14, "alphanumeric"));
    }

    let expected = check_character(&value[..14]).ok_or(InvalidGstin::Format {
        position: 15,
        expected: "alphanumeric",
    })?;
    if chars[14] != expected {
        return Err(InvalidGstin::Checksum {
            expected,
            found: chars[14],
        });
    }

    Ok(Gstin { value })
}

/// Check character over a 14-character prefix: base-36 character values,
/// weights alternating 1/2 starting at 1, doubled products folded as
/// `p / 36 + p % 36`, and the result encoding `(36 - total % 36) % 36`.
/// Returns `None` if the prefix holds a non-alphanumeric character.
pub fn check_character(prefix: &str) -> Option<char> {
    let mut total: u32 = 0;
    for (index, ch) in prefix.chars().enumerate() {
        let value = char_value(ch)?;
        let product = value * if index % 2 == 0 { 1 } else { 2 };
        total += product / 36 + product % 36;
    }
    value_char((36 - total % 36) % 36)
}

fn char_value(ch: char) -> Option<u32> {
    match ch {
        '0'..='9' => Some(ch as u32 - '0' as u32),
        'A'..='Z' => Some(ch as u32 - 'A' as u32 + 10),
        _ => None,
    }
}

fn value_char(value: u32) -> Option<char> {
    match value {
        0..=9 => char::from_u32('0' as u32 + value),
        10..=35 => char::from_u32('A' as u32 + value - 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Live registrations with known-good check characters.
    const KARNATAKA: &str = "29AABCE5725G1ZN";
    const MAHARASHTRA: &str = "27AAPFU0939F1ZV";

    #[test]
    fn accepts_real_registrations() {
        let gstin = validate(KARNATAKA).unwrap();
        assert_eq!(gstin.as_str(), KARNATAKA);
        assert_eq!(gstin.state_code(), "29");
        assert_eq!(gstin.state_name(), "Karnataka");
        assert_eq!(gstin.entity_id(), "AABCE5725G");
        assert_eq!(gstin.entity_code(), '1');

        let gstin = validate(MAHARASHTRA).unwrap();
        assert_eq!(gstin.state_name(), "Maharashtra");
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let gstin = validate("  29aabce5725g1zn ").unwrap();
        assert_eq!(gstin.as_str(), KARNATAKA);
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(validate("29AABCE5725G1Z").unwrap_err(), InvalidGstin::Length(14));
        assert_eq!(validate("").unwrap_err(), InvalidGstin::Length(0));
    }

    #[test]
    fn rejects_unknown_state_codes() {
        assert_eq!(
            validate("00AABCE5725G1ZN").unwrap_err(),
            InvalidGstin::StateCode("00".to_string())
        );
        assert_eq!(
            validate("99AABCE5725G1ZN").unwrap_err(),
            InvalidGstin::StateCode("99".to_string())
        );
        assert_eq!(
            validate("A9AABCE5725G1ZN").unwrap_err(),
            InvalidGstin::StateCode("A9".to_string())
        );
    }

    #[test]
    fn rejects_malformed_slots() {
        // Digit where the entity id needs a letter.
        assert!(matches!(
            validate("29AAB1E5725G1ZN").unwrap_err(),
            InvalidGstin::Format { position: 6, .. }
        ));
        // Letter inside the numeric run.
        assert!(matches!(
            validate("29AABCEX725G1ZN").unwrap_err(),
            InvalidGstin::Format { position: 8, .. }
        ));
        // Character 14 must be the literal Z.
        assert!(matches!(
            validate("29AABCE5725G1YN").unwrap_err(),
            InvalidGstin::Format { position: 14, .. }
        ));
    }

    #[test]
    fn exactly_one_check_character_validates() {
        let prefix = &KARNATAKA[..14];
        let expected = check_character(prefix).unwrap();
        assert_eq!(expected, 'N');

        for value in 0..36 {
            let candidate = value_char(value).unwrap();
            let identifier = format!("{prefix}{candidate}");
            if candidate == expected {
                assert!(validate(&identifier).is_ok());
            } else {
                assert_eq!(
                    validate(&identifier).unwrap_err(),
                    InvalidGstin::Checksum {
                        expected,
                        found: candidate
                    }
                );
            }
        }
    }

    #[test]
    fn validation_is_idempotent() {
        for _ in 0..3 {
            assert!(validate(KARNATAKA).is_ok());
            assert_eq!(
                validate("29AABCE5725G1ZA").unwrap_err(),
                InvalidGstin::Checksum {
                    expected: 'N',
                    found: 'A'
                }
            );
        }
    }
}
