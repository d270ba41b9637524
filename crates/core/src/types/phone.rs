//! Phone number type used as a WhatsApp destination.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Country calling code assumed for national numbers.
const BRAZIL_COUNTRY_CODE: &str = "55";

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input has no digits.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone number contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The digit count is outside what E.164 allows.
    #[error("phone number must have between {min} and {max} digits (got {got})")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
        /// Digits found.
        got: usize,
    },
}

/// A phone number normalized to E.164 (`+5511987654321`).
///
/// Spaces, dashes, dots and parentheses are ignored. Numbers written without
/// a leading `+` that have 10 or 11 digits are treated as Brazilian national
/// numbers (area code plus subscriber) and get the `55` prefix.
///
/// ```
/// use aurora_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("(11) 98765-4321").unwrap();
/// assert_eq!(phone.as_e164(), "+5511987654321");
/// assert_eq!(phone.digits(), "5511987654321");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum digits including the country code.
    pub const MIN_DIGITS: usize = 8;
    /// Maximum digits including the country code (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains letters or other
    /// symbols, or has a digit count E.164 cannot represent.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        let (international, rest) = s
            .strip_prefix('+')
            .map_or((false, s), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        if !international && matches!(digits.len(), 10 | 11) {
            digits.insert_str(0, BRAZIL_COUNTRY_CODE);
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                got: digits.len(),
            });
        }

        Ok(Self(format!("+{digits}")))
    }

    /// The number in E.164 form, with the leading `+`.
    #[must_use]
    pub fn as_e164(&self) -> &str {
        &self.0
    }

    /// The number as bare digits, country code first.
    #[must_use]
    pub fn digits(&self) -> &str {
        self.0.trim_start_matches('+')
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}
