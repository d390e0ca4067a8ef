//! Phone number type and normalization.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A phone number in its canonical comparison form.
///
/// Customers are identified by phone number, but the same number arrives in
/// many shapes: shared Telegram contacts carry a leading `+`, manually
/// imported records use `8`-prefixed local notation or spaces and dashes.
/// [`PhoneNumber::normalize`] folds all of these into one comparison key.
///
/// ## Normalization rules
///
/// Non-digits are stripped, then the first matching rule applies:
///
/// - 11 digits starting with `8` → the leading `8` becomes `7`
/// - 10 digits starting with `9` → a `7` is prefixed
/// - 11 digits starting with `7` → unchanged
/// - anything else → the input is kept as-is
///
/// The fallback is deliberate: an unrecognized number is not an error, it is
/// a key that will simply never match a registered profile.
///
/// ## Examples
///
/// ```
/// use lunchroom_core::PhoneNumber;
///
/// assert_eq!(PhoneNumber::normalize("8 912 345 67 89").as_str(), "79123456789");
/// assert_eq!(PhoneNumber::normalize("+7 916 000 00 00").as_str(), "79160000000");
/// assert_eq!(PhoneNumber::normalize("9123456789").as_str(), "79123456789");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize raw phone input into a canonical comparison key.
    ///
    /// Never fails; input that matches no rule is kept unmodified so that
    /// downstream lookups degrade to a non-match instead of a crash.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let canonical = match (digits.len(), digits.as_bytes().first()) {
            (11, Some(b'8')) => format!("7{}", &digits[1..]),
            (10, Some(b'9')) => format!("7{digits}"),
            (11, Some(b'7')) => digits,
            _ => raw.to_owned(),
        };

        Self(canonical)
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns only the digits of the number.
    ///
    /// The order ledger matches rows by digit content, so numbers that fell
    /// through normalization unchanged still compare on their digits.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
