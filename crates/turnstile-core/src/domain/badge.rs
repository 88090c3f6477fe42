//! Badge identity.
//!
//! A badge ID is the opaque string a reader extracts from a physical
//! credential (for RFID hardware this is typically the tag UID rendered
//! as uppercase hex, e.g. `F39A370E`).  The system never interprets the
//! contents: IDs are compared byte-for-byte, case-sensitively, and the
//! only structural rule is that an ID is non-empty.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a [`BadgeId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadgeIdError {
    /// The candidate string was empty (or contained only whitespace).
    #[error("badge id must not be empty")]
    Empty,
}

/// An opaque badge identifier.
///
/// `BadgeId` is a validated newtype over `String`: construction trims
/// surrounding ASCII whitespace (serial consoles and line-oriented tools
/// love to append `\r\n`) and rejects anything that is empty afterwards.
/// Comparison and hashing are exact and case-sensitive — `f39a370e` and
/// `F39A370E` are two different badges.
///
/// Serialises as a plain string, so a cached roster is just a JSON array
/// of badge strings.
///
/// # Examples
///
/// ```rust
/// use turnstile_core::BadgeId;
///
/// let badge = BadgeId::new("F39A370E").unwrap();
/// assert_eq!(badge.as_str(), "F39A370E");
/// assert!(BadgeId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BadgeId(String);

impl BadgeId {
    /// Creates a badge ID from a raw string, trimming surrounding
    /// whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`BadgeIdError::Empty`] if nothing remains after trimming.
    pub fn new(raw: impl Into<String>) -> Result<Self, BadgeIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BadgeIdError::Empty);
        }
        // Reuse the allocation when no trimming was needed.
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the badge ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BadgeId {
    type Err = BadgeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BadgeId {
    type Error = BadgeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BadgeId> for String {
    fn from(badge: BadgeId) -> Self {
        badge.0
    }
}

impl AsRef<str> for BadgeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_id_accepts_plain_uid() {
        // Arrange / Act
        let badge = BadgeId::new("F39A370E").unwrap();

        // Assert
        assert_eq!(badge.as_str(), "F39A370E");
        assert_eq!(badge.to_string(), "F39A370E");
    }

    #[test]
    fn test_badge_id_rejects_empty_string() {
        assert_eq!(BadgeId::new(""), Err(BadgeIdError::Empty));
    }

    #[test]
    fn test_badge_id_rejects_whitespace_only() {
        assert_eq!(BadgeId::new("  \r\n\t "), Err(BadgeIdError::Empty));
    }

    #[test]
    fn test_badge_id_trims_surrounding_whitespace() {
        // A reader wired through a serial console delivers "UID\r\n".
        let badge = BadgeId::new("20047935\r\n").unwrap();
        assert_eq!(badge.as_str(), "20047935");
    }

    #[test]
    fn test_badge_id_comparison_is_case_sensitive() {
        // Arrange
        let upper = BadgeId::new("F39A370E").unwrap();
        let lower = BadgeId::new("f39a370e").unwrap();

        // Assert – two different badges, never equal
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_badge_id_interior_whitespace_is_preserved() {
        // Only surrounding whitespace is trimmed; the ID itself is opaque.
        let badge = BadgeId::new(" AB CD ").unwrap();
        assert_eq!(badge.as_str(), "AB CD");
    }

    #[test]
    fn test_badge_id_from_str_round_trip() {
        let badge: BadgeId = "00220394".parse().unwrap();
        assert_eq!(badge.as_str(), "00220394");
        assert!("".parse::<BadgeId>().is_err());
    }

    #[test]
    fn test_badge_id_serde_round_trip_as_plain_string() {
        // Arrange
        let badge = BadgeId::new("72349395").unwrap();

        // Act
        let json = serde_json::to_string(&badge).unwrap();
        let back: BadgeId = serde_json::from_str(&json).unwrap();

        // Assert – plain string on the wire, validated on the way back in
        assert_eq!(json, "\"72349395\"");
        assert_eq!(back, badge);
    }

    #[test]
    fn test_badge_id_deserialization_rejects_empty() {
        let result: Result<BadgeId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err(), "empty badge string must not deserialize");
    }
}
