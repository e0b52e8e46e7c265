//! Content key computation.
//!
//! Provides [`ContentKey`], the digest-derived identifier under which every
//! artifact of a diagram is stored and served.

use std::fmt;
use std::str::FromStr;

use sha1::{Digest, Sha1};

/// Length of a key in hex characters (160-bit SHA-1).
pub const KEY_LEN: usize = 40;

/// Content-addressed identifier for a piece of diagram text.
///
/// The key is the lowercase hex SHA-1 of the exact markup bytes. It carries
/// no information about where the text came from: the same bytes always
/// produce the same key, and any byte difference (including whitespace)
/// produces a different one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey(String);

impl ContentKey {
    /// Compute the key for the given markup bytes.
    #[must_use]
    pub fn compute(markup: &[u8]) -> Self {
        Self(hex::encode(Sha1::digest(markup)))
    }

    /// Parse a key received from outside (e.g. a request parameter).
    ///
    /// Only exactly [`KEY_LEN`] lowercase hex characters are accepted, so a
    /// parsed key is always safe to use as a file name.
    pub fn parse(value: &str) -> Result<Self, InvalidKey> {
        let valid = value.len() == KEY_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(value.to_owned()))
        } else {
            Err(InvalidKey(value.to_owned()))
        }
    }

    /// The key as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentKey {
    type Err = InvalidKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ContentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when a string is not a well-formed [`ContentKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content key: {0:?}")]
pub struct InvalidKey(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_is_deterministic() {
        let text = b"@startuml\nA -> B\n@enduml";

        assert_eq!(ContentKey::compute(text), ContentKey::compute(text));
    }

    #[test]
    fn test_compute_known_digest() {
        // Stable across processes and platforms: plain SHA-1 of the bytes.
        assert_eq!(
            ContentKey::compute(b"abc").as_str(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_compute_is_whitespace_sensitive() {
        let key = ContentKey::compute(b"@startuml\nA -> B\n@enduml");
        let spaced = ContentKey::compute(b"@startuml\nA -> B\n@enduml ");

        assert_ne!(key, spaced);
    }

    #[test]
    fn test_compute_format() {
        let key = ContentKey::compute(b"test source");

        assert_eq!(key.as_str().len(), KEY_LEN);
        assert!(
            key.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()),
            "key should be lowercase hex"
        );
    }

    #[test]
    fn test_parse_accepts_computed_key() {
        let key = ContentKey::compute(b"diagram");

        assert_eq!(ContentKey::parse(key.as_str()), Ok(key.clone()));
        assert_eq!(key.to_string().parse::<ContentKey>(), Ok(key));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let too_short = "a9993e36";
        let uppercase = "A9993E364706816ABA3E25717850C26C9CD0D89D";
        let traversal = "../../../../../../../../../../etc/passwd";

        assert!(ContentKey::parse(too_short).is_err());
        assert!(ContentKey::parse(uppercase).is_err());
        assert!(ContentKey::parse(traversal).is_err());
        assert!(ContentKey::parse("").is_err());
    }
}
