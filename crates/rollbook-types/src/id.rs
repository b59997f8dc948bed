use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Name of the primary-key column every table carries first.
pub const ID_COLUMN: &str = "id";

/// Length of a generated identifier, in characters.
pub const ID_LEN: usize = 12;

/// Produce a fresh identifier string.
///
/// The token is the first [`ID_LEN`] hex digits of a random UUID v4, giving
/// 48 bits of entropy. Uniqueness is probabilistic; callers do not re-check
/// for collisions.
pub fn new_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Store-assigned primary key of a record.
///
/// A `RecordId` is stable for the record's lifetime, unlike its row
/// position, which shifts whenever an earlier row is deleted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new random identifier.
    pub fn generate() -> Self {
        Self(new_id())
    }

    /// Parse an identifier supplied from outside (form input, CLI argument).
    ///
    /// Surrounding whitespace is stripped. Ids created by other tools are
    /// accepted as-is, so no length or alphabet check is made.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TypeError::EmptyId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The identifier as stored in the `id` column.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for RecordId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_short_and_url_safe() {
        for _ in 0..100 {
            let id = new_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn thousand_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn parse_trims_whitespace() {
        let id = RecordId::parse("  a1b2c3d4 \n").unwrap();
        assert_eq!(id.as_str(), "a1b2c3d4");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(RecordId::parse("   "), Err(TypeError::EmptyId));
        assert_eq!("".parse::<RecordId>(), Err(TypeError::EmptyId));
    }

    #[test]
    fn serde_is_transparent() {
        let id = RecordId::parse("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }

    #[test]
    fn debug_and_display() {
        let id = RecordId::parse("f00d").unwrap();
        assert_eq!(format!("{id}"), "f00d");
        assert_eq!(format!("{id:?}"), "RecordId(f00d)");
    }

    proptest::proptest! {
        #[test]
        fn parse_is_stable_under_display(raw in "[ \\t]*[a-z0-9]{1,16}[ \\t]*") {
            let id = RecordId::parse(&raw).unwrap();
            proptest::prop_assert_eq!(RecordId::parse(&id.to_string()).unwrap(), id.clone());
            proptest::prop_assert_eq!(id.as_str(), raw.trim());
        }
    }
}
