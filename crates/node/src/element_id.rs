use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique, stable identifier for an element within one editor session.
///
/// Ids come from an [`IdGenerator`] owned by the editor, never from the
/// storage layer. The textual form is `e<N>`, which is also what ends up
/// in the markup `id` attribute.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId(e{})", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('e')
            .and_then(|digits| digits.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidId(s.to_string()))
    }
}

impl Serialize for ElementId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hands out monotonically increasing element ids.
///
/// The counter saturates at `u64::MAX`. Past that point every id it hands
/// out is the same and fails validation as a duplicate.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Starts after the largest id already in use.
    pub fn after(max: Option<ElementId>) -> Self {
        let mut generator = Self::new();
        if let Some(id) = max {
            generator.observe(id);
        }
        generator
    }

    pub fn next_id(&mut self) -> ElementId {
        let id = ElementId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Makes sure `id` will never be handed out.
    pub fn observe(&mut self, id: ElementId) {
        self.next = self.next.max(id.0.saturating_add(1));
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a document at the persistence boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(uuid::Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parses a full UUID string.
    pub fn parse(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s.trim()).ok().map(Self)
    }

    /// Get the full UUID string.
    pub fn to_uuid_string(&self) -> String {
        self.0.to_string()
    }

    /// Create a DocumentId from a u128 (useful for tests).
    pub fn from_u128(value: u128) -> Self {
        Self(uuid::Uuid::from_u128(value))
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", &self.0.to_string()[..8])
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_text_form() {
        let id = ElementId::from_raw(42);
        assert_eq!(id.to_string(), "e42");
        assert_eq!("e42".parse::<ElementId>().unwrap(), id);
        assert!("42".parse::<ElementId>().is_err());
        assert!("e-1".parse::<ElementId>().is_err());
    }

    #[test]
    fn test_generator_skips_observed_ids() {
        let mut ids = IdGenerator::after(Some(ElementId::from_raw(9)));
        assert_eq!(ids.next_id(), ElementId::from_raw(10));
        ids.observe(ElementId::from_raw(3));
        assert_eq!(ids.next_id(), ElementId::from_raw(11));
    }

    #[test]
    fn test_generator_saturates_at_the_top_of_the_range() {
        let mut ids = IdGenerator::after(Some(ElementId::from_raw(u64::MAX)));
        assert_eq!(ids.next_id(), ElementId::from_raw(u64::MAX));
        assert_eq!(ids.next_id(), ElementId::from_raw(u64::MAX));

        let mut ids = IdGenerator::after(Some(ElementId::from_raw(u64::MAX - 1)));
        assert_eq!(ids.next_id(), ElementId::from_raw(u64::MAX));
    }

    #[test]
    fn test_document_id_parse() {
        let id = DocumentId::from_u128(7);
        assert_eq!(DocumentId::parse(&id.to_uuid_string()), Some(id));
        assert_eq!(DocumentId::parse("not-a-uuid"), None);
    }
}
