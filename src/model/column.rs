//! Column identity and layout payloads.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a table column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    /// Create a column id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ColumnId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ColumnId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Column width in pixels. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ColumnWidth(u32);

/// Error returned when attempting to create a zero-width column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ColumnWidth must be >= 1 pixel (got {0})")]
pub struct InvalidColumnWidth(pub u32);

impl ColumnWidth {
    /// Smart constructor that validates width is >= 1.
    pub fn new(px: u32) -> Result<Self, InvalidColumnWidth> {
        if px == 0 {
            Err(InvalidColumnWidth(px))
        } else {
            Ok(Self(px))
        }
    }

    /// Get the raw pixel value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ColumnWidth {
    type Error = InvalidColumnWidth;

    fn try_from(px: u32) -> Result<Self, Self::Error> {
        Self::new(px)
    }
}

impl From<ColumnWidth> for u32 {
    fn from(width: ColumnWidth) -> Self {
        width.0
    }
}

/// Ordered column ids. Normalized to a permutation of the known columns.
pub type ColumnOrder = Vec<ColumnId>;

/// Explicit widths by column. A missing id means "use the default width".
pub type ColumnSizing = BTreeMap<ColumnId, ColumnWidth>;

/// Convenience constructor for a list of column ids.
pub fn column_ids<I, S>(ids: I) -> Vec<ColumnId>
where
    I: IntoIterator<Item = S>,
    S: Into<ColumnId>,
{
    ids.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_is_rejected() {
        assert_eq!(ColumnWidth::new(0), Err(InvalidColumnWidth(0)));
    }

    #[test]
    fn positive_width_is_accepted() {
        assert_eq!(ColumnWidth::new(120).map(|w| w.get()), Ok(120));
    }

    #[test]
    fn zero_width_fails_to_deserialize() {
        let parsed: Result<ColumnWidth, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
    }

    #[test]
    fn sizing_map_serializes_as_plain_object() {
        let mut sizing = ColumnSizing::new();
        sizing.insert(ColumnId::from("name"), ColumnWidth::new(200).expect("valid"));
        let json = serde_json::to_string(&sizing).expect("serialize");
        assert_eq!(json, r#"{"name":200}"#);
    }

    #[test]
    fn sizing_map_is_queryable_by_str() {
        let mut sizing = ColumnSizing::new();
        sizing.insert(ColumnId::from("name"), ColumnWidth::new(200).expect("valid"));
        assert!(sizing.contains_key("name"));
    }

    #[test]
    fn column_ids_collects_from_strs() {
        let ids = column_ids(["a", "b"]);
        assert_eq!(ids, vec![ColumnId::from("a"), ColumnId::from("b")]);
    }
}
