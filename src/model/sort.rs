//! Sort specification types.

use serde::{Deserialize, Serialize};

/// Sort direction of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// One `(field, direction)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortRule {
    /// Field being sorted on.
    pub field: String,
    /// Direction for this field.
    pub direction: SortDirection,
}

impl SortRule {
    /// Create a rule.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending rule for `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending rule for `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Whether a sort manager keeps one rule or an ordered list.
///
/// Static configuration; never switched at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// At most one sorted field.
    #[default]
    Single,
    /// Ordered list of sorted fields, each field at most once.
    Multi,
}

/// Settled sort value handed to callers.
///
/// Sum type mirrors the static [`SortMode`]: single mode exposes an optional
/// rule, multi mode an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSpec {
    /// Single-sort mode value.
    Single(Option<SortRule>),
    /// Multi-sort mode value.
    Multi(Vec<SortRule>),
}

impl SortSpec {
    /// Build the spec for `mode` from a rule list.
    ///
    /// Single mode keeps only the first rule.
    pub fn from_rules(mode: SortMode, rules: &[SortRule]) -> Self {
        match mode {
            SortMode::Single => Self::Single(rules.first().cloned()),
            SortMode::Multi => Self::Multi(rules.to_vec()),
        }
    }

    /// Rules as a slice, in priority order.
    pub fn rules(&self) -> &[SortRule] {
        match self {
            Self::Single(rule) => rule.as_slice(),
            Self::Multi(rules) => rules,
        }
    }

    /// Whether nothing is sorted.
    pub fn is_empty(&self) -> bool {
        self.rules().is_empty()
    }
}
