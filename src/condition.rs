//! Boolean settings that are either fixed or computed per context.

use std::fmt;
use std::rc::Rc;

/// A flag that is either a constant or a predicate over a context.
///
/// Resolved at the point of use, e.g. "is this column draggable".
///
/// # Examples
///
/// ```
/// # use viewsync::Condition;
/// let always: Condition<str> = Condition::from(true);
/// let not_id: Condition<str> = Condition::computed(|col: &str| col != "id");
/// assert!(always.resolve("id"));
/// assert!(!not_id.resolve("id"));
/// assert!(not_id.resolve("name"));
/// ```
pub enum Condition<C: ?Sized> {
    /// Same answer for every context.
    Static(bool),
    /// Answer computed from the context.
    Computed(Rc<dyn Fn(&C) -> bool>),
}

impl<C: ?Sized> Condition<C> {
    /// Wrap a predicate.
    pub fn computed(predicate: impl Fn(&C) -> bool + 'static) -> Self {
        Self::Computed(Rc::new(predicate))
    }

    /// Evaluate for `context`.
    pub fn resolve(&self, context: &C) -> bool {
        match self {
            Self::Static(value) => *value,
            Self::Computed(predicate) => predicate(context),
        }
    }
}

impl<C: ?Sized> Default for Condition<C> {
    fn default() -> Self {
        Self::Static(true)
    }
}

impl<C: ?Sized> From<bool> for Condition<C> {
    fn from(value: bool) -> Self {
        Self::Static(value)
    }
}

impl<C: ?Sized> Clone for Condition<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(value) => Self::Static(*value),
            Self::Computed(predicate) => Self::Computed(Rc::clone(predicate)),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Condition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnId;

    #[test]
    fn default_is_enabled() {
        let condition: Condition<ColumnId> = Condition::default();
        assert!(condition.resolve(&ColumnId::from("any")));
    }

    #[test]
    fn static_false_ignores_context() {
        let condition: Condition<ColumnId> = false.into();
        assert!(!condition.resolve(&ColumnId::from("a")));
    }

    #[test]
    fn computed_sees_the_context() {
        let pinned = ["id", "actions"];
        let condition: Condition<ColumnId> =
            Condition::computed(move |col: &ColumnId| !pinned.iter().any(|p| *p == col.as_str()));

        assert!(!condition.resolve(&ColumnId::from("id")));
        assert!(condition.resolve(&ColumnId::from("name")));
    }

    #[test]
    fn clones_share_the_predicate() {
        let condition: Condition<i32> = Condition::computed(|n: &i32| *n > 2);
        let copy = condition.clone();
        assert!(copy.resolve(&3));
        assert_eq!(format!("{copy:?}"), "Computed(..)");
    }
}
