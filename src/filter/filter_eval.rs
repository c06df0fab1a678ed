use std::cmp::Ordering;

use super::types::{Condition, FilterOp, Predicate, SortDirection, SortOrder};
use crate::database::models::{FieldValue, Property};

/// Evaluates predicates and sort orders directly against records. Text keys
/// compare by bytes, matching the `COLLATE "C"` the SQL ordering uses.
pub struct FilterEval;

impl FilterEval {
    pub fn matches(predicate: &Predicate, property: &Property) -> bool {
        predicate.conditions.iter().all(|condition| Self::matches_condition(condition, property))
    }

    fn matches_condition(condition: &Condition, property: &Property) -> bool {
        // Comparisons against an unset column are never true, as with SQL NULL.
        let Some(actual) = property.value_of(condition.field) else { return false };
        match condition.op {
            FilterOp::Eq => actual.compare(&condition.value) == Some(Ordering::Equal),
            FilterOp::Gte => matches!(actual.compare(&condition.value), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lte => matches!(actual.compare(&condition.value), Some(Ordering::Less | Ordering::Equal)),
            FilterOp::All => match (&actual, &condition.value) {
                (FieldValue::TextList(have), FieldValue::TextList(want)) => {
                    want.iter().all(|tag| have.contains(tag))
                }
                _ => false,
            },
        }
    }

    /// Unset values sort after set values when ascending and before them
    /// when descending.
    pub fn compare(order: &SortOrder, a: &Property, b: &Property) -> Ordering {
        let ascending = match (a.value_of(order.field), b.value_of(order.field)) {
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match order.direction {
            SortDirection::Asc => ascending,
            SortDirection::Desc => ascending.reverse(),
        }
    }
}
