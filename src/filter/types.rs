use serde::{Deserialize, Serialize};

use crate::database::models::{FieldValue, PropertyField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lte")] Lte,
    /// Record list contains every requested element.
    #[serde(rename = "$all")] All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: PropertyField,
    pub op: FilterOp,
    pub value: FieldValue,
}

impl Condition {
    pub fn new(field: PropertyField, op: FilterOp, value: FieldValue) -> Self {
        Self { field, op, value }
    }
}

/// Conjunction of field conditions. An empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub conditions: Vec<Condition>,
}

impl Predicate {
    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Conditions targeting `field`, in insertion order.
    pub fn on(&self, field: PropertyField) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(move |c| c.field == field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: PropertyField,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self { field: PropertyField::Price, direction: SortDirection::Asc }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

/// A fully-resolved read: predicate, single-field sort and page window.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySearch {
    pub predicate: Predicate,
    pub sort: SortOrder,
    pub page: Page,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FieldValue>,
}
