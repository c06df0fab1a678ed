use super::types::{Condition, FilterOp, Predicate};
use crate::database::models::FieldValue;

/// Renders a `Predicate` into a parameterised Postgres WHERE clause.
/// Column names come from `PropertyField::as_str`, values are always bound.
pub struct FilterWhere {
    param_values: Vec<FieldValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self { param_values: vec![], param_index: starting_param_index }
    }

    /// Returns the clause without the `WHERE` keyword (empty when the
    /// predicate is empty) and the values to bind, in placeholder order.
    pub fn generate(predicate: &Predicate, starting_param_index: usize) -> (String, Vec<FieldValue>) {
        let mut filter_where = Self::new(starting_param_index);
        let clause = predicate
            .conditions
            .iter()
            .map(|condition| filter_where.build_sql_condition(condition))
            .collect::<Vec<_>>()
            .join(" AND ");
        (clause, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> String {
        let quoted_column = format!("\"{}\"", condition.field.as_str());
        let placeholder = self.param(condition.value.clone());
        match condition.op {
            FilterOp::Eq => format!("{} = {}", quoted_column, placeholder),
            FilterOp::Gte => format!("{} >= {}", quoted_column, placeholder),
            FilterOp::Lte => format!("{} <= {}", quoted_column, placeholder),
            FilterOp::All => format!("{} @> {}", quoted_column, placeholder),
        }
    }

    fn param(&mut self, value: FieldValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
