use chrono::{DateTime, Utc};
use sqlx::{self, postgres::PgArguments, FromRow};

use crate::database::models::{FieldValue, ObjectId, PropertyField};
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::types::{PropertySearch, SqlResult};

pub const TABLE: &str = "properties";

/// Renders the parameterised statements the Postgres repository runs.
/// Identifiers only ever come from `PropertyField::as_str`.
pub struct QueryBuilder;

impl QueryBuilder {
    /// `SELECT` for a search: predicate, single-field sort with an id
    /// tie-break so pages are stable, then the page window.
    pub fn select(search: &PropertySearch) -> SqlResult {
        let (where_clause, mut params) = FilterWhere::generate(&search.predicate, 0);

        let mut query = format!("SELECT * FROM \"{}\"", TABLE);
        if !where_clause.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&where_clause);
        }
        query.push(' ');
        query.push_str(&FilterOrder::generate(&search.sort));
        query.push_str(", \"id\" COLLATE \"C\" ASC");

        params.push(FieldValue::BigInt(i64::from(search.page.limit)));
        query.push_str(&format!(" LIMIT ${}", params.len()));
        params.push(FieldValue::BigInt(i64::from(search.page.skip)));
        query.push_str(&format!(" OFFSET ${}", params.len()));

        SqlResult { query, params }
    }

    /// Conditional `UPDATE` scoped to the owner. `updated_at` always moves
    /// strictly forward, even when `now` is not later than the stored value.
    pub fn update_owned(
        id: &ObjectId,
        owner_id: &str,
        changes: &[(PropertyField, FieldValue)],
        now: DateTime<Utc>,
    ) -> SqlResult {
        let mut params = Vec::with_capacity(changes.len() + 3);
        let mut assignments = Vec::with_capacity(changes.len() + 1);

        for (field, value) in changes {
            params.push(value.clone());
            assignments.push(format!("\"{}\" = ${}", field.as_str(), params.len()));
        }

        params.push(FieldValue::Timestamp(now));
        assignments.push(format!(
            "\"updated_at\" = GREATEST(${}, \"updated_at\" + interval '1 microsecond')",
            params.len()
        ));

        params.push(FieldValue::Text(id.to_string()));
        let id_index = params.len();
        params.push(FieldValue::Text(owner_id.to_string()));
        let owner_index = params.len();

        let query = format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ${} AND \"owner_id\" = ${} RETURNING *",
            TABLE,
            assignments.join(", "),
            id_index,
            owner_index
        );
        SqlResult { query, params }
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &FieldValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        FieldValue::Text(s) => q.bind(s.clone()),
        FieldValue::Int(i) => q.bind(*i),
        FieldValue::BigInt(i) => q.bind(*i),
        FieldValue::Decimal(d) => q.bind(*d),
        FieldValue::Timestamp(t) => q.bind(*t),
        FieldValue::TextList(list) => q.bind(list.clone()),
    }
}
