use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProperty, ObjectId, Property, PropertyUpdate};
use crate::filter::types::PropertySearch;

/// Persistence seam for property records. Implemented by the Postgres
/// repository and by the in-memory store; both must agree on filtering,
/// ordering and the owner-scoped write semantics below.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Insert a new record and return it with its assigned id.
    async fn insert(&self, new: NewProperty) -> Result<Property, DatabaseError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Property>, DatabaseError>;

    /// All records owned by `owner_id`, newest first.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, DatabaseError>;

    async fn search(&self, search: &PropertySearch) -> Result<Vec<Property>, DatabaseError>;

    /// Apply `update` only if the record exists and belongs to `owner_id`,
    /// in one step. `None` when no record matched.
    async fn update_owned(
        &self,
        id: &ObjectId,
        owner_id: &str,
        update: &PropertyUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, DatabaseError>;

    /// Delete only if the record exists and belongs to `owner_id`.
    /// Returns whether a record was removed.
    async fn delete_owned(&self, id: &ObjectId, owner_id: &str) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
