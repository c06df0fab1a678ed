use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProperty, ObjectId, Property, PropertyUpdate};
use crate::database::store::PropertyStore;
use crate::filter::types::PropertySearch;
use crate::filter::FilterEval;

/// In-process store with the same filtering, ordering and owner-scoped
/// write semantics as the Postgres repository. Used by tests and by
/// `database.backend: memory`.
#[derive(Default)]
pub struct MemoryPropertyStore {
    records: RwLock<HashMap<ObjectId, Property>>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PropertyStore for MemoryPropertyStore {
    async fn insert(&self, new: NewProperty) -> Result<Property, DatabaseError> {
        let mut records = self.records.write().await;
        let mut id = ObjectId::new();
        while records.contains_key(&id) {
            id = ObjectId::new();
        }
        let property = Property::from_new(id, new);
        records.insert(id, property.clone());
        Ok(property)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Property>, DatabaseError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, DatabaseError> {
        let records = self.records.read().await;
        let mut owned: Vec<Property> = records.values().filter(|p| p.is_owned_by(owner_id)).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn search(&self, search: &PropertySearch) -> Result<Vec<Property>, DatabaseError> {
        let records = self.records.read().await;
        let mut matched: Vec<&Property> =
            records.values().filter(|p| FilterEval::matches(&search.predicate, p)).collect();
        matched.sort_by(|a, b| FilterEval::compare(&search.sort, a, b).then_with(|| a.id.cmp(&b.id)));

        Ok(matched
            .into_iter()
            .skip(search.page.skip as usize)
            .take(search.page.limit as usize)
            .cloned()
            .collect())
    }

    async fn update_owned(
        &self,
        id: &ObjectId,
        owner_id: &str,
        update: &PropertyUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, DatabaseError> {
        let mut records = self.records.write().await;
        let Some(existing) = records.get(id).filter(|p| p.is_owned_by(owner_id)) else {
            return Ok(None);
        };

        // Apply to a copy so a rejected change leaves the record untouched.
        let mut updated = existing.clone();
        for (field, value) in update.changes() {
            updated
                .set(field, value)
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        }
        updated.updated_at = now.max(existing.updated_at + Duration::microseconds(1));

        records.insert(*id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_owned(&self, id: &ObjectId, owner_id: &str) -> Result<bool, DatabaseError> {
        let mut records = self.records.write().await;
        match records.get(id) {
            Some(p) if p.is_owned_by(owner_id) => Ok(records.remove(id).is_some()),
            _ => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::property_input::tests::sample_create;
    use crate::database::models::PropertyField;
    use crate::filter::types::{Page, Predicate, SortDirection, SortOrder};
    use chrono::SubsecRound;
    use rust_decimal::Decimal;

    fn new_property(owner: &str, price: i64) -> NewProperty {
        let mut details = sample_create();
        details.price = Decimal::from(price);
        NewProperty {
            owner_id: owner.to_string(),
            details,
            images: vec![format!("local://images/{}/a.jpg", owner)],
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    fn search(field: PropertyField, direction: SortDirection, skip: u32, limit: u32) -> PropertySearch {
        PropertySearch {
            predicate: Predicate::default(),
            sort: SortOrder { field, direction },
            page: Page { skip, limit },
        }
    }

    #[tokio::test]
    async fn search_sorts_then_pages() {
        let store = MemoryPropertyStore::new();
        for price in [300, 100, 200, 400] {
            store.insert(new_property("owner", price)).await.unwrap();
        }

        let page = store.search(&search(PropertyField::Price, SortDirection::Asc, 1, 2)).await.unwrap();
        let prices: Vec<_> = page.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![Decimal::from(200), Decimal::from(300)]);

        let page = store.search(&search(PropertyField::Price, SortDirection::Desc, 0, 1)).await.unwrap();
        assert_eq!(page[0].price, Decimal::from(400));
    }

    #[tokio::test]
    async fn update_requires_matching_owner() {
        let store = MemoryPropertyStore::new();
        let created = store.insert(new_property("alice", 100)).await.unwrap();
        let update: PropertyUpdate = serde_json::from_value(serde_json::json!({ "bedrooms": 7 })).unwrap();

        let denied = store.update_owned(&created.id, "bob", &update, Utc::now()).await.unwrap();
        assert!(denied.is_none());
        assert_eq!(store.find_by_id(&created.id).await.unwrap().unwrap().bedrooms, created.bedrooms);

        let updated = store.update_owned(&created.id, "alice", &update, Utc::now()).await.unwrap().unwrap();
        assert_eq!(updated.bedrooms, 7);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn updated_at_strictly_increases_even_with_a_stale_clock() {
        let store = MemoryPropertyStore::new();
        let created = store.insert(new_property("alice", 100)).await.unwrap();
        let stale = created.created_at - Duration::seconds(5);

        let updated = store
            .update_owned(&created.id, "alice", &PropertyUpdate::default(), stale)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn delete_requires_matching_owner() {
        let store = MemoryPropertyStore::new();
        let created = store.insert(new_property("alice", 100)).await.unwrap();

        assert!(!store.delete_owned(&created.id, "bob").await.unwrap());
        assert_eq!(store.len().await, 1);
        assert!(store.delete_owned(&created.id, "alice").await.unwrap());
        assert!(!store.delete_owned(&created.id, "alice").await.unwrap());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn owner_listing_is_newest_first() {
        let store = MemoryPropertyStore::new();
        let mut older = new_property("alice", 100);
        older.created_at = older.created_at - Duration::minutes(1);
        let older = store.insert(older).await.unwrap();
        let newer = store.insert(new_property("alice", 200)).await.unwrap();
        store.insert(new_property("bob", 300)).await.unwrap();

        let mine = store.find_by_owner("alice").await.unwrap();
        let ids: Vec<_> = mine.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
