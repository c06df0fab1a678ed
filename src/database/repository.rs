use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{self, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProperty, ObjectId, Property, PropertyUpdate};
use crate::database::query_builder::{bind_param_query_as, QueryBuilder, TABLE};
use crate::database::store::PropertyStore;
use crate::filter::types::PropertySearch;

/// Row shape of the `properties` table.
#[derive(Debug, FromRow)]
struct PropertyRow {
    id: String,
    owner_id: String,
    availability_status: String,
    location_state: String,
    location_area: String,
    property_address: String,
    estate_name: Option<String>,
    property_type: String,
    condition: String,
    furnishing: String,
    bedrooms: i32,
    bathrooms: i32,
    toilets: i32,
    price: Decimal,
    caution_fee: Option<Decimal>,
    agency_fee: Option<Decimal>,
    other_fees: Option<Decimal>,
    facilities: Vec<String>,
    description: String,
    listing_by: String,
    images: Vec<String>,
    view_count: i64,
    bookmarked_by_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = DatabaseError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let id = ObjectId::parse(&row.id).map_err(|e| DatabaseError::CorruptRecord {
            id: row.id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Property {
            id,
            owner_id: row.owner_id,
            availability_status: row.availability_status,
            location_state: row.location_state,
            location_area: row.location_area,
            property_address: row.property_address,
            estate_name: row.estate_name,
            property_type: row.property_type,
            condition: row.condition,
            furnishing: row.furnishing,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            toilets: row.toilets,
            price: row.price,
            caution_fee: row.caution_fee,
            agency_fee: row.agency_fee,
            other_fees: row.other_fees,
            facilities: row.facilities,
            description: row.description,
            listing_by: row.listing_by,
            images: row.images,
            view_count: row.view_count,
            bookmarked_by_count: row.bookmarked_by_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_properties(rows: Vec<PropertyRow>) -> Result<Vec<Property>, DatabaseError> {
    rows.into_iter().map(Property::try_from).collect()
}

/// Postgres-backed property store.
pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyStore for PgPropertyRepository {
    async fn insert(&self, new: NewProperty) -> Result<Property, DatabaseError> {
        let property = Property::from_new(ObjectId::new(), new);
        let query = format!(
            "INSERT INTO \"{}\" (id, owner_id, availability_status, location_state, location_area, \
             property_address, estate_name, property_type, condition, furnishing, bedrooms, bathrooms, \
             toilets, price, caution_fee, agency_fee, other_fees, facilities, description, listing_by, \
             images, view_count, bookmarked_by_count, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
             $19, $20, $21, $22, $23, $24, $25) RETURNING *",
            TABLE
        );

        let row = sqlx::query_as::<_, PropertyRow>(&query)
            .bind(property.id.to_string())
            .bind(&property.owner_id)
            .bind(&property.availability_status)
            .bind(&property.location_state)
            .bind(&property.location_area)
            .bind(&property.property_address)
            .bind(&property.estate_name)
            .bind(&property.property_type)
            .bind(&property.condition)
            .bind(&property.furnishing)
            .bind(property.bedrooms)
            .bind(property.bathrooms)
            .bind(property.toilets)
            .bind(property.price)
            .bind(property.caution_fee)
            .bind(property.agency_fee)
            .bind(property.other_fees)
            .bind(&property.facilities)
            .bind(&property.description)
            .bind(&property.listing_by)
            .bind(&property.images)
            .bind(property.view_count)
            .bind(property.bookmarked_by_count)
            .bind(property.created_at)
            .bind(property.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Property::try_from(row)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Property>, DatabaseError> {
        let query = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", TABLE);
        let row = sqlx::query_as::<_, PropertyRow>(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Property::try_from).transpose()
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, DatabaseError> {
        let query = format!(
            "SELECT * FROM \"{}\" WHERE \"owner_id\" = $1 ORDER BY \"created_at\" DESC, \"id\" COLLATE \"C\" DESC",
            TABLE
        );
        let rows = sqlx::query_as::<_, PropertyRow>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        into_properties(rows)
    }

    async fn search(&self, search: &PropertySearch) -> Result<Vec<Property>, DatabaseError> {
        let sql_result = QueryBuilder::select(search);
        tracing::debug!("property search: {}", sql_result.query);

        let mut q = sqlx::query_as::<_, PropertyRow>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        into_properties(rows)
    }

    async fn update_owned(
        &self,
        id: &ObjectId,
        owner_id: &str,
        update: &PropertyUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Property>, DatabaseError> {
        let sql_result = QueryBuilder::update_owned(id, owner_id, &update.changes(), now);

        let mut q = sqlx::query_as::<_, PropertyRow>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(&self.pool).await?;
        row.map(Property::try_from).transpose()
    }

    async fn delete_owned(&self, id: &ObjectId, owner_id: &str) -> Result<bool, DatabaseError> {
        let query = format!("DELETE FROM \"{}\" WHERE \"id\" = $1 AND \"owner_id\" = $2", TABLE);
        let result = sqlx::query(&query)
            .bind(id.to_string())
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
