use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::object_id::ObjectId;
use super::property_input::PropertyCreate;

/// A property listing as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: ObjectId,
    pub owner_id: String,
    pub availability_status: String,
    pub location_state: String,
    pub location_area: String,
    pub property_address: String,
    pub estate_name: Option<String>,
    pub property_type: String,
    pub condition: String,
    pub furnishing: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub toilets: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub caution_fee: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub agency_fee: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub other_fees: Option<Decimal>,
    pub facilities: Vec<String>,
    pub description: String,
    pub listing_by: String,
    pub images: Vec<String>,
    pub view_count: i64,
    pub bookmarked_by_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the store needs to insert a record. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub owner_id: String,
    pub details: PropertyCreate,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Materialise a freshly inserted record: both timestamps equal, counters zeroed.
    pub fn from_new(id: ObjectId, new: NewProperty) -> Self {
        let NewProperty { owner_id, details, images, created_at } = new;
        Self {
            id,
            owner_id,
            availability_status: details.availability_status,
            location_state: details.location_state,
            location_area: details.location_area,
            property_address: details.property_address,
            estate_name: details.estate_name,
            property_type: details.property_type,
            condition: details.condition,
            furnishing: details.furnishing,
            bedrooms: details.bedrooms,
            bathrooms: details.bathrooms,
            toilets: details.toilets,
            price: details.price,
            caution_fee: details.caution_fee,
            agency_fee: details.agency_fee,
            other_fees: details.other_fees,
            facilities: details.facilities,
            description: details.description,
            listing_by: details.listing_by,
            images,
            view_count: 0,
            bookmarked_by_count: 0,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Current value of a field, `None` when the field is unset.
    pub fn value_of(&self, field: PropertyField) -> Option<FieldValue> {
        use PropertyField as F;
        let value = match field {
            F::OwnerId => FieldValue::Text(self.owner_id.clone()),
            F::AvailabilityStatus => FieldValue::Text(self.availability_status.clone()),
            F::LocationState => FieldValue::Text(self.location_state.clone()),
            F::LocationArea => FieldValue::Text(self.location_area.clone()),
            F::PropertyAddress => FieldValue::Text(self.property_address.clone()),
            F::EstateName => FieldValue::Text(self.estate_name.clone()?),
            F::PropertyType => FieldValue::Text(self.property_type.clone()),
            F::Condition => FieldValue::Text(self.condition.clone()),
            F::Furnishing => FieldValue::Text(self.furnishing.clone()),
            F::Bedrooms => FieldValue::Int(self.bedrooms),
            F::Bathrooms => FieldValue::Int(self.bathrooms),
            F::Toilets => FieldValue::Int(self.toilets),
            F::Price => FieldValue::Decimal(self.price),
            F::CautionFee => FieldValue::Decimal(self.caution_fee?),
            F::AgencyFee => FieldValue::Decimal(self.agency_fee?),
            F::OtherFees => FieldValue::Decimal(self.other_fees?),
            F::Facilities => FieldValue::TextList(self.facilities.clone()),
            F::Description => FieldValue::Text(self.description.clone()),
            F::ListingBy => FieldValue::Text(self.listing_by.clone()),
            F::ViewCount => FieldValue::BigInt(self.view_count),
            F::BookmarkedByCount => FieldValue::BigInt(self.bookmarked_by_count),
            F::CreatedAt => FieldValue::Timestamp(self.created_at),
            F::UpdatedAt => FieldValue::Timestamp(self.updated_at),
        };
        Some(value)
    }

    /// Apply one change produced by `PropertyUpdate::changes`.
    ///
    /// Only the mutable descriptive fields are accepted; identity, ownership,
    /// counters and timestamps are rejected.
    pub fn set(&mut self, field: PropertyField, value: FieldValue) -> Result<(), FieldValueMismatch> {
        use FieldValue as V;
        use PropertyField as F;
        match (field, value) {
            (F::AvailabilityStatus, V::Text(v)) => self.availability_status = v,
            (F::LocationState, V::Text(v)) => self.location_state = v,
            (F::LocationArea, V::Text(v)) => self.location_area = v,
            (F::PropertyAddress, V::Text(v)) => self.property_address = v,
            (F::EstateName, V::Text(v)) => self.estate_name = Some(v),
            (F::PropertyType, V::Text(v)) => self.property_type = v,
            (F::Condition, V::Text(v)) => self.condition = v,
            (F::Furnishing, V::Text(v)) => self.furnishing = v,
            (F::Bedrooms, V::Int(v)) => self.bedrooms = v,
            (F::Bathrooms, V::Int(v)) => self.bathrooms = v,
            (F::Toilets, V::Int(v)) => self.toilets = v,
            (F::Price, V::Decimal(v)) => self.price = v,
            (F::CautionFee, V::Decimal(v)) => self.caution_fee = Some(v),
            (F::AgencyFee, V::Decimal(v)) => self.agency_fee = Some(v),
            (F::OtherFees, V::Decimal(v)) => self.other_fees = Some(v),
            (F::Facilities, V::TextList(v)) => self.facilities = v,
            (F::Description, V::Text(v)) => self.description = v,
            (F::ListingBy, V::Text(v)) => self.listing_by = v,
            (field, _) => return Err(FieldValueMismatch(field)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("field '{0}' cannot be set to the given value")]
pub struct FieldValueMismatch(pub PropertyField);

/// The closed set of record fields that queries, sorts and updates may name.
/// `as_str` is the column name, so it is safe to splice into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyField {
    OwnerId,
    AvailabilityStatus,
    LocationState,
    LocationArea,
    PropertyAddress,
    EstateName,
    PropertyType,
    Condition,
    Furnishing,
    Bedrooms,
    Bathrooms,
    Toilets,
    Price,
    CautionFee,
    AgencyFee,
    OtherFees,
    Facilities,
    Description,
    ListingBy,
    ViewCount,
    BookmarkedByCount,
    CreatedAt,
    UpdatedAt,
}

impl PropertyField {
    pub const ALL: [PropertyField; 23] = [
        PropertyField::OwnerId,
        PropertyField::AvailabilityStatus,
        PropertyField::LocationState,
        PropertyField::LocationArea,
        PropertyField::PropertyAddress,
        PropertyField::EstateName,
        PropertyField::PropertyType,
        PropertyField::Condition,
        PropertyField::Furnishing,
        PropertyField::Bedrooms,
        PropertyField::Bathrooms,
        PropertyField::Toilets,
        PropertyField::Price,
        PropertyField::CautionFee,
        PropertyField::AgencyFee,
        PropertyField::OtherFees,
        PropertyField::Facilities,
        PropertyField::Description,
        PropertyField::ListingBy,
        PropertyField::ViewCount,
        PropertyField::BookmarkedByCount,
        PropertyField::CreatedAt,
        PropertyField::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyField::OwnerId => "owner_id",
            PropertyField::AvailabilityStatus => "availability_status",
            PropertyField::LocationState => "location_state",
            PropertyField::LocationArea => "location_area",
            PropertyField::PropertyAddress => "property_address",
            PropertyField::EstateName => "estate_name",
            PropertyField::PropertyType => "property_type",
            PropertyField::Condition => "condition",
            PropertyField::Furnishing => "furnishing",
            PropertyField::Bedrooms => "bedrooms",
            PropertyField::Bathrooms => "bathrooms",
            PropertyField::Toilets => "toilets",
            PropertyField::Price => "price",
            PropertyField::CautionFee => "caution_fee",
            PropertyField::AgencyFee => "agency_fee",
            PropertyField::OtherFees => "other_fees",
            PropertyField::Facilities => "facilities",
            PropertyField::Description => "description",
            PropertyField::ListingBy => "listing_by",
            PropertyField::ViewCount => "view_count",
            PropertyField::BookmarkedByCount => "bookmarked_by_count",
            PropertyField::CreatedAt => "created_at",
            PropertyField::UpdatedAt => "updated_at",
        }
    }

    /// List-valued and free-text fields have no useful ordering.
    pub fn is_sortable(&self) -> bool {
        !matches!(self, PropertyField::Facilities | PropertyField::Description)
    }

    /// Scalar `TEXT` columns.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            PropertyField::OwnerId
                | PropertyField::AvailabilityStatus
                | PropertyField::LocationState
                | PropertyField::LocationArea
                | PropertyField::PropertyAddress
                | PropertyField::EstateName
                | PropertyField::PropertyType
                | PropertyField::Condition
                | PropertyField::Furnishing
                | PropertyField::Description
                | PropertyField::ListingBy
        )
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown property field '{}'", s))
    }
}

/// A typed field value, used for predicates, sort keys and updates.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i32),
    BigInt(i64),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
    TextList(Vec<String>),
}

impl FieldValue {
    /// Ordering between two values of the same kind; `None` across kinds.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Int(a), FieldValue::Int(b)) => Some(a.cmp(b)),
            (FieldValue::BigInt(a), FieldValue::BigInt(b)) => Some(a.cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            (FieldValue::TextList(a), FieldValue::TextList(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
