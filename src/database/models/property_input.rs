use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::property::{FieldValue, PropertyField};

/// Payload accepted when creating a listing. Everything is required except
/// the estate name, the fee breakdown and the facility tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PropertyCreate {
    #[validate(length(min = 1, max = 50))]
    pub availability_status: String,

    #[validate(length(min = 1, max = 100))]
    pub location_state: String,

    #[validate(length(min = 1, max = 100))]
    pub location_area: String,

    #[validate(length(min = 1, max = 60))]
    pub property_address: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 60))]
    pub estate_name: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub property_type: String,

    #[validate(length(min = 1, max = 50))]
    pub condition: String,

    #[validate(length(min = 1, max = 50))]
    pub furnishing: String,

    #[validate(range(min = 0))]
    pub bedrooms: i32,

    #[validate(range(min = 0))]
    pub bathrooms: i32,

    #[validate(range(min = 0))]
    pub toilets: i32,

    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_fee"))]
    pub caution_fee: Option<Decimal>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_fee"))]
    pub agency_fee: Option<Decimal>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_fee"))]
    pub other_fees: Option<Decimal>,

    #[serde(default)]
    #[validate(custom(function = "validate_facilities"))]
    pub facilities: Vec<String>,

    #[validate(length(min = 1, max = 850))]
    pub description: String,

    #[validate(length(min = 1, max = 50))]
    pub listing_by: String,
}

/// Partial update. Only fields present in the request body are applied;
/// `null` is treated the same as an absent field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PropertyUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub availability_status: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub location_state: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub location_area: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 60))]
    pub property_address: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 60))]
    pub estate_name: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub property_type: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub condition: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub furnishing: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub bedrooms: Option<i32>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub bathrooms: Option<i32>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub toilets: Option<i32>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_fee"))]
    pub caution_fee: Option<Decimal>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_fee"))]
    pub agency_fee: Option<Decimal>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_fee"))]
    pub other_fees: Option<Decimal>,

    #[serde(default)]
    #[validate(custom(function = "validate_facilities"))]
    pub facilities: Option<Vec<String>>,

    #[serde(default)]
    #[validate(length(min = 1, max = 850))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub listing_by: Option<String>,
}

impl PropertyUpdate {
    /// The whitelisted changes carried by this update, in column order.
    pub fn changes(&self) -> Vec<(PropertyField, FieldValue)> {
        use PropertyField as F;

        let mut changes = Vec::new();
        let mut text = |field: F, value: &Option<String>| {
            if let Some(v) = value {
                changes.push((field, FieldValue::Text(v.clone())));
            }
        };
        text(F::AvailabilityStatus, &self.availability_status);
        text(F::LocationState, &self.location_state);
        text(F::LocationArea, &self.location_area);
        text(F::PropertyAddress, &self.property_address);
        text(F::EstateName, &self.estate_name);
        text(F::PropertyType, &self.property_type);
        text(F::Condition, &self.condition);
        text(F::Furnishing, &self.furnishing);
        text(F::Description, &self.description);
        text(F::ListingBy, &self.listing_by);

        let counts = [
            (F::Bedrooms, self.bedrooms),
            (F::Bathrooms, self.bathrooms),
            (F::Toilets, self.toilets),
        ];
        for (field, value) in counts {
            if let Some(v) = value {
                changes.push((field, FieldValue::Int(v)));
            }
        }

        let money = [
            (F::Price, self.price),
            (F::CautionFee, self.caution_fee),
            (F::AgencyFee, self.agency_fee),
            (F::OtherFees, self.other_fees),
        ];
        for (field, value) in money {
            if let Some(v) = value {
                changes.push((field, FieldValue::Decimal(v)));
            }
        }

        if let Some(facilities) = &self.facilities {
            changes.push((F::Facilities, FieldValue::TextList(facilities.clone())));
        }
        changes
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// At most two decimal places and `max_digits` significant digits in total.
fn check_money_shape(value: &Decimal, max_digits: u32) -> Result<(), ValidationError> {
    if value.normalize().scale() > 2 {
        return Err(invalid("decimal_places", "at most 2 decimal places are allowed"));
    }
    let limit = Decimal::from(10i64.pow(max_digits - 2));
    if value.abs() >= limit {
        return Err(invalid("max_digits", "value has too many digits"));
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(invalid("range", "price must be greater than zero"));
    }
    check_money_shape(price, 12)
}

fn validate_fee(fee: &Decimal) -> Result<(), ValidationError> {
    if fee.is_sign_negative() && !fee.is_zero() {
        return Err(invalid("range", "fees cannot be negative"));
    }
    check_money_shape(fee, 10)
}

fn validate_facilities(facilities: &Vec<String>) -> Result<(), ValidationError> {
    if facilities.iter().any(|tag| tag.trim().is_empty()) {
        return Err(invalid("blank_tag", "facility tags cannot be blank"));
    }
    if facilities.iter().any(|tag| tag.chars().count() > 50) {
        return Err(invalid("length", "facility tags are limited to 50 characters"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_create() -> PropertyCreate {
        serde_json::from_value(sample_create_json()).unwrap()
    }

    pub(crate) fn sample_create_json() -> serde_json::Value {
        json!({
            "availability_status": "Available",
            "location_state": "Lagos",
            "location_area": "Lekki",
            "property_address": "12 Admiralty Way",
            "estate_name": "Palm Springs",
            "property_type": "Apartment",
            "condition": "Newly built",
            "furnishing": "Furnished",
            "bedrooms": 3,
            "bathrooms": 3,
            "toilets": 4,
            "price": 2500000.0,
            "caution_fee": 250000,
            "agency_fee": 250000,
            "facilities": ["water", "power"],
            "description": "Spacious three bedroom apartment",
            "listing_by": "agent"
        })
    }

    #[test]
    fn accepts_complete_payload() {
        let create = sample_create();
        assert!(create.validate().is_ok());
        assert_eq!(create.price, Decimal::from(2_500_000));
        assert_eq!(create.other_fees, None);
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let mut payload = sample_create_json();
        let obj = payload.as_object_mut().unwrap();
        obj.remove("estate_name");
        obj.remove("caution_fee");
        obj.remove("agency_fee");
        obj.remove("facilities");
        let create: PropertyCreate = serde_json::from_value(payload).unwrap();
        assert!(create.validate().is_ok());
        assert!(create.facilities.is_empty());
    }

    #[test]
    fn missing_required_field_fails_to_parse() {
        let mut payload = sample_create_json();
        payload.as_object_mut().unwrap().remove("price");
        assert!(serde_json::from_value::<PropertyCreate>(payload).is_err());
    }

    #[test]
    fn server_managed_fields_are_rejected() {
        let mut payload = sample_create_json();
        payload["owner_id"] = json!("someone-else");
        assert!(serde_json::from_value::<PropertyCreate>(payload).is_err());
    }

    #[test]
    fn non_positive_price_fails_validation() {
        for price in [json!(0), json!(-10.5)] {
            let mut payload = sample_create_json();
            payload["price"] = price;
            let create: PropertyCreate = serde_json::from_value(payload).unwrap();
            let errors = create.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("price"));
        }
    }

    #[test]
    fn negative_counts_fail_validation() {
        let mut payload = sample_create_json();
        payload["bedrooms"] = json!(-1);
        let create: PropertyCreate = serde_json::from_value(payload).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("bedrooms"));
    }

    #[test]
    fn money_with_three_decimals_fails_validation() {
        let mut payload = sample_create_json();
        payload["agency_fee"] = json!(100.125);
        let create: PropertyCreate = serde_json::from_value(payload).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("agency_fee"));
    }

    #[test]
    fn overlong_description_fails_validation() {
        let mut payload = sample_create_json();
        payload["description"] = json!("x".repeat(851));
        let create: PropertyCreate = serde_json::from_value(payload).unwrap();
        assert!(create.validate().is_err());
    }

    #[test]
    fn blank_facility_tag_fails_validation() {
        let mut payload = sample_create_json();
        payload["facilities"] = json!(["water", " "]);
        let create: PropertyCreate = serde_json::from_value(payload).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("facilities"));
    }

    #[test]
    fn update_changes_list_only_present_fields() {
        let update: PropertyUpdate =
            serde_json::from_value(json!({ "price": 3000000, "bedrooms": 4, "estate_name": null })).unwrap();
        let changes = update.changes();
        assert_eq!(
            changes,
            vec![
                (PropertyField::Bedrooms, FieldValue::Int(4)),
                (PropertyField::Price, FieldValue::Decimal(Decimal::from(3_000_000))),
            ]
        );
        assert!(update.validate().is_ok());
    }

    #[test]
    fn empty_update_has_no_changes() {
        let update: PropertyUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(update.changes().is_empty());
    }

    #[test]
    fn update_cannot_name_owner_or_counters() {
        assert!(serde_json::from_value::<PropertyUpdate>(json!({ "owner_id": "x" })).is_err());
        assert!(serde_json::from_value::<PropertyUpdate>(json!({ "view_count": 10 })).is_err());
        assert!(serde_json::from_value::<PropertyUpdate>(json!({ "id": "66eb45085bc5f324f674a07f" })).is_err());
    }

    #[test]
    fn update_validates_present_fields() {
        let update: PropertyUpdate = serde_json::from_value(json!({ "price": 0 })).unwrap();
        assert!(update.validate().is_err());
        let update: PropertyUpdate = serde_json::from_value(json!({ "toilets": -2 })).unwrap();
        assert!(update.validate().is_err());
    }
}
