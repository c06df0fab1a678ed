use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::FilterError;
use crate::database::models::PropertyField;

/// Typed `/properties` query parameters.
///
/// Parsing happens once at the HTTP boundary. Absent parameters, empty values
/// and the literal `null` some clients send all come out as `None` (or an
/// empty facility list), so nothing downstream compares against sentinel
/// strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyQuery {
    pub location_state: Option<String>,
    pub location_area: Option<String>,
    pub property_type: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub furnishing: Option<String>,
    pub condition: Option<String>,
    pub facilities: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<PropertyField>,
    pub sort_order: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

/// `None` for values that carry no information.
fn meaningful(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_number<T: FromStr>(param: &str, raw: &str) -> Result<T, FilterError> {
    raw.parse::<T>()
        .map_err(|_| FilterError::invalid_argument(param, format!("'{}' is not a valid number", raw)))
}

fn parse_count(param: &str, raw: &str) -> Result<i32, FilterError> {
    let value: i32 = parse_number(param, raw)?;
    if value < 0 {
        return Err(FilterError::invalid_argument(param, "must not be negative"));
    }
    Ok(value)
}

fn parse_price(param: &str, raw: &str) -> Result<Decimal, FilterError> {
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| FilterError::invalid_argument(param, format!("'{}' is not a valid price", raw)))?;
    if value <= Decimal::ZERO {
        return Err(FilterError::invalid_argument(param, "must be greater than zero"));
    }
    Ok(value)
}

fn parse_sort_field(raw: &str) -> Result<PropertyField, FilterError> {
    let field = PropertyField::from_str(raw).map_err(|_| FilterError::UnknownSortField(raw.to_string()))?;
    if !field.is_sortable() {
        return Err(FilterError::UnsortableField(raw.to_string()));
    }
    Ok(field)
}

impl PropertyQuery {
    /// Parse a raw URL query string. Repeated `facilities` keys accumulate
    /// and each value may itself be a comma-separated list. Unknown keys are
    /// ignored.
    pub fn from_query_str(query: Option<&str>) -> Result<Self, FilterError> {
        let mut out = PropertyQuery::default();
        let Some(query) = query else { return Ok(out) };

        for (key, raw) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == "facilities" || key == "facilities[]" {
                out.facilities.extend(raw.split(',').filter_map(meaningful).map(str::to_string));
                continue;
            }
            let Some(value) = meaningful(&raw) else { continue };
            match key.as_ref() {
                "location_state" => out.location_state = Some(value.to_string()),
                "location_area" => out.location_area = Some(value.to_string()),
                "property_type" => out.property_type = Some(value.to_string()),
                "furnishing" => out.furnishing = Some(value.to_string()),
                "condition" => out.condition = Some(value.to_string()),
                "bedrooms" => out.bedrooms = Some(parse_count("bedrooms", value)?),
                "bathrooms" => out.bathrooms = Some(parse_count("bathrooms", value)?),
                "min_price" => out.min_price = Some(parse_price("min_price", value)?),
                "max_price" => out.max_price = Some(parse_price("max_price", value)?),
                "sort_by" => out.sort_by = Some(parse_sort_field(value)?),
                "sort_order" => out.sort_order = Some(value.to_string()),
                "skip" => out.skip = Some(parse_number("skip", value)?),
                "limit" => out.limit = Some(parse_number("limit", value)?),
                other => tracing::trace!("ignoring unknown query parameter '{}'", other),
            }
        }
        Ok(out)
    }
}
