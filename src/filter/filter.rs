use rust_decimal::Decimal;

use super::filter_order::FilterOrder;
use super::query::PropertyQuery;
use super::types::{Condition, FilterOp, Page, Predicate, PropertySearch, SortOrder};
use crate::config::FilterConfig;
use crate::database::models::{FieldValue, PropertyField};

/// Builds a store-agnostic `PropertySearch` from typed query parameters.
pub struct Filter<'a> {
    config: &'a FilterConfig,
}

impl<'a> Filter<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, query: &PropertyQuery) -> PropertySearch {
        PropertySearch {
            predicate: Self::predicate(query),
            sort: Self::sort(query),
            page: self.page(query),
        }
    }

    pub fn predicate(query: &PropertyQuery) -> Predicate {
        let mut predicate = Predicate::default();

        let text_fields = [
            (PropertyField::LocationState, &query.location_state),
            (PropertyField::LocationArea, &query.location_area),
            (PropertyField::PropertyType, &query.property_type),
        ];
        for (field, value) in text_fields {
            if let Some(v) = value {
                predicate.push(Condition::new(field, FilterOp::Eq, FieldValue::Text(v.clone())));
            }
        }

        let count_fields = [
            (PropertyField::Bedrooms, query.bedrooms),
            (PropertyField::Bathrooms, query.bathrooms),
        ];
        for (field, value) in count_fields {
            if let Some(v) = value {
                predicate.push(Condition::new(field, FilterOp::Eq, FieldValue::Int(v)));
            }
        }

        let descriptive_fields = [
            (PropertyField::Furnishing, &query.furnishing),
            (PropertyField::Condition, &query.condition),
        ];
        for (field, value) in descriptive_fields {
            if let Some(v) = value {
                predicate.push(Condition::new(field, FilterOp::Eq, FieldValue::Text(v.clone())));
            }
        }

        if !query.facilities.is_empty() {
            predicate.push(Condition::new(
                PropertyField::Facilities,
                FilterOp::All,
                FieldValue::TextList(query.facilities.clone()),
            ));
        }

        let (lower, upper) = price_bounds(query.min_price, query.max_price);
        if let Some(min) = lower {
            predicate.push(Condition::new(PropertyField::Price, FilterOp::Gte, FieldValue::Decimal(min)));
        }
        if let Some(max) = upper {
            predicate.push(Condition::new(PropertyField::Price, FilterOp::Lte, FieldValue::Decimal(max)));
        }

        predicate
    }

    pub fn sort(query: &PropertyQuery) -> SortOrder {
        SortOrder {
            field: query.sort_by.unwrap_or(PropertyField::Price),
            direction: FilterOrder::direction(query.sort_order.as_deref()),
        }
    }

    fn page(&self, query: &PropertyQuery) -> Page {
        let max_limit = self.config.max_limit;
        let requested = query.limit.unwrap_or(max_limit);
        let limit = if requested > max_limit {
            if self.config.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", requested, max_limit);
            }
            max_limit
        } else {
            requested
        };
        Page { skip: query.skip.unwrap_or(0), limit }
    }
}

/// Resolve the price window.
///
/// With both bounds present the lower bound is kept only when `min < max`
/// and the upper bound only when `max > min`, so `min == max` (or an
/// inverted range) yields no price condition at all. A lone bound is kept.
pub fn price_bounds(min: Option<Decimal>, max: Option<Decimal>) -> (Option<Decimal>, Option<Decimal>) {
    match (min, max) {
        (Some(lo), Some(hi)) => (
            if lo < hi { Some(lo) } else { None },
            if hi > lo { Some(hi) } else { None },
        ),
        other => other,
    }
}
