use super::types::{SortDirection, SortOrder};

pub struct FilterOrder;

impl FilterOrder {
    /// `asc` in any letter case sorts ascending, as does an absent value.
    /// Every other value sorts descending.
    pub fn direction(raw: Option<&str>) -> SortDirection {
        match raw {
            None => SortDirection::Asc,
            Some(dir) if dir.trim().eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(_) => SortDirection::Desc,
        }
    }

    /// Postgres default null placement (last when ascending, first when
    /// descending) is what the in-memory store mirrors. Text keys sort under
    /// the byte-order "C" collation so both stores agree on string order.
    pub fn generate(order: &SortOrder) -> String {
        let collate = if order.field.is_text() { " COLLATE \"C\"" } else { "" };
        format!("ORDER BY \"{}\"{} {}", order.field.as_str(), collate, order.direction.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::PropertyField;

    #[test]
    fn asc_is_case_insensitive() {
        assert_eq!(FilterOrder::direction(Some("asc")), SortDirection::Asc);
        assert_eq!(FilterOrder::direction(Some("ASC")), SortDirection::Asc);
        assert_eq!(FilterOrder::direction(Some(" Asc ")), SortDirection::Asc);
    }

    #[test]
    fn unrecognised_directions_sort_descending() {
        assert_eq!(FilterOrder::direction(Some("desc")), SortDirection::Desc);
        assert_eq!(FilterOrder::direction(Some("xyz")), SortDirection::Desc);
        assert_eq!(FilterOrder::direction(None), SortDirection::Asc);
    }

    #[test]
    fn renders_single_field_order() {
        let order = SortOrder { field: PropertyField::CreatedAt, direction: SortDirection::Desc };
        assert_eq!(FilterOrder::generate(&order), "ORDER BY \"created_at\" DESC");
    }

    #[test]
    fn text_keys_sort_by_byte_order() {
        let order = SortOrder { field: PropertyField::LocationArea, direction: SortDirection::Asc };
        assert_eq!(FilterOrder::generate(&order), "ORDER BY \"location_area\" COLLATE \"C\" ASC");
    }
}
