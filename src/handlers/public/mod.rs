// handlers/public - no authentication required
pub mod properties;

pub use properties::{get_property, search_properties};
