// handlers/protected - bearer token required (via the AuthUser extractor)
pub mod properties;

pub use properties::{create_property, delete_property, my_properties, update_property};
