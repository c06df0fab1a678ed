pub mod object_id;
pub mod property;
pub mod property_input;

pub use object_id::{InvalidObjectId, ObjectId};
pub use property::{FieldValue, FieldValueMismatch, NewProperty, Property, PropertyField};
pub use property_input::{PropertyCreate, PropertyUpdate};
