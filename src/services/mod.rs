pub mod property_service;

pub use property_service::{CreateAck, ImageFile, PropertyError, PropertyService};
