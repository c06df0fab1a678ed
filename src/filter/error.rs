use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid value for '{param}': {message}")]
    InvalidArgument { param: String, message: String },

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("Field cannot be used for sorting: {0}")]
    UnsortableField(String),
}

impl FilterError {
    pub fn invalid_argument(param: impl Into<String>, message: impl Into<String>) -> Self {
        FilterError::InvalidArgument { param: param.into(), message: message.into() }
    }
}
