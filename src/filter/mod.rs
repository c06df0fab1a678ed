pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod filter_eval;
pub mod query;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filter::Filter;
pub use filter_eval::FilterEval;
pub use query::PropertyQuery;
