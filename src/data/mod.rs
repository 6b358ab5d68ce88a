//! Data module - dataset loading, schema validation and filtering

mod filter;
mod loader;
mod validator;

pub use filter::{FilterCriteria, FilterEngine};
pub use loader::{DataLoader, LoaderError};
pub use validator::{SchemaError, SchemaValidator, REQUIRED_COLUMNS};
