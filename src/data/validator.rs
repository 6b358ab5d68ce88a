//! Schema Validator Module
//! Enforces the fixed club-dataset column set before any processing.

use polars::prelude::*;
use thiserror::Error;

/// Columns every club dataset must carry, in presentation order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Vereniging",
    "sport",
    "bond",
    "adres",
    "postcode",
    "plaats",
    "gemeente",
];

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("Failed to project columns: {0}")]
    Polars(#[from] PolarsError),
}

pub struct SchemaValidator;

impl SchemaValidator {
    /// Check for the required columns and project down to them, in order.
    ///
    /// Reports every missing name at once, not just the first. On success
    /// extra columns are dropped and each retained column is cast to a
    /// string column, so numeric-looking postcodes or gemeente codes read
    /// back uniformly downstream.
    pub fn validate(df: &DataFrame) -> Result<DataFrame, SchemaError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !present.iter().any(|p| p == *name))
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns { missing });
        }

        let columns = REQUIRED_COLUMNS
            .iter()
            .map(|name| df.column(name)?.cast(&DataType::String))
            .collect::<Result<Vec<Column>, PolarsError>>()?;

        Ok(DataFrame::new(columns)?)
    }
}
