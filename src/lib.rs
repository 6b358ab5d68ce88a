//! Verenigingenkaart Friesland - club dataset pipeline
//!
//! Loads a tabular club dataset, validates its schema, geocodes every row by
//! PC4 postal prefix and applies the user's filter criteria. The binary in
//! `main.rs` drives one full run per invocation and handles the CSV export.

pub mod data;
pub mod export;
pub mod geo;
pub mod pipeline;
