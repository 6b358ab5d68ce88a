//! Tabular Loader Module
//! Reads club datasets from CSV or spreadsheet files into Polars.

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load tabular data: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to open spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Spreadsheet has no usable sheet")]
    NoSheet,
}

/// Loads an uploaded dataset into a DataFrame.
///
/// Dispatch is by file name: `.csv` (any case) is parsed as comma-separated
/// text with a header row, everything else is treated as a spreadsheet
/// binary whose first sheet carries the header row.
pub struct DataLoader;

impl DataLoader {
    pub fn load(path: &Path) -> Result<DataFrame, LoaderError> {
        let is_csv = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_ascii_lowercase().ends_with(".csv"))
            .unwrap_or(false);

        if is_csv {
            Self::load_csv(path)
        } else {
            Self::load_spreadsheet(path)
        }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        log::debug!("loaded CSV {:?}: {} rows", path, df.height());
        Ok(df)
    }

    /// Load the first sheet of a spreadsheet file (xlsx, xls, ods).
    ///
    /// Every cell is carried as a string; empty cells become nulls. Type
    /// coercion happens later, during schema validation.
    pub fn load_spreadsheet(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook = open_workbook_auto(path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoaderError::NoSheet)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header: Vec<String> = match rows.next() {
            Some(cells) => cells.iter().map(|c| c.to_string()).collect(),
            None => return Err(LoaderError::NoSheet),
        };

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
        for cells in rows {
            for (idx, slot) in columns.iter_mut().enumerate() {
                let value = match cells.get(idx) {
                    None | Some(Data::Empty) => None,
                    Some(cell) => Some(cell.to_string()),
                };
                slot.push(value);
            }
        }

        let df = DataFrame::new(
            header
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name.into(), values))
                .collect(),
        )?;

        log::debug!("loaded sheet '{}' from {:?}: {} rows", sheet_name, path, df.height());
        Ok(df)
    }
}
