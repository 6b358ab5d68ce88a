//! Export Module
//! Writes the filtered table to the downloadable CSV artifact.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed file name of the download artifact.
pub const EXPORT_FILE_NAME: &str = "verenigingen_friesland_filtered.csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create export file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] PolarsError),
}

pub struct CsvExporter;

impl CsvExporter {
    /// Write `df` into `dir` as UTF-8 CSV: header row matching the frame's
    /// current columns, no index column. Returns the artifact path.
    ///
    /// Serializes to memory first so a failed run never leaves a partial
    /// artifact behind.
    pub fn write(df: &DataFrame, dir: &Path) -> Result<PathBuf, ExportError> {
        let mut buffer = Vec::new();
        let mut df = df.clone();
        CsvWriter::new(&mut buffer)
            .include_header(true)
            .finish(&mut df)?;

        let path = dir.join(EXPORT_FILE_NAME);
        std::fs::write(&path, buffer)?;

        log::info!("exported {} rows to {:?}", df.height(), path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows_without_index() {
        let df = DataFrame::new(vec![
            Column::new("Vereniging".into(), vec!["SC Leeuwarden"]),
            Column::new("gemeente".into(), vec!["Leeuwarden"]),
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = CsvExporter::write(&df, dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap().to_str().unwrap(), EXPORT_FILE_NAME);
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Vereniging,gemeente"));
        assert_eq!(lines.next(), Some("SC Leeuwarden,Leeuwarden"));
    }
}
