//! Geocode Enricher Module
//! Derives PC4 prefixes from raw postcodes and attaches centroid coordinates.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use thiserror::Error;

use super::index::GeoIndex;

static PC4_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Failed to attach coordinates: {0}")]
    Polars(#[from] PolarsError),
}

/// Attaches `pc4`, `lat` and `lng` columns to a club table.
///
/// Rows whose postcode has no 4-digit run, or whose prefix is unknown to
/// the index, keep null coordinates but stay in the table; the map side
/// just skips them.
pub struct GeocodeEnricher<'a> {
    index: &'a GeoIndex,
}

impl<'a> GeocodeEnricher<'a> {
    pub fn new(index: &'a GeoIndex) -> Self {
        Self { index }
    }

    /// First 4-digit run anywhere in a raw postcode value.
    ///
    /// Unanchored: `"9201 AB"` and `"AB1234"` both yield a prefix,
    /// `"geen"` yields none.
    pub fn postal_prefix(raw: &str) -> Option<String> {
        PC4_RE.find(raw).map(|m| m.as_str().to_string())
    }

    /// Enrich every row of `df`, reading prefixes from `postal_column`.
    ///
    /// Original columns are untouched; output appends nullable `pc4`,
    /// `lat` and `lng` columns.
    pub fn enrich(&self, df: &DataFrame, postal_column: &str) -> Result<DataFrame, EnrichError> {
        let postcodes = df.column(postal_column)?.cast(&DataType::String)?;
        let postcodes = postcodes.str()?;

        let prefixes: Vec<Option<String>> = postcodes
            .into_iter()
            .map(|value| value.and_then(Self::postal_prefix))
            .collect();

        let coords = self.index.resolve_batch(&prefixes);
        let lats: Vec<Option<f64>> = coords.iter().map(|c| c.map(|(lat, _)| lat)).collect();
        let lngs: Vec<Option<f64>> = coords.iter().map(|c| c.map(|(_, lng)| lng)).collect();

        let hits = lats.iter().flatten().count();
        log::info!("geocoded {}/{} rows", hits, df.height());

        let mut out = df.clone();
        out.with_column(Column::new("pc4".into(), prefixes))?;
        out.with_column(Column::new("lat".into(), lats))?;
        out.with_column(Column::new("lng".into(), lngs))?;
        Ok(out)
    }
}

/// Canonical display form of a Dutch postcode.
///
/// `"9201ab"` becomes `"9201 AB"`. Values that are not a full 6-character
/// postcode fall back to the bare PC4 when one can be extracted, and to the
/// trimmed input otherwise. Display only; prefix extraction always works
/// on the raw value.
pub fn normalize_postcode(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let is_full = compact.len() == 6
        && compact.chars().take(4).all(|c| c.is_ascii_digit())
        && compact.chars().skip(4).all(|c| c.is_ascii_uppercase());
    if is_full {
        return format!("{} {}", &compact[..4], &compact[4..]);
    }

    match PC4_RE.find(&compact) {
        Some(m) => m.as_str().to_string(),
        None => raw.trim().to_string(),
    }
}
