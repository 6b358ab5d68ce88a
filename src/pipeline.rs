//! Pipeline Module
//! One user trigger = one full load -> validate -> enrich -> filter run.

use polars::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::{
    DataLoader, FilterCriteria, FilterEngine, LoaderError, SchemaError, SchemaValidator,
};
use crate::geo::{EnrichError, GeoIndex, GeocodeEnricher};

/// Relative path of the bundled demo dataset.
pub const DEMO_DATA_PATH: &str = "data/sportverenigingen_friesland_dummy.csv";

/// Rough bounding box of Friesland, for the plottable-rows counter.
pub const FRIESLAND_BOUNDS: GeoBounds = GeoBounds {
    min_lat: 52.8,
    max_lat: 53.7,
    min_lng: 4.6,
    max_lng: 6.7,
};

#[derive(Debug, Clone, Copy)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    #[error("Demo dataset not found at {0}; is the data directory present?")]
    MissingDemoResource(PathBuf),
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("Filter failed: {0}")]
    Filter(#[from] PolarsError),
}

/// What the user pointed the run at: an uploaded file or the demo toggle.
#[derive(Debug, Clone)]
pub enum DataSource {
    Upload(PathBuf),
    Demo,
}

impl DataSource {
    fn resolve(&self) -> Result<PathBuf, PipelineError> {
        match self {
            DataSource::Upload(path) => Ok(path.clone()),
            DataSource::Demo => resolve_demo(Path::new(".")),
        }
    }
}

fn resolve_demo(base: &Path) -> Result<PathBuf, PipelineError> {
    let path = base.join(DEMO_DATA_PATH);
    if path.is_file() {
        Ok(path)
    } else {
        Err(PipelineError::MissingDemoResource(path))
    }
}

/// Counters shown after every run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Rows in the validated, enriched table.
    pub total_rows: usize,
    /// Rows surviving the active filter criteria.
    pub filtered_rows: usize,
    /// Filtered rows that carry coordinates (plottable).
    pub geocoded_rows: usize,
    /// Geocoded rows whose centroid falls inside the Friesland bounds.
    pub in_friesland_rows: usize,
}

/// Everything one trigger produces.
#[derive(Debug)]
pub struct RunOutput {
    /// The full enriched table, pre-filter (drives the facet pickers).
    pub enriched: DataFrame,
    /// The filtered view.
    pub filtered: DataFrame,
    pub summary: RunSummary,
}

/// Owns the geo index and the memoization caches across triggers.
///
/// Caches are keyed on input content, not on paths or timestamps: the load
/// cache by the SHA-256 of the file bytes, the enrich cache by a fingerprint
/// of the validated frame. Re-running with unchanged inputs skips the parse
/// and the geocode pass entirely.
pub struct Pipeline {
    index: GeoIndex,
    load_cache: HashMap<String, DataFrame>,
    enrich_cache: HashMap<String, DataFrame>,
}

impl Pipeline {
    pub fn new(index: GeoIndex) -> Self {
        Self {
            index,
            load_cache: HashMap::new(),
            enrich_cache: HashMap::new(),
        }
    }

    /// Execute one full run. Any failure aborts the trigger before the
    /// filtered view is produced; there is no partial output.
    pub fn run(
        &mut self,
        source: &DataSource,
        criteria: &FilterCriteria,
    ) -> Result<RunOutput, PipelineError> {
        let path = source.resolve()?;
        log::info!("run started: {:?}", path);

        let raw = self.load_cached(&path)?;
        let validated = SchemaValidator::validate(&raw)?;
        let enriched = self.enrich_cached(&validated, "postcode")?;
        let filtered = FilterEngine::apply(&enriched, criteria)?;
        let summary = Self::summarize(&enriched, &filtered)?;

        log::info!(
            "run finished: {} rows, {} after filter",
            summary.total_rows,
            summary.filtered_rows
        );
        Ok(RunOutput {
            enriched,
            filtered,
            summary,
        })
    }

    /// (load cache entries, enrich cache entries)
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.load_cache.len(), self.enrich_cache.len())
    }

    fn load_cached(&mut self, path: &Path) -> Result<DataFrame, PipelineError> {
        let bytes = std::fs::read(path)?;
        let key = hex::encode(Sha256::digest(&bytes));

        if let Some(df) = self.load_cache.get(&key) {
            log::debug!("load cache hit for {:?}", path);
            return Ok(df.clone());
        }

        let df = DataLoader::load(path)?;
        self.load_cache.insert(key, df.clone());
        Ok(df)
    }

    fn enrich_cached(
        &mut self,
        df: &DataFrame,
        postal_column: &str,
    ) -> Result<DataFrame, PipelineError> {
        let key = format!("{}:{}", frame_fingerprint(df), postal_column);

        if let Some(cached) = self.enrich_cache.get(&key) {
            log::debug!("enrich cache hit");
            return Ok(cached.clone());
        }

        let enricher = GeocodeEnricher::new(&self.index);
        let enriched = enricher.enrich(df, postal_column)?;
        self.enrich_cache.insert(key, enriched.clone());
        Ok(enriched)
    }

    fn summarize(enriched: &DataFrame, filtered: &DataFrame) -> Result<RunSummary, PolarsError> {
        let lat = filtered.column("lat")?.f64()?;
        let lng = filtered.column("lng")?.f64()?;

        let mut geocoded = 0;
        let mut in_friesland = 0;
        for (lat, lng) in lat.into_iter().zip(lng) {
            if let (Some(lat), Some(lng)) = (lat, lng) {
                geocoded += 1;
                if FRIESLAND_BOUNDS.contains(lat, lng) {
                    in_friesland += 1;
                }
            }
        }

        Ok(RunSummary {
            total_rows: enriched.height(),
            filtered_rows: filtered.height(),
            geocoded_rows: geocoded,
            in_friesland_rows: in_friesland,
        })
    }
}

/// Content fingerprint of a frame: column names plus every cell value.
pub fn frame_fingerprint(df: &DataFrame) -> String {
    let mut hasher = Sha256::new();
    for col in df.get_columns() {
        hasher.update(col.name().as_bytes());
        hasher.update([0u8]);
        let series = col.as_materialized_series();
        for i in 0..series.len() {
            if let Ok(value) = series.get(i) {
                hasher.update(value.to_string().as_bytes());
            }
            hasher.update([0u8]);
        }
    }
    hex::encode(hasher.finalize())
}
