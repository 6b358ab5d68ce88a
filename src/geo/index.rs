//! GeoIndex Module
//! Read-only postal-centroid lookup table, keyed by 4-digit prefix (PC4).

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the bundled centroid table (Friesland subset).
pub const DEFAULT_GEOINDEX_PATH: &str = "data/nl_pc4_centroids.csv";

#[derive(Error, Debug)]
pub enum GeoIndexError {
    #[error("Centroid table not found at {0}")]
    NotFound(PathBuf),
    #[error("Failed to parse centroid table: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the external postal-centroid dataset.
#[derive(Debug, Deserialize)]
struct CentroidRecord {
    pc4: String,
    latitude: f64,
    longitude: f64,
}

/// Maps a PC4 prefix to a representative latitude/longitude centroid.
///
/// The table is externally supplied and never mutated; a run treats it as
/// stable, which is what makes enrichment cacheable.
pub struct GeoIndex {
    centroids: HashMap<String, (f64, f64)>,
}

impl GeoIndex {
    /// Load a centroid table with a `pc4,latitude,longitude` header row.
    pub fn from_csv(path: &Path) -> Result<Self, GeoIndexError> {
        if !path.is_file() {
            return Err(GeoIndexError::NotFound(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut centroids = HashMap::new();
        for record in reader.deserialize() {
            let record: CentroidRecord = record?;
            centroids.insert(record.pc4, (record.latitude, record.longitude));
        }

        log::info!("geo index loaded: {} postal prefixes", centroids.len());
        Ok(Self { centroids })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, (f64, f64))>) -> Self {
        Self {
            centroids: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, pc4: &str) -> Option<(f64, f64)> {
        self.centroids.get(pc4).copied()
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Resolve a whole column of prefixes at once.
    ///
    /// The lookup runs once per unique prefix, not once per row; unknown
    /// prefixes and absent inputs come back as `None` in place.
    pub fn resolve_batch(&self, prefixes: &[Option<String>]) -> Vec<Option<(f64, f64)>> {
        let unique: HashSet<&str> = prefixes.iter().flatten().map(String::as_str).collect();
        let resolved: HashMap<&str, (f64, f64)> = unique
            .into_iter()
            .filter_map(|pc4| self.centroids.get(pc4).map(|c| (pc4, *c)))
            .collect();

        prefixes
            .iter()
            .map(|pc4| pc4.as_deref().and_then(|p| resolved.get(p).copied()))
            .collect()
    }
}
