//! Geo module - postal-centroid lookup and coordinate enrichment

mod enricher;
mod index;

pub use enricher::{normalize_postcode, EnrichError, GeocodeEnricher};
pub use index::{GeoIndex, GeoIndexError, DEFAULT_GEOINDEX_PATH};
