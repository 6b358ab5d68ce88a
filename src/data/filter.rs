//! Filter Engine Module
//! Conjunctive facet and free-text filtering over the club table.

use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User-selected filter state for one run.
///
/// An empty set or empty string on an axis means "no constraint"; the
/// gemeente and sport axes behave symmetrically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub municipalities: BTreeSet<String>,
    pub sports: BTreeSet<String>,
    pub query: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty() && self.sports.is_empty() && self.query.trim().is_empty()
    }
}

pub struct FilterEngine;

impl FilterEngine {
    /// Apply all active criteria as one conjunction, preserving row order.
    ///
    /// The input frame is left untouched; missing cells never match and
    /// never error.
    pub fn apply(df: &DataFrame, criteria: &FilterCriteria) -> Result<DataFrame, PolarsError> {
        if criteria.is_empty() {
            return Ok(df.clone());
        }

        let mut mask = vec![true; df.height()];

        if !criteria.municipalities.is_empty() {
            Self::retain_members(df, "gemeente", &criteria.municipalities, &mut mask)?;
        }
        if !criteria.sports.is_empty() {
            Self::retain_members(df, "sport", &criteria.sports, &mut mask)?;
        }
        let query = criteria.query.trim().to_lowercase();
        if !query.is_empty() {
            Self::retain_query_matches(df, &query, &mut mask)?;
        }

        let kept = mask.iter().filter(|&&m| m).count();
        log::debug!("filter kept {}/{} rows", kept, df.height());

        let mask: BooleanChunked = mask.into_iter().collect();
        df.filter(&mask)
    }

    /// Sorted unique non-null values of a column, for populating the facet
    /// pickers.
    pub fn unique_facet_values(df: &DataFrame, column: &str) -> Result<Vec<String>, PolarsError> {
        let values = df.column(column)?.str()?;
        let unique: BTreeSet<String> = values.into_iter().flatten().map(str::to_string).collect();
        Ok(unique.into_iter().collect())
    }

    /// Clear mask slots whose value in `column` is not a member of `selected`.
    fn retain_members(
        df: &DataFrame,
        column: &str,
        selected: &BTreeSet<String>,
        mask: &mut [bool],
    ) -> Result<(), PolarsError> {
        let values = df.column(column)?.str()?;
        for (slot, value) in mask.iter_mut().zip(values) {
            match value {
                Some(v) if selected.contains(v) => {}
                _ => *slot = false,
            }
        }
        Ok(())
    }

    /// Case-insensitive substring search over Vereniging, plaats and
    /// postcode; a row stays when any of the three matches.
    fn retain_query_matches(
        df: &DataFrame,
        query: &str,
        mask: &mut [bool],
    ) -> Result<(), PolarsError> {
        let names = df.column("Vereniging")?.str()?;
        let places = df.column("plaats")?.str()?;
        let postcodes = df.column("postcode")?.str()?;

        let rows: Vec<(Option<&str>, Option<&str>, Option<&str>)> = names
            .into_iter()
            .zip(places)
            .zip(postcodes)
            .map(|((name, place), postcode)| (name, place, postcode))
            .collect();

        let hits: Vec<bool> = rows
            .par_iter()
            .map(|(name, place, postcode)| {
                [name, place, postcode]
                    .into_iter()
                    .flatten()
                    .any(|value| value.to_lowercase().contains(query))
            })
            .collect();

        for (slot, hit) in mask.iter_mut().zip(hits) {
            if !hit {
                *slot = false;
            }
        }
        Ok(())
    }
}
