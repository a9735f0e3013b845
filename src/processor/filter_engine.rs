use polars::prelude::PolarsResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::models::{Dataset, Feature, columns};

/// The filters picked on the dashboard. Every field left at its default is inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Destinations to keep. Empty means any destination.
    pub locations: BTreeSet<String>,
    /// Inclusive `(low, high)` bounds on the starting rate.
    pub rate_range: Option<(f64, f64)>,
    pub name_query: Option<String>,
}

impl FilterSpec {
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rate_range(mut self, low: f64, high: f64) -> Self {
        self.rate_range = Some((low, high));
        self
    }

    pub fn with_name_query(mut self, query: impl Into<String>) -> Self {
        self.name_query = Some(query.into());
        self
    }

    /// Trimmed, lower-cased query when the name filter is active.
    fn active_query(&self) -> Option<String> {
        self.name_query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
    }

    pub fn is_identity(&self) -> bool {
        self.locations.is_empty() && self.rate_range.is_none() && self.active_query().is_none()
    }
}

/// Applies a [`FilterSpec`] as an AND of row masks, keeping row order.
///
/// A predicate whose column is missing is skipped, not treated as a failure.
pub struct FilterEngine;

impl FilterEngine {
    pub fn apply(&self, dataset: &Dataset, spec: &FilterSpec) -> PolarsResult<Dataset> {
        if spec.is_identity() {
            debug!("No active filters, keeping all {} rows", dataset.height());
            return Ok(dataset.clone());
        }

        let mut mask = vec![true; dataset.height()];

        if !spec.locations.is_empty() {
            if let Some(locations) = dataset
                .texts(columns::LOCATION)?
                .reported("location filter")
                .into_available()
            {
                for (keep, location) in mask.iter_mut().zip(locations) {
                    *keep &= location.is_some_and(|l| spec.locations.contains(&l));
                }
            }
        }

        if let Some((low, high)) = spec.rate_range {
            if let Feature::Available(rates) =
                dataset.numbers(columns::STARTING_RATE)?.reported("rate filter")
            {
                for (keep, rate) in mask.iter_mut().zip(rates) {
                    // Missing rates compare as 0
                    let effective = rate.unwrap_or(0.0);
                    *keep &= low <= effective && effective <= high;
                }
            }
        }

        if let Some(query) = spec.active_query() {
            if let Some(names) = dataset
                .texts(columns::NAME)?
                .reported("name search")
                .into_available()
            {
                for (keep, name) in mask.iter_mut().zip(names) {
                    *keep &= name.is_some_and(|n| n.to_lowercase().contains(&query));
                }
            }
        }

        let filtered = dataset.filter_rows(&mask)?;
        info!(
            "Filters kept {} of {} rows",
            filtered.height(),
            dataset.height()
        );

        Ok(filtered)
    }
}
