use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::info;

use super::data_models::{Listing, columns};

/// A column-dependent feature was skipped because its column is absent.
///
/// This is a degradation, not a failure: callers log it and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingColumn {
    pub column: String,
}

impl MissingColumn {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
        }
    }

    pub fn report(&self, feature: &str) {
        info!("Column '{}' not found, skipping {}", self.column, feature);
    }
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column '{}' not available", self.column)
    }
}

/// Result of something that needs a particular column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature<T> {
    Available(T),
    Unavailable(MissingColumn),
}

impl<T> Feature<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Feature::Available(_))
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Feature::Available(value) => Some(value),
            Feature::Unavailable(_) => None,
        }
    }

    pub fn into_available(self) -> Option<T> {
        match self {
            Feature::Available(value) => Some(value),
            Feature::Unavailable(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Feature<U> {
        match self {
            Feature::Available(value) => Feature::Available(f(value)),
            Feature::Unavailable(missing) => Feature::Unavailable(missing),
        }
    }

    /// Logs the skip when unavailable and passes the feature through.
    pub fn reported(self, feature: &str) -> Self {
        if let Feature::Unavailable(missing) = &self {
            missing.report(feature);
        }
        self
    }
}

/// Ordered hotel rows backed by a polars frame.
///
/// Operations never mutate a `Dataset` in place; they hand back a new one.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn empty() -> Self {
        Self::new(DataFrame::empty())
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    fn lookup(&self, name: &str) -> Option<&Column> {
        self.frame.column(name).ok()
    }

    /// Cells of `name` as numbers. Unparseable text, NaN and infinities read as missing.
    pub fn numbers(&self, name: &str) -> PolarsResult<Feature<Vec<Option<f64>>>> {
        let Some(column) = self.lookup(name) else {
            return Ok(Feature::Unavailable(MissingColumn::new(name)));
        };

        let as_float = column.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = as_float
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();

        Ok(Feature::Available(values))
    }

    /// Cells of `name` as text.
    pub fn texts(&self, name: &str) -> PolarsResult<Feature<Vec<Option<String>>>> {
        let Some(column) = self.lookup(name) else {
            return Ok(Feature::Unavailable(MissingColumn::new(name)));
        };

        let as_text = column.cast(&DataType::String)?;
        let values: Vec<Option<String>> = as_text
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();

        Ok(Feature::Available(values))
    }

    /// Rows at `indices`, in the order given.
    pub fn take(&self, indices: &[usize]) -> PolarsResult<Dataset> {
        let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
        let idx = IdxCa::from_vec("idx".into(), idx);
        Ok(Dataset::new(self.frame.take(&idx)?))
    }

    /// Keeps rows whose mask entry is true.
    pub fn filter_rows(&self, mask: &[bool]) -> PolarsResult<Dataset> {
        let mask = BooleanChunked::new("mask".into(), mask);
        Ok(Dataset::new(self.frame.filter(&mask)?))
    }

    pub fn select(&self, names: &[&str]) -> PolarsResult<Dataset> {
        Ok(Dataset::new(self.frame.select(names.iter().copied())?))
    }

    /// Typed row view. Absent columns read as missing / empty.
    pub fn listings(&self) -> PolarsResult<Vec<Listing>> {
        let height = self.height();

        let numbers = |name: &str| -> PolarsResult<Vec<Option<f64>>> {
            Ok(self
                .numbers(name)?
                .into_available()
                .unwrap_or_else(|| vec![None; height]))
        };
        let texts = |name: &str| -> PolarsResult<Vec<Option<String>>> {
            Ok(self
                .texts(name)?
                .into_available()
                .unwrap_or_else(|| vec![None; height]))
        };

        let rank = numbers(columns::RANK)?;
        let name = texts(columns::NAME)?;
        let location = texts(columns::LOCATION)?;
        let starting_rate = numbers(columns::STARTING_RATE)?;
        let total_rooms = numbers(columns::TOTAL_ROOMS)?;
        let dining_area = texts(columns::DINING_AREA)?;
        let drinking_area = texts(columns::DRINKING_AREA)?;
        let amenities = texts(columns::AMENITIES)?;
        let address = texts(columns::ADDRESS)?;
        let number = texts(columns::NUMBER)?;

        let listings = (0..height)
            .map(|i| Listing {
                rank: rank[i],
                name: name[i].clone().unwrap_or_default(),
                location: location[i].clone(),
                starting_rate: starting_rate[i],
                total_rooms: total_rooms[i],
                dining_area: dining_area[i].clone().unwrap_or_default(),
                drinking_area: drinking_area[i].clone().unwrap_or_default(),
                amenities: amenities[i].clone().unwrap_or_default(),
                address: address[i].clone().unwrap_or_default(),
                number: number[i].clone().unwrap_or_default(),
            })
            .collect();

        Ok(listings)
    }

    /// Hotel names in row order, empty for missing.
    pub fn names(&self) -> PolarsResult<Vec<String>> {
        let names = self
            .texts(columns::NAME)?
            .into_available()
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        Ok(names)
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}
