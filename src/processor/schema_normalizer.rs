use polars::prelude::*;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::models::{Dataset, columns};

/// Cleans a freshly loaded dataset: trimmed headers, numeric rate/rank/room
/// columns, and no missing cells left in text columns.
pub struct SchemaNormalizer {
    numeric_columns: Vec<String>,
}

impl SchemaNormalizer {
    pub fn new() -> Self {
        Self::with_numeric_columns(columns::NUMERIC.iter().map(|c| c.to_string()).collect())
    }

    pub fn with_numeric_columns(numeric_columns: Vec<String>) -> Self {
        SchemaNormalizer { numeric_columns }
    }

    pub fn normalize(&self, dataset: &Dataset) -> PolarsResult<Dataset> {
        let mut df = dataset.frame().clone();

        self.trim_column_names(&mut df)?;

        for col_name in &self.numeric_columns {
            self.coerce_numeric_column(&mut df, col_name)?;
        }

        self.fill_text_columns(&mut df)?;

        Ok(Dataset::new(df))
    }

    fn trim_column_names(&self, df: &mut DataFrame) -> PolarsResult<()> {
        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut trimmed_counts: HashMap<&str, usize> = HashMap::new();
        for name in &column_names {
            *trimmed_counts.entry(name.trim()).or_default() += 1;
        }

        for col_name in &column_names {
            let trimmed = col_name.trim();
            if trimmed == col_name {
                continue;
            }

            // Two headers that only differ by whitespace keep their raw names
            if trimmed_counts.get(trimmed).copied().unwrap_or(0) > 1 {
                warn!(
                    "Column '{}' would collide with another column once trimmed, keeping it as is",
                    col_name
                );
                continue;
            }

            debug!("Trimming column name '{}' -> '{}'", col_name, trimmed);
            df.rename(col_name, trimmed.into())?;
        }

        Ok(())
    }

    fn coerce_numeric_column(&self, df: &mut DataFrame, col_name: &str) -> PolarsResult<()> {
        let Ok(column) = df.column(col_name).cloned() else {
            return Ok(());
        };

        let coerced: Vec<Option<f64>> = match column.dtype() {
            DataType::Float64 => column
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect(),
            _ => {
                let as_text = column.cast(&DataType::String)?;
                let values: Vec<Option<f64>> = as_text
                    .str()?
                    .into_iter()
                    .map(|v| v.and_then(parse_number))
                    .collect();
                values
            }
        };

        let new_series = Series::new(col_name.into(), coerced);
        df.with_column(new_series)?;

        Ok(())
    }

    fn fill_text_columns(&self, df: &mut DataFrame) -> PolarsResult<()> {
        let text_columns: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|c| c.dtype() == &DataType::String && c.null_count() > 0)
            .map(|c| c.name().to_string())
            .collect();

        for col_name in text_columns {
            let series = df.column(&col_name)?.clone();
            let filled: Vec<&str> = series
                .str()?
                .into_iter()
                .map(|v| v.unwrap_or(""))
                .collect();

            let new_series = Series::new(col_name.as_str().into(), filled);
            df.with_column(new_series)?;
        }

        Ok(())
    }
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lenient number parsing: surrounding whitespace is ignored, anything else
/// that is not a finite number (NaN, `inf`) is missing.
fn parse_number(raw: &str) -> Option<f64> {
    f64::from_str(raw.trim()).ok().filter(|v| v.is_finite())
}
