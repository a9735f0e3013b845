use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

use crate::models::Dataset;

/// Writes datasets back out as comma-delimited UTF-8 with a header row.
pub struct CsvExporter;

impl CsvExporter {
    /// Same column order as the dataset; missing cells are written empty.
    pub fn export(&self, dataset: &Dataset) -> PolarsResult<Vec<u8>> {
        let mut buf = Vec::new();
        let mut df = dataset.frame().clone();

        CsvWriter::new(&mut buf)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df)?;

        Ok(buf)
    }

    pub fn write_to(&self, dataset: &Dataset, path: &Path) -> Result<()> {
        let bytes = self
            .export(dataset)
            .context("Failed to serialize dataset as CSV")?;

        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write CSV export: {}", path.display()))?;

        info!(
            "Exported {} rows ({} bytes) to {}",
            dataset.height(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::CsvLoader;
    use crate::processor::SchemaNormalizer;

    const SAMPLE: &str = "Rank,Name,Location,Starting Rate in ($),Hotel Ammenties\n\
                          1,Aman Venice,Venice,2200,\"Spa, pool\"\n\
                          2,Capella Bangkok,Bangkok,1800,\n\
                          3,Rosewood NY,New York,,Gym\n";

    fn load(bytes: &[u8]) -> Dataset {
        CsvLoader::new(vec!["utf-8".to_string()], "latin-1")
            .load_with_fallback(bytes, "test")
            .unwrap()
    }

    #[test]
    fn test_export_keeps_header_and_order() {
        let dataset = load(b"Name,Location\nAman Venice,Venice\nCapella Bangkok,Bangkok\n");
        let bytes = CsvExporter.export(&dataset).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "Name,Location\nAman Venice,Venice\nCapella Bangkok,Bangkok\n"
        );
    }

    #[test]
    fn test_round_trip_after_normalization() {
        let normalizer = SchemaNormalizer::new();
        let clean = normalizer.normalize(&load(SAMPLE.as_bytes())).unwrap();

        let exported = CsvExporter.export(&clean).unwrap();
        let reloaded = normalizer.normalize(&load(&exported)).unwrap();

        assert_eq!(reloaded.height(), clean.height());
        assert_eq!(reloaded.column_names(), clean.column_names());
        assert_eq!(reloaded, clean);

        let again = CsvExporter.export(&reloaded).unwrap();
        assert_eq!(again, exported);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotels_filtered.csv");
        let dataset = load(b"Name\nAman Venice\n");

        CsvExporter.write_to(&dataset, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Name\nAman Venice\n"
        );
    }
}
