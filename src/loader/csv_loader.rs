use encoding_rs::Encoding;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DataSection;
use crate::models::Dataset;

/// Why a single encoding attempt did not produce a table.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("unknown encoding label '{0}'")]
    UnknownEncoding(String),
    #[error("input is not valid {encoding}")]
    Decode { encoding: &'static str },
    #[error("CSV parse failed as {encoding}: {source}")]
    Parse {
        encoding: &'static str,
        #[source]
        source: PolarsError,
    },
}

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no candidate encodings configured for {0}")]
    NoEncodings(String),
    #[error("could not load {source_name} with any candidate encoding, last failure: {last}")]
    AllEncodingsFailed {
        source_name: String,
        #[source]
        last: AttemptFailure,
    },
    #[error("unknown upload encoding label '{0}'")]
    UnknownUploadEncoding(String),
    #[error("failed to parse uploaded CSV: {0}")]
    Parse(#[from] PolarsError),
}

/// Where a table comes from.
#[derive(Debug, Clone, Copy)]
pub enum DataSource<'a> {
    Path(&'a Path),
    Upload(&'a [u8]),
}

/// Reads comma-delimited listings into a raw [`Dataset`].
///
/// Path loads retry each candidate encoding strictly; uploads decode once,
/// replacing invalid sequences. Every cell comes back as text.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    encodings: Vec<String>,
    upload_encoding: String,
}

impl CsvLoader {
    pub fn new(encodings: Vec<String>, upload_encoding: impl Into<String>) -> Self {
        Self {
            encodings,
            upload_encoding: upload_encoding.into(),
        }
    }

    pub fn from_config(section: &DataSection) -> Self {
        Self::new(section.encodings.clone(), section.upload_encoding.clone())
    }

    pub fn encodings(&self) -> &[String] {
        &self.encodings
    }

    pub fn load(&self, source: DataSource<'_>) -> Result<Dataset, DataLoadError> {
        match source {
            DataSource::Path(path) => self.load_path(path),
            DataSource::Upload(bytes) => self.load_upload(bytes),
        }
    }

    pub fn load_path(&self, path: &Path) -> Result<Dataset, DataLoadError> {
        let bytes = std::fs::read(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.load_with_fallback(&bytes, &path.display().to_string())
    }

    /// Tries every configured encoding in order and keeps the first table that parses.
    pub fn load_with_fallback(
        &self,
        bytes: &[u8],
        source_name: &str,
    ) -> Result<Dataset, DataLoadError> {
        let mut last_failure = None;

        for label in &self.encodings {
            match Self::try_encoding(bytes, label) {
                Ok(frame) => {
                    info!(
                        "Loaded {} as {} ({} rows, {} columns)",
                        source_name,
                        label,
                        frame.height(),
                        frame.width()
                    );
                    return Ok(Dataset::new(frame));
                }
                Err(failure) => {
                    warn!("Encoding {} failed for {}: {}", label, source_name, failure);
                    last_failure = Some(failure);
                }
            }
        }

        match last_failure {
            Some(last) => Err(DataLoadError::AllEncodingsFailed {
                source_name: source_name.to_string(),
                last,
            }),
            None => Err(DataLoadError::NoEncodings(source_name.to_string())),
        }
    }

    pub fn load_upload(&self, bytes: &[u8]) -> Result<Dataset, DataLoadError> {
        let encoding = resolve_encoding(&self.upload_encoding)
            .ok_or_else(|| DataLoadError::UnknownUploadEncoding(self.upload_encoding.clone()))?;

        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            warn!(
                "Uploaded CSV had invalid {} sequences, replaced them",
                used.name()
            );
        }

        let frame = parse_csv(&text)?;
        info!(
            "Loaded uploaded CSV as {} ({} rows, {} columns)",
            used.name(),
            frame.height(),
            frame.width()
        );

        Ok(Dataset::new(frame))
    }

    fn try_encoding(bytes: &[u8], label: &str) -> Result<DataFrame, AttemptFailure> {
        let encoding = resolve_encoding(label)
            .ok_or_else(|| AttemptFailure::UnknownEncoding(label.to_string()))?;

        let text = encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or(AttemptFailure::Decode {
                encoding: encoding.name(),
            })?;

        parse_csv(&text).map_err(|source| AttemptFailure::Parse {
            encoding: encoding.name(),
            source,
        })
    }
}

/// Looks up an encoding by WHATWG label, also accepting hyphenated spellings like `latin-1`.
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    Encoding::for_label(label.as_bytes())
        .or_else(|| Encoding::for_label(label.replace(['-', '_'], "").as_bytes()))
}

fn parse_csv(text: &str) -> PolarsResult<DataFrame> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    debug!("Parsing {} bytes of CSV text", text.len());

    let parse_options = CsvParseOptions::default()
        .with_separator(b',')
        .with_missing_is_null(true);

    let read_options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(parse_options);

    CsvReader::new(Cursor::new(text.as_bytes().to_vec()))
        .with_options(read_options)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "Rank,Name,Location,Starting Rate in ($)\n\
                          1,Aman Venice,Venice,2200\n\
                          2,Capella Bangkok,Bangkok,1800\n\
                          3,Rosewood NY,New York,\n";

    fn loader(encodings: &[&str]) -> CsvLoader {
        CsvLoader::new(
            encodings.iter().map(|e| e.to_string()).collect(),
            "latin-1",
        )
    }

    #[test]
    fn test_resolve_encoding_labels() {
        assert_eq!(resolve_encoding("utf-8"), Some(encoding_rs::UTF_8));
        assert_eq!(resolve_encoding("cp1252"), Some(encoding_rs::WINDOWS_1252));
        assert_eq!(resolve_encoding("latin-1"), Some(encoding_rs::WINDOWS_1252));
        assert_eq!(resolve_encoding("not-an-encoding"), None);
    }

    #[test]
    fn test_from_config_keeps_encoding_order() {
        let csv_loader = CsvLoader::from_config(&DataSection::default());
        assert_eq!(csv_loader.encodings(), ["latin-1", "cp1252", "utf-8"]);
    }

    #[test]
    fn test_load_reads_every_cell_as_text() {
        let dataset = loader(&["utf-8"])
            .load_with_fallback(SAMPLE.as_bytes(), "sample")
            .unwrap();

        assert_eq!(dataset.height(), 3);
        assert_eq!(
            dataset.column_names(),
            vec!["Rank", "Name", "Location", "Starting Rate in ($)"]
        );
        let rates = dataset.frame().column("Starting Rate in ($)").unwrap();
        assert_eq!(rates.dtype(), &DataType::String);
        assert_eq!(rates.null_count(), 1);
    }

    #[test]
    fn test_falls_back_to_next_encoding() {
        // "Café" in windows-1252 is not valid UTF-8
        let bytes = b"Name,Location\nCaf\xe9 Royal,Paris\n";
        let dataset = loader(&["utf-8", "cp1252"])
            .load_with_fallback(bytes, "cafe")
            .unwrap();

        assert_eq!(dataset.names().unwrap(), vec!["Café Royal".to_string()]);
    }

    #[test]
    fn test_all_encodings_failing_keeps_last_failure() {
        let bytes = b"Name\nCaf\xe9\n";
        let err = loader(&["utf-8", "klingon"])
            .load_with_fallback(bytes, "cafe")
            .unwrap_err();

        match err {
            DataLoadError::AllEncodingsFailed { source_name, last } => {
                assert_eq!(source_name, "cafe");
                assert!(matches!(last, AttemptFailure::UnknownEncoding(label) if label == "klingon"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strict_utf8_rejects_invalid_bytes() {
        let err = loader(&["utf-8"])
            .load_with_fallback(b"Name\nCaf\xe9\n", "cafe")
            .unwrap_err();

        assert!(matches!(
            err,
            DataLoadError::AllEncodingsFailed {
                last: AttemptFailure::Decode { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_overlong_rows_fail_every_attempt() {
        let err = loader(&["utf-8", "cp1252"])
            .load_with_fallback(b"Name,Location\nA,B,C,D\n", "ragged")
            .unwrap_err();

        assert!(matches!(
            err,
            DataLoadError::AllEncodingsFailed {
                last: AttemptFailure::Parse { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_short_rows_are_padded_with_missing() {
        let dataset = loader(&["utf-8"])
            .load_with_fallback(b"Name,Location,Rate\nA,B\nC,D,3\n", "short")
            .unwrap();

        assert_eq!(dataset.height(), 2);
        let rates = dataset.frame().column("Rate").unwrap();
        assert_eq!(rates.null_count(), 1);
        assert_eq!(dataset.names().unwrap(), vec!["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_no_encodings() {
        let err = loader(&[])
            .load_with_fallback(SAMPLE.as_bytes(), "sample")
            .unwrap_err();
        assert!(matches!(err, DataLoadError::NoEncodings(_)));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(SAMPLE.as_bytes());
        let dataset = loader(&["utf-8"])
            .load_with_fallback(&bytes, "bom")
            .unwrap();
        assert!(dataset.has_column("Rank"));
    }

    #[test]
    fn test_upload_decodes_leniently() {
        let bytes = b"Name,Location\nH\xf4tel Plaza,Paris\n";
        let dataset = loader(&["utf-8"]).load_upload(bytes).unwrap();
        assert_eq!(dataset.names().unwrap(), vec!["Hôtel Plaza".to_string()]);
    }

    #[test]
    fn test_load_path_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let csv_loader = loader(&["latin-1", "cp1252", "utf-8"]);
        let dataset = csv_loader.load(DataSource::Path(file.path())).unwrap();
        assert_eq!(dataset.height(), 3);

        let err = csv_loader
            .load(DataSource::Path(Path::new("does/not/exist.csv")))
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
    }
}
