//! Delimited-text loading for wine data

use super::Dataset;
use crate::error::{Result, WineError};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV loader with delimiter detection
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Fixed delimiter; detected from the header when unset
    delimiter: Option<u8>,
    /// Rows used for schema inference; `None` scans the whole file
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            delimiter: None,
            infer_schema_length: None,
        }
    }

    /// Use a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Limit schema inference to the first `n` rows
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }

    /// Load a delimited file into a polars frame
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let delimiter = match self.delimiter {
            Some(d) => d,
            None => detect_delimiter(path)?,
        };
        debug!(path = %path.display(), delimiter = %(delimiter as char), "Reading delimited file");

        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()?;

        Ok(df)
    }

    /// Load a file and validate it against the wine schema
    pub fn load_wine(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let df = self.load_csv(path)?;
        Dataset::from_wine_frame(&df)
    }

    /// Get file info without loading full data
    pub fn file_info(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        let path = path.as_ref();
        let file_size = std::fs::metadata(path)?.len();
        let delimiter = match self.delimiter {
            Some(d) => d,
            None => detect_delimiter(path)?,
        };

        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();
        let header = lines.next().transpose()?.unwrap_or_default();

        let columns: Vec<String> = header
            .split(delimiter as char)
            .map(|s| s.trim().trim_matches('"').to_string())
            .collect();
        let n_rows = lines.filter(|l| l.as_ref().map_or(true, |s| !s.trim().is_empty())).count();

        Ok(FileInfo {
            path: path.to_path_buf(),
            file_size,
            delimiter,
            n_rows,
            columns,
        })
    }
}

/// File information
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub delimiter: u8,
    pub n_rows: usize,
    pub columns: Vec<String>,
}

/// Pick `;` when the header contains it (UCI distribution), otherwise `,`
fn detect_delimiter(path: &Path) -> Result<u8> {
    let reader = BufReader::new(File::open(path)?);
    let header = reader
        .lines()
        .next()
        .transpose()?
        .ok_or_else(|| WineError::InvalidInput(format!("{} is empty", path.display())))?;

    Ok(if header.contains(';') { b';' } else { b',' })
}
