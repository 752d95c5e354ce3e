//! Output sinks for merged records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::record::{FIELD_NAMES, OutputRecord};

/// Byte-order mark so spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors raised while writing output.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The output file could not be created or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be encoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SinkError {
    /// Creates an I/O error tied to `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Destination for merged records.
pub trait RecordSink {
    /// Writes one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn emit(&mut self, record: &OutputRecord) -> Result<(), SinkError>;

    /// Flushes buffered output. Called once after the last record.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> Result<(), SinkError>;
}

/// CSV file with a UTF-8 BOM and a header row.
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<BufWriter<File>>,
    rows: usize,
}

impl CsvSink {
    /// Creates (or truncates) `path` and writes the BOM and header row.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| SinkError::io(&path, e))?;
        let mut buffered = BufWriter::new(file);
        buffered
            .write_all(UTF8_BOM)
            .map_err(|e| SinkError::io(&path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(buffered);
        writer.write_record(FIELD_NAMES)?;
        debug!(path = %path.display(), "csv sink opened");
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    /// Output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl RecordSink for CsvSink {
    fn emit(&mut self, record: &OutputRecord) -> Result<(), SinkError> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|e| SinkError::io(&self.path, e))?;
        debug!(path = %self.path.display(), rows = self.rows, "csv sink flushed");
        Ok(())
    }
}

/// Collects records in memory.
impl RecordSink for Vec<OutputRecord> {
    fn emit(&mut self, record: &OutputRecord) -> Result<(), SinkError> {
        self.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
