//! Tabular record binder.
//!
//! [`bind`] turns one row of text tokens into a fully populated record.
//! [`RowSource`] walks a delimited stream and hands the binder one row at a
//! time, reporting end of input as `Ok(None)`.

use std::fs::File;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::debug;

use super::schema::Record;
use crate::types::{Result, SaxoError};

/// Bind one row to a record of type `R`.
///
/// The row width must equal the schema width; otherwise nothing is coerced.
/// Fields are applied left to right and the first coercion failure is
/// returned as-is. A partially written record never escapes.
pub fn bind<R: Record, S: AsRef<str>>(row: &[S]) -> Result<R> {
    let schema = R::schema();
    if row.len() != schema.len() {
        return Err(SaxoError::FieldCountMismatch {
            expected: schema.len(),
            got: row.len(),
        });
    }

    let mut record = R::default();
    for (position, (field, token)) in schema.fields().iter().zip(row).enumerate() {
        field.apply(&mut record, position, token.as_ref())?;
    }
    Ok(record)
}

/// Reads records of type `R` from a delimited text stream.
///
/// The first line is a header and is discarded. Rows of any width are
/// passed through so that width mismatches are reported by the binder.
/// Fields are decoded leniently: bytes that are not UTF-8 become U+FFFD
/// instead of failing the row.
pub struct RowSource<R, Rd> {
    reader: csv::Reader<Rd>,
    row: ByteRecord,
    rows_read: u64,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RowSource<R, File> {
    /// Open an export file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| SaxoError::SourceFailure(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Opened tabular source");
        Ok(Self::new(file))
    }
}

impl<R: Record, Rd: Read> RowSource<R, Rd> {
    pub fn new(source: Rd) -> Self {
        Self::with_delimiter(source, b',')
    }

    pub fn with_delimiter(source: Rd, delimiter: u8) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(source);
        Self {
            reader,
            row: ByteRecord::new(),
            rows_read: 0,
            _record: PhantomData,
        }
    }

    /// Number of data rows consumed so far (header excluded).
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Bind the next row.
    ///
    /// `Ok(None)` means the stream is exhausted. A row that fails to bind is
    /// still consumed, so the caller may keep reading after an error.
    pub fn next_record(&mut self) -> Result<Option<R>> {
        let more = self
            .reader
            .read_byte_record(&mut self.row)
            .map_err(|e| SaxoError::SourceFailure(e.to_string()))?;
        if !more {
            return Ok(None);
        }
        self.rows_read += 1;
        let tokens: Vec<_> = self.row.iter().map(String::from_utf8_lossy).collect();
        bind(&tokens).map(Some)
    }
}

impl<R: Record, Rd: Read> Iterator for RowSource<R, Rd> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
