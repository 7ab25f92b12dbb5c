//! Booking ledger: accumulates bound export rows for a portfolio.
//!
//! Rows are bound in stream order. Rows that fail to bind are kept aside
//! with their row number rather than aborting the load. Once the stream is
//! exhausted the bookings are ordered by date and an instrument index keyed
//! by UIC is derived.

use std::collections::BTreeMap;
use std::io::Read;
use tracing::{info, warn};

use super::binder::RowSource;
use super::record::{BookingDetail, Instrument};
use crate::types::{Result, SaxoError};

/// A row that could not be bound, with its 1-based data row number.
#[derive(Debug)]
pub struct RejectedRow {
    pub row: u64,
    pub error: SaxoError,
}

/// Bookings of one export, date-ordered, plus derived indexes.
#[derive(Debug, Default)]
pub struct BookingLedger {
    bookings: Vec<BookingDetail>,
    instruments: BTreeMap<String, Instrument>,
    rejected: Vec<RejectedRow>,
}

impl BookingLedger {
    /// Drain `source`, keeping every row that binds.
    ///
    /// Only a failure of the stream itself aborts the load.
    pub fn load<Rd: Read>(mut source: RowSource<BookingDetail, Rd>) -> Result<Self> {
        let mut ledger = Self::default();
        loop {
            match source.next_record() {
                Ok(Some(booking)) => ledger.bookings.push(booking),
                Ok(None) => break,
                Err(e @ SaxoError::SourceFailure(_)) => return Err(e),
                Err(error) => {
                    let row = source.rows_read();
                    warn!(row, error = %error, "Skipping booking row");
                    ledger.rejected.push(RejectedRow { row, error });
                }
            }
        }
        ledger.finish();
        info!(
            bookings = ledger.bookings.len(),
            instruments = ledger.instruments.len(),
            rejected = ledger.rejected.len(),
            "Bookings loaded"
        );
        Ok(ledger)
    }

    /// Build a ledger from already-bound bookings.
    pub fn from_bookings(bookings: Vec<BookingDetail>) -> Self {
        let mut ledger = Self {
            bookings,
            ..Self::default()
        };
        ledger.finish();
        ledger
    }

    fn finish(&mut self) {
        // Stable: same-day bookings keep their file order.
        self.bookings.sort_by_key(|b| b.date);
        for booking in &self.bookings {
            self.instruments
                .entry(booking.uic.clone())
                .or_insert_with(|| booking.instrument());
        }
    }

    /// All bookings, oldest first.
    pub fn bookings(&self) -> &[BookingDetail] {
        &self.bookings
    }

    pub fn instruments(&self) -> &BTreeMap<String, Instrument> {
        &self.instruments
    }

    pub fn instrument(&self, uic: &str) -> Option<&Instrument> {
        self.instruments.get(uic)
    }

    /// Bookings against one instrument, oldest first.
    pub fn bookings_for<'a>(&'a self, uic: &'a str) -> impl Iterator<Item = &'a BookingDetail> + 'a {
        self.bookings.iter().filter(move |b| b.uic == uic)
    }

    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
