//! The broker's booking export row and the asset model derived from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::schema::{Field, Record, Schema};
use crate::types::Currency;

// ---------------------------------------------------------------------------
// Instruments and assets
// ---------------------------------------------------------------------------

/// An instrument as described by booking columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub asset_type: String,
    pub subtype: String,
    pub symbol: String,
    pub description: String,
    pub uic: String,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} uic={}]", self.symbol, self.asset_type, self.uic)
    }
}

/// What a booking refers to: a plain instrument, or a derivative written on
/// an underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Asset {
    Instrument(Instrument),
    Derivative {
        primary: Instrument,
        underlying: Instrument,
    },
}

impl Asset {
    pub fn primary(&self) -> &Instrument {
        match self {
            Asset::Instrument(instrument) => instrument,
            Asset::Derivative { primary, .. } => primary,
        }
    }

    pub fn underlying(&self) -> Option<&Instrument> {
        match self {
            Asset::Instrument(_) => None,
            Asset::Derivative { underlying, .. } => Some(underlying),
        }
    }
}

// ---------------------------------------------------------------------------
// Booking row
// ---------------------------------------------------------------------------

/// One row of the booking export. Field order is the file's column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingDetail {
    pub date: NaiveDate,
    pub account_id: String,
    pub account_currency: Currency,
    pub client_currency: Currency,
    pub amount_type: String,
    #[serde(rename = "affects_balance?")]
    pub affects_balance: bool,
    pub asset_type: String,
    pub uic: String,
    pub underlying_instrument_subtype: String,
    pub instrument_symbol: String,
    pub instrument_description: String,
    pub instrument_subtype: String,
    pub underlying_instrument_asset_type: String,
    pub underlying_instrument_description: String,
    pub underlying_instrument_symbol: String,
    pub underlying_instrument_uic: String,
    pub amount: f64,
    #[serde(rename = "account_currency_amount")]
    pub amount_account_currency: f64,
    #[serde(rename = "client_currency_amount")]
    pub amount_client_currency: f64,
    pub cost_type: String,
    pub cost_subtype: String,
}

impl Record for BookingDetail {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<BookingDetail>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                Field::date("date", |r, v| r.date = v),
                Field::text("account_id", |r, v| r.account_id = v),
                Field::currency("account_currency", |r, v| r.account_currency = v),
                Field::currency("client_currency", |r, v| r.client_currency = v),
                Field::text("amount_type", |r, v| r.amount_type = v),
                Field::boolean("affects_balance", |r, v| r.affects_balance = v),
                Field::text("asset_type", |r, v| r.asset_type = v),
                Field::text("uic", |r, v| r.uic = v),
                Field::text("underlying_instrument_subtype", |r, v| {
                    r.underlying_instrument_subtype = v
                }),
                Field::text("instrument_symbol", |r, v| r.instrument_symbol = v),
                Field::text("instrument_description", |r, v| r.instrument_description = v),
                Field::text("instrument_subtype", |r, v| r.instrument_subtype = v),
                Field::text("underlying_instrument_asset_type", |r, v| {
                    r.underlying_instrument_asset_type = v
                }),
                Field::text("underlying_instrument_description", |r, v| {
                    r.underlying_instrument_description = v
                }),
                Field::text("underlying_instrument_symbol", |r, v| {
                    r.underlying_instrument_symbol = v
                }),
                Field::text("underlying_instrument_uic", |r, v| r.underlying_instrument_uic = v),
                Field::decimal("amount", |r, v| r.amount = v),
                Field::decimal("account_currency_amount", |r, v| r.amount_account_currency = v),
                Field::decimal("client_currency_amount", |r, v| r.amount_client_currency = v),
                Field::text("cost_type", |r, v| r.cost_type = v),
                Field::text("cost_subtype", |r, v| r.cost_subtype = v),
            ])
        })
    }
}

impl BookingDetail {
    /// The booked instrument itself.
    pub fn instrument(&self) -> Instrument {
        Instrument {
            asset_type: self.asset_type.clone(),
            subtype: self.instrument_subtype.clone(),
            symbol: self.instrument_symbol.clone(),
            description: self.instrument_description.clone(),
            uic: self.uic.clone(),
        }
    }

    /// The asset this booking refers to. A populated underlying UIC makes it
    /// a derivative.
    pub fn asset(&self) -> Asset {
        if self.underlying_instrument_uic.is_empty() {
            return Asset::Instrument(self.instrument());
        }
        Asset::Derivative {
            primary: self.instrument(),
            underlying: Instrument {
                asset_type: self.underlying_instrument_asset_type.clone(),
                subtype: self.underlying_instrument_subtype.clone(),
                symbol: self.underlying_instrument_symbol.clone(),
                description: self.underlying_instrument_description.clone(),
                uic: self.underlying_instrument_uic.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
