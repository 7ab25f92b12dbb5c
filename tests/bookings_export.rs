//! Booking export ingestion from files on disk.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use saxotrade::bookings::{Asset, BookingDetail, BookingLedger, DynamicSchema, FieldValue, RowSource};
use saxotrade::types::SaxoError;

const HEADER: &str = "Date,AccountId,AccountCurrency,ClientCurrency,AmountType,AffectsBalance,\
AssetType,Uic,UnderlyingInstrumentSubType,InstrumentSymbol,InstrumentDescription,\
InstrumentSubType,UnderlyingInstrumentAssetType,UnderlyingInstrumentDescription,\
UnderlyingInstrumentSymbol,UnderlyingInstrumentUic,Amount,AmountAccountCurrency,\
AmountClientCurrency,CostType,CostSubType";

struct TempExport(PathBuf);

impl TempExport {
    fn write(rows: &[&str]) -> Self {
        let rows: Vec<&[u8]> = rows.iter().map(|r| r.as_bytes()).collect();
        Self::write_bytes(&rows)
    }

    fn write_bytes(rows: &[&[u8]]) -> Self {
        let mut path = std::env::temp_dir();
        path.push(format!("saxotrade_bookings_{}.csv", uuid::Uuid::new_v4()));
        let mut contents = HEADER.as_bytes().to_vec();
        for row in rows {
            contents.push(b'\n');
            contents.extend_from_slice(row);
        }
        contents.push(b'\n');
        fs::write(&path, contents).unwrap();
        Self(path)
    }
}

impl Drop for TempExport {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

const SHARE_BUY: &str = "05-01-2024,9226397,EUR,EUR,Share amount,Yes,Stock,211,,AAPL:xnas,Apple Inc.,,,,,,10,-1712.5,-1712.5,,";
const SHARE_COMMISSION: &str = "05-01-2024,9226397,EUR,EUR,Commission,Yes,Stock,211,,AAPL:xnas,Apple Inc.,,,,,,-1,-1,-1,Commission,Standard";
const OPTION_PREMIUM: &str = "12-02-2024,9226397,EUR,USD,Premium,true,StockOption,31337,Stock,AAPL/24C180,\"Apple Mar24 180 Call, American\",Call,Stock,Apple Inc.,AAPL:xnas,211,-350,-325.75,-350,,";
const FX_SPOT: &str = "01-12-2023,9226397,EUR,EUR,Fx amount,No,FxSpot,21,,EURUSD,Euro/US Dollar,,,,,,1000,0,0,,";

#[test]
fn test_export_loads_in_date_order() {
    let export = TempExport::write(&[OPTION_PREMIUM, SHARE_BUY, FX_SPOT, SHARE_COMMISSION]);
    let ledger = BookingLedger::load(RowSource::from_path(&export.0).unwrap()).unwrap();

    assert_eq!(ledger.len(), 4);
    assert!(ledger.rejected().is_empty());

    let dates: Vec<_> = ledger.bookings().iter().map(|b| b.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
        ]
    );
    // Same-day rows keep file order.
    assert_eq!(ledger.bookings()[1].amount_type, "Share amount");
    assert_eq!(ledger.bookings()[2].amount_type, "Commission");
    assert!(!ledger.bookings()[0].affects_balance);
}

#[test]
fn test_quoted_fields_and_derivatives() {
    let export = TempExport::write(&[OPTION_PREMIUM]);
    let mut source: RowSource<BookingDetail, _> = RowSource::from_path(&export.0).unwrap();

    let booking = source.next_record().unwrap().unwrap();
    assert_eq!(booking.instrument_description, "Apple Mar24 180 Call, American");
    assert_eq!(booking.amount_account_currency, -325.75);
    match booking.asset() {
        Asset::Derivative { primary, underlying } => {
            assert_eq!(primary.uic, "31337");
            assert_eq!(underlying.uic, "211");
        }
        other => panic!("expected a derivative, got {other:?}"),
    }

    assert!(source.next_record().unwrap().is_none());
    assert_eq!(source.rows_read(), 1);
}

#[test]
fn test_bad_rows_are_set_aside() {
    let bad_bool = SHARE_BUY.replacen(",Yes,", ",Perhaps,", 1);
    let bad_amount = SHARE_BUY.replacen(",10,", ",ten,", 1);
    let export = TempExport::write(&[SHARE_BUY, bad_bool.as_str(), "too,short", bad_amount.as_str(), FX_SPOT]);
    let ledger = BookingLedger::load(RowSource::from_path(&export.0).unwrap()).unwrap();

    assert_eq!(ledger.len(), 2);
    let rejected = ledger.rejected();
    assert_eq!(rejected.len(), 3);

    assert_eq!(rejected[0].row, 2);
    match &rejected[0].error {
        SaxoError::UnrecognizedBoolean { position, token, .. } => {
            assert_eq!(*position, 5);
            assert_eq!(token, "Perhaps");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(rejected[1].row, 3);
    assert!(matches!(
        rejected[1].error,
        SaxoError::FieldCountMismatch { expected: 21, got: 2 }
    ));
    assert_eq!(rejected[2].row, 4);
    assert!(matches!(rejected[2].error, SaxoError::MalformedNumber { position: 16, .. }));
}

#[test]
fn test_latin1_description_does_not_abort_load() {
    // "Soci\xe9t\xe9 G\xe9n\xe9rale" in Latin-1.
    let latin1: &[u8] = b"08-01-2024,9226397,EUR,EUR,Share amount,Yes,Stock,3381,,GLE:xpar,Soci\xe9t\xe9 G\xe9n\xe9rale,,,,,,5,-130.1,-130.1,,";
    let export = TempExport::write_bytes(&[SHARE_BUY.as_bytes(), latin1, FX_SPOT.as_bytes()]);
    let ledger = BookingLedger::load(RowSource::from_path(&export.0).unwrap()).unwrap();

    assert_eq!(ledger.len(), 3);
    assert!(ledger.rejected().is_empty());
    let societe = ledger.instrument("3381").unwrap();
    assert_eq!(societe.symbol, "GLE:xpar");
    assert!(societe.description.starts_with("Soci\u{FFFD}t\u{FFFD}"));
}

#[test]
fn test_instrument_index() {
    let export = TempExport::write(&[SHARE_BUY, OPTION_PREMIUM, FX_SPOT, SHARE_COMMISSION]);
    let ledger = BookingLedger::load(RowSource::from_path(&export.0).unwrap()).unwrap();

    let uics: Vec<_> = ledger.instruments().keys().cloned().collect();
    assert_eq!(uics, vec!["21", "211", "31337"]);
    assert_eq!(ledger.instrument("21").unwrap().symbol, "EURUSD");
    assert_eq!(ledger.bookings_for("211").count(), 2);
}

#[test]
fn test_missing_file_is_source_failure() {
    let missing = std::env::temp_dir().join(format!("saxotrade_missing_{}.csv", uuid::Uuid::new_v4()));
    let result = RowSource::<BookingDetail, _>::from_path(&missing);
    assert!(matches!(result, Err(SaxoError::SourceFailure(_))));
}

#[test]
fn test_dynamic_schema_binds_trimmed_export() {
    let schema = DynamicSchema::parse([
        ("date", "date"),
        ("currency", "currency"),
        ("amount", "decimal"),
        ("affects_balance", "bool"),
    ])
    .unwrap();
    let values = schema.bind(&["05-01-2024", "EUR", "-1712.5", "No"]).unwrap();
    assert_eq!(values[2], FieldValue::Decimal(-1712.5));
    assert_eq!(values[3], FieldValue::Boolean(false));

    let err = DynamicSchema::parse([("when", "timestamp")]).unwrap_err();
    assert!(matches!(err, SaxoError::UnsupportedFieldType(name) if name == "timestamp"));
}
