//! Instruction objects and their projection onto query parameters.
//!
//! The gateway rejects empty or unknown parameters, so projection is sparse:
//! a field holding its zero value (empty string, empty list, `0`, `false`)
//! is left out entirely.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rich description of a reference-data or pricing query.
///
/// Never sent as-is; see [`Instruction::project`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Instruction {
    pub exchange_id: String,
    pub keywords: String,
    pub asset_types: Vec<String>,
    pub can_participate_in_multi_leg_order: bool,
    pub trading_status: String,
    pub field_groups: Vec<String>,
    pub class: Vec<String>,
    pub include_non_tradable: bool,
    pub uics: Vec<u64>,
    pub uic: u64,
    pub underlying_uic: u64,
    pub expiry_dates: String,
    pub option_space_segment: String,
    pub tags: Vec<String>,
    pub amount: f64,
    pub amount_type: String,
    pub forward_date: String,
    pub forward_date_far_leg: String,
    pub forward_date_near_leg: String,
    pub lower_barrier: f64,
    pub upper_barrier: f64,
    pub order_bid_price: f64,
    pub order_ask_price: f64,
    pub put_call: String,
    pub strike_price: f64,
    pub quote_currency: String,
    pub to_open_close: String,
}

impl Instruction {
    /// Flatten into the string map the dispatcher sends.
    ///
    /// A set `uic` is folded into `Uics` instead of being sent on its own.
    pub fn project(&self) -> BTreeMap<String, String> {
        let mut p = Projection::default();

        p.list("AssetTypes", &self.asset_types);
        p.list("Class", &self.class);
        p.list("Tags", &self.tags);
        p.list("FieldGroups", &self.field_groups);
        p.text("ExchangeId", &self.exchange_id);
        p.text("Keywords", &self.keywords);
        p.text("OptionSpaceSegment", &self.option_space_segment);
        p.text("TradingStatus", &self.trading_status);
        p.text("ExpiryDates", &self.expiry_dates);
        p.flag("CanParticipateInMultiLegOrder", self.can_participate_in_multi_leg_order);
        p.flag("IncludeNonTradable", self.include_non_tradable);
        p.integer("UnderlyingUic", self.underlying_uic);
        p.list("Uics", &self.all_uics());
        p.decimal("Amount", self.amount);
        p.text("AmountType", &self.amount_type);
        p.text("ForwardDate", &self.forward_date);
        p.text("ForwardDateFarLeg", &self.forward_date_far_leg);
        p.text("ForwardDateNearLeg", &self.forward_date_near_leg);
        p.decimal("LowerBarrier", self.lower_barrier);
        p.decimal("UpperBarrier", self.upper_barrier);
        p.decimal("OrderBidPrice", self.order_bid_price);
        p.decimal("OrderAskPrice", self.order_ask_price);
        p.text("PutCall", &self.put_call);
        p.decimal("StrikePrice", self.strike_price);
        p.text("QuoteCurrency", &self.quote_currency);
        p.text("ToOpenClose", &self.to_open_close);

        p.params
    }

    /// `uics` with a set `uic` appended, unless it is already listed.
    fn all_uics(&self) -> Vec<u64> {
        let mut uics = self.uics.clone();
        if self.uic > 0 && !uics.contains(&self.uic) {
            uics.push(self.uic);
        }
        uics
    }
}

/// Accumulates parameters, dropping zero values.
#[derive(Default)]
struct Projection {
    params: BTreeMap<String, String>,
}

impl Projection {
    fn text(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.params.insert(key.to_string(), value.to_string());
        }
    }

    fn list<T: ToString>(&mut self, key: &str, values: &[T]) {
        if !values.is_empty() {
            let joined = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            self.params.insert(key.to_string(), joined);
        }
    }

    fn integer(&mut self, key: &str, value: u64) {
        if value != 0 {
            self.params.insert(key.to_string(), value.to_string());
        }
    }

    fn decimal(&mut self, key: &str, value: f64) {
        if value != 0.0 {
            self.params.insert(key.to_string(), format_decimal(value));
        }
    }

    fn flag(&mut self, key: &str, value: bool) {
        if value {
            self.params.insert(key.to_string(), "true".to_string());
        }
    }
}

/// Fixed notation with six decimals; never scientific.
///
/// A non-zero value too small for six decimals falls back to its shortest
/// round-trip form, which `Display` also keeps out of scientific notation.
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{value:.6}");
    if value != 0.0 && fixed.trim_start_matches('-').bytes().all(|b| b == b'0' || b == b'.') {
        return value.to_string();
    }
    fixed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_instruction_projects_nothing() {
        assert!(Instruction::default().project().is_empty());
    }

    #[test]
    fn test_fx_spot_keyword_search() {
        let instr = Instruction {
            asset_types: vec!["FxSpot".into()],
            keywords: "EUR".into(),
            ..Default::default()
        };
        let params = instr.project();
        assert_eq!(params.len(), 2);
        assert_eq!(params["AssetTypes"], "FxSpot");
        assert_eq!(params["Keywords"], "EUR");
    }

    #[test]
    fn test_lists_joined_in_input_order() {
        let instr = Instruction {
            asset_types: vec!["Stock".into(), "FxSpot".into(), "Bond".into()],
            field_groups: vec!["Quote".into(), "DisplayAndFormat".into()],
            ..Default::default()
        };
        let params = instr.project();
        assert_eq!(params["AssetTypes"], "Stock,FxSpot,Bond");
        assert_eq!(params["FieldGroups"], "Quote,DisplayAndFormat");
    }

    #[test]
    fn test_singular_uic_folded_into_uics() {
        let instr = Instruction {
            uic: 21,
            ..Default::default()
        };
        let params = instr.project();
        assert_eq!(params["Uics"], "21");
        assert!(!params.contains_key("Uic"));

        let instr = Instruction {
            uics: vec![4, 7],
            uic: 21,
            ..Default::default()
        };
        assert_eq!(instr.project()["Uics"], "4,7,21");
    }

    #[test]
    fn test_singular_uic_not_duplicated() {
        let instr = Instruction {
            uics: vec![21, 4],
            uic: 21,
            ..Default::default()
        };
        assert_eq!(instr.project()["Uics"], "21,4");
    }

    #[test]
    fn test_decimals_fixed_notation() {
        let instr = Instruction {
            amount: 100000.0,
            strike_price: 0.0000125,
            upper_barrier: 1e21,
            ..Default::default()
        };
        let params = instr.project();
        assert_eq!(params["Amount"], "100000.000000");
        assert_eq!(params["StrikePrice"], "0.000013");
        assert_eq!(params["UpperBarrier"], "1000000000000000000000.000000");
        assert!(!params.contains_key("LowerBarrier"));
    }

    #[test]
    fn test_tiny_decimals_not_flattened_to_zero() {
        let instr = Instruction {
            strike_price: 0.0000004,
            lower_barrier: -0.0000004,
            ..Default::default()
        };
        let params = instr.project();
        assert_eq!(params["StrikePrice"], "0.0000004");
        assert_eq!(params["LowerBarrier"], "-0.0000004");
        assert_eq!(format_decimal(1.5), "1.500000");
    }

    #[test]
    fn test_every_set_field_emitted_once() {
        let instr = Instruction {
            exchange_id: "NYSE".into(),
            keywords: "apple".into(),
            asset_types: vec!["Stock".into()],
            can_participate_in_multi_leg_order: true,
            trading_status: "Tradable".into(),
            field_groups: vec!["Quote".into()],
            class: vec!["Single".into()],
            include_non_tradable: true,
            uics: vec![211],
            uic: 0,
            underlying_uic: 9,
            expiry_dates: "2024-06-21".into(),
            option_space_segment: "AllDates".into(),
            tags: vec!["x".into()],
            amount: 1.5,
            amount_type: "Quantity".into(),
            forward_date: "2024-07-01".into(),
            forward_date_far_leg: "2024-08-01".into(),
            forward_date_near_leg: "2024-07-01".into(),
            lower_barrier: 1.0,
            upper_barrier: 2.0,
            order_bid_price: 3.0,
            order_ask_price: 4.0,
            put_call: "Call".into(),
            strike_price: 5.0,
            quote_currency: "USD".into(),
            to_open_close: "ToOpen".into(),
        };
        let params = instr.project();
        assert_eq!(params.len(), 26);
        assert_eq!(params["IncludeNonTradable"], "true");
        assert_eq!(params["UnderlyingUic"], "9");
        assert_eq!(params["OrderAskPrice"], "4.000000");
    }

    #[test]
    fn test_false_flags_omitted() {
        let instr = Instruction {
            keywords: "x".into(),
            include_non_tradable: false,
            ..Default::default()
        };
        assert!(!instr.project().contains_key("IncludeNonTradable"));
    }

    #[test]
    fn test_deserializes_from_broker_style_json() {
        let instr: Instruction =
            serde_json::from_str(r#"{"AssetTypes":["FxSpot"],"Keywords":"EUR","Uic":21}"#).unwrap();
        assert_eq!(instr.asset_types, vec!["FxSpot"]);
        assert_eq!(instr.uic, 21);
        assert!(instr.tags.is_empty());
    }
}
