//! Typed response schemas.
//!
//! Field names follow the gateway's PascalCase JSON. Every struct defaults
//! missing fields so that additions on the broker side never break decoding,
//! and unknown fields are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Envelope of every list-returning endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(rename = "Data", default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

/// The broker's error document, carried in the body of a rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ErrorBody {
    pub error_code: String,
    pub message: String,
    pub model_state: HashMap<String, Vec<String>>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    pub active: bool,
    pub client_key: String,
    pub culture: String,
    pub language: String,
    pub last_login_time: String,
    pub last_login_status: String,
    pub legal_asset_types: Vec<String>,
    pub market_data_via_open_api_terms_accepted: bool,
    pub name: String,
    pub timezone_id: i64,
    pub user_id: String,
    pub user_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClientProfile {
    pub account_value_protection_limit: f64,
    pub allowed_netting_profiles: Vec<String>,
    pub allowed_trading_sessions: String,
    pub client_id: String,
    pub client_key: String,
    pub client_type: String,
    pub currency_decimals: i64,
    pub default_account_key: String,
    pub default_account_id: String,
    pub default_currency: String,
    pub force_open_default_value: bool,
    pub is_margin_trading_allowed: bool,
    pub is_variation_margin_eligible: bool,
    pub legal_asset_types: Vec<String>,
    pub legal_asset_types_are_indicative: bool,
    pub margin_calculation_method: String,
    pub margin_monitoring_mode: String,
    pub name: String,
    pub partner_platform_id: String,
    pub position_netting_method: String,
    pub position_netting_mode: String,
    pub position_netting_profile: String,
    pub reduce_exposure_only: bool,
    pub supports_account_value_protection_limit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Account {
    pub account_id: String,
    pub account_key: String,
    pub account_group_key: String,
    pub account_name: String,
    pub account_type: String,
    pub account_sub_type: String,
    pub account_value_protection_limit: f64,
    pub account_value_protection_limit_currency: String,
    pub active: bool,
    pub can_use_cash_positions_as_margin_collateral: bool,
    pub cfd_borrowing_costs_active: bool,
    pub client_id: String,
    pub client_key: String,
    pub creation_date: String,
    pub currency: String,
    pub currency_decimals: i64,
    pub direct_market_access: bool,
    pub fractional_order_enabled: bool,
    pub fractional_order_enabled_asset_types: Vec<String>,
    pub individual_margining: bool,
    pub is_currency_conversion_at_settlement_time: bool,
    pub is_margin_trading_allowed: bool,
    pub is_shareable: bool,
    pub is_trial_account: bool,
    pub legal_asset_types: Vec<String>,
    pub management_type: String,
    pub margin_calculation_method: String,
    pub margin_lending_enabled: String,
    pub portfolio_based_margin_enabled: bool,
    pub sharing: Vec<String>,
    pub supports_account_value_protection_limit: bool,
    pub use_cash_positions_as_margin_collateral: bool,
}

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreditLine {
    pub line: f64,
    pub utilization_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InitialMargin {
    pub collateral_available: f64,
    pub collateral_credit_value: CreditLine,
    pub margin_available: f64,
    pub margin_collateral_not_available: f64,
    pub margin_used_by_current_positions: f64,
    pub margin_utilization_pct: f64,
    pub net_equity_for_margin: f64,
    pub other_collateral_deduction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Balance {
    pub calculation_reliability: String,
    pub cash_available_for_trading: f64,
    pub cash_balance: f64,
    pub cash_blocked: f64,
    pub changes_scheduled: bool,
    pub closed_positions_count: i64,
    pub collateral_available: f64,
    pub collateral_credit_value: CreditLine,
    pub corporate_action_unrealized_amounts: f64,
    pub cost_to_close_positions: f64,
    pub currency: String,
    pub currency_decimals: i64,
    pub initial_margin: InitialMargin,
    pub is_portfolio_margin_model_simple: bool,
    pub margin_and_collateral_utilization_pct: f64,
    pub margin_available_for_trading: f64,
    pub margin_collateral_not_available: f64,
    pub margin_exposure_coverage_pct: f64,
    pub margin_net_exposure: f64,
    pub margin_used_by_current_positions: f64,
    pub margin_utilization_pct: f64,
    pub net_equity_for_margin: f64,
    pub net_positions_count: i64,
    pub non_margin_positions_value: f64,
    pub open_ipo_orders_count: i64,
    pub open_positions_count: i64,
    pub option_premiums_market_value: f64,
    pub orders_count: i64,
    pub other_collateral: f64,
    pub settlement_value: f64,
    pub spending_power_detail: HashMap<String, serde_json::Value>,
    pub total_value: f64,
    pub transactions_not_booked: f64,
    pub trigger_orders_count: i64,
    pub unrealized_margin_closed_profit_loss: f64,
    pub unrealized_margin_open_profit_loss: f64,
    pub unrealized_margin_profit_loss: f64,
    pub unrealized_positions_value: f64,
}

// ---------------------------------------------------------------------------
// Reference data and prices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InstrumentSummary {
    pub asset_type: String,
    pub currency_code: String,
    pub exchange_id: String,
    pub description: String,
    pub group_id: i64,
    pub identifier: u64,
    pub primary_listing: u64,
    pub summary_type: String,
    pub issuer_country: String,
    pub symbol: String,
    pub tradable_as: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Exchange {
    pub exchange_id: String,
    pub name: String,
    pub description: String,
    pub country_code: String,
    pub is_open: bool,
    pub timezone_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PriceFormat {
    pub decimals: i64,
    pub order_decimals: i64,
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderDistances {
    pub entry_default_distance: f64,
    pub entry_default_distance_type: String,
    pub limit_default_distance: f64,
    pub limit_default_distance_type: String,
    pub stop_limit_default_distance: f64,
    pub stop_limit_default_distance_type: String,
    pub stop_loss_default_distance: f64,
    pub stop_loss_default_distance_type: String,
    pub stop_loss_default_order_type: String,
    pub take_profit_default_distance: f64,
    pub take_profit_default_distance_type: String,
    pub take_profit_default_order_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InstrumentDetails {
    pub asset_type: String,
    pub amount_decimals: i64,
    pub currency_code: String,
    pub default_amount: f64,
    pub default_slippage: f64,
    pub default_slippage_type: String,
    pub description: String,
    pub exchange: Exchange,
    pub format: PriceFormat,
    pub fx_forward_max_forward_date: String,
    pub fx_forward_min_forward_date: String,
    pub group_id: i64,
    pub increment_size: f64,
    pub is_redemption_by_amounts: bool,
    pub is_tradable: bool,
    pub non_tradable_reason: String,
    pub order_distances: OrderDistances,
    pub standard_amounts: Vec<f64>,
    pub supported_order_types: Vec<String>,
    pub symbol: String,
    pub tick_size: f64,
    pub tradable_as: Vec<String>,
    pub tradable_on: Vec<String>,
    pub trading_signals: String,
    pub trading_status: String,
    pub uic: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Quote {
    pub ask: f64,
    pub ask_size: f64,
    pub bid: f64,
    pub bid_size: f64,
    pub amount: f64,
    pub delayed_by_minutes: f64,
    pub error_code: String,
    pub market_state: String,
    pub mid: f64,
    pub price_source: String,
    pub price_source_type: String,
    pub price_type_ask: String,
    pub price_type_bid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DisplayAndFormat {
    pub format: String,
    pub currency: String,
    pub decimals: i64,
    pub description: String,
    pub order_decimals: i64,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InfoPrice {
    pub asset_type: String,
    pub last_updated: String,
    pub price_source: String,
    pub quote: Quote,
    pub display_and_format: DisplayAndFormat,
    pub uic: u64,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderDuration {
    pub duration_type: String,
}

/// Body of an order placement or replacement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderInstruction {
    pub uic: u64,
    pub buy_sell: String,
    pub asset_type: String,
    pub amount: f64,
    pub order_price: f64,
    pub order_type: String,
    pub order_duration: OrderDuration,
    pub manual_order: bool,
    pub account_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub order_id: String,
}

/// What the gateway returns for an accepted placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderReceipt {
    pub order_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Order {
    pub account_id: String,
    pub account_key: String,
    pub advice_note: String,
    pub amount: f64,
    pub ask: f64,
    pub asset_type: String,
    pub bid: f64,
    pub buy_sell: String,
    pub calculation_reliability: String,
    pub client_id: String,
    pub client_key: String,
    pub client_name: String,
    pub client_note: String,
    pub correlation_key: String,
    pub current_price: f64,
    pub current_price_delay_minutes: f64,
    pub current_price_type: String,
    pub display_and_format: DisplayAndFormat,
    pub distance_to_market: f64,
    pub duration: OrderDuration,
    pub exchange: Exchange,
    pub ipo_subscription_fee: f64,
    pub is_extended_hours_enabled: bool,
    pub is_force_open: bool,
    pub is_market_open: bool,
    pub market_price: f64,
    pub market_state: String,
    pub market_value: f64,
    pub non_tradable_reason: String,
    pub open_order_type: String,
    pub order_amount_type: String,
    pub order_id: String,
    pub order_relation: String,
    pub order_time: String,
    pub price: f64,
    pub related_open_orders: Vec<String>,
    pub status: String,
    pub trading_status: String,
    pub uic: u64,
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PositionBase {
    pub amount: f64,
    pub account_id: String,
    pub account_key: String,
    pub asset_type: String,
    pub can_be_closed: bool,
    pub client_id: String,
    pub close_conversion_rate_settled: bool,
    pub correlation_key: String,
    pub execution_open_time: String,
    pub is_force_open: bool,
    pub is_market_open: bool,
    pub locked_by_back_office: bool,
    pub open_price: f64,
    pub open_price_including_costs: f64,
    pub related_open_orders: Vec<serde_json::Value>,
    pub source_order_id: String,
    pub spot_date: String,
    pub status: String,
    pub uic: u64,
    pub value_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PositionView {
    pub ask: f64,
    pub bid: f64,
    pub calculation_reliability: String,
    pub conversion_rate_current: f64,
    pub conversion_rate_open: f64,
    pub current_price: f64,
    pub current_price_delay_minutes: f64,
    pub current_price_type: String,
    pub exposure: f64,
    pub exposure_currency: String,
    pub exposure_in_base_currency: f64,
    pub instrument_price_day_percent_change: f64,
    pub market_state: String,
    pub market_value: f64,
    pub market_value_in_base_currency: f64,
    pub profit_loss_on_trade: f64,
    pub profit_loss_on_trade_in_base_currency: f64,
    pub trade_costs_total: f64,
    pub trade_costs_total_in_base_currency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Position {
    pub display_and_format: DisplayAndFormat,
    pub net_position_id: String,
    pub position_base: PositionBase,
    pub position_id: String,
    pub position_view: PositionView,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetPositionBase {
    pub amount: f64,
    pub account_id: String,
    pub account_key: String,
    pub asset_type: String,
    pub can_be_closed: bool,
    pub client_id: String,
    pub close_conversion_rate_settled: bool,
    pub correlation_key: String,
    pub has_force_open_positions: bool,
    pub is_market_open: bool,
    pub non_tradable_reason: String,
    pub number_of_related_orders: i64,
    pub opening_direction: String,
    pub open_ipo_orders_count: i64,
    pub open_orders_count: i64,
    pub open_trigger_orders_count: i64,
    pub positions_account: String,
    pub single_position_status: String,
    pub uic: u64,
    pub value_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetPositionView {
    pub average_open_price: f64,
    pub average_open_price_including_costs: f64,
    pub calculation_reliability: String,
    pub current_price: f64,
    pub current_price_delay_minutes: f64,
    pub current_price_type: String,
    pub exposure: f64,
    pub exposure_in_base_currency: f64,
    pub instrument_price_day_percent_change: f64,
    pub position_count: i64,
    pub positions_not_closed_count: i64,
    pub profit_loss_on_trade: f64,
    pub status: String,
    pub trade_costs_total: f64,
    pub trade_costs_total_in_base_currency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetPosition {
    pub display_and_format: DisplayAndFormat,
    pub net_position_id: String,
    pub net_position_base: NetPositionBase,
    pub net_position_view: NetPositionView,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::dispatch::decode;

    #[test]
    fn test_paged_accounts() {
        let json = r#"{"Data":[
            {"AccountId":"9226397","AccountKey":"LZTc7DdejXODf-WSl2aCyQ==","Currency":"EUR","Active":true},
            {"AccountId":"9226398","AccountKey":"k2","Currency":"USD","Sharing":["x"]}
        ]}"#;
        let page: Paged<Account> = decode(json.as_bytes()).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].account_key, "LZTc7DdejXODf-WSl2aCyQ==");
        assert!(page.data[0].active);
        assert_eq!(page.data[1].sharing, vec!["x"]);
    }

    #[test]
    fn test_paged_missing_data_is_empty() {
        let page: Paged<Order> = decode(br#"{"__count":0}"#).unwrap();
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_balance_nested_blocks() {
        let json = r#"{
            "CashBalance": 1000.5,
            "Currency": "EUR",
            "InitialMargin": {"MarginAvailable": 900.0, "CollateralCreditValue": {"Line": 5.0}},
            "CollateralCreditValue": {"UtilizationPct": 12.5},
            "SpendingPowerDetail": {"Current": 10}
        }"#;
        let balance: Balance = decode(json.as_bytes()).unwrap();
        assert_eq!(balance.cash_balance, 1000.5);
        assert_eq!(balance.initial_margin.margin_available, 900.0);
        assert_eq!(balance.initial_margin.collateral_credit_value.line, 5.0);
        assert_eq!(balance.collateral_credit_value.utilization_pct, 12.5);
        assert_eq!(balance.spending_power_detail["Current"], 10);
    }

    #[test]
    fn test_info_price_quote() {
        let json = r#"{"Data":[{"Uic":21,"AssetType":"FxSpot",
            "Quote":{"Ask":1.0865,"Bid":1.0863,"Mid":1.0864,"MarketState":"Open"},
            "DisplayAndFormat":{"Currency":"USD","Decimals":4,"Symbol":"EURUSD"}}]}"#;
        let page: Paged<InfoPrice> = decode(json.as_bytes()).unwrap();
        let price = &page.data[0];
        assert_eq!(price.uic, 21);
        assert_eq!(price.quote.ask, 1.0865);
        assert_eq!(price.display_and_format.symbol, "EURUSD");
    }

    #[test]
    fn test_order_instruction_wire_names() {
        let instr = OrderInstruction {
            uic: 21,
            buy_sell: "Buy".into(),
            asset_type: "FxSpot".into(),
            amount: 10000.0,
            order_price: 1.08,
            order_type: "Limit".into(),
            order_duration: OrderDuration {
                duration_type: "DayOrder".into(),
            },
            manual_order: true,
            account_key: "A1".into(),
            order_id: String::new(),
        };
        let json = serde_json::to_value(&instr).unwrap();
        assert_eq!(json["BuySell"], "Buy");
        assert_eq!(json["OrderDuration"]["DurationType"], "DayOrder");
        assert_eq!(json["AccountKey"], "A1");
        assert!(json.get("OrderId").is_none());
    }

    #[test]
    fn test_error_body_model_state() {
        let json = r#"{"ErrorCode":"InvalidModelState","Message":"bad",
            "ModelState":{"Amount":["must be positive"]}}"#;
        let body: ErrorBody = decode(json.as_bytes()).unwrap();
        assert_eq!(body.model_state["Amount"], vec!["must be positive"]);
    }

    #[test]
    fn test_net_position_nested() {
        let json = r#"{"NetPositionId":"211__Share","NetPositionBase":{"Amount":10,"Uic":211},
            "NetPositionView":{"AverageOpenPrice":171.25,"PositionCount":2}}"#;
        let np: NetPosition = decode(json.as_bytes()).unwrap();
        assert_eq!(np.net_position_base.uic, 211);
        assert_eq!(np.net_position_view.position_count, 2);
    }
}
