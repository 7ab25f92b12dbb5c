//! Typed broker operations.
//!
//! `SaxoClient` keeps the session (base URL, token and the client/account
//! keys it has learned) and runs one dispatch per method, each with a fresh
//! [`RequestContext`]. Calls are awaited one at a time; nothing is cached
//! beyond the two keys.

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::info;

use super::context::RequestContext;
use super::dispatch::{decode, Dispatcher, HttpTransport};
use super::models::{
    Account, Balance, ClientProfile, InfoPrice, InstrumentDetails, InstrumentSummary, NetPosition,
    Order, OrderDuration, OrderInstruction, OrderReceipt, Paged, Position, User,
};
use super::params::Instruction;
use super::Transport;
use crate::types::{Result, SaxoError};

/// Page size requested from the instrument search.
const INSTRUMENT_PAGE_SIZE: &str = "1000";
const DEFAULT_DURATION: &str = "DayOrder";
const DEFAULT_ORDER_TYPE: &str = "Limit";

/// What to trade. Unset duration and order type fall back to a limit day
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSpec {
    pub uic: u64,
    pub asset_type: String,
    pub buy_sell: String,
    pub amount: f64,
    pub price: f64,
    pub duration: Option<String>,
    pub order_type: Option<String>,
}

pub struct SaxoClient<T = HttpTransport> {
    dispatcher: Dispatcher<T>,
    base_url: String,
    token: SecretString,
    client_key: Option<String>,
    account_key: Option<String>,
}

impl SaxoClient<HttpTransport> {
    /// Client over HTTP. `timeout` of `None` leaves requests unbounded.
    pub fn connect(
        base_url: impl Into<String>,
        token: SecretString,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(timeout)?, base_url, token))
    }
}

impl<T: Transport> SaxoClient<T> {
    pub fn with_transport(transport: T, base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            base_url: base_url.into(),
            token,
            client_key: None,
            account_key: None,
        }
    }

    pub fn client_key(&self) -> Option<&str> {
        self.client_key.as_deref()
    }

    pub fn account_key(&self) -> Option<&str> {
        self.account_key.as_deref()
    }

    /// Use a known client key instead of looking it up.
    pub fn set_client_key(&mut self, key: impl Into<String>) {
        self.client_key = Some(key.into());
    }

    pub fn set_account_key(&mut self, key: impl Into<String>) {
        self.account_key = Some(key.into());
    }

    fn context(&self) -> RequestContext {
        RequestContext::new(self.base_url.clone(), self.token.clone())
            .with_client_key(self.client_key.as_deref())
            .with_account_key(self.account_key.as_deref())
    }

    fn require_client_key(&self) -> Result<()> {
        match self.client_key.as_deref() {
            Some(k) if !k.is_empty() => Ok(()),
            _ => Err(SaxoError::MissingKey("client key")),
        }
    }

    fn require_account_key(&self) -> Result<&str> {
        match self.account_key.as_deref() {
            Some(k) if !k.is_empty() => Ok(k),
            _ => Err(SaxoError::MissingKey("account key")),
        }
    }

    async fn fetch<D: DeserializeOwned>(&self, ctx: RequestContext, name: &str) -> Result<D> {
        let payload = self.dispatcher.call(&ctx, name).await?;
        decode(&payload)
    }

    // -- Session ------------------------------------------------------------

    pub async fn user(&self) -> Result<User> {
        self.fetch(self.context(), "user").await
    }

    /// Fetch the client profile and remember its client key.
    pub async fn client(&mut self) -> Result<ClientProfile> {
        let profile: ClientProfile = self.fetch(self.context(), "client").await?;
        if !profile.client_key.is_empty() {
            info!(client_id = %profile.client_id, "Client key learned");
            self.client_key = Some(profile.client_key.clone());
        }
        Ok(profile)
    }

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        let page: Paged<Account> = self.fetch(self.context(), "account").await?;
        Ok(page.data)
    }

    /// Look up the client and its accounts, and remember the default
    /// account's key. Falls back to the first account when the profile names
    /// no default.
    pub async fn select_default_account(&mut self) -> Result<Account> {
        let profile = self.client().await?;
        let mut accounts = self.accounts().await?;
        let idx = accounts
            .iter()
            .position(|a| a.account_key == profile.default_account_key)
            .unwrap_or(0);
        if accounts.is_empty() {
            return Err(SaxoError::MissingKey("account key"));
        }
        let account = accounts.swap_remove(idx);
        info!(account_id = %account.account_id, currency = %account.currency, "Default account selected");
        self.account_key = Some(account.account_key.clone());
        Ok(account)
    }

    pub async fn balance(&self) -> Result<Balance> {
        self.require_client_key()?;
        self.fetch(self.context(), "balance").await
    }

    // -- Reference data -----------------------------------------------------

    /// Instrument search; asks for up to a thousand results.
    pub async fn instruments(&self, instr: &Instruction) -> Result<Vec<InstrumentSummary>> {
        let ctx = self
            .context()
            .params(instr.project())
            .param("$top", INSTRUMENT_PAGE_SIZE);
        let page: Paged<InstrumentSummary> = self.fetch(ctx, "instruments").await?;
        Ok(page.data)
    }

    pub async fn instrument_details(&self, instr: &Instruction) -> Result<Vec<InstrumentDetails>> {
        let ctx = self.context().params(instr.project());
        let page: Paged<InstrumentDetails> = self.fetch(ctx, "instrument_details").await?;
        Ok(page.data)
    }

    pub async fn prices(&self, instr: &Instruction) -> Result<Vec<InfoPrice>> {
        let ctx = self.context().params(instr.project());
        let page: Paged<InfoPrice> = self.fetch(ctx, "prices").await?;
        Ok(page.data)
    }

    // -- Orders -------------------------------------------------------------

    /// Build an order body against the selected account. Sends nothing.
    pub fn make_order(&self, spec: &OrderSpec) -> Result<OrderInstruction> {
        let account_key = self.require_account_key()?;
        Ok(OrderInstruction {
            uic: spec.uic,
            buy_sell: spec.buy_sell.clone(),
            asset_type: spec.asset_type.clone(),
            amount: spec.amount,
            order_price: spec.price,
            order_type: spec
                .order_type
                .clone()
                .unwrap_or_else(|| DEFAULT_ORDER_TYPE.to_string()),
            order_duration: OrderDuration {
                duration_type: spec
                    .duration
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DURATION.to_string()),
            },
            manual_order: true,
            account_key: account_key.to_string(),
            order_id: String::new(),
        })
    }

    pub async fn place_order(&self, order: &OrderInstruction) -> Result<OrderReceipt> {
        self.require_client_key()?;
        let mut ctx = self.context();
        ctx.set_body_object(order)?;
        self.fetch(ctx, "make_order").await
    }

    /// Change an open order; `order.order_id` names it.
    pub async fn replace_order(&self, order: &OrderInstruction) -> Result<OrderReceipt> {
        self.require_client_key()?;
        if order.order_id.is_empty() {
            return Err(SaxoError::MissingParameter("OrderId".to_string()));
        }
        let mut ctx = self.context();
        ctx.set_body_object(order)?;
        self.fetch(ctx, "replace_order").await
    }

    /// Cancel open orders by id. The ids travel in the query string.
    pub async fn cancel_order(&self, order_ids: &[&str]) -> Result<Vec<OrderReceipt>> {
        self.require_client_key()?;
        self.require_account_key()?;
        if order_ids.is_empty() {
            return Err(SaxoError::MissingParameter("OrderIds".to_string()));
        }
        let ctx = self.context().param("OrderIds", order_ids.join(","));
        let payload = self.dispatcher.call(&ctx, "cancel_order").await?;
        let cancelled: CancelledOrders = decode(&payload)?;
        Ok(cancelled.orders)
    }

    pub async fn order_list(&self) -> Result<Vec<Order>> {
        self.require_client_key()?;
        let page: Paged<Order> = self.fetch(self.context(), "order_list").await?;
        Ok(page.data)
    }

    pub async fn order_details(&self, order_id: &str) -> Result<Order> {
        self.require_client_key()?;
        let ctx = self.context().param("OrderId", order_id);
        self.fetch(ctx, "order_details").await
    }

    // -- Portfolio ----------------------------------------------------------

    pub async fn positions(&self) -> Result<Vec<Position>> {
        self.require_client_key()?;
        let page: Paged<Position> = self.fetch(self.context(), "positions").await?;
        Ok(page.data)
    }

    pub async fn net_positions(&self) -> Result<Vec<NetPosition>> {
        self.require_client_key()?;
        let page: Paged<NetPosition> = self.fetch(self.context(), "net_positions").await?;
        Ok(page.data)
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CancelledOrders {
    #[serde(default)]
    orders: Vec<OrderReceipt>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
