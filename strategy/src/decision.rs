use derive_more::From;
use rust_decimal::Decimal;
use vantage_instrument::{Symbol, VenueId};

/// What a strategy wants the engine to do in response to one `analyze`
/// call. `buy`/`sell` without a `price` become market orders; with one,
/// limit orders.
#[derive(Debug, Clone, PartialEq, From)]
pub enum Decision {
    Hold,
    #[from(skip)]
    Buy(OrderIntent),
    Sell(OrderIntent),
    Cancel(CancelIntent),
    Update(UpdateIntent),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderIntent {
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub trade_mode: Option<String>,
    pub leverage: Option<Decimal>,
    pub client_order_id: Option<String>,
    pub reason: Option<String>,
    pub confidence: Option<Decimal>,
    pub symbol: Option<Symbol>,
    pub venue: Option<VenueId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancelIntent {
    pub order_id: Option<String>,
    pub client_order_id: Option<String>,
    pub symbol: Option<Symbol>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateIntent {
    pub client_order_id: String,
    pub new_client_order_id: Option<String>,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub symbol: Option<Symbol>,
    pub reason: Option<String>,
}
