use crate::types::{OrderId, Price, Quantity};

/// One side of a [`Trade`]: which order was involved, at what price and
/// quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeSide {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

/// A single execution between a resting bid and a resting ask.
///
/// Both sides always carry the same `price` and `quantity` — the trade
/// prices at the ask-side level regardless of which side was the
/// aggressor (see the execution price policy note in the matching loop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub bid: TradeSide,
    pub ask: TradeSide,
}

pub type Trades = Vec<Trade>;
