//! Fixed-width primitive types shared across the matching core.

/// Unique identifier for an order, assigned monotonically by the book.
pub type OrderId = u64;

/// A discrete tick count; there is no fractional price representation.
pub type Price = u32;

/// Order size, in whatever unit the instrument trades.
pub type Quantity = u32;

/// Monotonic simulation timestamp attached to log entries.
pub type SimTick = u64;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side, used when walking the book to match an order.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Time-in-force policy for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    /// Rests until explicitly cancelled.
    GoodTilCancel,
    /// Rests until end of session (session boundary is external; see TODO in `Book`).
    GoodForDay,
    /// Must be fully fillable immediately, else rejected whole and never rested.
    FillOrKill,
    /// Fills as much as possible immediately; any remainder is discarded, never rested.
    FillAndKill,
    /// Crosses at any price; modeled as a `FillAndKill` limit at the most permissive price.
    Market,
}
