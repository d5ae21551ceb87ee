use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::errors::CancelError;
use crate::level::{Level, Slot};
use crate::logging::Logger;
use crate::order::Order;
use crate::trade::{Trade, TradeSide, Trades};
use crate::types::{OrderId, OrderType, Price, Quantity, Side, SimTick};

/// Where a live order sits: which side's map, which price level, and
/// which slot within that level's arena. Lets `remove` splice an order
/// out in O(1) instead of scanning its level for it.
type Locator = (Side, Price, Slot);

/// Aggregated view of one price level, as returned by [`Book::level_infos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
}

/// Snapshot of both sides of the book: bids descending, asks ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelInfos {
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
}

/// How much simulated time passes per `submit` call, mirroring the
/// source's practice of ticking the logger clock on every operation.
const TICK_STEP: SimTick = 1000;

/// A single-instrument, single-threaded limit order book.
///
/// `Book` is the sole owner of every resting [`Order`] and [`Level`]. The
/// `index` map gives `cancel` an O(1) locator for an order's side, price,
/// and slot, so removal never scans a level.
pub struct Book {
    bids: BTreeMap<Price, Level>,
    asks: BTreeMap<Price, Level>,
    index: HashMap<OrderId, Locator>,
    next_id: OrderId,
    tick: SimTick,
    logger: Logger,
}

impl Book {
    /// Constructs an empty book, spawning the trade-log consumer thread
    /// over `sink`.
    pub fn new<W: std::io::Write + Send + 'static>(sink: W) -> Self {
        let logger = Logger::new(sink);
        logger.log_message(0, "orderbook initialized");
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 1,
            tick: 0,
            logger,
        }
    }

    fn advance_tick(&mut self) -> SimTick {
        self.tick += TICK_STEP;
        self.tick
    }

    fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<Price, Level> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn levels(&self, side: Side) -> &BTreeMap<Price, Level> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Count of resting orders across both sides.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Side-effect-free check used by `FillOrKill` pre-checks and in-match
    /// pruning: can an order of `qty` on `side` at `price` be fully filled
    /// right now?
    pub fn can_fully_fill(&self, side: Side, price: Price, qty: Quantity) -> bool {
        let opposite = self.levels(side.opposite());
        let mut running: u64 = 0;
        let levels_in_range: Box<dyn Iterator<Item = (&Price, &Level)>> = match side {
            Side::Buy => Box::new(opposite.iter().take_while(move |entry| *entry.0 <= price)),
            Side::Sell => Box::new(
                opposite
                    .iter()
                    .rev()
                    .take_while(move |entry| *entry.0 >= price),
            ),
        };
        for (_, level) in levels_in_range {
            running += level.total_quantity() as u64;
            if running >= qty as u64 {
                return true;
            }
        }
        false
    }

    fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.bids.keys().next_back().copied(),
            Side::Sell => self.asks.keys().next().copied(),
        }
    }

    fn insert(&mut self, order: Order) {
        let side = order.side;
        let price = order.price;
        let id = order.id;
        let slot = self.levels_mut(side).entry(price).or_default().push_back(order);
        self.index.insert(id, (side, price, slot));
    }

    /// Splices the order out of its level via its stored slot — no scan —
    /// erasing the level if it becomes empty, and drops the `index`
    /// entry. Returns the removed order.
    fn remove(&mut self, side: Side, price: Price, id: OrderId) -> Option<Order> {
        let slot = self.index.get(&id)?.2;
        let levels = self.levels_mut(side);
        let level = levels.get_mut(&price)?;
        let removed = level.remove(slot);
        if removed.is_some() {
            if level.is_empty() {
                levels.remove(&price);
            }
            self.index.remove(&id);
        }
        removed
    }

    /// Cancels the order identified by `id`.
    pub fn cancel(&mut self, id: OrderId) -> Result<(), CancelError> {
        let Some(&(side, price, _)) = self.index.get(&id) else {
            self.logger.log_error(self.tick, id);
            return Err(CancelError::NotFound(id));
        };
        self.remove(side, price, id);
        Ok(())
    }

    /// Cancels every resting order.
    pub fn flush(&mut self) {
        let tick = self.advance_tick();
        self.logger.log_message(tick, "flushing orderbook");
        let ids: Vec<OrderId> = self.index.keys().copied().collect();
        for id in ids {
            let _ = self.cancel(id);
        }
    }

    /// Snapshot of aggregated quantity per price level, bids descending,
    /// asks ascending.
    pub fn level_infos(&self) -> LevelInfos {
        let bids = self
            .bids
            .iter()
            .rev()
            .map(|(&price, level)| LevelInfo {
                price,
                quantity: level.total_quantity(),
            })
            .collect();
        let asks = self
            .asks
            .iter()
            .map(|(&price, level)| LevelInfo {
                price,
                quantity: level.total_quantity(),
            })
            .collect();
        LevelInfos { bids, asks }
    }

    /// Submits a new order, applying its time-in-force policy, and
    /// returns whatever trades it produced.
    // TODO: GoodForDay orders currently rest indefinitely, same as
    // GoodTilCancel. There is no session clock to expire them against.
    pub fn submit(&mut self, side: Side, price: Price, qty: Quantity, order_type: OrderType) -> Trades {
        let (price, order_type) = match order_type {
            OrderType::Market => {
                let permissive = match side {
                    Side::Buy => Price::MAX,
                    Side::Sell => 0,
                };
                (permissive, OrderType::FillAndKill)
            }
            other => (price, other),
        };

        let id = self.next_id;
        self.next_id += 1;
        let tick = self.advance_tick();

        if order_type == OrderType::FillOrKill && !self.can_fully_fill(side, price, qty) {
            info!(id, ?side, price, qty, "fill-or-kill rejected: insufficient liquidity");
            return Vec::new();
        }

        self.insert(Order::new(id, side, price, qty, order_type));

        let mut trades = Vec::with_capacity(self.len());
        self.match_book(tick, &mut trades);

        if order_type == OrderType::FillAndKill {
            if let Some(&(s, p, _)) = self.index.get(&id) {
                self.remove(s, p, id);
            }
        }

        trades
    }

    /// Repeatedly crosses the best bid against the best ask, mutating the
    /// book and appending to `trades` in lock-step. Entry invariant: the
    /// book is settled (no crossing pair) on entry, aside from whatever
    /// order was just inserted by the caller.
    fn match_book(&mut self, tick: SimTick, trades: &mut Trades) {
        loop {
            let (Some(bid_price), Some(ask_price)) =
                (self.best_price(Side::Buy), self.best_price(Side::Sell))
            else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            // FillOrKill pruning at the head of either side.
            if self.prune_unfillable_head(Side::Buy, bid_price) {
                continue;
            }
            if self.prune_unfillable_head(Side::Sell, ask_price) {
                continue;
            }

            let (bid_id, bid_remaining) = {
                let bid = self.bids.get(&bid_price).and_then(Level::front).unwrap();
                (bid.id, bid.remaining_qty)
            };
            let (ask_id, ask_remaining) = {
                let ask = self.asks.get(&ask_price).and_then(Level::front).unwrap();
                (ask.id, ask.remaining_qty)
            };

            let qty = bid_remaining.min(ask_remaining);

            self.bids.get_mut(&bid_price).and_then(Level::front_mut).unwrap().fill(qty);
            self.asks.get_mut(&ask_price).and_then(Level::front_mut).unwrap().fill(qty);

            let bid_filled = self.bids.get(&bid_price).and_then(Level::front).unwrap().is_filled();
            if bid_filled {
                self.remove(Side::Buy, bid_price, bid_id);
            }
            let ask_filled = self.asks.get(&ask_price).and_then(Level::front).unwrap().is_filled();
            if ask_filled {
                self.remove(Side::Sell, ask_price, ask_id);
            }

            let trade = Trade {
                bid: TradeSide {
                    order_id: bid_id,
                    price: ask_price,
                    quantity: qty,
                },
                ask: TradeSide {
                    order_id: ask_id,
                    price: ask_price,
                    quantity: qty,
                },
            };
            self.logger.log_trade(tick, &trade);
            trades.push(trade);
        }
    }

    /// If the resting head on `side` at `price` is `FillOrKill` and can no
    /// longer be fully filled, removes it and returns `true` so the
    /// caller re-evaluates the book from scratch.
    fn prune_unfillable_head(&mut self, side: Side, price: Price) -> bool {
        let Some((id, order_type, remaining)) = self
            .levels(side)
            .get(&price)
            .and_then(Level::front)
            .map(|o| (o.id, o.order_type, o.remaining_qty))
        else {
            return false;
        };
        if order_type != OrderType::FillOrKill {
            return false;
        }
        if self.can_fully_fill(side, price, remaining) {
            return false;
        }
        warn!(id, ?side, price, "pruning unfillable fill-or-kill head");
        self.remove(side, price, id);
        true
    }
}
