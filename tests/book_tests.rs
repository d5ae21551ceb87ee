use order_book_engine::{Book, CancelError, OrderType, Side};

fn new_book() -> Book {
    Book::new(std::io::sink())
}

#[test]
fn empty_cross_produces_one_trade_and_drains_the_book() {
    let mut book = new_book();
    let t1 = book.submit(Side::Sell, 100, 50, OrderType::GoodTilCancel);
    assert!(t1.is_empty());
    let t2 = book.submit(Side::Buy, 100, 50, OrderType::GoodTilCancel);
    assert_eq!(t2.len(), 1);
    assert_eq!(t2[0].bid.order_id, 2);
    assert_eq!(t2[0].ask.order_id, 1);
    assert_eq!(t2[0].ask.price, 100);
    assert_eq!(t2[0].ask.quantity, 50);
    assert_eq!(book.len(), 0);
}

#[test]
fn multi_level_sweep_consumes_best_price_first() {
    let mut book = new_book();
    book.submit(Side::Sell, 100, 30, OrderType::GoodTilCancel);
    book.submit(Side::Sell, 103, 20, OrderType::GoodTilCancel);
    let trades = book.submit(Side::Buy, 105, 40, OrderType::GoodTilCancel);

    assert_eq!(trades.len(), 2);
    assert_eq!((trades[0].ask.price, trades[0].ask.quantity), (100, 30));
    assert_eq!((trades[1].ask.price, trades[1].ask.quantity), (103, 10));

    let infos = book.level_infos();
    assert_eq!(infos.asks.len(), 1);
    assert_eq!(infos.asks[0].price, 103);
    assert_eq!(infos.asks[0].quantity, 10);
    assert_eq!(book.len(), 1);
}

#[test]
fn fifo_within_a_level_preserves_insertion_order() {
    let mut book = new_book();
    for _ in 0..5 {
        book.submit(Side::Buy, 100, 10, OrderType::GoodTilCancel);
    }
    let trades = book.submit(Side::Sell, 100, 50, OrderType::GoodTilCancel);

    assert_eq!(trades.len(), 5);
    let bid_ids: Vec<_> = trades.iter().map(|t| t.bid.order_id).collect();
    assert_eq!(bid_ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(book.len(), 0);
}

#[test]
fn fill_or_kill_rejected_when_liquidity_is_short() {
    let mut book = new_book();
    book.submit(Side::Sell, 100, 30, OrderType::GoodTilCancel);
    let before = book.level_infos();

    let trades = book.submit(Side::Buy, 100, 100, OrderType::FillOrKill);

    assert!(trades.is_empty());
    assert_eq!(book.level_infos().asks, before.asks);
    assert_eq!(book.len(), 1);
}

#[test]
fn fill_or_kill_accepted_when_exactly_fillable() {
    let mut book = new_book();
    for price in 100..110 {
        book.submit(Side::Sell, price, 10, OrderType::GoodTilCancel);
    }
    let trades = book.submit(Side::Buy, 109, 100, OrderType::FillOrKill);

    assert_eq!(trades.len(), 10);
    assert_eq!(book.len(), 0);
}

#[test]
fn level_aggregation_sums_quantity_at_equal_price() {
    let mut book = new_book();
    book.submit(Side::Buy, 100, 10, OrderType::GoodTilCancel);
    book.submit(Side::Buy, 100, 25, OrderType::GoodTilCancel);
    book.submit(Side::Sell, 200, 15, OrderType::GoodTilCancel);

    let infos = book.level_infos();
    assert_eq!(infos.bids.len(), 1);
    assert_eq!(infos.bids[0].price, 100);
    assert_eq!(infos.bids[0].quantity, 35);
    assert_eq!(infos.asks.len(), 1);
    assert_eq!(infos.asks[0].price, 200);
    assert_eq!(infos.asks[0].quantity, 15);
}

#[test]
fn fill_and_kill_never_rests() {
    let mut book = new_book();
    book.submit(Side::Sell, 100, 10, OrderType::GoodTilCancel);
    let trades = book.submit(Side::Buy, 100, 30, OrderType::FillAndKill);

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].ask.quantity, 10);
    assert_eq!(book.len(), 0);
}

#[test]
fn market_order_crosses_regardless_of_resting_price() {
    let mut book = new_book();
    book.submit(Side::Sell, 500, 20, OrderType::GoodTilCancel);
    let trades = book.submit(Side::Buy, 0, 20, OrderType::Market);

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].ask.price, 500);
    assert_eq!(book.len(), 0);
}

#[test]
fn cancel_of_a_non_crossing_order_is_a_true_round_trip() {
    let mut book = new_book();
    book.submit(Side::Sell, 200, 15, OrderType::GoodTilCancel);
    let before = book.level_infos();
    let before_len = book.len();

    book.submit(Side::Buy, 100, 5, OrderType::GoodTilCancel);
    book.cancel(2).unwrap();

    assert_eq!(book.len(), before_len);
    assert_eq!(book.level_infos(), before);
}

#[test]
fn cancel_twice_returns_not_found_on_the_second_call() {
    let mut book = new_book();
    book.submit(Side::Buy, 100, 5, OrderType::GoodTilCancel);

    assert_eq!(book.cancel(1), Ok(()));
    assert_eq!(book.cancel(1), Err(CancelError::NotFound(1)));
}

#[test]
fn flush_empties_the_book_and_is_idempotent() {
    let mut book = new_book();
    book.submit(Side::Buy, 100, 5, OrderType::GoodTilCancel);
    book.submit(Side::Sell, 200, 5, OrderType::GoodTilCancel);

    book.flush();
    assert_eq!(book.len(), 0);
    assert!(book.level_infos().bids.is_empty());
    assert!(book.level_infos().asks.is_empty());

    book.flush();
    assert_eq!(book.len(), 0);
}

#[test]
fn no_resting_cross_survives_a_partial_fill() {
    let mut book = new_book();
    book.submit(Side::Sell, 100, 10, OrderType::GoodTilCancel);
    book.submit(Side::Buy, 100, 4, OrderType::GoodTilCancel);

    let infos = book.level_infos();
    let best_bid = infos.bids.first().map(|l| l.price);
    let best_ask = infos.asks.first().map(|l| l.price);
    if let (Some(bid), Some(ask)) = (best_bid, best_ask) {
        assert!(bid < ask);
    }
    assert_eq!(infos.asks[0].quantity, 6);
}
