use criterion::{Criterion, criterion_group, criterion_main};
use order_book_engine::{Book, OrderType, Side};

/// Builds a book with `depth` resting bid levels below `depth` resting ask
/// levels (non-overlapping, so nothing crosses while the book is built) and
/// `orders_per_level` orders of size 1 at each.
fn setup_book(depth: u32, orders_per_level: u32) -> Book {
    let mut book = Book::new(std::io::sink());
    for price in 1..=depth {
        for _ in 0..orders_per_level {
            book.submit(Side::Buy, price, 1, OrderType::GoodTilCancel);
        }
    }
    for price in (depth + 1)..=(2 * depth) {
        for _ in 0..orders_per_level {
            book.submit(Side::Sell, price, 1, OrderType::GoodTilCancel);
        }
    }
    book
}

fn bench_match_order(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;

    c.bench_function("market order crossing half the ask side", |b| {
        b.iter_batched(
            || setup_book(depth, orders_per_level),
            |mut book| {
                book.submit(
                    Side::Buy,
                    0,
                    depth * orders_per_level / 2,
                    OrderType::Market,
                );
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("limit order crossing multiple bid levels", |b| {
        b.iter_batched(
            || setup_book(depth, orders_per_level),
            |mut book| {
                book.submit(
                    Side::Sell,
                    depth / 2,
                    depth * orders_per_level,
                    OrderType::GoodTilCancel,
                );
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("cancel a resting order in a deep book", |b| {
        b.iter_batched(
            || setup_book(depth, orders_per_level),
            |mut book| {
                let _ = book.cancel(1);
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_match_order);
criterion_main!(benches);
