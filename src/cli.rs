use clap::{Parser, Subcommand, ValueEnum};

use crate::book::Book;
use crate::errors::LogInitError;
use crate::types::{OrderType, Side};

/// Simple CLI to interact with the Order Book
#[derive(Parser)]
#[command(name = "Order Book CLI")]
#[command(version = "0.1", about = "A demo of a limit order book engine")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory to write the trade log into.
    #[arg(long, default_value = "logs")]
    log_dir: std::path::PathBuf,
}

#[derive(Copy, Clone, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for Side {
    fn from(s: SideArg) -> Self {
        match s {
            SideArg::Buy => Side::Buy,
            SideArg::Sell => Side::Sell,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum OrderTypeArg {
    Gtc,
    Gfd,
    Fok,
    Fak,
    Market,
}

impl From<OrderTypeArg> for OrderType {
    fn from(t: OrderTypeArg) -> Self {
        match t {
            OrderTypeArg::Gtc => OrderType::GoodTilCancel,
            OrderTypeArg::Gfd => OrderType::GoodForDay,
            OrderTypeArg::Fok => OrderType::FillOrKill,
            OrderTypeArg::Fak => OrderType::FillAndKill,
            OrderTypeArg::Market => OrderType::Market,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new order.
    Add {
        side: SideArg,
        order_type: OrderTypeArg,
        /// Ignored for `market` orders.
        price: u32,
        quantity: u32,
    },
    /// Cancel a resting order by id.
    Cancel { id: u64 },
    /// Display the current order book.
    Book,
    /// Cancel every resting order.
    Flush,
}

fn print_order_book(book: &Book) {
    let infos = book.level_infos();
    println!("------ Order Book ------");
    println!("Bids (highest first):");
    for level in &infos.bids {
        println!("Price: {}, Total Qty: {}", level.price, level.quantity);
    }
    println!("Asks (lowest first):");
    for level in &infos.asks {
        println!("Price: {}, Total Qty: {}", level.price, level.quantity);
    }
    println!("--------------------------");
}

fn open_log_sink(log_dir: &std::path::Path) -> Result<std::fs::File, LogInitError> {
    std::fs::create_dir_all(log_dir)?;
    if !log_dir.is_dir() {
        return Err(LogInitError::NotADirectory(log_dir.display().to_string()));
    }
    let log_path = log_dir.join("orderbook.log");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(LogInitError::Io)
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let sink = open_log_sink(&cli.log_dir)?;
    let mut book = Book::new(sink);

    match cli.command {
        Commands::Add {
            side,
            order_type,
            price,
            quantity,
        } => {
            let trades = book.submit(side.into(), price, quantity, order_type.into());
            if trades.is_empty() {
                println!("No trades occurred.");
            } else {
                println!("Trades generated:");
                for t in &trades {
                    println!(
                        "bid={} ask={} price={} qty={}",
                        t.bid.order_id, t.ask.order_id, t.ask.price, t.ask.quantity
                    );
                }
            }
        }
        Commands::Cancel { id } => match book.cancel(id) {
            Ok(()) => println!("Cancelled order {id}"),
            Err(e) => println!("{e}"),
        },
        Commands::Book => print_order_book(&book),
        Commands::Flush => {
            book.flush();
            println!("Book flushed.");
        }
    }
    Ok(())
}
