//! Asynchronous trade-log pipeline.
//!
//! The matching thread (producer) pushes [`LogEntry`] values into a bounded
//! [`ring::Ring`]; a dedicated background thread (the consumer) drains it,
//! formats entries, and writes them to a sink. The producer never performs
//! I/O and never blocks.

mod ring;

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use ring::Ring;
use tracing::error;

use crate::trade::Trade;
use crate::types::{OrderId, SimTick};

const RING_CAPACITY: usize = 8192;
const MESSAGE_MAX: usize = 127;

/// How many consecutive empty pops the consumer spins through before
/// yielding to the scheduler.
const CONSUMER_SPIN_BUDGET: u32 = 256;

#[derive(Clone, Copy, Debug)]
pub enum LogEntry {
    Trade {
        tick: SimTick,
        bid_id: OrderId,
        ask_id: OrderId,
        price: u32,
        qty: u32,
    },
    Message {
        tick: SimTick,
        len: u8,
        text: [u8; MESSAGE_MAX + 1],
    },
    Error {
        tick: SimTick,
        order_id: OrderId,
    },
}

impl Default for LogEntry {
    fn default() -> Self {
        LogEntry::Message {
            tick: 0,
            len: 0,
            text: [0u8; MESSAGE_MAX + 1],
        }
    }
}

fn write_entry<W: Write>(sink: &mut W, entry: &LogEntry) -> SimTick {
    match *entry {
        LogEntry::Trade {
            tick,
            bid_id,
            ask_id,
            price,
            qty,
        } => {
            if let Err(e) = writeln!(sink, "{tick} | {bid_id} | {ask_id} | {price} | {qty}") {
                error!(tick, bid_id, ask_id, %e, "failed to write trade log entry");
            }
            tick
        }
        LogEntry::Message { tick, len, text } => {
            let msg = std::str::from_utf8(&text[..len as usize]).unwrap_or("<invalid utf8>");
            let result = writeln!(
                sink,
                "\n-----------------------------------------------------------\n{tick} | MESSAGE:\n{msg}\n-----------------------------------------------------------\n"
            );
            if let Err(e) = result {
                error!(tick, %e, "failed to write log message entry");
            }
            tick
        }
        LogEntry::Error { tick, order_id } => {
            if let Err(e) = writeln!(sink, "Error with order: {order_id}") {
                error!(tick, order_id, %e, "failed to write error log entry");
            }
            tick
        }
    }
}

/// Owns the producer half of the trade-log ring plus the consumer
/// thread's shutdown flag and join handle.
///
/// Constructed once per [`crate::book::Book`] (or shared across several,
/// if a caller wants one log for multiple books) — never global state.
pub struct Logger {
    ring: Arc<Ring<LogEntry, RING_CAPACITY>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Logger {
    /// Spawns the consumer thread, which owns `sink` exclusively from this
    /// point on.
    pub fn new<W: Write + Send + 'static>(mut sink: W) -> Self {
        let ring: Arc<Ring<LogEntry, RING_CAPACITY>> = Arc::new(Ring::new());
        let stop = Arc::new(AtomicBool::new(false));

        let consumer_ring = ring.clone();
        let consumer_stop = stop.clone();
        let handle = thread::spawn(move || {
            let mut last_tick: SimTick = 0;
            let mut idle_spins = 0u32;
            loop {
                match consumer_ring.pop() {
                    Some(entry) => {
                        idle_spins = 0;
                        last_tick = write_entry(&mut sink, &entry);
                    }
                    None => {
                        if consumer_stop.load(Ordering::Acquire) {
                            break;
                        }
                        if idle_spins < CONSUMER_SPIN_BUDGET {
                            std::hint::spin_loop();
                            idle_spins += 1;
                        } else {
                            thread::yield_now();
                        }
                    }
                }
            }
            // One final drain: entries pushed between the producer's last
            // write and the consumer observing `stop` must not be lost.
            while let Some(entry) = consumer_ring.pop() {
                last_tick = write_entry(&mut sink, &entry);
            }
            let _ = writeln!(sink, "End logger");
            let _ = writeln!(sink, "Tick: {last_tick}");
            let _ = sink.flush();
        });

        Self {
            ring,
            stop,
            handle: Some(handle),
        }
    }

    fn push(&self, entry: LogEntry) {
        let mut idle_spins = 0u32;
        while !self.ring.push(entry) {
            if idle_spins < CONSUMER_SPIN_BUDGET {
                std::hint::spin_loop();
                idle_spins += 1;
            } else {
                thread::yield_now();
            }
        }
    }

    pub fn log_trade(&self, tick: SimTick, trade: &Trade) {
        self.push(LogEntry::Trade {
            tick,
            bid_id: trade.bid.order_id,
            ask_id: trade.ask.order_id,
            price: trade.ask.price,
            qty: trade.ask.quantity,
        });
    }

    pub fn log_message(&self, tick: SimTick, text: &str) {
        let mut buf = [0u8; MESSAGE_MAX + 1];
        let bytes = text.as_bytes();
        let n = bytes.len().min(MESSAGE_MAX);
        buf[..n].copy_from_slice(&bytes[..n]);
        self.push(LogEntry::Message {
            tick,
            len: n as u8,
            text: buf,
        });
    }

    pub fn log_error(&self, tick: SimTick, order_id: OrderId) {
        self.push(LogEntry::Error { tick, order_id });
    }

    /// Requests the consumer to drain, flush, and stop; blocks until it
    /// has exited. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}
