//! Ordering system for BOJO Restaurant: cart, checkout, order tracking,
//! the admin console, and the order sync API.
//!
//! Orders live in two places. Each installation keeps a local SQLite
//! mirror ([`local_store`]); the `bojo-server` binary serves the shared
//! `orders.json` collection over the four-route API in [`server`].
//! [`sync::SyncedStore`] ties the two together with remote-first reads and
//! local-first writes.

use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod db;
pub mod error;
pub mod file_store;
pub mod local_store;
pub mod order;
pub mod receipt;
pub mod remote;
pub mod server;
pub mod status;
pub mod store;
pub mod sync;
pub mod track;

pub use error::{Error, Result};
pub use order::Order;
pub use status::OrderStatus;
pub use store::OrderStore;

/// Initialize structured logging: console plus a daily rolling file in
/// `log_dir`. Call once at process start.
pub fn init_logging(log_dir: &Path) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bojo_ordering=debug"));

    std::fs::create_dir_all(log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(log_dir, "bojo");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let console_layer = fmt::layer().with_target(true);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    // Keep the guard alive for the lifetime of the process — dropping it
    // flushes logs. Leaked intentionally since we run until exit.
    std::mem::forget(guard);
}
