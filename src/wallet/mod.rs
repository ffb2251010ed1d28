//! Wallet domain module
//!
//! Balances and the append-only transaction ledger that refund credits
//! land in.

mod model;
mod service;

pub use model::*;
pub use service::WalletService;
