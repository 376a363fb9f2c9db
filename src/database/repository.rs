//! Table access, one module per aggregate.
//!
//! Reads take any `PgExecutor` so they work on the pool or inside a
//! transaction; multi-statement writes take `&mut PgConnection` and expect the
//! caller to hold the transaction.

pub mod account;
pub mod asset;
pub mod department;
pub mod ip_address;
pub mod ip_ledger;
