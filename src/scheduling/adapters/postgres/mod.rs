//! `PostgreSQL` adapter implementations.

mod ledger;
mod models;
mod schema;

pub use ledger::{LedgerPgPool, PostgresExtensionLedger};
