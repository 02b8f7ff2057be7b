//! Episode catalog (SQLite via sqlx).
//!
//! Stores podcasts and their episodes so listings survive across runs and can
//! be browsed without re-scraping. Episodes also record whether and where they
//! were downloaded, for the history view only: skip decisions read the ledger
//! in `status_store`, never this table.

pub mod db;
pub mod episodes;
pub mod types;

pub use db::Catalog;
pub use types::*;
