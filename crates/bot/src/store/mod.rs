//! File-backed stores.
//!
//! Each store owns one file and performs whole-file read-modify-write
//! cycles serialized behind a single async mutex. This trades throughput
//! for the simplest possible consistency story: within one store there is
//! no lost-update race, and a reader always observes a complete snapshot.
//!
//! ## Files
//!
//! - `users.json` - identity store, one profile per phone key
//! - `addresses.json` - ordered catalog of delivery address strings
//! - `orders.csv` - order ledger, one row per line item

pub mod addresses;
pub mod identity;
pub mod ledger;

pub use addresses::AddressBook;
pub use identity::{IdentityStore, UserProfile};
pub use ledger::{OrderLedger, OrderLine};

use thiserror::Error;

/// Errors that can occur in the file-backed stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but could not be decoded.
    #[error("store data error: {0}")]
    Data(String),

    /// A write collided with an existing key.
    #[error("conflict: {0}")]
    Conflict(String),
}
