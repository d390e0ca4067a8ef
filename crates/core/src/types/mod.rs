//! Core types for Lunchroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod chat;
pub mod phone;
pub mod price;
pub mod status;

pub use chat::ChatId;
pub use phone::PhoneNumber;
pub use price::Price;
pub use status::{PaymentStatus, Role};
