//! Lunchroom Core - Shared types library.
//!
//! This crate provides common types used across all Lunchroom components:
//! - `bot` - The conversational ordering service
//! - `integration-tests` - End-to-end scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no file
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for phone numbers, chat ids, prices, and
//!   statuses
#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
