//! Slash Core - Shared types library.
//!
//! This crate provides the domain types used across the Slash workspace:
//! - `storefront` - Public-facing experiences marketplace
//! - `cli` - Command-line tools for migrations and admin credentials
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no sessions.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
