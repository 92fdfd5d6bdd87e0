//! ShapeShop Core - Shared domain types.
//!
//! This crate provides the types used across all ShapeShop components:
//! - `storefront` - Cart store, catalog and the public cart API
//! - `cli` - Command-line cart backed by a local directory
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP, no storage.
//! Cart reconciliation lives in the storefront crate and operates on the
//! [`CartLine`] records defined here.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, customization signatures and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
