//! Core types for ShapeShop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart_line;
pub mod customization;
pub mod id;
pub mod price;

pub use cart_line::{CartLine, NewCartLine};
pub use customization::CustomizationSignature;
pub use id::*;
pub use price::{CurrencyCode, Price};
