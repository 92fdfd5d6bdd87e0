//! ShapeShop Storefront library.
//!
//! This crate provides the cart store and the storefront HTTP API as a
//! library, allowing it to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
