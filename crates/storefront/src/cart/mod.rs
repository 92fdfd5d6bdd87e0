//! Shopping cart state.
//!
//! # Components
//!
//! - [`store`] - [`CartStore`], the stock-aware reconciliation layer
//! - [`storage`] - Durable key-value backends for the cart document
//! - [`notify`] - Stock advisories and the notifiers that deliver them
//!
//! The store is constructed explicitly with its storage and notifier:
//!
//! ```
//! use rust_decimal::Decimal;
//! use shapeshop_core::{NewCartLine, ProductId};
//! use shapeshop_storefront::cart::{CartStore, MemoryStorage, RecordingNotifier};
//!
//! let mut cart = CartStore::load(MemoryStorage::new(), RecordingNotifier::new());
//! let lamp = NewCartLine::plain(ProductId::new(1), Decimal::new(2500, 2))
//!     .with_stock_ceiling(Some(5));
//!
//! cart.add_item(lamp.clone(), 3);
//! cart.add_item(lamp, 4);
//!
//! assert_eq!(cart.item_count(), 5);
//! assert_eq!(cart.notifier().advisories().len(), 1);
//! ```

pub mod notify;
pub mod storage;
pub mod store;

pub use notify::{LogNotifier, RecordingNotifier, StockAdvisory, StockNotifier};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{AddOutcome, CART_STORAGE_KEY, CartStore, UpdateOutcome};
