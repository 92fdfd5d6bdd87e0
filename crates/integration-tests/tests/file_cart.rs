//! Integration tests for the directory-backed cart.
//!
//! These tests reopen the store between operations, the way separate
//! sessions would, and check what survives on disk.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::fs;

use rust_decimal::Decimal;
use serde_json::json;
use shapeshop_core::{NewCartLine, ProductId};
use shapeshop_storefront::cart::{
    CartStore, FileStorage, MemoryStorage, RecordingNotifier, StockAdvisory,
};

fn lamp() -> NewCartLine {
    NewCartLine::plain(ProductId::new(1), Decimal::new(2500, 2)).with_stock_ceiling(Some(5))
}

fn custom_lamp(shade: &str) -> NewCartLine {
    NewCartLine::customized(
        ProductId::new(1),
        Decimal::new(2500, 2),
        Decimal::new(500, 2),
        json!({ "shade": shade }),
    )
    .with_stock_ceiling(Some(5))
}

#[test]
fn test_cart_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let mut cart = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    cart.add_item(lamp(), 2);
    cart.add_item(custom_lamp("oak"), 1);
    let original = cart.lines().to_vec();

    let reopened = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    assert_eq!(reopened.lines(), original.as_slice());
    assert_eq!(reopened.total_price(), Decimal::new(8000, 2));
}

#[test]
fn test_stock_pool_enforced_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    first.add_item(lamp(), 3);

    let mut second = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    second.add_item(custom_lamp("linen"), 4);

    assert_eq!(second.item_count(), 5);
    assert_eq!(
        second.notifier().advisories(),
        &[StockAdvisory {
            product_id: ProductId::new(1),
            ceiling: 5,
            in_cart: 3,
            requested: 4,
            allowed: 2,
        }]
    );
}

#[test]
fn test_stored_ceiling_applies_to_items_without_stock_info() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    first.add_item(lamp(), 2);

    let mut second = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    let unknown_stock = custom_lamp("oak").with_stock_ceiling(None);
    let line_id = second.add_item(unknown_stock, 10).line_id().unwrap();
    assert_eq!(second.quantity_for_product(ProductId::new(1)), 5);

    let mut third = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    let line = third.line(line_id).unwrap();
    assert_eq!(line.stock_ceiling, None);
    assert_eq!(line.quantity, 3);

    third.update_quantity(line_id, 50);
    assert_eq!(third.quantity_for_product(ProductId::new(1)), 5);
    assert_eq!(third.notifier().advisories()[0].ceiling, 5);
}

#[test]
fn test_corrupt_file_starts_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cart.json"), "[{\"id\": 12").unwrap();

    let mut cart = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    assert!(cart.is_empty());

    cart.add_item(lamp(), 1);
    let reopened = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    assert_eq!(reopened.item_count(), 1);
}

#[test]
fn test_clear_persists_empty_document() {
    let dir = tempfile::tempdir().unwrap();

    let mut cart = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    cart.add_item(lamp(), 2);
    cart.clear_cart();

    assert_eq!(fs::read_to_string(dir.path().join("cart.json")).unwrap(), "[]");
    let reopened = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    assert_eq!(reopened.item_count(), 0);
    assert_eq!(reopened.total_price(), Decimal::ZERO);
}

#[test]
fn test_document_moves_between_backends() {
    let dir = tempfile::tempdir().unwrap();

    let mut cart = CartStore::load(FileStorage::new(dir.path()), RecordingNotifier::new());
    cart.add_item(custom_lamp("oak"), 2);

    let document = fs::read_to_string(dir.path().join("cart.json")).unwrap();
    let in_memory = CartStore::load(
        MemoryStorage::with_document("cart", document),
        RecordingNotifier::new(),
    );
    assert_eq!(in_memory.lines(), cart.lines());
}
