//! Cart commands against a directory-backed store.
//!
//! The cart document lives in `<dir>/cart.json`. Every command opens the
//! store, applies one operation and lets the store persist the result.
//! Stock advisories are logged as warnings.

use std::fmt::Write as _;
use std::path::Path;

use rust_decimal::Decimal;
use serde_json::Value;
use shapeshop_core::{LineId, NewCartLine, Price, ProductId};
use shapeshop_storefront::cart::{
    AddOutcome, CartStore, FileStorage, LogNotifier, StorageError, UpdateOutcome,
};
use tracing::info;

/// Cart persisted in a local directory.
pub type FileCart = CartStore<FileStorage, LogNotifier>;

/// Open the cart stored in `dir`.
///
/// # Errors
///
/// Returns `StorageError` if `dir` cannot be created or is not a directory.
pub fn open(dir: &Path) -> Result<FileCart, StorageError> {
    Ok(CartStore::load(FileStorage::open(dir)?, LogNotifier))
}

/// Parameters for adding an item.
#[derive(Debug, Clone)]
pub struct AddItem {
    pub product_id: i32,
    pub quantity: u32,
    pub price: Decimal,
    pub customization_price: Decimal,
    pub stock: Option<u32>,
    pub options: Option<Value>,
    pub title: Option<String>,
}

impl AddItem {
    fn into_cart_line(self) -> NewCartLine {
        let product_id = ProductId::new(self.product_id);
        let line = match self.options {
            Some(options) => NewCartLine::customized(
                product_id,
                self.price,
                self.customization_price,
                options,
            ),
            None => NewCartLine::plain(product_id, self.price),
        };
        line.with_title(self.title.unwrap_or_default())
            .with_stock_ceiling(self.stock)
    }
}

/// Add an item to the cart.
pub fn add(cart: &mut FileCart, item: AddItem) -> AddOutcome {
    let quantity = item.quantity;
    let outcome = cart.add_item(item.into_cart_line(), quantity);
    match outcome {
        AddOutcome::Merged { line_id, added, .. } => {
            info!(%line_id, added, "Merged into existing line");
        }
        AddOutcome::Inserted { line_id, added, .. } => {
            info!(%line_id, added, "Added new line");
        }
        AddOutcome::Rejected => info!("Nothing added"),
    }
    outcome
}

/// Set a line's quantity.
pub fn update(cart: &mut FileCart, line_id: LineId, quantity: u32) -> UpdateOutcome {
    let outcome = cart.update_quantity(line_id, quantity);
    if outcome == UpdateOutcome::Unchanged {
        info!(%line_id, "Cart unchanged");
    }
    outcome
}

/// Remove a line.
pub fn remove(cart: &mut FileCart, line_id: LineId) -> bool {
    let removed = cart.remove_item(line_id);
    if !removed {
        info!(%line_id, "No such line");
    }
    removed
}

/// Render the cart as a text table.
#[must_use]
pub fn render(cart: &FileCart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for line in cart.lines() {
        let kind = if line.is_customized { "custom" } else { "plain" };
        let stock = line
            .stock_ceiling
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        let _ = writeln!(
            out,
            "{}  product={:<4} {:<6} qty={:<3} stock={:<4} {:>10}  {}",
            line.id,
            line.product_id,
            kind,
            line.quantity,
            stock,
            Price::from_amount(line.line_total()).display(),
            line.title,
        );
    }
    let _ = writeln!(
        out,
        "items={}  total={}",
        cart.item_count(),
        Price::from_amount(cart.total_price()).display()
    );
    out
}
