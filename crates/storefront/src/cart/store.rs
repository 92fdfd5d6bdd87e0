//! Stock-aware cart store.
//!
//! [`CartStore`] owns the ordered list of cart lines for one shopper and
//! mirrors it to a [`CartStorage`] backend after every mutation. Stock is
//! pooled per product: plain and customized lines of the same product
//! draw from one ceiling, so every quantity check sums across all lines
//! sharing the product ID.
//!
//! No operation returns an error. Unreadable storage yields an empty
//! cart, ceiling violations are clamped and reported through the
//! [`StockNotifier`], and failed writes are logged.

use rust_decimal::Decimal;
use shapeshop_core::{CartLine, LineId, NewCartLine, ProductId};
use tracing::{debug, error, info, warn};

use super::notify::{StockAdvisory, StockNotifier};
use super::storage::CartStorage;

/// Storage key under which the cart document is persisted.
pub const CART_STORAGE_KEY: &str = "cart";

/// Result of [`CartStore::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Quantity was added to an existing matching line.
    Merged {
        line_id: LineId,
        added: u32,
        clamped: bool,
    },
    /// A new line was appended.
    Inserted {
        line_id: LineId,
        added: u32,
        clamped: bool,
    },
    /// Nothing was added; the cart is unchanged.
    Rejected,
}

impl AddOutcome {
    /// Units actually added to the cart.
    #[must_use]
    pub const fn added(&self) -> u32 {
        match self {
            Self::Merged { added, .. } | Self::Inserted { added, .. } => *added,
            Self::Rejected => 0,
        }
    }

    /// Line that received the units, if any.
    #[must_use]
    pub const fn line_id(&self) -> Option<LineId> {
        match self {
            Self::Merged { line_id, .. } | Self::Inserted { line_id, .. } => Some(*line_id),
            Self::Rejected => None,
        }
    }
}

/// Result of [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The line now holds `quantity` units.
    Updated { quantity: u32, clamped: bool },
    /// Nothing changed.
    Unchanged,
}

/// A shopper's cart, persisted through `S` and reporting clamps to `N`.
#[derive(Debug)]
pub struct CartStore<S, N> {
    storage: S,
    notifier: N,
    lines: Vec<CartLine>,
}

impl<S: CartStorage, N: StockNotifier> CartStore<S, N> {
    /// Load the cart from `storage`.
    ///
    /// A missing document is an empty cart. An unreadable or malformed
    /// document is discarded and also yields an empty cart.
    pub fn load(storage: S, notifier: N) -> Self {
        let lines = match storage.read(CART_STORAGE_KEY) {
            Ok(Some(document)) => match serde_json::from_str::<Vec<CartLine>>(&document) {
                Ok(mut lines) => {
                    let before = lines.len();
                    lines.retain(|line| line.quantity > 0);
                    if lines.len() != before {
                        warn!(
                            dropped = before - lines.len(),
                            "Dropped zero-quantity cart lines"
                        );
                    }
                    lines
                }
                Err(e) => {
                    warn!(error = %e, "Stored cart is corrupt, starting with an empty cart");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart, starting with an empty cart");
                Vec::new()
            }
        };

        debug!(lines = lines.len(), "Cart loaded");

        Self {
            storage,
            notifier,
            lines,
        }
    }

    /// Add `desired_quantity` units of `candidate`.
    ///
    /// The quantity is clamped so the product's pooled total stays within
    /// the stock ceiling. The candidate's ceiling is used when it has one;
    /// otherwise the lowest ceiling stored on the product's existing lines
    /// applies. A matching line (see
    /// [`CartLine::is_same_line`]) absorbs the units; otherwise a new line
    /// with a fresh ID is appended.
    pub fn add_item(&mut self, candidate: NewCartLine, desired_quantity: u32) -> AddOutcome {
        if desired_quantity == 0 {
            return AddOutcome::Rejected;
        }

        let product_id = candidate.product_id;
        let already_in_cart = self.quantity_for_product(product_id);
        let mut quantity = desired_quantity;
        let mut clamped = false;

        let stock_ceiling = candidate
            .stock_ceiling
            .or_else(|| self.stored_ceiling(product_id, None));

        if let Some(ceiling) = stock_ceiling {
            if already_in_cart.saturating_add(desired_quantity) > ceiling {
                let allowed = ceiling.saturating_sub(already_in_cart);
                self.notifier.notify(&StockAdvisory {
                    product_id,
                    ceiling,
                    in_cart: already_in_cart,
                    requested: desired_quantity,
                    allowed,
                });

                if allowed == 0 {
                    info!(%product_id, ceiling, already_in_cart, "Add rejected, stock exhausted");
                    return AddOutcome::Rejected;
                }
                quantity = allowed;
                clamped = true;
            }
        } else {
            warn!(%product_id, "No stock information for product, ceiling not enforced");
        }

        let outcome = if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.is_same_line(&candidate))
        {
            line.quantity = line.quantity.saturating_add(quantity);
            if candidate.stock_ceiling.is_some() {
                line.stock_ceiling = candidate.stock_ceiling;
            }
            AddOutcome::Merged {
                line_id: line.id,
                added: quantity,
                clamped,
            }
        } else {
            let mut line = candidate.into_line(quantity);
            while self.lines.iter().any(|existing| existing.id == line.id) {
                line.id = LineId::generate();
            }
            let line_id = line.id;
            self.lines.push(line);
            AddOutcome::Inserted {
                line_id,
                added: quantity,
                clamped,
            }
        };

        debug!(%product_id, ?outcome, "Item added to cart");
        self.persist();
        outcome
    }

    /// Set the quantity of line `line_id`.
    ///
    /// Quantities below 1 and unknown lines are ignored. The quantity is
    /// clamped to what the other lines of the same product leave available
    /// under the line's own ceiling, or under the lowest ceiling carried by
    /// a sibling line when the target has none.
    pub fn update_quantity(&mut self, line_id: LineId, new_quantity: u32) -> UpdateOutcome {
        if new_quantity < 1 {
            return UpdateOutcome::Unchanged;
        }

        let Some(target) = self.line(line_id) else {
            return UpdateOutcome::Unchanged;
        };
        let product_id = target.product_id;
        let current = target.quantity;
        let stock_ceiling = target
            .stock_ceiling
            .or_else(|| self.stored_ceiling(product_id, Some(line_id)));

        let other_quantity = self
            .lines
            .iter()
            .filter(|line| line.product_id == product_id && line.id != line_id)
            .fold(0_u32, |sum, line| sum.saturating_add(line.quantity));

        let mut quantity = new_quantity;
        let mut clamped = false;

        if let Some(ceiling) = stock_ceiling {
            if other_quantity.saturating_add(new_quantity) > ceiling {
                let max_allowed = ceiling.saturating_sub(other_quantity);
                self.notifier.notify(&StockAdvisory {
                    product_id,
                    ceiling,
                    in_cart: other_quantity.saturating_add(current),
                    requested: new_quantity,
                    allowed: max_allowed,
                });

                if max_allowed == 0 {
                    info!(%product_id, %line_id, ceiling, "Update rejected, stock exhausted");
                    return UpdateOutcome::Unchanged;
                }
                quantity = max_allowed;
                clamped = true;
            }
        } else {
            warn!(%product_id, "No stock information for product, ceiling not enforced");
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.id == line_id) {
            line.quantity = quantity;
        }

        debug!(%line_id, quantity, clamped, "Cart line quantity updated");
        self.persist();
        UpdateOutcome::Updated { quantity, clamped }
    }

    /// Remove line `line_id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, line_id: LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != line_id);
        let removed = self.lines.len() != before;

        debug!(%line_id, removed, "Cart line removed");
        self.persist();
        removed
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.lines.clear();
        debug!("Cart cleared");
        self.persist();
    }

    /// Lowest ceiling stored on the lines of `product_id`, skipping `except`.
    fn stored_ceiling(&self, product_id: ProductId, except: Option<LineId>) -> Option<u32> {
        self.lines
            .iter()
            .filter(|line| line.product_id == product_id && Some(line.id) != except)
            .filter_map(|line| line.stock_ceiling)
            .min()
    }

    fn persist(&mut self) {
        let document = match serde_json::to_string(&self.lines) {
            Ok(document) => document,
            Err(e) => {
                error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.write(CART_STORAGE_KEY, &document) {
            error!(error = %e, "Failed to persist cart");
        }
    }
}

impl<S, N> CartStore<S, N> {
    /// Cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by ID.
    #[must_use]
    pub fn line(&self, line_id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Units of `product_id` across all of its lines.
    #[must_use]
    pub fn quantity_for_product(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.product_id == product_id)
            .fold(0, |sum, line| sum.saturating_add(line.quantity))
    }

    /// The notifier, e.g. to read recorded advisories.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Release the storage and notifier.
    pub fn into_parts(self) -> (S, N) {
        (self.storage, self.notifier)
    }
}
