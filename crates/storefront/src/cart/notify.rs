//! Stock advisories raised when a requested quantity is clamped.
//!
//! Clamping is policy, not failure: the cart operation still succeeds with
//! a reduced quantity and the customer is told why through a
//! [`StockNotifier`] the caller supplies.

use serde::Serialize;
use shapeshop_core::ProductId;

/// A quantity request that exceeded the product's pooled stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockAdvisory {
    /// Product whose stock was exceeded.
    pub product_id: ProductId,
    /// Total stock available for the product across all variants.
    pub ceiling: u32,
    /// Units of the product already in the cart.
    pub in_cart: u32,
    /// Quantity the caller asked for.
    pub requested: u32,
    /// Quantity actually allowed.
    pub allowed: u32,
}

impl StockAdvisory {
    /// Customer-facing message describing the clamp.
    #[must_use]
    pub fn message(&self) -> String {
        if self.allowed == 0 {
            format!(
                "Only {} in stock and you already have {} in your cart. No more can be added.",
                self.ceiling, self.in_cart
            )
        } else {
            format!(
                "Only {} in stock and you already have {} in your cart. Quantity adjusted to {}.",
                self.ceiling, self.in_cart, self.allowed
            )
        }
    }
}

/// Receives stock advisories synchronously during a cart operation.
pub trait StockNotifier {
    /// Report an advisory to the customer.
    fn notify(&mut self, advisory: &StockAdvisory);
}

impl<F> StockNotifier for F
where
    F: FnMut(&StockAdvisory),
{
    fn notify(&mut self, advisory: &StockAdvisory) {
        self(advisory);
    }
}

/// Collects advisories for later presentation.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    advisories: Vec<StockAdvisory>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advisories recorded so far.
    #[must_use]
    pub fn advisories(&self) -> &[StockAdvisory] {
        &self.advisories
    }

    /// Consume the recorder, returning its advisories.
    #[must_use]
    pub fn into_advisories(self) -> Vec<StockAdvisory> {
        self.advisories
    }
}

impl StockNotifier for RecordingNotifier {
    fn notify(&mut self, advisory: &StockAdvisory) {
        self.advisories.push(*advisory);
    }
}

/// Emits advisories as warning-level log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl StockNotifier for LogNotifier {
    fn notify(&mut self, advisory: &StockAdvisory) {
        tracing::warn!(
            product_id = %advisory.product_id,
            ceiling = advisory.ceiling,
            in_cart = advisory.in_cart,
            requested = advisory.requested,
            allowed = advisory.allowed,
            "{}",
            advisory.message()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advisory(allowed: u32) -> StockAdvisory {
        StockAdvisory {
            product_id: ProductId::new(1),
            ceiling: 5,
            in_cart: 3,
            requested: 4,
            allowed,
        }
    }

    #[test]
    fn test_message_mentions_remainder() {
        let msg = advisory(2).message();
        assert!(msg.contains("Only 5 in stock"));
        assert!(msg.contains("have 3"));
        assert!(msg.contains("adjusted to 2"));
    }

    #[test]
    fn test_message_when_nothing_allowed() {
        assert!(advisory(0).message().contains("No more can be added"));
    }

    #[test]
    fn test_closure_notifier() {
        let mut seen = Vec::new();
        let mut notifier = |a: &StockAdvisory| seen.push(a.allowed);
        notifier.notify(&advisory(2));
        assert_eq!(seen, vec![2]);
    }

    #[test]
    fn test_recording_notifier() {
        let mut notifier = RecordingNotifier::new();
        notifier.notify(&advisory(1));
        notifier.notify(&advisory(0));
        assert_eq!(notifier.advisories().len(), 2);
        assert_eq!(notifier.into_advisories()[1].allowed, 0);
    }
}
