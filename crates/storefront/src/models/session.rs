//! Session-related types.

/// Session keys for visitor data.
pub mod keys {
    /// Key for the serialized cart document.
    pub const CART: &str = "cart";
}
