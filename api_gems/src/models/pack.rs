use serde::{Deserialize, Serialize};

/// A purchasable gem bundle, sourced from a one-time Stripe price whose
/// product carries a `gem_amount` metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GemPack {
    /// Stripe price id.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Gems credited when the checkout completes.
    pub gems: i64,
    /// Price in the smallest currency unit (cents).
    pub price: i64,
    pub currency: String,
}
