use serde::{Deserialize, Serialize};

use crate::models::pack::GemPack;

#[derive(Debug, Deserialize)]
pub struct DeductRequest {
    /// Gems to debit. Must be positive.
    pub amount: i64,
    /// Free-form reason, logged for auditing.
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseGemsRequest {
    /// Stripe price id of the pack to buy.
    pub pack_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseGemsResponse {
    /// Stripe Checkout URL the client redirects to.
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct GemPacksResponse {
    pub packs: Vec<GemPack>,
}
