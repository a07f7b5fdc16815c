use uuid::Uuid;

pub struct PurchaseCreateRequest {
    pub user_id: Uuid,
    pub stripe_session_id: String,
    pub gems: i64,
    pub amount_cents: i64,
    pub currency: String,
}
