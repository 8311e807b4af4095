use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Checkout session handed back by the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub payment_intent_id: Option<String>,
    pub checkout_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    pub refund_id: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment session not found: {0}")]
    SessionNotFound(String),

    #[error("gateway rejected the request: {0}")]
    Rejected(String),

    #[error("gateway unreachable: {0}")]
    Unreachable(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session for a booking's total amount.
    async fn create_session(
        &self,
        booking_id: Uuid,
        amount: i64,
        currency: &str,
        description: &str,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Look a session up again, e.g. to resolve its payment intent.
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError>;

    async fn refund(&self, payment_intent_id: &str) -> Result<Refund, GatewayError>;
}
