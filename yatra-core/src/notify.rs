use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Best-effort SMS/alert delivery. Callers log failures and move on;
/// a broken sink must never fail the surrounding operation.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, phone_number: &str, message: &str) -> Result<(), NotifyError>;
}
