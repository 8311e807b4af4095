use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use yatra_core::notify::{NotificationSink, NotifyError};
use yatra_core::payment::{CheckoutSession, GatewayError, PaymentGateway, Refund};
use yatra_core::route::{RouteDuration, RouteDurationProvider, RouteLookupError};

/// Static route-duration table, seeded from configuration. Stands in for
/// the external routing service that estimates travel time per route.
#[derive(Default)]
pub struct StaticRouteTable {
    routes: RwLock<HashMap<Uuid, i64>>,
}

impl StaticRouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, route_id: Uuid, minutes: i64) {
        self.routes.write().await.insert(route_id, minutes);
    }
}

#[async_trait]
impl RouteDurationProvider for StaticRouteTable {
    async fn duration(&self, route_id: Uuid) -> Result<RouteDuration, RouteLookupError> {
        match self.routes.read().await.get(&route_id) {
            Some(minutes) => Ok(RouteDuration {
                estimated_duration_minutes: *minutes,
            }),
            None => Err(RouteLookupError::NotFound),
        }
    }
}

/// Payment gateway that mints deterministic ids instead of calling a
/// provider. Session ids embed the booking id, so `retrieve_session` can
/// derive the matching intent without shared state.
#[derive(Default)]
pub struct StubPaymentGateway {
    counter: AtomicU64,
}

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn create_session(
        &self,
        booking_id: Uuid,
        amount: i64,
        currency: &str,
        description: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let session_id = format!("sess_{booking_id}_{n}");
        info!(booking = %booking_id, amount, currency, description, "stub checkout session created");
        Ok(CheckoutSession {
            payment_intent_id: Some(format!("pi_{booking_id}_{n}")),
            checkout_url: Some(format!("https://checkout.invalid/{session_id}")),
            session_id,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        match session_id.strip_prefix("sess_") {
            Some(rest) => Ok(CheckoutSession {
                session_id: session_id.to_string(),
                payment_intent_id: Some(format!("pi_{rest}")),
                checkout_url: None,
            }),
            None => Err(GatewayError::SessionNotFound(session_id.to_string())),
        }
    }

    async fn refund(&self, payment_intent_id: &str) -> Result<Refund, GatewayError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        info!(intent = %payment_intent_id, "stub refund issued");
        Ok(Refund {
            refund_id: format!("re_{n}"),
        })
    }
}

/// SMS sink that only writes to the log. Deliveries are best-effort by
/// contract, so a logging sink is a valid deployment, not just a test aid.
pub struct SmsLogSink;

#[async_trait]
impl NotificationSink for SmsLogSink {
    async fn send(&self, phone_number: &str, message: &str) -> Result<(), NotifyError> {
        info!(to = %phone_number, message, "SMS dispatched");
        Ok(())
    }
}
