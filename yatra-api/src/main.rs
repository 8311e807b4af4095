use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use yatra_api::{
    app,
    state::{AppState, AuthConfig},
};
use yatra_booking::{BookingLifecycleManager, Fares};
use yatra_core::repository::{BookingRepository, ScheduleRepository};
use yatra_schedule::ScheduleLifecycleManager;
use yatra_store::stub::{SmsLogSink, StaticRouteTable, StubPaymentGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatra_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = yatra_store::Config::load()?;
    tracing::info!("Starting Yatra API on port {}", config.server.port);

    let (schedule_repo, booking_repo): (Arc<dyn ScheduleRepository>, Arc<dyn BookingRepository>) =
        match &config.database.url {
            Some(url) => {
                let store = Arc::new(yatra_store::PgStore::connect(url).await?);
                tracing::info!("Using Postgres storage");
                (
                    store.clone() as Arc<dyn ScheduleRepository>,
                    store as Arc<dyn BookingRepository>,
                )
            }
            None => {
                let store = Arc::new(yatra_store::MemoryStore::new());
                tracing::warn!("No database configured, using in-memory storage");
                (
                    store.clone() as Arc<dyn ScheduleRepository>,
                    store as Arc<dyn BookingRepository>,
                )
            }
        };

    let routes = Arc::new(StaticRouteTable::new());
    for (id, minutes) in &config.routes {
        match Uuid::parse_str(id) {
            Ok(route_id) => routes.insert(route_id, *minutes).await,
            Err(_) => tracing::warn!(route = %id, "ignoring malformed route id in config"),
        }
    }

    let schedules = Arc::new(ScheduleLifecycleManager::new(schedule_repo, routes));
    let bookings = Arc::new(BookingLifecycleManager::new(
        booking_repo,
        Arc::new(StubPaymentGateway::new()),
        Arc::new(SmsLogSink),
        Fares {
            price_per_seat: config.fares.price_per_seat,
            currency: config.fares.currency.clone(),
        },
    ));

    let state = AppState {
        schedules,
        bookings,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
