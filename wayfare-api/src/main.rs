use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfare_api::{app, metrics::Metrics, AppState};
use wayfare_booking::fulfillment::FulfillmentConfig;
use wayfare_booking::{BookingIntake, IntakeDependencies};
use wayfare_core::pdf::RenderedDocument;
use wayfare_store::{
    Config, DbClient, HttpAgreementRenderer, HttpPaymentProvider, SmtpMailer,
    StoreAgreementRepository, StoreBookingRepository, StoreParticipantRepository,
    StoreTripRepository,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfare_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Wayfare API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let trips = Arc::new(StoreTripRepository::new(db.pool.clone()));
    let bookings = Arc::new(StoreBookingRepository::new(
        db.pool.clone(),
        db.service_pool.clone(),
    ));
    let participants = Arc::new(StoreParticipantRepository::new(db.pool.clone()));
    let agreements = Arc::new(StoreAgreementRepository::new(db.pool.clone()));

    let renderer = Arc::new(HttpAgreementRenderer::new(config.pdf.service_url.clone()));
    let mailer = Arc::new(SmtpMailer::new(&config.smtp).expect("Failed to build SMTP mailer"));
    let payments = Arc::new(HttpPaymentProvider::new(&config.payment));

    let placeholder_document = config.pdf.placeholder_path.as_ref().and_then(|path| {
        match std::fs::read(path) {
            Ok(bytes) => Some(RenderedDocument {
                filename: std::path::Path::new(path)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "agreement.pdf".to_string()),
                bytes,
                url: None,
            }),
            Err(error) => {
                tracing::warn!(path = %path, %error, "could not load placeholder document");
                None
            }
        }
    });

    let intake = Arc::new(BookingIntake::from_dependencies(IntakeDependencies {
        trips: trips.clone(),
        bookings: bookings.clone(),
        participants: participants.clone(),
        agreements,
        renderer,
        mailer,
        payments,
        config: FulfillmentConfig {
            public_base_url: config.booking.public_base_url.clone(),
            payment_notification_url: config.payment.notification_url.clone(),
            placeholder_document,
        },
    }));

    let state = AppState {
        intake,
        trips,
        bookings,
        participants,
        metrics: Arc::new(Metrics::new()),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
