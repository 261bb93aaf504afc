use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::state::AppState;

/// Booking intake counters. Fulfillment failures are visible in logs; these
/// cover the request outcomes operations actually alert on.
pub struct Metrics {
    registry: Registry,
    pub bookings_created: IntCounter,
    pub bookings_rejected: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let bookings_created =
            IntCounter::new("bookings_created_total", "Bookings successfully created")
                .expect("metric definition");
        let bookings_rejected = IntCounterVec::new(
            Opts::new("bookings_rejected_total", "Rejected booking requests"),
            &["reason"],
        )
        .expect("metric definition");

        registry
            .register(Box::new(bookings_created.clone()))
            .expect("metric registration");
        registry
            .register(Box::new(bookings_rejected.clone()))
            .expect("metric registration");

        Self {
            registry,
            bookings_created,
            bookings_rejected,
        }
    }

    pub fn rejected(&self, reason: &str) {
        self.bookings_rejected.with_label_values(&[reason]).inc();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// GET /metrics
pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(&state.metrics.registry.gather(), &mut buffer) {
        tracing::error!(%error, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        buffer,
    )
        .into_response()
}
