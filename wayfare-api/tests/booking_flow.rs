use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wayfare_api::{app, metrics::Metrics, AppState};
use wayfare_booking::fulfillment::FulfillmentConfig;
use wayfare_booking::memory::{
    sample_trip, MemoryAgreementRepository, MemoryBookingRepository, MemoryParticipantRepository,
    MemoryTripRepository, MockAgreementRenderer, MockMailer, MockPaymentProvider,
};
use wayfare_booking::{BookingIntake, IntakeDependencies};
use wayfare_core::repository::BookingRepository;
use wayfare_shared::models::Trip;

struct TestApp {
    router: Router,
    trips: Arc<MemoryTripRepository>,
    bookings: Arc<MemoryBookingRepository>,
    mailer: Arc<MockMailer>,
    trip: Trip,
}

fn test_app(seats_total: i32, seats_reserved: i32) -> TestApp {
    let trips = Arc::new(MemoryTripRepository::new());
    let trip = sample_trip("dolomites-weekend", seats_total, seats_reserved);
    trips.insert(trip.clone());

    let bookings = Arc::new(MemoryBookingRepository::new());
    let participants = Arc::new(MemoryParticipantRepository::new());
    let agreements = Arc::new(MemoryAgreementRepository::new());
    let renderer = Arc::new(MockAgreementRenderer::new());
    let mailer = Arc::new(MockMailer::new());
    let payments = Arc::new(MockPaymentProvider::new());

    let intake = Arc::new(BookingIntake::from_dependencies(IntakeDependencies {
        trips: trips.clone(),
        bookings: bookings.clone(),
        participants: participants.clone(),
        agreements,
        renderer,
        mailer: mailer.clone(),
        payments,
        config: FulfillmentConfig {
            public_base_url: "https://wayfare.example.com".to_string(),
            payment_notification_url: "https://api.wayfare.example.com/webhooks/payments"
                .to_string(),
            placeholder_document: None,
        },
    }));

    let state = AppState {
        intake,
        trips: trips.clone(),
        bookings: bookings.clone(),
        participants,
        metrics: Arc::new(Metrics::new()),
    };

    TestApp {
        router: app(state),
        trips,
        bookings,
        mailer,
        trip,
    }
}

fn booking_payload(with_payment: bool) -> Value {
    json!({
        "slug": "dolomites-weekend",
        "contact_first_name": "Anna",
        "contact_last_name": "Kowalska",
        "contact_email": "anna@example.com",
        "contact_phone": "+48600700800",
        "address": {"street": "Polna 12", "city": "Warszawa", "zip": "00-625"},
        "participants": [
            {"first_name": "Anna", "last_name": "Kowalska", "national_id": "90010112345"}
        ],
        "consents": {"data_processing": true, "terms": true, "conditions": true},
        "with_payment": with_payment
    })
}

fn post_booking(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_booking_returns_201() {
    let app = test_app(10, 0);

    let response = app
        .router
        .clone()
        .oneshot(post_booking(&booking_payload(false)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let booking_ref = body["booking_ref"].as_str().unwrap();
    assert!(booking_ref.starts_with("WF-"));
    assert!(body["booking_url"].as_str().unwrap().contains(booking_ref));
    assert!(body.get("redirect_url").is_none());

    assert_eq!(app.trips.seats_reserved(app.trip.id), 1);
    assert_eq!(app.bookings.count(), 1);
    assert_eq!(app.mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_with_payment_returns_redirect() {
    let app = test_app(10, 0);

    let response = app
        .router
        .clone()
        .oneshot(post_booking(&booking_payload(true)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["redirect_url"]
        .as_str()
        .unwrap()
        .starts_with("https://pay.example.com/"));
}

#[tokio::test]
async fn test_missing_consents_is_400_with_details() {
    let app = test_app(10, 0);
    let mut payload = booking_payload(false);
    payload["consents"]["terms"] = json!(false);

    let response = app
        .router
        .clone()
        .oneshot(post_booking(&payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["details"].get("consents").is_some());
    // No side effects before validation passes.
    assert_eq!(app.trips.seats_reserved(app.trip.id), 0);
    assert_eq!(app.bookings.count(), 0);
}

#[tokio::test]
async fn test_unknown_slug_is_404() {
    let app = test_app(10, 0);
    let mut payload = booking_payload(false);
    payload["slug"] = json!("no-such-trip");

    let response = app
        .router
        .clone()
        .oneshot(post_booking(&payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.bookings.count(), 0);
}

#[tokio::test]
async fn test_sold_out_trip_is_409() {
    let app = test_app(10, 10);

    let response = app
        .router
        .clone()
        .oneshot(post_booking(&booking_payload(false)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(app.trips.seats_reserved(app.trip.id), 10);
}

#[tokio::test]
async fn test_self_service_lookup_requires_token() {
    let app = test_app(10, 0);

    let response = app
        .router
        .clone()
        .oneshot(post_booking(&booking_payload(false)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let booking_ref = body["booking_ref"].as_str().unwrap().to_string();

    let booking = app.bookings.find_by_ref(&booking_ref).await.unwrap().unwrap();
    let token = app
        .bookings
        .fetch_access_token(booking.id)
        .await
        .unwrap()
        .unwrap();

    // Valid token resolves the booking summary.
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/bookings/{}?token={}", booking_ref, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["booking_ref"].as_str().unwrap(), booking_ref);
    assert_eq!(body["participants"].as_array().unwrap().len(), 1);
    assert_eq!(body["payment_status"].as_str().unwrap(), "unpaid");

    // A wrong token answers like a missing booking.
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/bookings/{}?token=wrong", booking_ref))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trip_card_endpoint() {
    let app = test_app(10, 4);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/trips/dolomites-weekend")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["seats_available"].as_i64().unwrap(), 6);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/trips/nowhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_webhook_marks_booking_paid() {
    let app = test_app(10, 0);

    let response = app
        .router
        .clone()
        .oneshot(post_booking(&booking_payload(true)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let booking_ref = body["booking_ref"].as_str().unwrap().to_string();

    let webhook = json!({
        "payment_id": format!("pay_{}", booking_ref),
        "external_id": booking_ref,
        "status": "completed"
    });
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/payments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(webhook.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let booking = app.bookings.find_by_ref(&booking_ref).await.unwrap().unwrap();
    assert_eq!(booking.payment_status.as_str(), "paid");
    assert_eq!(booking.status.as_str(), "confirmed");

    // Unknown references are acknowledged and ignored.
    let webhook = json!({
        "payment_id": "pay_unknown",
        "external_id": "WF-0000000000-XXXX",
        "status": "completed"
    });
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/payments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(webhook.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = test_app(10, 0);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
