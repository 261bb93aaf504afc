use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfare_booking::{validate_request, BookingRequest, IntakeError};
use wayfare_shared::models::{BookingSource, BookingStatus, PaymentStatus};

use crate::error::{from_intake, AppError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement_pdf_url: Option<String>,
    pub booking_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// POST /bookings
/// Public booking submission from the trip page
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    if let Err(errors) = validate_request(&payload) {
        state.metrics.rejected("validation");
        return Err(AppError::Validation(errors));
    }

    match state
        .intake
        .submit(payload, BookingSource::PublicPage)
        .await
    {
        Ok(receipt) => {
            state.metrics.bookings_created.inc();
            Ok((
                StatusCode::CREATED,
                Json(BookingResponse {
                    booking_ref: receipt.booking_ref,
                    agreement_pdf_url: receipt.agreement_pdf_url,
                    booking_url: receipt.booking_url,
                    redirect_url: receipt.redirect_url,
                }),
            ))
        }
        Err(error) => {
            let reason = match &error {
                IntakeError::TripNotFound => "trip_not_found",
                IntakeError::NotEnoughSeats => "sold_out",
                IntakeError::Store(_) => "storage",
            };
            state.metrics.rejected(reason);
            Err(from_intake(error))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ParticipantSummary {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct BookingSummary {
    pub booking_ref: String,
    pub trip_id: Uuid,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub contact_email: String,
    pub participants: Vec<ParticipantSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// GET /bookings/{reference}?token=...
/// Unauthenticated customer self-service lookup. The access token gates the
/// row; an unknown reference and a bad token answer identically.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<BookingSummary>, AppError> {
    let not_found = || AppError::NotFound("booking not found".to_string());

    let booking = state
        .bookings
        .find_by_ref(&reference)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?
        .ok_or_else(not_found)?;

    let token = state
        .bookings
        .fetch_access_token(booking.id)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?;
    match token {
        Some(expected) if !query.token.is_empty() && expected == query.token => {}
        _ => return Err(not_found()),
    }

    let participants = state
        .participants
        .list_for_booking(booking.id)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?;

    Ok(Json(BookingSummary {
        booking_ref: booking.booking_ref,
        trip_id: booking.trip_id,
        status: booking.status,
        payment_status: booking.payment_status,
        contact_email: booking.contact.email.expose().clone(),
        participants: participants
            .into_iter()
            .map(|participant| ParticipantSummary {
                first_name: participant.first_name,
                last_name: participant.last_name,
            })
            .collect(),
        created_at: booking.created_at,
    }))
}
