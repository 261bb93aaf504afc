use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use wayfare_shared::models::{BookingStatus, PaymentStatus};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    pub payment_id: String,
    /// The merchant-side id we opened the session with: the booking ref
    pub external_id: String,
    pub status: String,
}

/// POST /webhooks/payments
/// Receive payment status updates from the hosted payment provider. Always
/// answers 200 once the payload parses; the provider retries anything else.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> StatusCode {
    tracing::info!(
        payment_id = %payload.payment_id,
        external_id = %payload.external_id,
        status = %payload.status,
        "payment webhook received"
    );

    let booking = match state.bookings.find_by_ref(&payload.external_id).await {
        Ok(Some(booking)) => booking,
        Ok(None) => {
            tracing::warn!(external_id = %payload.external_id, "webhook for unknown booking");
            return StatusCode::OK;
        }
        Err(error) => {
            tracing::error!(%error, "webhook booking lookup failed");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    if payload.status == "completed" {
        if let Err(error) = state
            .bookings
            .update_payment_status(booking.id, PaymentStatus::Paid)
            .await
        {
            tracing::error!(booking_id = %booking.id, %error, "failed to mark booking paid");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        if let Err(error) = state
            .bookings
            .update_status(booking.id, BookingStatus::Confirmed)
            .await
        {
            tracing::error!(booking_id = %booking.id, %error, "failed to confirm booking");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        tracing::info!(booking_ref = %booking.booking_ref, "booking paid and confirmed");
    } else {
        // Failed or cancelled sessions leave the booking unpaid; the
        // customer can retry from the self-service page.
        tracing::info!(
            booking_ref = %booking.booking_ref,
            status = %payload.status,
            "payment not completed"
        );
    }

    StatusCode::OK
}
