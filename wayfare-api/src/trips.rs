use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub title: String,
    pub slug: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub price_per_seat: i32,
    pub currency: String,
    pub seats_available: i32,
}

/// GET /trips/{slug}
/// Public trip card backing the booking page. Inactive trips do not exist
/// as far as this endpoint is concerned.
pub async fn get_trip(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state
        .trips
        .find_active_by_slug(&slug)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?
        .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;

    let seats_available = trip.seats_available();
    Ok(Json(TripResponse {
        title: trip.title,
        slug: trip.public_slug.unwrap_or(trip.slug),
        starts_on: trip.starts_on,
        ends_on: trip.ends_on,
        price_per_seat: trip.price_per_seat,
        currency: trip.currency,
        seats_available,
    }))
}
