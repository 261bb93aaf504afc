use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wayfare_core::repository::{BoxError, TripRepository};
use wayfare_shared::models::Trip;

pub struct StoreTripRepository {
    pool: PgPool,
}

impl StoreTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    title: String,
    slug: String,
    public_slug: Option<String>,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    price_per_seat: i32,
    currency: String,
    seats_total: i32,
    seats_reserved: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            id: row.id,
            title: row.title,
            slug: row.slug,
            public_slug: row.public_slug,
            starts_on: row.starts_on,
            ends_on: row.ends_on,
            price_per_seat: row.price_per_seat,
            currency: row.currency,
            seats_total: row.seats_total,
            seats_reserved: row.seats_reserved,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TripRepository for StoreTripRepository {
    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Trip>, BoxError> {
        let row = sqlx::query_as::<_, TripRow>(
            r#"
            SELECT id, title, slug, public_slug, starts_on, ends_on,
                   price_per_seat, currency, seats_total, seats_reserved,
                   is_active, created_at, updated_at
            FROM trips
            WHERE is_active AND (slug = $1 OR public_slug = $1)
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Trip::from))
    }

    async fn reserve_seats(&self, trip_id: Uuid, count: i32) -> Result<bool, BoxError> {
        // Single conditional read-check-increment; this is the authoritative
        // capacity check under concurrency.
        let result = sqlx::query(
            r#"
            UPDATE trips
            SET seats_reserved = seats_reserved + $2, updated_at = NOW()
            WHERE id = $1 AND seats_reserved + $2 <= seats_total
            "#,
        )
        .bind(trip_id)
        .bind(count)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn release_seats(&self, trip_id: Uuid, count: i32) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            UPDATE trips
            SET seats_reserved = GREATEST(seats_reserved - $2, 0), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(trip_id)
        .bind(count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
