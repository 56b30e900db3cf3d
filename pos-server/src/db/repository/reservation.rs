//! Reservation Repository

use super::{RepoError, RepoResult};
use shared::models::{Reservation, ReservationCreate, ReservationStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, table_id, customer_name, reservation_time, status, created_at";

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Reservation>> {
    let reservations = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservation ORDER BY reservation_time"
    ))
    .fetch_all(db)
    .await?;
    Ok(reservations)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    data: &ReservationCreate,
) -> RepoResult<Reservation> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "INSERT INTO reservation (id, table_id, customer_name, reservation_time, status, created_at) \
         VALUES (?, ?, ?, ?, 'reserved', ?) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(data.table_id)
    .bind(data.customer_name.trim())
    .bind(data.reservation_time)
    .bind(now_millis())
    .fetch_one(db)
    .await?;
    Ok(reservation)
}

pub async fn update_status(
    db: impl SqliteExecutor<'_>,
    id: i64,
    status: ReservationStatus,
) -> RepoResult<Reservation> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "UPDATE reservation SET status = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(db)
    .await?;
    reservation.ok_or_else(|| RepoError::NotFound(format!("Reservation {id} not found")))
}
