//! Reservation Model

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ReservationStatus {
    Reserved,
    Seated,
    Completed,
}

/// Reservation entity (预订)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    pub table_id: i64,
    pub customer_name: String,
    /// Unix millis
    pub reservation_time: i64,
    pub status: ReservationStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreate {
    pub table_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub customer_name: String,
    pub reservation_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatusUpdate {
    pub status: ReservationStatus,
}
