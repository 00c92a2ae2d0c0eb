use chrono::NaiveDateTime;

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::{Booking, BookingDetails, BookingWindow},
};

/// Booking ledger
#[derive(Clone)]
pub struct BookingStore {
    pool: DbPool,
}

/// Everything needed to write a new booking row
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub slot_id: i64,
    pub window: BookingWindow,
    pub amount: i64,
    pub created_at: NaiveDateTime,
}

impl BookingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a `booked` row unless the slot is inactive or already has an
    /// overlapping `booked` row.
    ///
    /// The checks and the insert are one statement, so two concurrent calls
    /// for the same window cannot both succeed. Returns `None` when a
    /// condition failed.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Option<Booking>> {
        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (user_id, slot_id, start_time, end_time, status, amount, created_at)
            SELECT ?, ?, ?, ?, 'booked', ?, ?
            WHERE EXISTS (
                SELECT 1 FROM slots WHERE id = ? AND is_active = 1
            ) AND NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.slot_id = ? AND b.status = 'booked'
                  AND NOT (b.end_time <= ? OR b.start_time >= ?)
            )
            RETURNING *
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.slot_id)
        .bind(booking.window.start)
        .bind(booking.window.end)
        .bind(booking.amount)
        .bind(booking.created_at)
        .bind(booking.slot_id)
        .bind(booking.slot_id)
        .bind(booking.window.start)
        .bind(booking.window.end)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(created)
    }

    /// A booking, only if it belongs to `user_id`
    pub async fn get_booking_for_user(&self, id: i64, user_id: i64) -> Result<Option<Booking>> {
        let booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        Ok(booking)
    }

    /// Move an owned `booked` booking to `cancelled`. Returns false if no row matched.
    pub async fn cancel_booking(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET status = 'cancelled'
            WHERE id = ? AND user_id = ? AND status = 'booked'
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() == 1)
    }

    /// A user's bookings with slot numbers, newest first
    pub async fn get_bookings_for_user(&self, user_id: i64) -> Result<Vec<BookingDetails>> {
        let bookings = sqlx::query_as::<_, BookingDetails>(
            r#"
            SELECT b.*, s.slot_number FROM bookings b
            JOIN slots s ON s.id = b.slot_id
            WHERE b.user_id = ?
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(bookings)
    }

    /// Every booking with slot number and owner, newest first
    pub async fn get_all_bookings(&self) -> Result<Vec<BookingDetails>> {
        let bookings = sqlx::query_as::<_, BookingDetails>(
            r#"
            SELECT b.*, s.slot_number, u.name AS user_name, u.email AS user_email
            FROM bookings b
            JOIN slots s ON s.id = b.slot_id
            JOIN users u ON u.id = b.user_id
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(bookings)
    }

    pub async fn count_bookings(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// `booked` rows that have not ended yet
    pub async fn count_upcoming(&self, now: NaiveDateTime) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE status = 'booked' AND end_time >= ?",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
