use sqlx::{Executor, Sqlite};

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::{BookingWindow, Slot},
};

/// Slot registry: existence and activation of parking slots
#[derive(Clone)]
pub struct SlotStore {
    pool: DbPool,
}

impl SlotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// All slots ordered by slot number
    pub async fn get_all_slots(&self) -> Result<Vec<Slot>> {
        let slots = sqlx::query_as::<_, Slot>("SELECT * FROM slots ORDER BY slot_number")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(slots)
    }

    pub async fn get_slot(&self, id: i64) -> Result<Option<Slot>> {
        let slot = sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(slot)
    }

    /// Active slots with no `booked` row overlapping `window`.
    ///
    /// The result is advisory: nothing holds the slot between this read and a
    /// later booking attempt.
    pub async fn available_slots(&self, window: &BookingWindow) -> Result<Vec<Slot>> {
        let slots = sqlx::query_as::<_, Slot>(
            r#"
            SELECT s.* FROM slots s
            WHERE s.is_active = 1 AND NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.slot_id = s.id AND b.status = 'booked'
                  AND NOT (b.end_time <= ? OR b.start_time >= ?)
            )
            ORDER BY s.slot_number
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(slots)
    }

    /// Flip the active flag and return the updated slot
    pub async fn toggle_slot(&self, id: i64) -> Result<Slot> {
        let updated = sqlx::query_as::<_, Slot>(
            "UPDATE slots SET is_active = 1 - is_active WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Slot"))?;

        Ok(updated)
    }

    /// Replace the whole slot set with `count` active slots numbered from 1.
    ///
    /// Bookings of the old slots are removed with them (cascade) and slot ids
    /// restart at 1.
    pub async fn reset_slots(&self, count: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM slots").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'slots'")
            .execute(&mut *tx)
            .await?;
        insert_numbered_slots(&mut *tx, count).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn count_slots(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM slots")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn count_active_slots(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM slots WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

/// Insert active slots numbered `1..=count`
pub(crate) async fn insert_numbered_slots<'e, E>(executor: E, count: i64) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        WITH RECURSIVE seq(n) AS (
            SELECT 1
            UNION ALL
            SELECT n + 1 FROM seq WHERE n < ?
        )
        INSERT INTO slots (slot_number, is_active)
        SELECT n, 1 FROM seq
        "#,
    )
    .bind(count)
    .execute(executor)
    .await?;

    Ok(())
}
