//! Idempotent progress records and range reads.

use super::Store;
use chrono::NaiveDate;
use pacto_core::error::PactoError;
use pacto_core::model::ProgressRecord;

/// Storage format for calendar days.
const DATE_FMT: &str = "%Y-%m-%d";

impl Store {
    /// Record a dated outcome for a goal.
    ///
    /// At most one record exists per (goal, date): a write for an existing
    /// pair is a no-op. Returns whether a new row was inserted.
    pub async fn record_progress(
        &self,
        goal_id: &str,
        date: NaiveDate,
        achieved: bool,
    ) -> Result<bool, PactoError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO progress (goal_id, date, achieved) VALUES (?, ?, ?)",
        )
        .bind(goal_id)
        .bind(date.format(DATE_FMT).to_string())
        .bind(achieved as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| PactoError::Store(format!("record progress failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// All of a user's progress records in `[from, to]`, ordered by date
    /// then goal creation order.
    pub async fn list_progress(
        &self,
        owner_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ProgressRecord>, PactoError> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            "SELECT p.goal_id, g.description, p.date, p.achieved \
             FROM progress p JOIN goals g ON g.id = p.goal_id \
             WHERE g.owner_id = ? AND p.date >= ? AND p.date <= ? \
             ORDER BY p.date ASC, g.created_at ASC, g.rowid ASC",
        )
        .bind(owner_id)
        .bind(from.format(DATE_FMT).to_string())
        .bind(to.format(DATE_FMT).to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PactoError::Store(format!("list progress failed: {e}")))?;

        rows.into_iter()
            .map(|(goal_id, description, date, achieved)| {
                let date = NaiveDate::parse_from_str(&date, DATE_FMT)
                    .map_err(|e| PactoError::Store(format!("bad progress date '{date}': {e}")))?;
                Ok(ProgressRecord {
                    goal_id,
                    description,
                    date,
                    achieved: achieved != 0,
                })
            })
            .collect()
    }
}
