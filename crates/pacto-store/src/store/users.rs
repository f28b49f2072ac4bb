//! User lifecycle and phase transitions.

use super::Store;
use pacto_core::error::PactoError;
use pacto_core::model::{Phase, User};

/// Display name used when the transport gives us nothing better.
const DEFAULT_NAME: &str = "Campeão";

impl Store {
    /// Look up a user by normalized address.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, PactoError> {
        let row: Option<(String, String, String)> =
            sqlx::query_as("SELECT id, name, phase FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PactoError::Store(format!("get user failed: {e}")))?;

        match row {
            None => Ok(None),
            Some((id, name, phase)) => {
                let phase = Phase::parse(&phase)
                    .ok_or_else(|| PactoError::Store(format!("unknown phase '{phase}'")))?;
                Ok(Some(User { id, name, phase }))
            }
        }
    }

    /// Create a user in the initial setup phase.
    pub async fn create_user(&self, id: &str, name: Option<&str>) -> Result<User, PactoError> {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => DEFAULT_NAME.to_string(),
        };

        sqlx::query("INSERT INTO users (id, name, phase) VALUES (?, ?, ?)")
            .bind(id)
            .bind(&name)
            .bind(Phase::SetupDaily.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| PactoError::Store(format!("create user failed: {e}")))?;

        Ok(User {
            id: id.to_string(),
            name,
            phase: Phase::SetupDaily,
        })
    }

    /// Move a user to a new phase.
    pub async fn set_phase(&self, id: &str, phase: Phase) -> Result<(), PactoError> {
        sqlx::query("UPDATE users SET phase = ? WHERE id = ?")
            .bind(phase.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PactoError::Store(format!("set phase failed: {e}")))?;
        Ok(())
    }

    /// Users who have finished onboarding, in registration order.
    pub async fn list_active_users(&self) -> Result<Vec<User>, PactoError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT id, name FROM users WHERE phase = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(Phase::Active.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PactoError::Store(format!("list active users failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| User {
                id,
                name,
                phase: Phase::Active,
            })
            .collect())
    }
}
