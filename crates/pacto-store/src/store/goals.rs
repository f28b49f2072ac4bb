//! Goal CRUD and query-based removal.

use super::Store;
use pacto_core::error::PactoError;
use pacto_core::model::{Goal, GoalCategory};
use uuid::Uuid;

impl Store {
    /// Persist a batch of extracted goals under one category.
    ///
    /// Returns the number of goals saved. Blank descriptions are skipped.
    pub async fn save_goals(
        &self,
        owner_id: &str,
        descriptions: &[String],
        category: GoalCategory,
    ) -> Result<usize, PactoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PactoError::Store(format!("save goals begin failed: {e}")))?;

        let mut saved = 0;
        for description in descriptions {
            let description = description.trim();
            if description.is_empty() {
                continue;
            }
            sqlx::query(
                "INSERT INTO goals (id, owner_id, description, category) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(owner_id)
            .bind(description)
            .bind(category.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| PactoError::Store(format!("save goals insert failed: {e}")))?;
            saved += 1;
        }

        tx.commit()
            .await
            .map_err(|e| PactoError::Store(format!("save goals commit failed: {e}")))?;

        Ok(saved)
    }

    /// Add a single goal.
    pub async fn add_goal(
        &self,
        owner_id: &str,
        description: &str,
        category: GoalCategory,
    ) -> Result<Goal, PactoError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO goals (id, owner_id, description, category) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(owner_id)
            .bind(description)
            .bind(category.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| PactoError::Store(format!("add goal failed: {e}")))?;

        Ok(Goal {
            id,
            owner_id: owner_id.to_string(),
            description: description.to_string(),
            category,
        })
    }

    /// Remove the single goal whose description contains `query`
    /// (case-insensitive). Returns the removed description, or `None` when
    /// the query matches zero goals or more than one — ambiguity never
    /// deletes.
    pub async fn remove_goal_by_query(
        &self,
        owner_id: &str,
        query: &str,
    ) -> Result<Option<String>, PactoError> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let matches: Vec<(String, String)> = sqlx::query_as(
            "SELECT id, description FROM goals \
             WHERE owner_id = ? AND lower(description) LIKE ?",
        )
        .bind(owner_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PactoError::Store(format!("remove goal lookup failed: {e}")))?;

        if matches.len() != 1 {
            tracing::debug!(
                "remove goal: query {query:?} matched {} goals for {owner_id}",
                matches.len()
            );
            return Ok(None);
        }

        let (goal_id, description) = matches.into_iter().next().unwrap();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PactoError::Store(format!("remove goal begin failed: {e}")))?;

        sqlx::query("DELETE FROM progress WHERE goal_id = ?")
            .bind(&goal_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PactoError::Store(format!("remove goal progress failed: {e}")))?;

        sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(&goal_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PactoError::Store(format!("remove goal failed: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| PactoError::Store(format!("remove goal commit failed: {e}")))?;

        Ok(Some(description))
    }

    /// List a user's goals in creation order, optionally filtered by category.
    pub async fn list_goals(
        &self,
        owner_id: &str,
        category: Option<GoalCategory>,
    ) -> Result<Vec<Goal>, PactoError> {
        let rows: Vec<(String, String, String)> = match category {
            Some(cat) => sqlx::query_as(
                "SELECT id, description, category FROM goals \
                 WHERE owner_id = ? AND category = ? \
                 ORDER BY created_at ASC, rowid ASC",
            )
            .bind(owner_id)
            .bind(cat.as_str())
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query_as(
                "SELECT id, description, category FROM goals \
                 WHERE owner_id = ? \
                 ORDER BY created_at ASC, rowid ASC",
            )
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(|e| PactoError::Store(format!("list goals failed: {e}")))?;

        rows.into_iter()
            .map(|(id, description, category)| {
                let category = GoalCategory::parse(&category)
                    .ok_or_else(|| PactoError::Store(format!("unknown category '{category}'")))?;
                Ok(Goal {
                    id,
                    owner_id: owner_id.to_string(),
                    description,
                    category,
                })
            })
            .collect()
    }
}
