//! Monthly aggregation and narrative delivery.

use super::Gateway;
use chrono::{Datelike, NaiveDate};
use pacto_core::{error::PactoError, model::User};
use tracing::{debug, error, info, warn};

/// `[first day, last day]` of the month containing `date`.
pub(crate) fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    let next_month_first = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    let last = next_month_first.and_then(|d| d.pred_opt()).unwrap_or(date);
    (first, last)
}

pub(crate) fn is_last_day_of_month(date: NaiveDate) -> bool {
    month_range(date).1 == date
}

impl Gateway {
    /// Build and deliver the month's narrative for every active user.
    /// Users without progress in the period are skipped silently; one
    /// user's failure never aborts the rest.
    pub(super) async fn run_monthly_report(&self, today: NaiveDate) {
        let (from, to) = month_range(today);
        info!("scheduler: running monthly report for {from}..{to}");

        let users = match self.store.list_active_users().await {
            Ok(users) => users,
            Err(e) => {
                error!("monthly report: failed to list active users: {e}");
                return;
            }
        };

        for user in &users {
            if let Err(e) = self.report_for_user(user, from, to).await {
                warn!("monthly report failed for {}: {e}", user.id);
            }
        }
    }

    async fn report_for_user(
        &self,
        user: &User,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(), PactoError> {
        let progress = self.store.list_progress(&user.id, from, to).await?;
        if progress.is_empty() {
            debug!("monthly report: no progress for {}, skipping", user.id);
            return Ok(());
        }

        let goals = self.store.list_goals(&user.id, None).await?;
        match self
            .extractor
            .monthly_report(&user.name, &goals, &progress, from, to)
            .await
        {
            Some(narrative) => self.channel.send(&user.id, &narrative).await,
            None => {
                warn!("monthly report: oracle produced nothing for {}", user.id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_month_range() {
        assert_eq!(
            month_range(day("2026-08-15")),
            (day("2026-08-01"), day("2026-08-31"))
        );
        assert_eq!(
            month_range(day("2026-12-31")),
            (day("2026-12-01"), day("2026-12-31"))
        );
        assert_eq!(
            month_range(day("2026-02-10")),
            (day("2026-02-01"), day("2026-02-28"))
        );
        assert_eq!(
            month_range(day("2028-02-10")),
            (day("2028-02-01"), day("2028-02-29"))
        );
    }

    #[test]
    fn test_is_last_day_of_month() {
        assert!(is_last_day_of_month(day("2026-08-31")));
        assert!(!is_last_day_of_month(day("2026-08-30")));
        assert!(is_last_day_of_month(day("2026-02-28")));
        assert!(!is_last_day_of_month(day("2028-02-28")));
        assert!(is_last_day_of_month(day("2028-02-29")));
    }
}
