//! Time-triggered jobs: the daily check-in broadcast and the monthly
//! report trigger.
//!
//! A poll loop ticks every few seconds and compares wall-clock time in the
//! configured fixed-offset zone against the trigger times. Each trigger
//! fires at most once per period; triggers already past at startup are
//! marked done so a restart does not replay them.

use super::{texts, Gateway};
use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc};
use pacto_core::config::SchedulerConfig;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fixed-offset zone from whole hours, clamped to a valid offset.
pub fn zone_offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours.clamp(-23, 23) * 3600).expect("clamped offset is valid")
}

/// Tracks which trigger periods have already fired.
pub(crate) struct TriggerState {
    last_daily: Option<chrono::NaiveDate>,
    last_monthly: Option<(i32, u32)>,
}

impl TriggerState {
    /// State as of startup: triggers whose time has already passed today
    /// count as fired, so a restart mid-evening stays quiet.
    pub(crate) fn at_startup(now: DateTime<FixedOffset>, cfg: &SchedulerConfig) -> Self {
        let date = now.date_naive();
        let mut state = Self {
            last_daily: None,
            last_monthly: None,
        };
        if past(now, cfg.daily_hour, cfg.daily_minute) {
            state.last_daily = Some(date);
        }
        if super::report::is_last_day_of_month(date)
            && past(now, cfg.monthly_hour, cfg.monthly_minute)
        {
            state.last_monthly = Some((date.year(), date.month()));
        }
        state
    }

    /// Whether the daily broadcast should fire now; marks it fired if so.
    pub(crate) fn daily_due(&mut self, now: DateTime<FixedOffset>, cfg: &SchedulerConfig) -> bool {
        let date = now.date_naive();
        if past(now, cfg.daily_hour, cfg.daily_minute) && self.last_daily != Some(date) {
            self.last_daily = Some(date);
            return true;
        }
        false
    }

    /// Whether the monthly report should fire now (last calendar day only);
    /// marks it fired if so.
    pub(crate) fn monthly_due(
        &mut self,
        now: DateTime<FixedOffset>,
        cfg: &SchedulerConfig,
    ) -> bool {
        let date = now.date_naive();
        if !super::report::is_last_day_of_month(date) {
            return false;
        }
        let period = (date.year(), date.month());
        if past(now, cfg.monthly_hour, cfg.monthly_minute) && self.last_monthly != Some(period) {
            self.last_monthly = Some(period);
            return true;
        }
        false
    }
}

fn past(now: DateTime<FixedOffset>, hour: u32, minute: u32) -> bool {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => now.time() >= t,
        None => false,
    }
}

/// Background loop driving both triggers. Runs until the process exits.
pub async fn scheduler_loop(gateway: Arc<Gateway>, cfg: SchedulerConfig) {
    let tz = zone_offset(cfg.utc_offset_hours);
    let mut state = TriggerState::at_startup(Utc::now().with_timezone(&tz), &cfg);

    info!(
        "scheduler started | daily {:02}:{:02} | monthly {:02}:{:02} (last day) | UTC{:+03}",
        cfg.daily_hour, cfg.daily_minute, cfg.monthly_hour, cfg.monthly_minute,
        cfg.utc_offset_hours
    );

    loop {
        tokio::time::sleep(std::time::Duration::from_secs(cfg.poll_interval_secs.max(1))).await;

        let now = Utc::now().with_timezone(&tz);
        if state.daily_due(now, &cfg) {
            gateway.run_daily_broadcast().await;
        }
        if state.monthly_due(now, &cfg) {
            gateway.run_monthly_report(now.date_naive()).await;
        }
    }
}

impl Gateway {
    /// Send the fixed check-in prompt to every active user, sequentially.
    /// One user's delivery failure never aborts the rest.
    pub(super) async fn run_daily_broadcast(&self) {
        info!("scheduler: running daily check-in broadcast");

        let users = match self.store.list_active_users().await {
            Ok(users) => users,
            Err(e) => {
                error!("broadcast: failed to list active users: {e}");
                return;
            }
        };

        let mut sent = 0;
        for user in &users {
            match self
                .channel
                .send(&user.id, &texts::daily_checkin(&user.name))
                .await
            {
                Ok(()) => sent += 1,
                Err(e) => warn!("broadcast: failed to reach {}: {e}", user.id),
            }
        }

        info!("scheduler: check-in delivered to {sent}/{} users", users.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cfg() -> SchedulerConfig {
        SchedulerConfig {
            daily_hour: 20,
            daily_minute: 0,
            monthly_hour: 21,
            monthly_minute: 0,
            ..SchedulerConfig::default()
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        zone_offset(-3).with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_zone_offset_clamps() {
        assert_eq!(zone_offset(-3).local_minus_utc(), -3 * 3600);
        assert_eq!(zone_offset(0).local_minus_utc(), 0);
        // Out-of-range inputs clamp instead of panicking.
        assert_eq!(zone_offset(99).local_minus_utc(), 23 * 3600);
    }

    #[test]
    fn test_daily_fires_once_per_day() {
        let cfg = cfg();
        let mut state = TriggerState::at_startup(at(2026, 8, 6, 8, 0), &cfg);

        assert!(!state.daily_due(at(2026, 8, 6, 19, 59), &cfg));
        assert!(state.daily_due(at(2026, 8, 6, 20, 0), &cfg));
        // Later ticks the same day do not re-fire.
        assert!(!state.daily_due(at(2026, 8, 6, 20, 1), &cfg));
        assert!(!state.daily_due(at(2026, 8, 6, 23, 59), &cfg));
        // Next day fires again.
        assert!(state.daily_due(at(2026, 8, 7, 20, 0), &cfg));
    }

    #[test]
    fn test_startup_past_trigger_is_marked_done() {
        let cfg = cfg();
        // Service restarts at 22:00 — tonight's broadcast already happened.
        let mut state = TriggerState::at_startup(at(2026, 8, 6, 22, 0), &cfg);
        assert!(!state.daily_due(at(2026, 8, 6, 22, 0), &cfg));
        assert!(state.daily_due(at(2026, 8, 7, 20, 0), &cfg));
    }

    #[test]
    fn test_monthly_fires_only_on_last_day() {
        let cfg = cfg();
        let mut state = TriggerState::at_startup(at(2026, 8, 1, 8, 0), &cfg);

        assert!(!state.monthly_due(at(2026, 8, 30, 21, 0), &cfg));
        assert!(state.monthly_due(at(2026, 8, 31, 21, 0), &cfg));
        assert!(!state.monthly_due(at(2026, 8, 31, 22, 0), &cfg));
        // Next month's last day fires again.
        assert!(state.monthly_due(at(2026, 9, 30, 21, 0), &cfg));
    }

    #[test]
    fn test_monthly_february() {
        let cfg = cfg();
        let mut state = TriggerState::at_startup(at(2026, 2, 1, 8, 0), &cfg);
        assert!(!state.monthly_due(at(2026, 2, 27, 21, 0), &cfg));
        assert!(state.monthly_due(at(2026, 2, 28, 21, 0), &cfg));
        // 2028 is a leap year.
        let mut state = TriggerState::at_startup(at(2028, 2, 1, 8, 0), &cfg);
        assert!(!state.monthly_due(at(2028, 2, 28, 21, 0), &cfg));
        assert!(state.monthly_due(at(2028, 2, 29, 21, 0), &cfg));
    }
}
