//! Message processing pipeline — the conversation phase controller.

use super::intent::Intent;
use super::texts;
use super::{Gateway, HandleStatus};
use pacto_core::error::PactoError;
use pacto_core::model::{GoalCategory, Phase};
use tracing::{debug, info};

/// Accepted only in the monthly setup phase; compared after trim + lowercase.
const SKIP_TOKEN: &str = "pular";

impl Gateway {
    /// Dispatch one message: resolve the user, route the intent, then let
    /// the current phase decide. Store/channel faults propagate to the
    /// caller, which maps them to the generic error status.
    pub(super) async fn handle_inner(
        &self,
        sender: &str,
        text: &str,
    ) -> Result<HandleStatus, PactoError> {
        let user = match self.store.get_user(sender).await? {
            Some(user) => user,
            None => {
                self.store.create_user(sender, None).await?;
                info!("new user {sender}");
                self.channel.send(sender, texts::WELCOME).await?;
                return Ok(HandleStatus::NovoUsuario);
            }
        };

        match Intent::parse(text) {
            Intent::Reset => {
                self.store.set_phase(sender, Phase::SetupDaily).await?;
                info!("{sender}: phase reset to {}", Phase::SetupDaily.as_str());
                self.channel.send(sender, texts::RESET_DONE).await?;
                Ok(HandleStatus::FaseReiniciada)
            }
            Intent::AddGoal(description) => {
                let goal = self
                    .store
                    .add_goal(sender, &description, GoalCategory::Daily)
                    .await?;
                self.channel
                    .send(sender, &texts::goal_added(&goal.description))
                    .await?;
                Ok(HandleStatus::MetaAdicionada)
            }
            Intent::RemoveGoal(query) => {
                match self.store.remove_goal_by_query(sender, &query).await? {
                    Some(description) => {
                        self.channel
                            .send(sender, &texts::goal_removed(&description))
                            .await?;
                        Ok(HandleStatus::MetaRemovida)
                    }
                    None => {
                        self.channel.send(sender, texts::GOAL_NOT_FOUND).await?;
                        Ok(HandleStatus::MetaNaoEncontrada)
                    }
                }
            }
            Intent::Greeting => {
                let reply = if user.phase == Phase::Active {
                    texts::GREETING_ACTIVE
                } else {
                    texts::GREETING_SETUP
                };
                self.channel.send(sender, reply).await?;
                Ok(HandleStatus::Saudacao)
            }
            Intent::Plain(content) => match user.phase {
                Phase::SetupDaily => self.handle_setup_daily(sender, &content).await,
                Phase::SetupMonthly => self.handle_setup_monthly(sender, &content).await,
                Phase::Active => self.handle_active(sender, &content).await,
            },
        }
    }

    /// SETUP_DAILY: extract the daily goal list or ask again.
    async fn handle_setup_daily(
        &self,
        sender: &str,
        content: &str,
    ) -> Result<HandleStatus, PactoError> {
        let goals = self.extractor.extract_goals(content).await;
        if goals.is_empty() {
            self.channel.send(sender, texts::DAILY_RETRY).await?;
            return Ok(HandleStatus::DiariasRetry);
        }

        self.store
            .save_goals(sender, &goals, GoalCategory::Daily)
            .await?;
        self.store.set_phase(sender, Phase::SetupMonthly).await?;
        info!("{sender}: {} daily goals saved", goals.len());
        self.channel.send(sender, &texts::daily_saved(&goals)).await?;
        Ok(HandleStatus::DiariasOk)
    }

    /// SETUP_MONTHLY: skip token, extractable list, or ask again.
    async fn handle_setup_monthly(
        &self,
        sender: &str,
        content: &str,
    ) -> Result<HandleStatus, PactoError> {
        if content.trim().to_lowercase() == SKIP_TOKEN {
            self.store.set_phase(sender, Phase::Active).await?;
            info!("{sender}: monthly goals skipped, now active");
            self.channel.send(sender, texts::MONTHLY_SKIPPED).await?;
            return Ok(HandleStatus::MensaisPuladas);
        }

        let goals = self.extractor.extract_goals(content).await;
        if goals.is_empty() {
            self.channel.send(sender, texts::MONTHLY_RETRY).await?;
            return Ok(HandleStatus::MensaisRetry);
        }

        self.store
            .save_goals(sender, &goals, GoalCategory::Monthly)
            .await?;
        self.store.set_phase(sender, Phase::Active).await?;
        info!("{sender}: {} monthly goals saved, now active", goals.len());
        self.channel
            .send(sender, &texts::monthly_saved(&goals))
            .await?;
        Ok(HandleStatus::MensaisOk)
    }

    /// ACTIVE: analyze the report, persist matched outcomes, send a summary.
    async fn handle_active(
        &self,
        sender: &str,
        content: &str,
    ) -> Result<HandleStatus, PactoError> {
        let goals = self.store.list_goals(sender, None).await?;
        let names: Vec<String> = goals.iter().map(|g| g.description.clone()).collect();

        let analysis = self.extractor.analyze_progress(content, &names).await;
        if analysis.items.is_empty() {
            self.channel.send(sender, texts::ANALYSIS_RETRY).await?;
            return Ok(HandleStatus::RegistroRetry);
        }

        let today = self.today();
        for item in &analysis.items {
            match self.matcher.match_goal(&item.name, &goals) {
                Some(idx) => {
                    self.store
                        .record_progress(&goals[idx].id, today, item.completed)
                        .await?;
                }
                None => {
                    // Unmatched reports are dropped, not surfaced as errors.
                    debug!("{sender}: no stored goal matches reported '{}'", item.name);
                }
            }
        }

        self.channel
            .send(
                sender,
                &texts::progress_summary(&analysis.comment, &analysis.items),
            )
            .await?;
        Ok(HandleStatus::RegistroSalvo)
    }
}
