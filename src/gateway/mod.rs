//! Gateway — routes inbound messages through the phase controller and owns
//! the scheduled broadcast/report jobs.
//!
//! Handling for a single user is serialized: the phase read-decide-write
//! sequence runs under a per-identity lock, so near-simultaneous messages
//! from the same sender cannot race.

mod intent;
mod matcher;
mod pipeline;
mod report;
mod scheduler;
mod texts;

#[cfg(test)]
pub(crate) mod testutil;

pub use matcher::{MatchStrategy, SubstringMatcher};
pub use scheduler::{scheduler_loop, zone_offset};

use chrono::{FixedOffset, NaiveDate, Utc};
use pacto_core::{message::IncomingMessage, normalize::normalize_address, traits::Channel};
use pacto_oracle::Extractor;
use pacto_store::{
    audit::{AuditEntry, AuditStatus},
    AuditLogger, Store,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Outcome of handling one inbound message — the branch taken, reported
/// back to the webhook caller as `{"status": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleStatus {
    NovoUsuario,
    DiariasOk,
    DiariasRetry,
    MensaisOk,
    MensaisPuladas,
    MensaisRetry,
    RegistroSalvo,
    RegistroRetry,
    MetaAdicionada,
    MetaRemovida,
    MetaNaoEncontrada,
    FaseReiniciada,
    Saudacao,
    Erro,
}

impl HandleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NovoUsuario => "novo_usuario",
            Self::DiariasOk => "diarias_ok",
            Self::DiariasRetry => "diarias_retry",
            Self::MensaisOk => "mensais_ok",
            Self::MensaisPuladas => "mensais_puladas",
            Self::MensaisRetry => "mensais_retry",
            Self::RegistroSalvo => "registro_salvo",
            Self::RegistroRetry => "registro_retry",
            Self::MetaAdicionada => "meta_adicionada",
            Self::MetaRemovida => "meta_removida",
            Self::MetaNaoEncontrada => "meta_nao_encontrada",
            Self::FaseReiniciada => "fase_reiniciada",
            Self::Saudacao => "saudacao",
            Self::Erro => "erro",
        }
    }
}

/// The central gateway connecting the webhook, store, oracle, and channel.
pub struct Gateway {
    pub(super) store: Store,
    pub(super) extractor: Extractor,
    pub(super) channel: Arc<dyn Channel>,
    pub(super) matcher: Box<dyn MatchStrategy>,
    pub(super) audit: AuditLogger,
    /// Fixed zone the agent lives in; progress dates and scheduler times
    /// are wall-clock in this offset.
    pub(super) tz: FixedOffset,
    /// One lock per known sender; held for the whole of a message's
    /// read-decide-write sequence.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        store: Store,
        extractor: Extractor,
        channel: Arc<dyn Channel>,
        matcher: Box<dyn MatchStrategy>,
        tz: FixedOffset,
    ) -> Self {
        let audit = AuditLogger::new(store.pool().clone());
        Self {
            store,
            extractor,
            channel,
            matcher,
            audit,
            tz,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Process one inbound message end to end.
    ///
    /// Never returns an error: any store/channel fault is logged, audited,
    /// and collapsed into the generic `Erro` status. Writes committed before
    /// the fault stay committed.
    pub async fn handle_message(&self, incoming: IncomingMessage) -> HandleStatus {
        let sender = normalize_address(&incoming.sender_id);

        let preview = if incoming.text.chars().count() > 60 {
            let truncated: String = incoming.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            incoming.text.clone()
        };
        info!("[{}] {} says: {}", self.channel.name(), sender, preview);

        let lock = self.user_lock(&sender).await;
        let _guard = lock.lock().await;

        let started = Instant::now();
        let result = self.handle_inner(&sender, incoming.text.trim()).await;
        let elapsed_ms = started.elapsed().as_millis() as i64;

        let (status, detail, audit_status) = match result {
            Ok(status) => (status, status.as_str().to_string(), AuditStatus::Ok),
            Err(e) => {
                error!("message handling failed for {sender}: {e}");
                (HandleStatus::Erro, e.to_string(), AuditStatus::Error)
            }
        };

        let _ = self
            .audit
            .log(&AuditEntry {
                sender_id: sender,
                input_text: incoming.text,
                status: audit_status,
                detail: Some(detail),
                processing_ms: Some(elapsed_ms),
            })
            .await;

        status
    }

    /// Today's date in the agent's zone.
    pub(super) fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    async fn user_lock(&self, sender: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(sender.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
