//! Twilio WhatsApp outbound channel.
//!
//! Sends messages through the Twilio Messages API with basic auth.
//! Docs: <https://www.twilio.com/docs/whatsapp/api>

use async_trait::async_trait;
use pacto_core::{config::TwilioConfig, error::PactoError, traits::Channel};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const TWILIO_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// WhatsApp channel via the Twilio gateway.
pub struct TwilioChannel {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioChannel {
    /// Create a new channel from config (env fallbacks applied).
    pub fn from_config(config: &TwilioConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            account_sid: config.resolved_account_sid(),
            auth_token: config.resolved_auth_token(),
            from_number: config.from_number.clone(),
        }
    }

    /// Whether the config carries everything needed to send.
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }
}

/// Subset of Twilio's message resource we care about.
#[derive(Deserialize)]
struct TwilioMessageResponse {
    sid: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[async_trait]
impl Channel for TwilioChannel {
    fn name(&self) -> &str {
        "twilio-whatsapp"
    }

    async fn send(&self, to: &str, text: &str) -> Result<(), PactoError> {
        let url = format!(
            "{TWILIO_BASE_URL}/Accounts/{}/Messages.json",
            self.account_sid
        );

        // Twilio wants the transport scheme back on both addresses.
        let params = [
            ("From", format!("whatsapp:{}", self.from_number)),
            ("To", format!("whatsapp:{to}")),
            ("Body", text.to_string()),
        ];

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| PactoError::Channel(format!("twilio request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp
                .json::<TwilioMessageResponse>()
                .await
                .ok()
                .and_then(|r| r.error_message)
                .unwrap_or_default();
            warn!("twilio send to {to} failed: {status} {detail}");
            return Err(PactoError::Channel(format!(
                "twilio returned {status}: {detail}"
            )));
        }

        let parsed: TwilioMessageResponse = resp
            .json()
            .await
            .map_err(|e| PactoError::Channel(format!("twilio: failed to parse response: {e}")))?;

        debug!(
            "twilio: sent to {to}, sid {}",
            parsed.sid.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }
}
