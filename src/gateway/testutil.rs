//! Shared test doubles: scripted oracle, recording channel, gateway harness.

use super::{Gateway, SubstringMatcher};
use async_trait::async_trait;
use pacto_core::{
    error::PactoError,
    message::IncomingMessage,
    traits::{Channel, Oracle},
};
use pacto_oracle::Extractor;
use pacto_store::Store;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Oracle fed with scripted responses, consumed in order.
pub(crate) struct MockOracle {
    responses: Mutex<VecDeque<Result<String, String>>>,
}

impl MockOracle {
    pub(crate) fn scripted(responses: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
        })
    }
}

#[async_trait]
impl Oracle for MockOracle {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, PactoError> {
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(PactoError::Oracle(e)),
            None => Err(PactoError::Oracle("no scripted response".into())),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// Channel that records sent messages; can be told to fail for one
/// recipient or for everyone.
pub(crate) struct MockChannel {
    pub(crate) sent: Mutex<Vec<(String, String)>>,
    fail_for: Option<String>,
    fail_all: bool,
}

impl MockChannel {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_for: None,
            fail_all: false,
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_for: None,
            fail_all: true,
        })
    }

    pub(crate) fn failing_for(recipient: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_for: Some(recipient.to_string()),
            fail_all: false,
        })
    }

    /// Recipients of every message sent so far.
    pub(crate) fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(to, _)| to.clone()).collect()
    }

    /// Text of the last message sent.
    pub(crate) fn last_text(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, text)| text.clone())
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, to: &str, text: &str) -> Result<(), PactoError> {
        if self.fail_all || self.fail_for.as_deref() == Some(to) {
            return Err(PactoError::Channel("connection reset".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        Ok(())
    }
}

/// In-memory gateway with a scripted oracle and a recording channel.
pub(crate) async fn test_gateway(
    responses: Vec<Result<&str, &str>>,
) -> (Arc<Gateway>, Arc<MockChannel>) {
    let channel = MockChannel::new();
    let gateway = gateway_with(responses, channel.clone()).await;
    (gateway, channel)
}

pub(crate) async fn gateway_with(
    responses: Vec<Result<&str, &str>>,
    channel: Arc<MockChannel>,
) -> Arc<Gateway> {
    let store = Store::in_memory().await.unwrap();
    let oracle = MockOracle::scripted(responses);
    Arc::new(Gateway::new(
        store,
        Extractor::new(oracle),
        channel,
        Box::new(SubstringMatcher),
        super::zone_offset(-3),
    ))
}

pub(crate) fn msg(sender: &str, text: &str) -> IncomingMessage {
    IncomingMessage::from_event(sender, text)
}
