//! Pushover sink -- post timer alerts to the Pushover messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{Alert, AlertSink};
use crate::config::AlertsConfig;
use crate::error::AlertError;

pub const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct PushoverMessage<'a> {
    token: &'a str,
    user: &'a str,
    message: &'a str,
    title: &'a str,
}

pub struct PushoverSink {
    client: Client,
    endpoint: String,
    api_token: String,
    user_key: String,
}

impl PushoverSink {
    pub fn new(api_token: impl Into<String>, user_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: PUSHOVER_ENDPOINT.to_string(),
            api_token: api_token.into(),
            user_key: user_key.into(),
        }
    }

    /// Point the sink at a different messages URL (self-hosted relay, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Build from the `[alerts]` config section. Both credentials are
    /// required.
    pub fn from_config(config: &AlertsConfig) -> Result<Self, AlertError> {
        let token = config
            .pushover_api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AlertError::NotConfigured("pushover_api_token"))?;
        let user = config
            .pushover_user_key
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(AlertError::NotConfigured("pushover_user_key"))?;
        Ok(Self::new(token, user).with_endpoint(config.endpoint.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AlertSink for PushoverSink {
    fn name(&self) -> &str {
        "pushover"
    }

    async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        let body = PushoverMessage {
            token: &self.api_token,
            user: &self.user_key,
            message: &alert.message,
            title: &alert.title,
        };

        let resp = self.client.post(&self.endpoint).json(&body).send().await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(AlertError::Rejected { status, body })
        }
    }
}
