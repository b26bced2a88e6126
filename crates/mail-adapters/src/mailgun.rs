//! Delivery through the Mailgun HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use configs::MailSettings;
use domains::{Delivery, Notification, Notifier};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::template::{render, RenderedMessage};

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
    message: String,
}

pub struct MailgunNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    sender: String,
    confirm_base_url: String,
}

impl MailgunNotifier {
    pub fn new(settings: &MailSettings) -> anyhow::Result<Self> {
        anyhow::ensure!(!settings.domain.is_empty(), "mail.domain is required for mailgun");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/{}/messages",
                settings.api_base.trim_end_matches('/'),
                settings.domain
            ),
            api_key: SecretString::from(settings.api_key.expose_secret().to_owned()),
            sender: settings.sender.clone(),
            confirm_base_url: settings.confirm_base_url.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form<'a>(&'a self, message: &'a RenderedMessage) -> [(&'static str, &'a str); 5] {
        [
            ("from", self.sender.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.text.as_str()),
            ("html", message.html.as_str()),
        ]
    }
}

#[async_trait]
impl Notifier for MailgunNotifier {
    #[instrument(skip(self, notification), fields(to = notification.recipient()))]
    async fn send(&self, notification: &Notification) -> anyhow::Result<Delivery> {
        let message = render(notification, &self.confirm_base_url)?;

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(self.api_key.expose_secret()))
            .form(&self.form(&message))
            .send()
            .await?
            .error_for_status()?
            .json::<SendResponse>()
            .await?;

        debug!(id = %response.id, "mailgun accepted message");
        Ok(Delivery {
            id: response.id,
            message: response.message,
        })
    }
}
