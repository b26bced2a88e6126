//! Development notifier: writes the message to the log instead of sending it.

use async_trait::async_trait;
use domains::{Delivery, Notification, Notifier};
use tracing::info;
use uuid::Uuid;

use crate::template::render;

pub struct LogNotifier {
    confirm_base_url: String,
}

impl LogNotifier {
    pub fn new(confirm_base_url: impl Into<String>) -> Self {
        Self {
            confirm_base_url: confirm_base_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> anyhow::Result<Delivery> {
        let message = render(notification, &self.confirm_base_url)?;
        let id = format!("<{}@log>", Uuid::new_v4());
        info!(%id, to = %message.to, subject = %message.subject, body = %message.text, "mail not sent, logged instead");
        Ok(Delivery {
            id,
            message: "Logged.".to_string(),
        })
    }
}
