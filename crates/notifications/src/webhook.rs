//! HTTP webhook publisher.

use std::time::Duration;

use async_trait::async_trait;

use crate::{NotificationPublisher, OrderStatusChanged, PublishError, Result};

/// Header carrying [`OrderStatusChanged::subject`].
pub const SUBJECT_HEADER: &str = "x-notification-subject";

/// Publisher that POSTs each notification as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    client: reqwest::Client,
    url: String,
}

impl WebhookPublisher {
    /// Creates a publisher for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Returns the target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationPublisher for WebhookPublisher {
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    async fn publish(&self, event: &OrderStatusChanged) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header(SUBJECT_HEADER, event.subject())
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Rejected(status.as_u16()));
        }

        tracing::debug!(status = status.as_u16(), "webhook accepted notification");
        Ok(())
    }
}
