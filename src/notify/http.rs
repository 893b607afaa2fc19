//! HTTP email provider.
//!
//! Posts one JSON request per message to a template-based email API
//! (EmailJS-style: service id, template id, public key, template params).

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{EmailMessage, NotificationSender, NotifyError};
use crate::config::NotificationConfig;

/// Email sender backed by an HTTP provider.
pub struct HttpEmailSender {
    client: reqwest::Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    api_key: String,
    from_name: String,
}

/// Provider request format.
#[derive(Debug, Serialize, PartialEq)]
struct EmailRequest {
    service_id: String,
    template_id: String,
    user_id: String,
    template_params: TemplateParams,
}

#[derive(Debug, Serialize, PartialEq)]
struct TemplateParams {
    to_email: String,
    from_name: String,
    subject: String,
    message: String,
    message_html: String,
}

impl HttpEmailSender {
    pub fn new(
        endpoint: String,
        service_id: String,
        template_id: String,
        api_key: String,
        from_name: String,
        timeout_seconds: u64,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            service_id,
            template_id,
            api_key,
            from_name,
        })
    }

    /// Build a sender from config, reading the key from the configured
    /// environment variable.
    pub fn from_config(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| NotifyError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(
            config.endpoint.clone(),
            config.service_id.clone(),
            config.template_id.clone(),
            api_key,
            config.from_name.clone(),
            config.timeout_seconds,
        )
    }

    fn build_request(&self, message: &EmailMessage) -> EmailRequest {
        EmailRequest {
            service_id: self.service_id.clone(),
            template_id: self.template_id.clone(),
            user_id: self.api_key.clone(),
            template_params: TemplateParams {
                to_email: message.to.clone(),
                from_name: self.from_name.clone(),
                subject: message.subject.clone(),
                message: message.text.clone(),
                message_html: message.html.clone(),
            },
        }
    }
}

#[async_trait]
impl NotificationSender for HttpEmailSender {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        debug!("Sending email to {} via {}", message.to, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.build_request(message))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Provider {
                status,
                message: body,
            });
        }

        Ok(())
    }
}
