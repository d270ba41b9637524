//! HTTP client for the storefront's notification endpoints.
//!
//! Both endpoints take JSON and answer 2xx on success, optionally with a
//! `{"success": bool, "error": string}` body.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;

use super::Notifier;
use super::error::NotifyError;
use super::types::{DispatchResponse, EmailTrigger, WhatsAppMessage};
use crate::config::NotifyConfig;

/// Path of the email automation trigger endpoint.
const EMAIL_PATH: &str = "api/email";

/// Path of the WhatsApp send endpoint.
const WHATSAPP_PATH: &str = "api/whatsapp";

/// Notifier that POSTs to `/api/email` and `/api/whatsapp`.
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    email_url: Url,
    whatsapp_url: Url,
}

impl std::fmt::Debug for HttpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNotifier")
            .field("email_url", &self.email_url.as_str())
            .field("whatsapp_url", &self.whatsapp_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpNotifier {
    /// Create a notifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value, the endpoint
    /// URLs cannot be derived, or the HTTP client fails to build.
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| NotifyError::Config(format!("Invalid API token format: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            email_url: endpoint(&config.base_url, EMAIL_PATH)?,
            whatsapp_url: endpoint(&config.base_url, WHATSAPP_PATH)?,
        })
    }

    async fn post<T>(&self, url: &Url, body: &T) -> Result<(), NotifyError>
    where
        T: serde::Serialize + Sync,
    {
        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: DispatchResponse = serde_json::from_str(&text).unwrap_or_default();
        if parsed.success == Some(false) {
            return Err(NotifyError::Rejected(
                parsed.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        debug!(url = %url, status = status.as_u16(), "Notification accepted");
        Ok(())
    }
}

impl Notifier for HttpNotifier {
    #[instrument(
        skip(self, trigger),
        fields(trigger = %trigger.trigger, user_id = %trigger.data.user_id)
    )]
    async fn trigger_email(&self, trigger: &EmailTrigger) -> Result<(), NotifyError> {
        self.post(&self.email_url, trigger).await
    }

    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send_whatsapp(&self, message: &WhatsAppMessage) -> Result<(), NotifyError> {
        self.post(&self.whatsapp_url, message).await
    }
}

/// Join an endpoint path onto the base URL, keeping any base path prefix.
fn endpoint(base: &Url, path: &str) -> Result<Url, NotifyError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .map_err(|e| NotifyError::Config(format!("Invalid endpoint URL for {path}: {e}")))
}
