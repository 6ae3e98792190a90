//! HTTP client handing email and push requests to the platform

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{EmailSender, ModuleError, PushSender, Result};

const EMAIL_PATH: &str = "email/send";
const PUSH_PATH: &str = "push/broadcast";

#[derive(Debug, Clone)]
pub struct BaasClient {
    client: Client,
    base_url: Option<String>,
}

impl BaasClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flex-starter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ModuleError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
        })
    }

    pub fn unconfigured() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
        }
    }

    async fn post(&self, module: &'static str, path: &str, payload: Value) -> Result<Value> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(ModuleError::NotConfigured(module))?;
        let url = format!("{base_url}/{path}");

        debug!(module, %url, "Sending module request");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ModuleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModuleError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ModuleError::RequestFailed(format!("failed to read body: {e}")))?;

        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[async_trait]
impl EmailSender for BaasClient {
    async fn send(&self, from: &str, to: &str, subject: &str, text: &str) -> Result<Value> {
        let payload = json!({
            "from": from,
            "to": to,
            "subject": subject,
            "body": text,
        });
        self.post("email", EMAIL_PATH, payload).await
    }
}

#[async_trait]
impl PushSender for BaasClient {
    async fn broadcast_message(&self, message: &str) -> Result<Value> {
        self.post("push", PUSH_PATH, json!({ "message": message })).await
    }
}
