//! Per-request capability handles (email, push)
//!
//! Handlers receive a [`Modules`] bundle on every invocation. Delivery itself
//! is owned by the platform; these traits only hand the message over.

mod http;

pub use http::BaasClient;

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("{0} module is not configured")]
    NotConfigured(&'static str),

    #[error("request to platform failed: {0}")]
    RequestFailed(String),

    #[error("platform rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl ModuleError {
    pub fn code(&self) -> &'static str {
        match self {
            ModuleError::NotConfigured(_) => "MODULE_NOT_CONFIGURED",
            ModuleError::RequestFailed(_) => "MODULE_REQUEST_FAILED",
            ModuleError::Rejected { .. } => "MODULE_REJECTED",
        }
    }

    /// JSON form placed in a completion body
    pub fn to_body(&self) -> Value {
        json!({
            "code": self.code(),
            "message": self.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, ModuleError>;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, from: &str, to: &str, subject: &str, text: &str) -> Result<Value>;
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn broadcast_message(&self, message: &str) -> Result<Value>;
}

/// Capability bundle injected into each handler call
#[derive(Clone)]
pub struct Modules {
    pub email: Arc<dyn EmailSender>,
    pub push: Arc<dyn PushSender>,
}

impl Modules {
    pub fn new(email: Arc<dyn EmailSender>, push: Arc<dyn PushSender>) -> Self {
        Self { email, push }
    }

    /// Bundle backed by a single platform client
    pub fn from_client(client: BaasClient) -> Self {
        let client = Arc::new(client);
        Self {
            email: client.clone(),
            push: client,
        }
    }

    /// Bundle whose every call fails with [`ModuleError::NotConfigured`]
    pub fn unconfigured() -> Self {
        Self::from_client(BaasClient::unconfigured())
    }
}
