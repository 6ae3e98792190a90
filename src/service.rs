//! Service bootstrap
//!
//! [`service`] validates the start-up options and returns the [`Flex`]
//! capability handle through which every registration happens. Once
//! registration is finished, [`Flex::into_parts`] freezes the registry.

use thiserror::Error;
use tracing::info;

use crate::handlers::{HandlerRegistry, RegistryBuilder};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("shared secret is missing; set FLEX_SHARED_SECRET")]
    MissingSharedSecret,
}

#[derive(Debug, Clone, Default)]
pub struct FlexOptions {
    /// Must match the secret configured for this service on the platform
    pub shared_secret: String,
}

impl FlexOptions {
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
        }
    }
}

/// Capability handle returned by [`service`]
pub struct Flex {
    shared_secret: String,
    registry: RegistryBuilder,
}

impl Flex {
    pub fn shared_secret(&self) -> &str {
        &self.shared_secret
    }

    pub fn registry(&mut self) -> &mut RegistryBuilder {
        &mut self.registry
    }

    pub fn into_parts(self) -> (String, HandlerRegistry) {
        (self.shared_secret, self.registry.build())
    }
}

pub fn service(options: FlexOptions) -> Result<Flex, InitError> {
    if options.shared_secret.trim().is_empty() {
        return Err(InitError::MissingSharedSecret);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Flex service initialized");

    Ok(Flex {
        shared_secret: options.shared_secret,
        registry: RegistryBuilder::new(),
    })
}
