use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::traits::FlexHandler;
use super::types::DataEvent;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("collection name must not be empty")]
    EmptyCollectionName,
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
    #[error("function already registered: {0}")]
    DuplicateFunction(String),
    #[error("auth provider already registered: {0}")]
    DuplicateAuthProvider(String),
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    #[error("collection '{collection}' has no handler for {event}")]
    EventNotRegistered { collection: String, event: DataEvent },
    #[error("function not found: {0}")]
    FunctionNotFound(String),
    #[error("auth provider not found: {0}")]
    AuthProviderNotFound(String),
}

type HandlerRef = Arc<dyn FlexHandler>;

/// Append-only registration surface used during start-up
///
/// Nothing can be dispatched from a builder; call [`RegistryBuilder::build`]
/// to obtain the immutable [`HandlerRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    data: BTreeMap<String, BTreeMap<DataEvent, HandlerRef>>,
    functions: BTreeMap<String, HandlerRef>,
    auth: BTreeMap<String, HandlerRef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to one data event of a collection. A second handler
    /// for the same pair replaces the first.
    pub fn register_data_handler(
        &mut self,
        collection: impl Into<String>,
        event: DataEvent,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        let collection = collection.into();
        if collection.is_empty() {
            return Err(RegistryError::EmptyCollectionName);
        }

        let events = self.data.entry(collection.clone()).or_default();
        if events.insert(event, Arc::new(handler)).is_some() {
            warn!(%collection, %event, "Replacing existing data handler");
        } else {
            debug!(%collection, %event, "Data handler registered");
        }

        Ok(self)
    }

    pub fn register_function(
        &mut self,
        name: impl Into<String>,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName("function"));
        }
        if self.functions.contains_key(&name) {
            return Err(RegistryError::DuplicateFunction(name));
        }

        debug!(function = %name, "Function registered");
        self.functions.insert(name, Arc::new(handler));
        Ok(self)
    }

    pub fn register_auth_provider(
        &mut self,
        name: impl Into<String>,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName("auth provider"));
        }
        if self.auth.contains_key(&name) {
            return Err(RegistryError::DuplicateAuthProvider(name));
        }

        debug!(auth_provider = %name, "Auth provider registered");
        self.auth.insert(name, Arc::new(handler));
        Ok(self)
    }

    /// Handle for binding several events of one collection
    pub fn service_object(&mut self, collection: impl Into<String>) -> ServiceObject<'_> {
        ServiceObject {
            builder: self,
            collection: collection.into(),
        }
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            data: self.data,
            functions: self.functions,
            auth: self.auth,
        }
    }
}

/// Collection-scoped view over a [`RegistryBuilder`]
pub struct ServiceObject<'a> {
    builder: &'a mut RegistryBuilder,
    collection: String,
}

impl ServiceObject<'_> {
    pub fn on(
        &mut self,
        event: DataEvent,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.builder
            .register_data_handler(self.collection.clone(), event, handler)?;
        Ok(self)
    }

    pub fn on_get_by_id(
        &mut self,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.on(DataEvent::FetchOne, handler)
    }

    pub fn on_get_all(
        &mut self,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.on(DataEvent::FetchAll, handler)
    }

    pub fn on_insert(
        &mut self,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.on(DataEvent::Create, handler)
    }

    pub fn on_update(
        &mut self,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.on(DataEvent::Update, handler)
    }

    pub fn on_delete_by_id(
        &mut self,
        handler: impl FlexHandler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.on(DataEvent::Delete, handler)
    }
}

/// Immutable registry consulted by the runtime adapter
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    data: BTreeMap<String, BTreeMap<DataEvent, HandlerRef>>,
    functions: BTreeMap<String, HandlerRef>,
    auth: BTreeMap<String, HandlerRef>,
}

impl HandlerRegistry {
    pub fn data_handler(
        &self,
        collection: &str,
        event: DataEvent,
    ) -> Result<Arc<dyn FlexHandler>, RegistryError> {
        let events = self
            .data
            .get(collection)
            .ok_or_else(|| RegistryError::CollectionNotFound(collection.to_string()))?;

        events
            .get(&event)
            .cloned()
            .ok_or_else(|| RegistryError::EventNotRegistered {
                collection: collection.to_string(),
                event,
            })
    }

    pub fn function(&self, name: &str) -> Result<Arc<dyn FlexHandler>, RegistryError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::FunctionNotFound(name.to_string()))
    }

    pub fn auth_provider(&self, name: &str) -> Result<Arc<dyn FlexHandler>, RegistryError> {
        self.auth
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::AuthProviderNotFound(name.to_string()))
    }

    pub fn describe(&self) -> RegistrySummary {
        RegistrySummary {
            data: self
                .data
                .iter()
                .map(|(collection, events)| (collection.clone(), events.keys().copied().collect()))
                .collect(),
            functions: self.functions.keys().cloned().collect(),
            auth_providers: self.auth.keys().cloned().collect(),
        }
    }
}

/// Names registered per category
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistrySummary {
    pub data: BTreeMap<String, Vec<DataEvent>>,
    pub functions: Vec<String>,
    pub auth_providers: Vec<String>,
}
