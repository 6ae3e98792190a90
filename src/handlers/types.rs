use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub type ParamsMap = BTreeMap<String, String>;

/// Data events a collection handler can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataEvent {
    FetchOne,
    FetchAll,
    Create,
    Update,
    Delete,
}

impl DataEvent {
    pub const ALL: [DataEvent; 5] = [
        DataEvent::FetchOne,
        DataEvent::FetchAll,
        DataEvent::Create,
        DataEvent::Update,
        DataEvent::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataEvent::FetchOne => "fetch_one",
            DataEvent::FetchAll => "fetch_all",
            DataEvent::Create => "create",
            DataEvent::Update => "update",
            DataEvent::Delete => "delete",
        }
    }
}

impl fmt::Display for DataEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request context handed to a handler for one invocation
///
/// Handlers may attach extra properties with [`FlexRequest::attach`]; they
/// serialize flattened next to the regular fields, so echoing the request
/// back as a body carries them along.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexRequest {
    pub request_id: String,
    pub method: String,
    #[serde(default)]
    pub received_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_object_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub query: ParamsMap,
    #[serde(default)]
    pub headers: ParamsMap,
    #[serde(default)]
    pub body: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlexRequest {
    pub fn new(request_id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            received_at: Utc::now(),
            ..Self::default()
        }
    }

    pub fn with_service_object(mut self, name: impl Into<String>) -> Self {
        self.service_object_name = Some(name.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Attach a property that is echoed with the request
    pub fn attach(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn attached(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
