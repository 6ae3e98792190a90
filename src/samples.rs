//! Sample handlers shipped with the starter service
//!
//! These return hard-coded data. A real service would make outbound calls to
//! fetch the record, send mail or push notifications.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use crate::handlers::{
    Completed, Completion, FlexHandler, FlexRequest, RegistryBuilder, RegistryError,
};
use crate::modules::Modules;

pub const SAMPLE_COLLECTION: &str = "CoolCollection";
pub const NOT_FOUND_MESSAGE: &str = "The entity could not be found";

/// Options for [`register_samples`]
#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub business_logic_delay: Duration,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            business_logic_delay: Duration::from_millis(2000),
        }
    }
}

pub fn sample_record() -> Value {
    json!({ "some": 15, "data": 25 })
}

/// Data handler that echoes the request with a looked-up record attached
#[derive(Debug, Clone)]
pub struct RecordEcho {
    name: &'static str,
    record: Option<Value>,
}

impl RecordEcho {
    pub fn new(name: &'static str, record: Option<Value>) -> Self {
        Self { name, record }
    }

    pub fn get_all_records() -> Self {
        Self::new("getAllRecords", Some(sample_record()))
    }

    pub fn get_record_by_id() -> Self {
        Self::new("getRecordById", Some(sample_record()))
    }
}

#[async_trait]
impl FlexHandler for RecordEcho {
    async fn call(
        &self,
        mut request: FlexRequest,
        complete: Completion,
        _modules: Modules,
    ) -> Completed {
        info!(handler = self.name, request_id = %request.request_id, "SDK request received");

        let Some(record) = self.record.clone() else {
            return complete.set_body(NOT_FOUND_MESSAGE).not_found().next();
        };

        request.attach("responseObject", record);
        request.attach("serviceVersion", json!(env!("CARGO_PKG_VERSION")));
        request.attach("runtimeVersion", runtime_version());

        info!(handler = self.name, "Preparing to return");
        complete.set_body(request.to_value()).ok().next()
    }
}

fn runtime_version() -> Value {
    json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
    })
}

/// Business logic that waits, then ends the hook chain
#[derive(Debug, Clone)]
pub struct DelayedEcho {
    delay: Duration,
}

impl DelayedEcho {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl FlexHandler for DelayedEcho {
    async fn call(
        &self,
        request: FlexRequest,
        complete: Completion,
        _modules: Modules,
    ) -> Completed {
        tokio::time::sleep(self.delay).await;
        complete.set_body(request.to_value()).ok().done()
    }
}

pub async fn emailer(_request: FlexRequest, complete: Completion, modules: Modules) -> Completed {
    match modules
        .email
        .send("my-app@my-app.com", "sam@kinvey.com", "Test", "Test")
        .await
    {
        Ok(_) => {
            info!("Email sent without issue");
            complete.ok().next()
        }
        Err(err) => {
            error!(error = %err, "Email send failed");
            complete.set_body(err.to_body()).runtime_error().next()
        }
    }
}

pub async fn pusher(_request: FlexRequest, complete: Completion, modules: Modules) -> Completed {
    match modules.push.broadcast_message("bcast!").await {
        Ok(_) => {
            info!("Push sent without issue");
            complete.ok().next()
        }
        Err(err) => {
            error!(error = %err, "Push broadcast failed");
            complete.set_body(err.to_body()).runtime_error().next()
        }
    }
}

/// Auth provider returning a random opaque token
pub async fn authenticate(
    _request: FlexRequest,
    complete: Completion,
    _modules: Modules,
) -> Completed {
    let token = Uuid::new_v4().simple().to_string();
    complete.set_token(token).ok().next()
}

/// Register every sample handler
pub fn register_samples(
    registry: &mut RegistryBuilder,
    options: &SampleOptions,
) -> Result<(), RegistryError> {
    registry
        .service_object(SAMPLE_COLLECTION)
        .on_get_by_id(RecordEcho::get_record_by_id())?
        .on_get_all(RecordEcho::get_all_records())?;

    registry.register_auth_provider("myAuth", authenticate)?;

    registry
        .register_function(
            "sampleBusinessLogic",
            DelayedEcho::new(options.business_logic_delay),
        )?
        .register_function("pusher", pusher)?
        .register_function("emailer", emailer)?;

    Ok(())
}
