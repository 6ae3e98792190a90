use async_trait::async_trait;
use std::future::Future;

use super::completion::{Completed, Completion};
use super::types::FlexRequest;
use crate::modules::Modules;

/// Callback invoked by the runtime adapter for one request
///
/// Side effects flow only through the returned [`Completed`], which can only
/// be produced by consuming the [`Completion`] handle.
#[async_trait]
pub trait FlexHandler: Send + Sync {
    async fn call(
        &self,
        request: FlexRequest,
        complete: Completion,
        modules: Modules,
    ) -> Completed;
}

#[async_trait]
impl<F, Fut> FlexHandler for F
where
    F: Fn(FlexRequest, Completion, Modules) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Completed> + Send + 'static,
{
    async fn call(
        &self,
        request: FlexRequest,
        complete: Completion,
        modules: Modules,
    ) -> Completed {
        (self)(request, complete, modules).await
    }
}
