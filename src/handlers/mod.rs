//! Handler system for flex-starter
//!
//! Binds symbolic names to callbacks so the runtime adapter can dispatch
//! incoming platform requests to application code.
//!
//! ## Key Components
//!
//! - [`FlexHandler`] - Callback trait, implemented for async closures
//! - [`RegistryBuilder`] - Append-only registration surface used at start-up
//! - [`HandlerRegistry`] - Immutable lookup table handed to the adapter
//! - [`Completion`] - Builder for the single response of an invocation
//! - [`FlexRequest`] - Request context passed to handlers
//!
//! ## Example
//!
//! ```rust,ignore
//! use flex_starter::handlers::{RegistryBuilder, DataEvent};
//!
//! let mut builder = RegistryBuilder::new();
//! builder.service_object("CoolCollection").on_get_all(get_all_records)?;
//! builder.register_function("emailer", emailer)?;
//! let registry = builder.build();
//! ```

mod completion;
mod registry;
mod traits;
pub(crate) mod types;

pub use completion::{Completed, Completion};
pub use registry::{
    HandlerRegistry, RegistryBuilder, RegistryError, RegistrySummary, ServiceObject,
};
pub use traits::FlexHandler;
pub use types::{DataEvent, FlexRequest, ParamsMap};
