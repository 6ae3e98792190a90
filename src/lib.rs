pub mod api;
pub mod config;
pub mod handlers;
pub mod modules;
pub mod observability;
pub mod probe;
pub mod samples;
pub mod service;
