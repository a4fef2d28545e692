//! HTTP transport, configuration, and telemetry for the digest service.
//!
//! ## Structure
//!
//! - [`config`] - CLI / environment configuration.
//! - [`error`] - HTTP error mapping.
//! - [`service`] - Router, handlers, and the latency middleware.
//! - [`telemetry`] - `tracing` subscriber setup.
//! - [`validate`] - Request validation.

pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;
pub mod validate;
