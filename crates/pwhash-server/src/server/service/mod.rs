//! HTTP surface of the digest service.
//!
//! ## Structure
//!
//! - [`handler`] - Route table and request handlers.
//! - [`stats`] - Latency middleware feeding [`pwhash::RequestStats`].

pub mod handler;
pub mod stats;
