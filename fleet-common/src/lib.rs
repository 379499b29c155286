//! Shared types and ambient infrastructure for the inference fleet
//! control plane: the [`ServiceRecord`] data model, the stable error
//! envelope, logging setup, and HTTP client helpers.

pub mod duration_secs;
pub mod error;
pub mod http;
pub mod logging;
pub mod service;

pub use error::{ErrorEnvelope, FleetError};
pub use service::{now_iso, now_secs, HealthStatus, ServiceRecord, HEALTHY_WINDOW_SECS};
