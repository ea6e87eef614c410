//! Region-scoped aggregation over three heterogeneous Korean public-sector
//! APIs (recruitment listings, apartment real-trade records, youth
//! policies), producing display-ready envelopes for a web front end.
//!
//! The interesting parts live in `core`: a per-call TLS fallback cascade,
//! one normalizing gateway adapter per provider, a concurrent fan-out
//! orchestrator that tolerates per-domain failure, and pure statistics and
//! formatting stages. Ranking, intent analysis and XML parsing are consumed
//! through the traits in `domain::ports`.

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{EndpointConfig, HubConfig};
pub use crate::core::facade::{ApiEnvelope, Collaborators, RegionHub};
pub use crate::core::orchestrator::{AggregationOrchestrator, DomainFilters, DomainLimits};
pub use crate::domain::model::{
    Domain, ExternalQuery, FetchStatus, Intent, NormalizedResult, Record,
};
pub use crate::utils::error::{HubError, Result};
