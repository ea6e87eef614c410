pub mod adapter;
pub mod client;
pub mod facade;
pub mod format;
pub mod orchestrator;
pub mod stats;

pub use crate::domain::model::{Domain, ExternalQuery, NormalizedResult, Record};
pub use crate::utils::error::Result;
