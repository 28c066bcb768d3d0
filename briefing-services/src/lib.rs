//! Orchestration for the daily briefing
//!
//! This crate ties the feed and model crates together: configuration,
//! reconciliation of model output, publishing, and the run itself.

pub mod config;
pub mod pipeline;
pub mod publisher;
pub mod reconciler;

pub use config::{PipelineConfig, RevalidationConfig};
pub use pipeline::BriefingPipeline;
pub use publisher::{write_briefing, RevalidationClient, RevalidationOutcome};
pub use reconciler::{ClockCorrections, Reconciler};
