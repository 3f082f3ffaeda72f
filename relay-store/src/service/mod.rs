//! Service layer
//!
//! Services hold the pipeline configuration lifecycle. They orchestrate
//! the key-value repository, identifier generation and the clock.
//!
//! Collaborators are trait objects so tests can substitute fakes.

mod identity;
mod pipeline_config;

// Re-export traits
pub use identity::{Clock, IdGenerator};

// Re-export implementations
pub use identity::{SystemClock, UuidGenerator};
pub use pipeline_config::{PIPELINE_CONFIG_BUCKET, PipelineConfigError, PipelineConfigStore};
