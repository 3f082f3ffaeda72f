//! Core domain types
//!
//! The configuration entities persisted by the store. These carry no
//! persistence logic of their own; that lives in `relay-store`.

pub mod pipeline;

pub use pipeline::{JointConfig, Parameters, Phrase, PipelineConfig};
