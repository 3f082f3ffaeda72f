//! Relay Core
//!
//! Core types for Relay pipeline configuration.
//!
//! This crate contains:
//! - Domain types: the pipeline and joint configuration model
//! - Utilities: small collections used by pipeline logic

pub mod domain;
pub mod util;
