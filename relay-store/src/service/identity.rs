//! Identity and time sources
//!
//! The store never calls `Uuid::new_v4` or `Utc::now` directly; it asks
//! these seams, which keeps stamping deterministic under test.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Produces identifiers unique across all calls for the lifetime of the system
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Source of the current UTC instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Random (v4) UUID identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
