//! Small general-purpose helpers shared by pipeline logic

pub mod string_set;

pub use string_set::StringSet;
