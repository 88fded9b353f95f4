//! Core data types for city weather lookups
//!
//! This crate provides the flattened weather record, the sink abstraction
//! each record is appended through, and the small validation/preference
//! vocabulary shared by the client and the HTTP surface.

pub mod city;
pub mod prefs;
pub mod sink;
pub mod types;

pub use city::*;
pub use prefs::*;
pub use sink::*;
pub use types::*;
