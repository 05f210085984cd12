//! Room assignment engine for housing draws.
//!
//! The [`housing`] module holds the domain records, the entity store seam and the
//! assignment workflow (parse, validate, preview, commit). Configuration, telemetry and
//! the application error live alongside it so the API service can share them.

pub mod config;
pub mod error;
pub mod housing;
pub mod telemetry;
