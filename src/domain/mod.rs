//! Domain layer for the escalation engine
//!
//! This module contains core models and the ports the engine is written against.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
