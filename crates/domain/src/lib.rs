//! Medication Delivery Wizard Domain

/// Wizard session aggregate
pub mod wizard;

/// Delivery estimates
pub mod estimates;

/// Non-prescription product catalog
pub mod catalog;

/// Environment configuration
pub mod config;

/// Domain errors
pub mod errors;

pub use config::Settings;
pub use errors::{Error, FieldErrors};
