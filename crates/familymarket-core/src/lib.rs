//! Family Market core — configuration and error types shared by all services.

pub mod config;
pub mod error;

pub use config::{BillingSettings, FamilyMarketConfig, FirestoreSettings, SearchLimits};
pub use error::{Error, Result};
