//! LLM integration for the marketplace: intent classification for search
//! and best-effort assistant replies. External APIs only — no local model.
//!
//! Every call in this crate degrades to a documented fallback on failure;
//! nothing here surfaces an error to an end user.

pub mod classifier;
pub mod config;
pub mod providers;
pub mod reply;
pub mod types;

pub use classifier::classify_intent;
pub use config::LlmConfig;
pub use reply::{generate_reply, NO_RESULTS_REPLY, RESULTS_REPLY};
pub use types::*;
