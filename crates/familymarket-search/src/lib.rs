//! Intent-guided multi-collection search.
//!
//! Pipeline per query: classify intent, fetch a bounded recent window of
//! each targeted collection (concurrently, failures isolated per
//! collection), drop listings outside their visible lifecycle state,
//! keep listings matching any of three relevance heuristics, truncate to
//! the display cap. No scoring, no ranking — survivor order is fetch
//! order.

pub mod engine;
pub mod filter;
pub mod matcher;

pub use engine::{run_search, search_with_analysis, SearchOutcome};
pub use matcher::{is_relevant, query_terms};
