//! Search orchestration: classify, fetch, filter, match, truncate.

use familymarket_core::SearchLimits;
use familymarket_intent::{classify_intent, IntentAnalysis, LlmConfig};
use familymarket_store::{Listing, ListingKind, SearchResult, StoreBackend};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::filter::visible_only;
use crate::matcher::{is_relevant, query_terms};

/// Result of one search: the analysis that guided it plus the surviving
/// listings per collection. Collections outside the target set stay
/// empty arrays, never absent.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub analysis: IntentAnalysis,
    pub productos: Vec<Listing>,
    pub servicios: Vec<Listing>,
    pub empleos: Vec<Listing>,
}

impl SearchOutcome {
    pub fn list(&self, kind: ListingKind) -> &Vec<Listing> {
        match kind {
            ListingKind::Producto => &self.productos,
            ListingKind::Servicio => &self.servicios,
            ListingKind::Empleo => &self.empleos,
        }
    }

    fn list_mut(&mut self, kind: ListingKind) -> &mut Vec<Listing> {
        match kind {
            ListingKind::Producto => &mut self.productos,
            ListingKind::Servicio => &mut self.servicios,
            ListingKind::Empleo => &mut self.empleos,
        }
    }

    pub fn total(&self) -> usize {
        self.productos.len() + self.servicios.len() + self.empleos.len()
    }

    /// Merge all collections into one type-tagged list for the chat
    /// client, in collection order then fetch order.
    pub fn tagged_results(&self) -> Vec<SearchResult> {
        ListingKind::ALL
            .iter()
            .flat_map(|kind| self.list(*kind).iter().cloned().map(SearchResult::new))
            .collect()
    }
}

/// Classify the query, then run the pipeline with the resulting analysis.
pub async fn run_search(
    store: &StoreBackend,
    http: &reqwest::Client,
    llm: &LlmConfig,
    limits: &SearchLimits,
    query: &str,
    cap: usize,
) -> SearchOutcome {
    let analysis = classify_intent(http, llm, query).await;
    search_with_analysis(store, limits, query, cap, analysis).await
}

/// Run the pipeline with an already-built analysis. Per-collection
/// fetches run concurrently; a failed fetch empties only that
/// collection's list.
pub async fn search_with_analysis(
    store: &StoreBackend,
    limits: &SearchLimits,
    query: &str,
    cap: usize,
    analysis: IntentAnalysis,
) -> SearchOutcome {
    let terms = query_terms(query);
    let targets = analysis.targets();

    let windows = join_all(
        targets
            .iter()
            .map(|kind| fetch_window(store, *kind, limits.fetch_window)),
    )
    .await;

    let mut outcome = SearchOutcome {
        analysis,
        ..Default::default()
    };

    for (kind, window) in targets.into_iter().zip(windows) {
        let survivors: Vec<Listing> = visible_only(window)
            .into_iter()
            .filter(|listing| is_relevant(listing, &terms, &outcome.analysis))
            .take(cap)
            .collect();

        debug!("{}: {} relevant listings", kind, survivors.len());
        *outcome.list_mut(kind) = survivors;
    }

    outcome
}

async fn fetch_window(store: &StoreBackend, kind: ListingKind, window: usize) -> Vec<Listing> {
    match store.fetch_listings(kind, window).await {
        Ok(listings) => listings,
        Err(e) => {
            warn!("Fetching {} failed, collection left empty: {e}", kind);
            Vec::new()
        }
    }
}
