//! Relevance matching: three independent heuristics joined by OR.
//!
//! A listing is relevant if a raw query term, an AI-extracted keyword,
//! or an AI-suggested category matches it. No score is computed; a
//! single hit on any heuristic retains the listing.

use familymarket_intent::IntentAnalysis;
use familymarket_store::Listing;

/// Tokenize the raw query: lowercase, whitespace-split, tokens of one
/// or two characters discarded.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// OR of the three heuristics against one listing.
pub fn is_relevant(listing: &Listing, terms: &[String], analysis: &IntentAnalysis) -> bool {
    let text = listing.search_text();

    matches_terms(&text, terms)
        || matches_keywords(&text, &analysis.palabras_clave)
        || matches_category(&listing.category, analysis.categories_for(listing.kind))
}

fn matches_terms(text: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| text.contains(term.as_str()))
}

fn matches_keywords(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| {
        let keyword = keyword.trim().to_lowercase();
        // An empty keyword is a substring of everything; never match on it.
        !keyword.is_empty() && text.contains(&keyword)
    })
}

fn matches_category(category: &str, suggestions: &[String]) -> bool {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        return false;
    }

    suggestions.iter().any(|suggestion| {
        let suggestion = suggestion.trim().to_lowercase();
        if suggestion.is_empty() {
            return false;
        }
        if category == suggestion
            || category.contains(&suggestion)
            || suggestion.contains(&category)
        {
            return true;
        }
        // Shared underscore-delimited token, e.g. "hogar_y_mantenimiento"
        // vs "mantenimiento_general".
        suggestion
            .split('_')
            .filter(|token| !token.is_empty())
            .any(|token| category.split('_').any(|c| c == token))
    })
}
