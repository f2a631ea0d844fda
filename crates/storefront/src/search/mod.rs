//! Catalog search for the overlay and the browse page.
//!
//! Matching is deliberately simple: the lowercased query must appear as a
//! substring of an experience's title, description or location. No
//! tokenizing, no ranking; matches keep catalog order. The overlay shows at
//! most [`MAX_SUGGESTIONS`] results and ignores queries shorter than
//! [`MIN_QUERY_CHARS`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogAccessor, Experience};

/// Shortest query the overlay reacts to.
pub const MIN_QUERY_CHARS: usize = 2;

/// Result cap for the overlay.
pub const MAX_SUGGESTIONS: usize = 5;

/// How many submitted queries the overlay remembers.
pub const MAX_RECENT_SEARCHES: usize = 3;

/// Quick links shown in the overlay before the visitor types anything.
pub const POPULAR_SEARCHES: [&str; 5] = ["Hot Air Balloon", "Dining", "Yacht", "Spa Day", "Adventure"];

/// Overlay suggestions for `query`: empty below two characters, otherwise
/// the first five matches in catalog order.
#[must_use]
pub fn suggest<'a>(catalog: &'a dyn CatalogAccessor, query: &str) -> Vec<&'a Experience> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    matching(catalog, query).take(MAX_SUGGESTIONS).collect()
}

/// Every experience matching `query`, for the browse page.
///
/// A blank query returns the whole catalog.
#[must_use]
pub fn browse<'a>(catalog: &'a dyn CatalogAccessor, query: &str) -> Vec<&'a Experience> {
    if query.trim().is_empty() {
        return catalog.get_all().iter().collect();
    }
    matching(catalog, query).collect()
}

fn matching<'a>(
    catalog: &'a dyn CatalogAccessor,
    query: &str,
) -> impl Iterator<Item = &'a Experience> + use<'a> {
    let needle = query.to_lowercase();
    catalog
        .get_all()
        .iter()
        .filter(move |experience| experience.matches(&needle))
}

/// Browse URL for a submitted query, or `None` when there is nothing to
/// search for after trimming.
#[must_use]
pub fn browse_url(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    Some(format!("/experiences?search={}", urlencoding::encode(query)))
}

/// Search overlay state: whether it is open and what has been typed.
///
/// Results are never stored; they are recomputed from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOverlay {
    open: bool,
    query: String,
}

impl SearchOverlay {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Current suggestions for the stored query.
    #[must_use]
    pub fn results<'a>(&self, catalog: &'a dyn CatalogAccessor) -> Vec<&'a Experience> {
        suggest(catalog, &self.query)
    }
}

/// Most-recent-first list of submitted queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearches(VecDeque<String>);

impl RecentSearches {
    /// Remember a submitted query, moving repeats (ignoring case) to the front.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let lowered = query.to_lowercase();
        self.0.retain(|existing| existing.to_lowercase() != lowered);
        self.0.push_front(query.to_string());
        self.0.truncate(MAX_RECENT_SEARCHES);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::catalog::fixtures::{catalog, experience};

    fn titles(results: &[&Experience]) -> Vec<String> {
        results.iter().map(|e| e.title.clone()).collect()
    }

    #[test]
    fn test_spa_finds_spa_day() {
        let catalog = catalog();
        let results = suggest(&catalog, "spa");
        assert_eq!(titles(&results), vec!["Spa Day"]);
    }

    #[test]
    fn test_single_character_returns_nothing() {
        let catalog = catalog();
        assert!(suggest(&catalog, "s").is_empty());
        assert!(suggest(&catalog, "").is_empty());
    }

    #[test]
    fn test_case_insensitive_and_location_match() {
        let catalog = catalog();
        let results = suggest(&catalog, "MUMBAI");
        assert_eq!(titles(&results), vec!["Sunset Yacht Cruise"]);
    }

    #[test]
    fn test_results_capped_at_five_in_catalog_order() {
        let experiences = (1..=8)
            .map(|i| experience(&format!("t{i}"), &format!("Tea Tasting {i}"), "Darjeeling", 10))
            .collect();
        let catalog = StaticCatalog::new(experiences).unwrap();

        let results = suggest(&catalog, "tea");
        assert_eq!(results.len(), MAX_SUGGESTIONS);
        let ids: Vec<&str> = results.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4", "t5"]);

        // The browse page is not capped.
        assert_eq!(browse(&catalog, "tea").len(), 8);
    }

    #[test]
    fn test_browse_blank_query_lists_catalog() {
        let catalog = catalog();
        assert_eq!(browse(&catalog, "  ").len(), 4);
    }

    #[test]
    fn test_browse_url() {
        assert_eq!(
            browse_url("  hot air balloon "),
            Some("/experiences?search=hot%20air%20balloon".to_string())
        );
        assert_eq!(browse_url("   "), None);
        assert_eq!(browse_url(""), None);
    }

    #[test]
    fn test_overlay_results_follow_query() {
        let catalog = catalog();
        let mut overlay = SearchOverlay::default();
        overlay.set_query("y");
        assert!(overlay.results(&catalog).is_empty());
        overlay.set_query("ya");
        assert_eq!(titles(&overlay.results(&catalog)), vec!["Sunset Yacht Cruise"]);
    }

    #[test]
    fn test_recent_searches_dedup_and_cap() {
        let mut recent = RecentSearches::default();
        recent.record("Spa");
        recent.record("Yacht");
        recent.record("spa");
        recent.record("Dining");
        recent.record("Balloon");
        recent.record("   ");

        let items: Vec<&str> = recent.iter().collect();
        assert_eq!(items, vec!["Balloon", "Dining", "spa"]);
    }
}
