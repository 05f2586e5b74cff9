//! Network-layer URL filter compilation
//!
//! The blocklist vocabulary is wildcard match patterns of the form
//! `*://*.doubleclick.net/*`. Installation into an actual network filter
//! is the host's business; here they are derived into deduplicated
//! substring filters, and the compiled set implements the engine's
//! `ResourcePolicy` so the DOM side can ask whether a resource would have
//! been allowed to load.

use std::collections::HashSet;

use aw_core::types::{ResourcePolicy, ResourceType};

/// One compiled URL filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFilter {
    /// Substring the URL must contain.
    pub filter: String,
    /// Resource types the filter applies to.
    pub types: ResourceType,
}

/// Derive the substring filter from a wildcard pattern.
///
/// Keeps paths when present (for granular matches like ad endpoints on an
/// otherwise legitimate host). Returns `None` for patterns that reduce to
/// nothing.
pub fn derive_url_filter(pattern: &str) -> Option<String> {
    let without_scheme = pattern.strip_prefix("*://").unwrap_or(pattern);
    let without_wildcard_subdomain = without_scheme
        .strip_prefix("*.")
        .unwrap_or(without_scheme);
    let filter: String = without_wildcard_subdomain
        .chars()
        .filter(|&c| c != '*')
        .collect();
    let filter = filter.trim().to_string();
    if filter.is_empty() {
        None
    } else {
        Some(filter)
    }
}

/// A compiled set of URL filters.
#[derive(Debug, Clone, Default)]
pub struct UrlFilterSet {
    filters: Vec<UrlFilter>,
}

impl UrlFilterSet {
    /// Compile a pattern list, deduplicating derived filters.
    pub fn compile(patterns: &[&str]) -> Self {
        Self::compile_with_types(patterns, ResourceType::ALL)
    }

    pub fn compile_with_types(patterns: &[&str], types: ResourceType) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut filters = Vec::new();
        for pattern in patterns {
            let filter = match derive_url_filter(pattern) {
                Some(f) => f,
                None => {
                    log::warn!("blocklist pattern derives to nothing: {pattern}");
                    continue;
                }
            };
            if seen.insert(filter.clone()) {
                filters.push(UrlFilter { filter, types });
            }
        }
        Self { filters }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether any filter matches the URL for the given resource type.
    pub fn matches(&self, url: &str, resource_type: ResourceType) -> bool {
        self.filters
            .iter()
            .any(|f| f.types.intersects(resource_type) && url.contains(&f.filter))
    }
}

impl ResourcePolicy for UrlFilterSet {
    fn should_load(&self, url: &str, resource_type: ResourceType) -> bool {
        !self.matches(url, resource_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_url_filter() {
        assert_eq!(
            derive_url_filter("*://*.doubleclick.net/*"),
            Some("doubleclick.net/".to_string())
        );
        assert_eq!(
            derive_url_filter("*://*.youtube.com/api/stats/ads*"),
            Some("youtube.com/api/stats/ads".to_string())
        );
        assert_eq!(
            derive_url_filter("*://*.googlevideo.com/*adformat=*"),
            Some("googlevideo.com/adformat=".to_string())
        );
        assert_eq!(derive_url_filter("*://*"), None);
        assert_eq!(derive_url_filter(""), None);
    }

    #[test]
    fn test_compile_dedupes() {
        let set = UrlFilterSet::compile(&[
            "*://*.doubleclick.net/*",
            "*://doubleclick.net/*",
            "*://*.taboola.com/*",
        ]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_should_load() {
        let set = UrlFilterSet::compile(&["*://*.doubleclick.net/*", "*://*.taboola.com/*"]);
        assert!(!set.should_load(
            "https://ad.doubleclick.net/ddm/adj/x",
            ResourceType::SUBDOCUMENT
        ));
        assert!(set.should_load("https://example.com/page", ResourceType::SUBDOCUMENT));
    }

    #[test]
    fn test_type_mask_restricts() {
        let set = UrlFilterSet::compile_with_types(
            &["*://*.doubleclick.net/*"],
            ResourceType::SCRIPT | ResourceType::SUBDOCUMENT,
        );
        assert!(set.matches("https://ad.doubleclick.net/x", ResourceType::SCRIPT));
        assert!(!set.matches("https://ad.doubleclick.net/x", ResourceType::IMAGE));
    }
}
