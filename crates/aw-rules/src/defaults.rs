//! Bundled default rule tables
//!
//! Keep the selectors conservative: prefer network-level blocking and only
//! remove DOM elements we are fairly sure about. Everything here is data;
//! hosts may replace any table with an externally loaded one without
//! touching the engine.

use aw_core::selector::RuleSet;
use aw_core::sweep::SweepTables;

use crate::netrules::UrlFilterSet;
use crate::parser::parse_selector_list;

/// High-confidence third-party ad markup.
pub const STRICT_SELECTORS: &str = "\
! Google/AdSense
ins.adsbygoogle
div.adsbygoogle
iframe[id^='google_ads_iframe']
iframe[src*='doubleclick.net']
iframe[src*='googlesyndication.com']
iframe[src*='googleadservices.com']
iframe[src*='adservice.google.com']
[data-ad-client]
[data-ad-slot]
[data-ad-unit]
! Common accessibility labels
[aria-label='advertisement' i]
[aria-label='ads' i]
";

/// Exact-match vocabulary for the bundled video site's ad surfaces.
pub const SITE_SELECTORS: &str = "\
ytd-display-ad-renderer
ytd-promoted-sparkles-text-search-renderer
ytd-promoted-video-renderer
ytd-ad-slot-renderer
.ytd-video-masthead-ad-advertiser-info-renderer
.ytp-ad-module
.ytp-ad-overlay-slot
.ytp-ad-image-overlay
.ytp-ad-text-overlay
";

/// Containers whose subtrees are media players and must never be removed.
pub const PLAYER_SELECTORS: &str = "\
video
audio
#movie_player
.html5-video-player
.jwplayer
.video-js
";

/// Wildcard URL patterns for known ad-serving hosts and endpoints.
pub const BLOCKLIST_PATTERNS: &[&str] = &[
    "*://*.doubleclick.net/*",
    "*://*.googlesyndication.com/*",
    "*://*.googleadservices.com/*",
    "*://*.googletagmanager.com/*",
    "*://*.googletagservices.com/*",
    "*://*.adsense.com/*",
    "*://*.adservice.google.com/*",
    "*://*.g.doubleclick.net/*",
    "*://*.googlevideo.com/*adformat=*",
    "*://*.youtube.com/api/stats/ads*",
    "*://*.youtube.com/get_midroll_info*",
    "*://*.adform.net/*",
    "*://*.zedo.com/*",
    "*://*.taboola.com/*",
    "*://*.outbrain.com/*",
    "*://*.advertising.com/*",
    "*://*.criteo.com/*",
    "*://*.amazon-adsystem.com/*",
    "*://*.moatads.com/*",
    "*://*.pubmatic.com/*",
    "*://*.rubiconproject.com/*",
    "*://*.smartadserver.com/*",
    "*://*.serving-sys.com/*",
    "*://*.adsrvr.org/*",
    "*://*.popads.net/*",
    "*://*.propellerads.com/*",
    "*://*.onclickads.net/*",
];

pub fn strict_rules() -> RuleSet {
    parse_selector_list(STRICT_SELECTORS)
}

pub fn site_rules() -> RuleSet {
    parse_selector_list(SITE_SELECTORS)
}

pub fn player_rules() -> RuleSet {
    parse_selector_list(PLAYER_SELECTORS)
}

/// The engine's default tables.
pub fn default_tables() -> SweepTables {
    SweepTables {
        strict: strict_rules(),
        site: site_rules(),
        players: player_rules(),
    }
}

/// The default network-layer filter set.
pub fn default_url_filters() -> UrlFilterSet {
    UrlFilterSet::compile(BLOCKLIST_PATTERNS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw_core::dom::ElementData;
    use aw_core::types::ResourceType;

    #[test]
    fn test_bundled_tables_fully_parse() {
        assert_eq!(strict_rules().len(), 12);
        assert_eq!(site_rules().len(), 9);
        assert_eq!(player_rules().len(), 6);
    }

    #[test]
    fn test_strict_hits_known_markup() {
        let strict = strict_rules();
        assert!(strict.matches(&ElementData::new("ins").with_class("adsbygoogle")));
        assert!(strict.matches(
            &ElementData::new("iframe").with_attr("src", "https://x.googlesyndication.com/f")
        ));
        assert!(strict.matches(&ElementData::new("div").with_attr("data-ad-client", "ca-pub-1")));
        assert!(strict.matches(&ElementData::new("div").with_attr("aria-label", "Advertisement")));
        assert!(!strict.matches(&ElementData::new("div").with_class("content")));
    }

    #[test]
    fn test_default_url_filters_block_known_hosts() {
        let filters = default_url_filters();
        assert!(filters.matches("https://cdn.taboola.com/libtrc/x.js", ResourceType::SCRIPT));
        assert!(filters.matches(
            "https://www.youtube.com/api/stats/ads?ver=2",
            ResourceType::XMLHTTPREQUEST
        ));
        assert!(!filters.matches("https://www.youtube.com/watch?v=abc", ResourceType::MAIN_FRAME));
    }
}
