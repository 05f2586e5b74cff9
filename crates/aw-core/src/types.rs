//! Core type definitions for AdWipe
//!
//! Shared types used throughout the engine, plus the traits through which
//! the engine talks to its external collaborators (network policy, usage
//! statistics).

// =============================================================================
// Time
// =============================================================================

/// Millisecond timestamp supplied by the host on every engine call.
///
/// The engine never reads a clock itself; the single cooperative scheduling
/// domain means "now" is whatever the host says it is.
pub type Ms = u64;

// =============================================================================
// Classification Verdict
// =============================================================================

/// Outcome of classifying one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Not advertising; leave the element alone.
    NotAd,
    /// Matched the token heuristic and passed the geometry gate.
    LikelyAd,
    /// Matched a strict selector or a known ad-serving source; no further
    /// heuristics are consulted.
    DefiniteAd,
}

impl Verdict {
    /// Whether this verdict calls for removing the element.
    #[inline]
    pub fn is_removable(self) -> bool {
        matches!(self, Self::DefiniteAd | Self::LikelyAd)
    }
}

// =============================================================================
// Resource Types (bit mask for the network policy interface)
// =============================================================================

bitflags::bitflags! {
    /// Resource type bit mask for the network-layer resource policy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceType: u32 {
        const OTHER = 1 << 0;
        const SCRIPT = 1 << 1;
        const IMAGE = 1 << 2;
        const STYLESHEET = 1 << 3;
        const SUBDOCUMENT = 1 << 4;  // iframe/frame
        const MAIN_FRAME = 1 << 5;   // main document
        const XMLHTTPREQUEST = 1 << 6;
        const WEBSOCKET = 1 << 7;
        const FONT = 1 << 8;
        const MEDIA = 1 << 9;
        const PING = 1 << 10;

        /// All resource types
        const ALL = 0x7FF;
        /// Document types (main_frame + sub_frame)
        const DOCUMENT = Self::MAIN_FRAME.bits() | Self::SUBDOCUMENT.bits();
    }
}

impl ResourceType {
    /// Parse from a browser resource type string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "main_frame" => Self::MAIN_FRAME,
            "sub_frame" => Self::SUBDOCUMENT,
            "stylesheet" => Self::STYLESHEET,
            "script" => Self::SCRIPT,
            "image" => Self::IMAGE,
            "font" => Self::FONT,
            "xmlhttprequest" => Self::XMLHTTPREQUEST,
            "ping" => Self::PING,
            "media" => Self::MEDIA,
            "websocket" => Self::WEBSOCKET,
            _ => Self::OTHER,
        }
    }
}

// =============================================================================
// Collaborator Interfaces
// =============================================================================

/// Network-layer URL filtering, as seen from the DOM engine.
///
/// The actual pattern compilation and installation live outside this crate;
/// the engine only ever asks "would this resource have been allowed to
/// load". It uses the answer to treat iframes with known ad-serving sources
/// as definite ads.
pub trait ResourcePolicy {
    /// Returns `false` if a request for `url` of the given type would be
    /// blocked at the network layer.
    fn should_load(&self, url: &str, resource_type: ResourceType) -> bool;
}

/// One removal, reported to the statistics collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalEvent {
    /// Host-supplied timestamp of the removal.
    pub at_ms: Ms,
    /// Origin host of the document the element was removed from.
    pub origin_host: String,
}

/// Sink for removal events, emitted once per successful detach.
pub trait StatsSink {
    fn record_removal(&mut self, event: &RemovalEvent);
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Tunable engine parameters.
///
/// The defaults are the empirically chosen values from field use; none of
/// them is known to be optimal, which is why they are configuration rather
/// than constants.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum rendered area (px²) for a token-heuristic match to count as
    /// an ad. Elements measuring below this are icons/badges, not slots.
    pub min_ad_area: f32,
    /// Quiet period required after a mutation burst before a flush runs.
    pub debounce_ms: Ms,
    /// Upper bound on how long a dispatched flush may wait for host idle
    /// time before running anyway.
    pub idle_timeout_ms: Ms,
    /// Pause applied when a disruptive transition (fullscreen, resize) is
    /// detected; geometry reads are unreliable while layout churns.
    pub disruption_pause_ms: Ms,
    /// Maximum pending roots drained per flush.
    pub max_roots_per_flush: usize,
    /// Maximum elements visited by the heuristic walk under one root.
    pub max_elements_per_root: usize,
    /// Minimum interval between whole-document strict sweeps.
    pub full_sweep_interval_ms: Ms,
    /// Interval of the media-ad poll, independent of the mutation path.
    pub media_poll_interval_ms: Ms,
    /// Playback rate forced while a player ad is showing.
    pub fast_forward_rate: f64,
    /// Tags eligible for the heuristic walk. Container-like elements only;
    /// walking every tag would blow the per-root budget on text-heavy pages.
    pub candidate_tags: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_ad_area: 15_000.0,
            debounce_ms: 200,
            idle_timeout_ms: 500,
            disruption_pause_ms: 900,
            max_roots_per_flush: 30,
            max_elements_per_root: 1200,
            full_sweep_interval_ms: 2000,
            media_poll_interval_ms: 500,
            fast_forward_rate: 8.0,
            candidate_tags: ["ins", "iframe", "div", "aside", "section"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl EngineConfig {
    /// Whether `tag` participates in the heuristic walk.
    #[inline]
    pub fn is_candidate_tag(&self, tag: &str) -> bool {
        self.candidate_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_from_str() {
        assert_eq!(ResourceType::from_str("sub_frame"), ResourceType::SUBDOCUMENT);
        assert_eq!(ResourceType::from_str("script"), ResourceType::SCRIPT);
        assert_eq!(ResourceType::from_str("weird"), ResourceType::OTHER);
    }

    #[test]
    fn test_default_config_candidate_tags() {
        let cfg = EngineConfig::default();
        assert!(cfg.is_candidate_tag("div"));
        assert!(cfg.is_candidate_tag("IFRAME"));
        assert!(!cfg.is_candidate_tag("span"));
    }

    #[test]
    fn test_verdict_removable() {
        assert!(Verdict::DefiniteAd.is_removable());
        assert!(Verdict::LikelyAd.is_removable());
        assert!(!Verdict::NotAd.is_removable());
    }
}
