//! The Classifier
//!
//! Pure element classification: no scheduling, no removal, no side effects.
//! Callers bound how many elements pass through here per cycle, because the
//! geometry read at the end of the heuristic costs a layout.

use crate::dom::{DomTree, NodeId};
use crate::selector::RuleSet;
use crate::types::{ResourcePolicy, ResourceType, Verdict};

/// Everything classification needs beyond the element itself.
pub struct ClassifyContext<'a> {
    /// High-confidence structural signatures, removed unconditionally.
    pub strict: &'a RuleSet,
    /// Media-player container vocabulary; anything scoped to a player is
    /// excluded from removal absolutely.
    pub players: &'a RuleSet,
    /// Network-layer filter, consulted for iframe sources.
    pub net_policy: Option<&'a dyn ResourcePolicy>,
    /// Minimum rendered area for a token-heuristic match.
    pub min_ad_area: f32,
}

/// Classify one element.
///
/// Order matters: strict signatures short-circuit to `DefiniteAd`; the
/// media exclusion is absolute and checked before any heuristic, because a
/// false-positive removal of a player breaks playback irrecoverably; the
/// token heuristic only counts with geometric confirmation. A stale handle
/// classifies as `NotAd`.
pub fn classify(doc: &DomTree, id: NodeId, ctx: &ClassifyContext<'_>) -> Verdict {
    let el = match doc.get(id) {
        Some(el) => el,
        None => return Verdict::NotAd,
    };

    if ctx.strict.matches(el) {
        return Verdict::DefiniteAd;
    }

    // Iframes sourced from a host the network layer would block are ads the
    // filter missed (e.g. loaded before rules were installed).
    if el.tag == "iframe" {
        if let (Some(policy), Some(src)) = (ctx.net_policy, el.attr("src")) {
            if !policy.should_load(src, ResourceType::SUBDOCUMENT) {
                return Verdict::DefiniteAd;
            }
        }
    }

    if is_media_protected(doc, id, ctx.players) {
        return Verdict::NotAd;
    }

    let token_hit =
        has_ad_token(&el.id_attr) || el.classes.iter().any(|c| has_ad_token(c));
    if !token_hit {
        return Verdict::NotAd;
    }

    // Zero area means not laid out yet; removal is still permitted. Small
    // but laid-out elements are icons/badges, a common false positive.
    let area = el.area();
    if area > 0.0 && area < ctx.min_ad_area {
        return Verdict::NotAd;
    }

    Verdict::LikelyAd
}

/// Whether `id` is, contains, or sits inside media playback machinery.
pub fn is_media_protected(doc: &DomTree, id: NodeId, players: &RuleSet) -> bool {
    let is_media_tag = |nid: NodeId| {
        doc.get(nid)
            .map(|el| el.tag == "video" || el.tag == "audio")
            .unwrap_or(false)
    };

    if is_media_tag(id) {
        return true;
    }
    if doc.descendants(id).any(is_media_tag) {
        return true;
    }
    // Player containers shield their whole subtree.
    let in_player = |nid: NodeId| doc.get(nid).map(|el| players.matches(el)).unwrap_or(false);
    in_player(id) || doc.ancestors(id).any(in_player)
}

// =============================================================================
// Token Heuristic
// =============================================================================

/// Whole-token match for "ad", "ads", "advert", "advertisement".
///
/// Token boundaries are start/end of string, space, hyphen, underscore.
/// Near-miss substrings ("header", "badge", "shadow", "load") fail by
/// construction.
pub fn has_ad_token(value: &str) -> bool {
    value
        .split(|c| c == ' ' || c == '-' || c == '_')
        .any(is_ad_token)
}

#[inline]
fn is_ad_token(token: &str) -> bool {
    token.eq_ignore_ascii_case("ad")
        || token.eq_ignore_ascii_case("ads")
        || token.eq_ignore_ascii_case("advert")
        || token.eq_ignore_ascii_case("advertisement")
}
