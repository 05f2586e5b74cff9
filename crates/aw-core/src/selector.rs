//! Compiled element match rules
//!
//! A `Selector` is the compiled form of one entry in an externally supplied
//! rule table (strict ad markup, site-specific vocabulary, player
//! containers). Matching is attribute-only and allocation-free; parsing the
//! textual form lives in the rules crate so tables stay hot-swappable
//! without touching the engine.

use crate::dom::ElementData;

// =============================================================================
// Attribute Matching
// =============================================================================

/// How an attribute value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// Attribute is present, value ignored.
    Exists,
    /// Value equals exactly.
    Equals,
    /// Value starts with.
    Prefix,
    /// Value contains.
    Contains,
}

/// One attribute condition of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: String,
    pub op: AttrOp,
    pub value: String,
    /// Case-insensitive value comparison (the `i` flag).
    pub case_insensitive: bool,
}

impl AttrMatch {
    fn matches(&self, el: &ElementData) -> bool {
        let value = match el.attr(&self.name) {
            Some(v) => v,
            None => return false,
        };
        if self.op == AttrOp::Exists {
            return true;
        }
        if self.case_insensitive {
            let value = value.to_ascii_lowercase();
            let wanted = self.value.to_ascii_lowercase();
            Self::compare(self.op, &value, &wanted)
        } else {
            Self::compare(self.op, value, &self.value)
        }
    }

    fn compare(op: AttrOp, value: &str, wanted: &str) -> bool {
        match op {
            AttrOp::Exists => true,
            AttrOp::Equals => value == wanted,
            AttrOp::Prefix => value.starts_with(wanted),
            AttrOp::Contains => value.contains(wanted),
        }
    }
}

// =============================================================================
// Selector
// =============================================================================

/// Compiled element selector: optional tag, required class tokens, optional
/// id, attribute conditions. All parts must hold for a match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub id: Option<String>,
    pub attrs: Vec<AttrMatch>,
}

impl Selector {
    /// Selector matching any element of the given tag.
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Self::default()
        }
    }

    /// Selector matching any element carrying the given class token.
    pub fn class(class: &str) -> Self {
        Self {
            classes: vec![class.to_string()],
            ..Self::default()
        }
    }

    pub fn matches(&self, el: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id_attr != *id {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| a.matches(el))
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// An ordered table of selectors; matches if any entry matches.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    selectors: Vec<Selector>,
}

impl RuleSet {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    pub fn matches(&self, el: &ElementData) -> bool {
        self.selectors.iter().any(|s| s.matches(el))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }

    pub fn push(&mut self, selector: Selector) {
        self.selectors.push(selector);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_and_class() {
        let sel = Selector {
            tag: Some("ins".to_string()),
            classes: vec!["adsbygoogle".to_string()],
            ..Selector::default()
        };
        let hit = ElementData::new("ins").with_class("adsbygoogle");
        let wrong_tag = ElementData::new("div").with_class("adsbygoogle");
        let wrong_class = ElementData::new("ins").with_class("content");
        assert!(sel.matches(&hit));
        assert!(!sel.matches(&wrong_tag));
        assert!(!sel.matches(&wrong_class));
    }

    #[test]
    fn test_class_token_not_substring() {
        let sel = Selector::class("ad");
        let el = ElementData::new("div").with_class("adsbygoogle");
        assert!(!sel.matches(&el));
    }

    #[test]
    fn test_attr_ops() {
        let exists = Selector {
            attrs: vec![AttrMatch {
                name: "data-ad-slot".to_string(),
                op: AttrOp::Exists,
                value: String::new(),
                case_insensitive: false,
            }],
            ..Selector::default()
        };
        let prefix = Selector {
            tag: Some("iframe".to_string()),
            attrs: vec![AttrMatch {
                name: "id".to_string(),
                op: AttrOp::Prefix,
                value: "google_ads_iframe".to_string(),
                case_insensitive: false,
            }],
            ..Selector::default()
        };
        let contains = Selector {
            tag: Some("iframe".to_string()),
            attrs: vec![AttrMatch {
                name: "src".to_string(),
                op: AttrOp::Contains,
                value: "doubleclick.net".to_string(),
                case_insensitive: false,
            }],
            ..Selector::default()
        };

        let slot = ElementData::new("div").with_attr("data-ad-slot", "123");
        assert!(exists.matches(&slot));
        assert!(!exists.matches(&ElementData::new("div")));

        let frame = ElementData::new("iframe")
            .with_attr("id", "google_ads_iframe_7")
            .with_attr("src", "https://ad.doubleclick.net/x");
        assert!(prefix.matches(&frame));
        assert!(contains.matches(&frame));
    }

    #[test]
    fn test_case_insensitive_value() {
        let sel = Selector {
            attrs: vec![AttrMatch {
                name: "aria-label".to_string(),
                op: AttrOp::Equals,
                value: "advertisement".to_string(),
                case_insensitive: true,
            }],
            ..Selector::default()
        };
        let el = ElementData::new("div").with_attr("aria-label", "Advertisement");
        assert!(sel.matches(&el));
    }

    #[test]
    fn test_rule_set_any_match() {
        let set = RuleSet::new(vec![Selector::tag("ins"), Selector::class("ytp-ad-module")]);
        assert!(set.matches(&ElementData::new("ins")));
        assert!(set.matches(&ElementData::new("div").with_class("ytp-ad-module")));
        assert!(!set.matches(&ElementData::new("div")));
        assert_eq!(set.len(), 2);
    }
}
