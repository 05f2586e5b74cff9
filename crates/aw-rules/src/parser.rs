//! Selector list parser
//!
//! Parses the textual selector vocabulary into compiled `Selector`s. The
//! supported grammar is the subset the rule tables actually use:
//!
//! ```text
//! tag
//! .class            (repeatable)
//! #id
//! [attr]
//! [attr='value']
//! [attr^='value']
//! [attr*='value']
//! [attr='value' i]  (case-insensitive value)
//! ```
//!
//! List files are line-oriented; blank lines and `!` comments are skipped,
//! and unparsable lines are warned about and skipped rather than failing
//! the whole table.

use aw_core::selector::{AttrMatch, AttrOp, RuleSet, Selector};

/// Error type for selector parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectorParseError {
    #[error("empty selector")]
    Empty,
    #[error("empty class name")]
    EmptyClass,
    #[error("empty id")]
    EmptyId,
    #[error("unterminated attribute selector")]
    UnterminatedAttr,
    #[error("empty attribute name")]
    EmptyAttrName,
    #[error("unterminated quoted value")]
    UnterminatedQuote,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}

/// Parse one selector.
pub fn parse_selector(input: &str) -> Result<Selector, SelectorParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SelectorParseError::Empty);
    }

    let mut selector = Selector::default();
    let bytes = input.as_bytes();
    let mut pos = 0usize;

    // Leading tag name, if the selector doesn't start with a combinator.
    if !matches!(bytes[0], b'.' | b'#' | b'[') {
        let tag = take_ident(input, 0);
        if tag.is_empty() {
            return Err(SelectorParseError::UnexpectedChar(input.chars().next().unwrap_or('?')));
        }
        selector.tag = Some(tag.to_ascii_lowercase());
        pos = tag.len();
    }

    while pos < bytes.len() {
        match bytes[pos] {
            b'.' => {
                let name = take_ident(input, pos + 1);
                if name.is_empty() {
                    return Err(SelectorParseError::EmptyClass);
                }
                selector.classes.push(name.to_string());
                pos += 1 + name.len();
            }
            b'#' => {
                let name = take_ident(input, pos + 1);
                if name.is_empty() {
                    return Err(SelectorParseError::EmptyId);
                }
                selector.id = Some(name.to_string());
                pos += 1 + name.len();
            }
            b'[' => {
                let close = input[pos..]
                    .find(']')
                    .ok_or(SelectorParseError::UnterminatedAttr)?;
                let body = &input[pos + 1..pos + close];
                selector.attrs.push(parse_attr(body)?);
                pos += close + 1;
            }
            other => return Err(SelectorParseError::UnexpectedChar(other as char)),
        }
    }

    Ok(selector)
}

/// Identifier characters for tags, classes, and ids.
fn take_ident(input: &str, from: usize) -> &str {
    let rest = &input[from..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Parse the inside of `[...]`.
fn parse_attr(body: &str) -> Result<AttrMatch, SelectorParseError> {
    let body = body.trim();

    // Split off the operator, longest first.
    let (name, op, rest) = if let Some(pos) = body.find("^=") {
        (&body[..pos], AttrOp::Prefix, &body[pos + 2..])
    } else if let Some(pos) = body.find("*=") {
        (&body[..pos], AttrOp::Contains, &body[pos + 2..])
    } else if let Some(pos) = body.find('=') {
        (&body[..pos], AttrOp::Equals, &body[pos + 1..])
    } else {
        let name = body.trim();
        if name.is_empty() {
            return Err(SelectorParseError::EmptyAttrName);
        }
        return Ok(AttrMatch {
            name: name.to_string(),
            op: AttrOp::Exists,
            value: String::new(),
            case_insensitive: false,
        });
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(SelectorParseError::EmptyAttrName);
    }

    let rest = rest.trim();
    let (value, flags) = take_quoted(rest)?;
    let case_insensitive = flags.trim().eq_ignore_ascii_case("i");

    Ok(AttrMatch {
        name: name.to_string(),
        op,
        value: value.to_string(),
        case_insensitive,
    })
}

/// Split a possibly-quoted value from its trailing flags.
fn take_quoted(rest: &str) -> Result<(&str, &str), SelectorParseError> {
    let mut chars = rest.chars();
    match chars.next() {
        Some(q @ ('\'' | '"')) => {
            let inner = &rest[1..];
            let close = inner
                .find(q)
                .ok_or(SelectorParseError::UnterminatedQuote)?;
            Ok((&inner[..close], &inner[close + 1..]))
        }
        _ => {
            // Unquoted value runs to the first whitespace.
            match rest.find(char::is_whitespace) {
                Some(pos) => Ok((&rest[..pos], &rest[pos..])),
                None => Ok((rest, "")),
            }
        }
    }
}

/// Parse a whole selector list file into a rule set.
///
/// Invalid lines are skipped with a warning so one bad entry in an
/// externally updated table can't disable the rest.
pub fn parse_selector_list(text: &str) -> RuleSet {
    let mut set = RuleSet::default();
    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }
        match parse_selector(line) {
            Ok(selector) => set.push(selector),
            Err(err) => {
                log::warn!("skipping selector on line {}: {err} ({line})", lineno + 1);
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw_core::dom::ElementData;

    #[test]
    fn test_tag_class_forms() {
        let sel = parse_selector("ins.adsbygoogle").unwrap();
        assert_eq!(sel.tag.as_deref(), Some("ins"));
        assert_eq!(sel.classes, vec!["adsbygoogle"]);

        let sel = parse_selector(".ytp-ad-module").unwrap();
        assert_eq!(sel.tag, None);
        assert_eq!(sel.classes, vec!["ytp-ad-module"]);

        let sel = parse_selector("ytd-ad-slot-renderer").unwrap();
        assert_eq!(sel.tag.as_deref(), Some("ytd-ad-slot-renderer"));
        assert!(sel.classes.is_empty());

        let sel = parse_selector("#movie_player").unwrap();
        assert_eq!(sel.id.as_deref(), Some("movie_player"));
    }

    #[test]
    fn test_attr_forms() {
        let sel = parse_selector("[data-ad-client]").unwrap();
        assert_eq!(sel.attrs[0].op, AttrOp::Exists);
        assert_eq!(sel.attrs[0].name, "data-ad-client");

        let sel = parse_selector("iframe[id^='google_ads_iframe']").unwrap();
        assert_eq!(sel.tag.as_deref(), Some("iframe"));
        assert_eq!(sel.attrs[0].op, AttrOp::Prefix);
        assert_eq!(sel.attrs[0].value, "google_ads_iframe");

        let sel = parse_selector("iframe[src*='doubleclick.net']").unwrap();
        assert_eq!(sel.attrs[0].op, AttrOp::Contains);

        let sel = parse_selector("[aria-label='advertisement' i]").unwrap();
        assert_eq!(sel.attrs[0].op, AttrOp::Equals);
        assert!(sel.attrs[0].case_insensitive);
        assert!(sel.matches(&ElementData::new("div").with_attr("aria-label", "Advertisement")));
    }

    #[test]
    fn test_compound_selector() {
        let sel = parse_selector("div.adsbygoogle[data-ad-slot]").unwrap();
        let hit = ElementData::new("div")
            .with_class("adsbygoogle")
            .with_attr("data-ad-slot", "42");
        assert!(sel.matches(&hit));
        assert!(!sel.matches(&ElementData::new("div").with_class("adsbygoogle")));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_selector(""), Err(SelectorParseError::Empty));
        assert_eq!(parse_selector("."), Err(SelectorParseError::EmptyClass));
        assert_eq!(parse_selector("div["), Err(SelectorParseError::UnterminatedAttr));
        assert_eq!(
            parse_selector("[src*='oops]"),
            Err(SelectorParseError::UnterminatedQuote)
        );
        assert_eq!(parse_selector("[]"), Err(SelectorParseError::EmptyAttrName));
    }

    #[test]
    fn test_list_skips_bad_lines() {
        let text = "\
! strict ad markup
ins.adsbygoogle

div[
[data-ad-slot]
";
        let set = parse_selector_list(text);
        assert_eq!(set.len(), 2);
    }
}
