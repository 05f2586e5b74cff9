//! AdWipe rule compilation
//!
//! Compiles the externally supplied, hot-swappable rule vocabularies into
//! the engine's compiled tables:
//!
//! - element selector lists (strict ad markup, site-specific vocabulary,
//!   player containers) via `parser`
//! - wildcard URL blocklist patterns into the network-layer resource
//!   policy via `netrules`
//!
//! `defaults` carries the bundled tables the engine ships with.

pub mod defaults;
pub mod netrules;
pub mod parser;

pub use netrules::{derive_url_filter, UrlFilter, UrlFilterSet};
pub use parser::{parse_selector, parse_selector_list, SelectorParseError};
