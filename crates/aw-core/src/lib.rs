//! AdWipe Core Library
//!
//! This crate provides the incremental DOM classification engine for the
//! AdWipe content cleaner. It decides which elements of a continuously
//! mutating document tree are advertising, removes them, and handles the
//! embedded media-player ad state with playback acceleration instead of
//! removal.
//!
//! # Architecture
//!
//! The engine is a second line of defense behind network-level blocking:
//! anything that reaches the document was already allowed to load, so the
//! DOM side can afford to be conservative. All work is driven by the host
//! through explicit calls with a millisecond timestamp; the engine owns no
//! threads and no OS timers.
//!
//! # Modules
//!
//! - `types`: shared type definitions, config, and collaborator traits
//! - `dom`: arena document tree and mutation batches
//! - `selector`: compiled element match rules and rule sets
//! - `classify`: the pure ad/not-ad classifier
//! - `collect`: mutation collector and pending-root queue
//! - `schedule`: debounce / idle-dispatch / pause scheduler
//! - `media`: media-player ad state machine
//! - `sweep`: bounded sweep executor
//! - `engine`: the per-document engine instance wiring it all together

pub mod types;
pub mod dom;
pub mod selector;
pub mod classify;
pub mod collect;
pub mod schedule;
pub mod media;
pub mod sweep;
pub mod engine;

// Re-export commonly used types
pub use types::{EngineConfig, Ms, RemovalEvent, ResourcePolicy, ResourceType, StatsSink, Verdict};
pub use dom::{DomTree, ElementData, MutationBatch, MutationRecord, NodeId};
pub use selector::{RuleSet, Selector};
pub use classify::classify;
pub use engine::{Engine, TickReport};
pub use media::MediaAdWatcher;
pub use sweep::SweepTables;
