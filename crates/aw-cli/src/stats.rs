//! Usage statistics
//!
//! The counting collaborator the engine emits removal events to, plus the
//! summary view. Persisted as JSON with the storage schema the browser
//! extension used (camelCase keys), so existing stats files keep working.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use aw_core::types::{RemovalEvent, StatsSink};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageStats {
    pub total_blocked: u64,
    pub session_blocked: u64,
    pub per_domain: HashMap<String, u64>,
    pub last_blocked: Option<String>,
    pub last_updated_at: Option<u64>,
}

impl UsageStats {
    pub fn record(&mut self, event: &RemovalEvent) {
        self.total_blocked += 1;
        self.session_blocked += 1;
        *self.per_domain.entry(event.origin_host.clone()).or_insert(0) += 1;
        self.last_blocked = Some(event.origin_host.clone());
        self.last_updated_at = Some(event.at_ms);
    }

    /// New session: the lifetime total persists, the session counter resets.
    pub fn start_session(&mut self) {
        self.session_blocked = 0;
    }

    /// Top domains by count, descending.
    pub fn top_domains(&self, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> =
            self.per_domain.iter().map(|(d, c)| (d.clone(), *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("Invalid stats file '{}': {}", path.display(), e))
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize stats: {}", e))?;
        fs::write(path, text)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
    }
}

/// Shared handle implementing the engine's sink trait, so the CLI can keep
/// reading the stats after handing the sink to the engine.
#[derive(Clone, Default)]
pub struct SharedStats(pub Rc<RefCell<UsageStats>>);

impl SharedStats {
    pub fn new(stats: UsageStats) -> Self {
        Self(Rc::new(RefCell::new(stats)))
    }

    pub fn snapshot(&self) -> UsageStats {
        self.0.borrow().clone()
    }
}

impl StatsSink for SharedStats {
    fn record_removal(&mut self, event: &RemovalEvent) {
        self.0.borrow_mut().record(event);
    }
}
