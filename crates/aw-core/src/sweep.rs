//! Sweep Executor
//!
//! Consumes pending roots and performs the actual classification and
//! removal. Cost is bounded structurally rather than by time-slicing:
//! at most `max_roots_per_flush` roots per flush, at most
//! `max_elements_per_root` elements walked per root, and the whole-document
//! pass is rate-limited and strict-only. Partial coverage is acceptable;
//! anything missed is caught by the next mutation touching the subtree or
//! by the periodic full pass.

use crate::classify::{classify, ClassifyContext};
use crate::collect::MutationCollector;
use crate::dom::{DomTree, NodeId};
use crate::selector::RuleSet;
use crate::types::{EngineConfig, Ms, ResourcePolicy};

/// The three externally supplied rule tables.
#[derive(Debug, Clone, Default)]
pub struct SweepTables {
    /// High-confidence ad markup, removed unconditionally.
    pub strict: RuleSet,
    /// Site-specific exact-match vocabulary, removed unconditionally.
    pub site: RuleSet,
    /// Player containers, shielding their subtrees from removal.
    pub players: RuleSet,
}

/// What one flush did.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub roots_processed: usize,
    /// Elements run through the heuristic classifier.
    pub elements_classified: usize,
    /// Successfully detached elements, in removal order.
    pub removed: Vec<NodeId>,
    /// Roots whose heuristic walk hit the per-root cap.
    pub capped_roots: usize,
    /// Whether the rate-limited whole-document pass ran.
    pub full_pass: bool,
}

/// Executes flushes; holds the full-sweep rate-limit clock.
#[derive(Debug, Default)]
pub struct SweepExecutor {
    last_full_sweep: Option<Ms>,
}

impl SweepExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one flush: drain pending roots, sweep each, then the periodic
    /// whole-document strict pass if due.
    pub fn flush(
        &mut self,
        doc: &mut DomTree,
        collector: &mut MutationCollector,
        tables: &SweepTables,
        net_policy: Option<&dyn ResourcePolicy>,
        cfg: &EngineConfig,
        now: Ms,
    ) -> SweepReport {
        let mut report = SweepReport::default();
        let roots = collector.drain(cfg.max_roots_per_flush);

        for root in roots {
            // Stale by the time we got here: already satisfied.
            if !doc.is_attached(root) {
                continue;
            }
            report.roots_processed += 1;
            strict_pass(doc, root, tables, net_policy, &mut report.removed);
            // The strict pass may have removed the root itself.
            if doc.is_attached(root) {
                let capped = heuristic_pass(doc, root, tables, net_policy, cfg, &mut report);
                if capped {
                    report.capped_roots += 1;
                }
            }
        }

        let full_due = match self.last_full_sweep {
            None => true,
            Some(last) => now.saturating_sub(last) >= cfg.full_sweep_interval_ms,
        };
        if full_due {
            // Safety net for anything the mutation path missed. Strict and
            // site tables only; the heuristic walk never runs at document
            // scope.
            strict_pass(doc, doc.root(), tables, net_policy, &mut report.removed);
            self.last_full_sweep = Some(now);
            report.full_pass = true;
            log::debug!("full-document strict sweep at {now}ms");
        }

        report
    }
}

/// Attribute-only removal of strict and site-table matches across the
/// subtree rooted at `root`, root included.
fn strict_pass(
    doc: &mut DomTree,
    root: NodeId,
    tables: &SweepTables,
    net_policy: Option<&dyn ResourcePolicy>,
    removed: &mut Vec<NodeId>,
) {
    let matches_strict = |doc: &DomTree, id: NodeId| {
        doc.get(id)
            .map(|el| {
                if tables.strict.matches(el) || tables.site.matches(el) {
                    return true;
                }
                // Iframes from known ad-serving hosts count as strict hits.
                if el.tag == "iframe" {
                    if let (Some(policy), Some(src)) = (net_policy, el.attr("src")) {
                        return !policy.should_load(src, crate::types::ResourceType::SUBDOCUMENT);
                    }
                }
                false
            })
            .unwrap_or(false)
    };

    let mut hits: Vec<NodeId> = Vec::new();
    if matches_strict(doc, root) {
        hits.push(root);
    }
    hits.extend(doc.descendants(root).filter(|&id| matches_strict(doc, id)));

    for id in hits {
        // Descendants of an earlier hit are stale now; remove() no-ops.
        if doc.remove(id) {
            removed.push(id);
        }
    }
}

/// Bounded heuristic walk below `root`. Returns whether the per-root cap
/// aborted the walk.
fn heuristic_pass(
    doc: &mut DomTree,
    root: NodeId,
    tables: &SweepTables,
    net_policy: Option<&dyn ResourcePolicy>,
    cfg: &EngineConfig,
    report: &mut SweepReport,
) -> bool {
    let ctx = ClassifyContext {
        strict: &tables.strict,
        players: &tables.players,
        net_policy,
        min_ad_area: cfg.min_ad_area,
    };

    let mut to_remove: Vec<NodeId> = Vec::new();
    let mut visited = 0usize;
    let mut capped = false;

    let walk = std::iter::once(root).chain(doc.descendants(root));
    for id in walk {
        visited += 1;
        if visited > cfg.max_elements_per_root {
            capped = true;
            break;
        }
        let tag_is_candidate = doc
            .get(id)
            .map(|el| cfg.is_candidate_tag(&el.tag))
            .unwrap_or(false);
        if !tag_is_candidate {
            continue;
        }
        report.elements_classified += 1;
        if classify(doc, id, &ctx).is_removable() {
            to_remove.push(id);
        }
    }

    for id in to_remove {
        if doc.remove(id) {
            report.removed.push(id);
        }
    }
    capped
}
