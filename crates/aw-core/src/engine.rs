//! The Engine
//!
//! One `Engine` instance per document context. It owns the collector,
//! scheduler, sweep executor, media watcher, and rule tables; there is no
//! ambient global state. The host drives it: push mutation batches in,
//! report disruptive transitions, and call `tick` with the current time.
//!
//! Everything runs in a single cooperative scheduling domain, interleaved
//! with host work. Removals performed inside a flush that trigger new
//! mutation notifications come back through `on_mutations` as next-cycle
//! pending roots; a flush never re-enters itself.

use crate::collect::MutationCollector;
use crate::dom::{DomTree, MutationBatch, NodeId};
use crate::media::MediaAdWatcher;
use crate::schedule::{DispatchPolicy, IdlePriority, Scheduler};
use crate::sweep::{SweepExecutor, SweepTables};
use crate::types::{EngineConfig, Ms, RemovalEvent, ResourcePolicy, StatsSink};

/// What one `tick` call did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Whether a flush was granted and executed.
    pub flushed: bool,
    /// Elements removed during this tick.
    pub removed: Vec<NodeId>,
    /// Elements run through the heuristic classifier.
    pub elements_classified: usize,
    /// The host should poll the media-ad watcher now (its own interval
    /// elapsed, or a full-document pass ran).
    pub media_check_due: bool,
}

pub struct Engine {
    cfg: EngineConfig,
    tables: SweepTables,
    collector: MutationCollector,
    scheduler: Scheduler,
    executor: SweepExecutor,
    media: MediaAdWatcher,
    last_media_poll: Option<Ms>,
    net_policy: Option<Box<dyn ResourcePolicy>>,
    stats: Option<Box<dyn StatsSink>>,
}

impl Engine {
    /// Engine with idle-priority dispatch (the default host path).
    pub fn new(cfg: EngineConfig, tables: SweepTables) -> Self {
        let policy = Box::new(IdlePriority {
            timeout_ms: cfg.idle_timeout_ms,
        });
        Self::with_dispatch(cfg, tables, policy)
    }

    /// Engine with an explicit dispatch policy, for hosts without idle
    /// scheduling.
    pub fn with_dispatch(
        cfg: EngineConfig,
        tables: SweepTables,
        policy: Box<dyn DispatchPolicy>,
    ) -> Self {
        let scheduler = Scheduler::new(cfg.debounce_ms, policy);
        let media = MediaAdWatcher::new(cfg.fast_forward_rate);
        Self {
            cfg,
            tables,
            collector: MutationCollector::new(),
            scheduler,
            executor: SweepExecutor::new(),
            media,
            last_media_poll: None,
            net_policy: None,
            stats: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Install the network-layer policy collaborator.
    pub fn set_net_policy(&mut self, policy: Box<dyn ResourcePolicy>) {
        self.net_policy = Some(policy);
    }

    /// Install the statistics sink collaborator.
    pub fn set_stats_sink(&mut self, sink: Box<dyn StatsSink>) {
        self.stats = Some(sink);
    }

    pub fn stats_sink_mut(&mut self) -> Option<&mut dyn StatsSink> {
        self.stats.as_deref_mut().map(|s| s as _)
    }

    /// The media-ad watcher; the host polls it with its player and video
    /// handles when `TickReport::media_check_due` is set.
    pub fn media(&mut self) -> &mut MediaAdWatcher {
        &mut self.media
    }

    pub fn pending_roots(&self) -> usize {
        self.collector.pending()
    }

    /// Ingest a mutation batch and signal the scheduler.
    pub fn on_mutations(&mut self, batch: &MutationBatch, now: Ms) {
        self.collector.ingest(batch);
        if !self.collector.is_empty() {
            self.scheduler.request_flush(now);
        }
    }

    /// A disruptive transition (fullscreen toggle, viewport resize) was
    /// detected; defer classification until layout settles.
    pub fn on_viewport_disruption(&mut self, now: Ms) {
        self.scheduler.pause_for(now, self.cfg.disruption_pause_ms);
    }

    /// Advance the engine. `host_idle` reports whether the host is in an
    /// idle period; hosts without that signal pass `false` and rely on the
    /// dispatch timeout.
    pub fn tick(&mut self, doc: &mut DomTree, now: Ms, host_idle: bool) -> TickReport {
        let mut report = TickReport::default();

        if self.scheduler.poll(now, host_idle) {
            let sweep = self.executor.flush(
                doc,
                &mut self.collector,
                &self.tables,
                self.net_policy.as_deref(),
                &self.cfg,
                now,
            );
            report.flushed = true;
            report.elements_classified = sweep.elements_classified;
            report.media_check_due |= sweep.full_pass;

            if let Some(sink) = self.stats.as_deref_mut() {
                let origin = doc.origin_host().to_string();
                for _ in &sweep.removed {
                    sink.record_removal(&RemovalEvent {
                        at_ms: now,
                        origin_host: origin.clone(),
                    });
                }
            }
            report.removed = sweep.removed;

            // Roots beyond the per-flush cap wait for the next cycle.
            if !self.collector.is_empty() {
                self.scheduler.request_flush(now);
            }
        }

        let media_due = match self.last_media_poll {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.cfg.media_poll_interval_ms,
        };
        if media_due {
            self.last_media_poll = Some(now);
            report.media_check_due = true;
        }

        report
    }
}
