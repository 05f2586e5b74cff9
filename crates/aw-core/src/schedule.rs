//! Flush Scheduler
//!
//! Decides *when* collected work actually runs. Three policies compose:
//! debounce collapses mutation bursts into one flush; idle dispatch hands
//! the flush to a host idle slot instead of contending with rendering; a
//! pause window defers work entirely during disruptive transitions
//! (fullscreen, resize) where geometry reads are unreliable.
//!
//! The scheduler owns no timers. The host polls it with the current time
//! and, for idle-priority dispatch, an "am I idle" flag; the scheduler
//! answers whether a flush is granted right now.

use crate::types::Ms;

// =============================================================================
// Dispatch Policy
// =============================================================================

/// An armed idle slot awaiting execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSlot {
    pub armed_at: Ms,
    /// Latest time the flush may keep waiting for host idle.
    pub deadline: Ms,
}

/// How an expired debounce hands its flush to the host scheduler.
///
/// Selected once at construction; call sites never branch on availability.
pub trait DispatchPolicy {
    fn arm(&self, now: Ms) -> IdleSlot;
    fn ready(&self, slot: &IdleSlot, now: Ms, host_idle: bool) -> bool;
}

/// Idle-time dispatch with a bounded timeout: the flush waits for a host
/// idle period, but never past the deadline.
#[derive(Debug, Clone, Copy)]
pub struct IdlePriority {
    pub timeout_ms: Ms,
}

impl DispatchPolicy for IdlePriority {
    fn arm(&self, now: Ms) -> IdleSlot {
        IdleSlot {
            armed_at: now,
            deadline: now.saturating_add(self.timeout_ms),
        }
    }

    fn ready(&self, slot: &IdleSlot, now: Ms, host_idle: bool) -> bool {
        host_idle || now >= slot.deadline
    }
}

/// Fallback when idle scheduling is unavailable: run at the next poll
/// after the debounce expires.
#[derive(Debug, Clone, Copy)]
pub struct ImmediateDeferred;

impl DispatchPolicy for ImmediateDeferred {
    fn arm(&self, now: Ms) -> IdleSlot {
        IdleSlot {
            armed_at: now,
            deadline: now,
        }
    }

    fn ready(&self, _slot: &IdleSlot, _now: Ms, _host_idle: bool) -> bool {
        true
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// No flush requested.
    Idle,
    /// A flush is requested; waiting out the quiet period.
    Debounced { deadline: Ms },
    /// Debounce expired; waiting for the idle slot.
    Dispatched { slot: IdleSlot },
}

pub struct Scheduler {
    state: ScheduleState,
    paused_until: Ms,
    debounce_ms: Ms,
    policy: Box<dyn DispatchPolicy>,
}

impl Scheduler {
    pub fn new(debounce_ms: Ms, policy: Box<dyn DispatchPolicy>) -> Self {
        Self {
            state: ScheduleState::Idle,
            paused_until: 0,
            debounce_ms,
            policy,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn paused_until(&self) -> Ms {
        self.paused_until
    }

    /// Request a flush. Coalesces: while a flush is already pending this is
    /// a no-op, so a burst of requests yields a single flush.
    pub fn request_flush(&mut self, now: Ms) {
        if let ScheduleState::Idle = self.state {
            self.state = ScheduleState::Debounced {
                deadline: now.saturating_add(self.debounce_ms),
            };
        }
    }

    /// Defer flushes until `now + duration_ms`. The window only ever
    /// extends, and a flush is requested so progress resumes on its own
    /// once the window closes.
    pub fn pause_for(&mut self, now: Ms, duration_ms: Ms) {
        self.paused_until = self.paused_until.max(now.saturating_add(duration_ms));
        self.request_flush(now);
    }

    /// Advance the state machine. Returns `true` exactly when the caller
    /// should execute a flush now.
    ///
    /// A dispatch landing inside the pause window does no work and re-arms
    /// a fresh debounce cycle; the request is deferred, never discarded.
    pub fn poll(&mut self, now: Ms, host_idle: bool) -> bool {
        if let ScheduleState::Debounced { deadline } = self.state {
            if now >= deadline {
                self.state = ScheduleState::Dispatched {
                    slot: self.policy.arm(now),
                };
            }
        }

        if let ScheduleState::Dispatched { slot } = self.state {
            if self.policy.ready(&slot, now, host_idle) {
                if now < self.paused_until {
                    log::debug!("flush deferred: paused until {}", self.paused_until);
                    self.state = ScheduleState::Idle;
                    self.request_flush(now);
                    return false;
                }
                self.state = ScheduleState::Idle;
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn immediate(debounce: Ms) -> Scheduler {
        Scheduler::new(debounce, Box::new(ImmediateDeferred))
    }

    /// Poll repeatedly in `step` increments; return the time of the first
    /// granted flush, if any before `until`.
    fn first_grant(sched: &mut Scheduler, from: Ms, until: Ms, step: Ms) -> Option<Ms> {
        let mut now = from;
        while now <= until {
            if sched.poll(now, false) {
                return Some(now);
            }
            now += step;
        }
        None
    }

    #[test]
    fn test_debounce_delays_flush() {
        let mut sched = immediate(200);
        sched.request_flush(0);
        assert!(!sched.poll(100, false));
        assert!(!sched.poll(199, false));
        assert!(sched.poll(200, false));
        // Back to idle; nothing further without a new request.
        assert!(!sched.poll(400, false));
    }

    #[test]
    fn test_requests_coalesce() {
        let mut sched = immediate(200);
        sched.request_flush(0);
        sched.request_flush(50);
        sched.request_flush(150);
        // Deadline stays at the first request's.
        assert!(sched.poll(200, false));
        assert!(!sched.poll(250, false));
        assert!(!sched.poll(350, false));
    }

    #[test]
    fn test_idle_priority_waits_for_idle_or_timeout() {
        let mut sched = Scheduler::new(200, Box::new(IdlePriority { timeout_ms: 500 }));
        sched.request_flush(0);
        // Debounce expires, but the host is busy.
        assert!(!sched.poll(200, false));
        assert!(!sched.poll(400, false));
        // Idle grants immediately.
        assert!(sched.poll(450, true));

        // Without idle, the timeout bounds the wait.
        sched.request_flush(1000);
        assert!(!sched.poll(1200, false));
        assert!(!sched.poll(1699, false));
        assert!(sched.poll(1700, false));
    }

    #[test]
    fn test_pause_defers_to_new_debounce_cycle() {
        let mut sched = immediate(200);
        sched.pause_for(0, 900);
        // Every dispatch inside the window re-arms instead of granting.
        assert_eq!(first_grant(&mut sched, 0, 899, 50), None);
        let granted = first_grant(&mut sched, 900, 2000, 50).expect("flush after pause");
        assert!(granted >= 900);
    }

    #[test]
    fn test_pause_window_only_extends() {
        let mut sched = immediate(200);
        sched.pause_for(0, 900);
        sched.pause_for(100, 100);
        assert_eq!(sched.paused_until(), 900);
        sched.pause_for(200, 1000);
        assert_eq!(sched.paused_until(), 1200);
    }

    #[test]
    fn test_flush_while_paused_is_not_discarded() {
        let mut sched = immediate(100);
        sched.request_flush(0);
        sched.pause_for(50, 500);
        assert!(!sched.poll(100, false));
        // The request survives the window.
        assert!(first_grant(&mut sched, 550, 1500, 50).is_some());
    }
}
