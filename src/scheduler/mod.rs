//! Change listener and recompute scheduler
//!
//! The [`Paginator`] owns the live [`PaginationState`] and is its only writer.
//! Every document mutation remaps the state synchronously so markers stay in
//! place, then (re)schedules one debounced recompute. A burst of edits thus
//! collapses into a single trailing recompute against the final document.
//!
//! Recomputes run as explicit tickets: [`Paginator::take_due`] hands out a
//! [`RecomputeTicket`] tagged with the generation it was scheduled for,
//! [`RecomputeTicket::run`] measures and calculates, and [`Paginator::apply`]
//! installs the result only if no newer mutation has happened meanwhile.

mod cancel;
mod queue;

pub use cancel::CancellationToken;
pub use queue::{DeferredQueue, TaskHandle, TaskId};

use crate::config::SchedulerConfig;
use crate::document::Document;
use crate::editing::Mapping;
use crate::measure::{measure, HeightOracle};
use crate::pagination::{calculate_breaks, BreakList, PaginationState};
use std::rc::Rc;

/// A document change as reported by the kernel
#[derive(Debug, Clone, Copy)]
pub struct Mutation<'a> {
    pub before: &'a Document,
    pub after: &'a Document,
    /// Old-to-new position mapping of the change
    pub mapping: &'a Mapping,
}

impl Mutation<'_> {
    /// Whether the document actually changed (selection-only updates don't)
    pub fn doc_changed(&self) -> bool {
        self.before.version() != self.after.version() || !self.mapping.is_identity()
    }
}

/// Listener lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// State holds authoritative breaks for the current document
    Idle,
    /// State was remapped and a recompute is pending
    Remapped,
    /// Session ended; nothing runs any more
    TornDown,
}

/// Scheduler statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Mutations that changed the document
    pub mutations: u64,
    /// Notifications ignored because nothing changed
    pub ignored_mutations: u64,
    /// Recomputes scheduled
    pub scheduled: u64,
    /// Pending recomputes cancelled by a newer mutation
    pub superseded: u64,
    /// Tickets handed out for running
    pub started: u64,
    /// Results installed as the live state
    pub applied: u64,
    /// Results dropped because a newer generation was live
    pub discarded: u64,
    /// Tickets re-queued because layout had not settled
    pub deferred: u64,
    /// Tasks cancelled on teardown
    pub cancelled_on_teardown: u64,
}

/// Payload of a scheduled recompute
#[derive(Debug, Clone, Copy)]
struct Recompute {
    generation: u64,
}

/// An in-flight recompute for one generation
#[derive(Debug, Clone)]
pub struct RecomputeTicket {
    task: TaskId,
    generation: u64,
    capacity: f32,
    session: CancellationToken,
}

impl RecomputeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn task(&self) -> TaskId {
        self.task
    }

    /// Measure the settled layout and calculate fresh breaks
    pub fn run<O>(&self, document: &Document, oracle: &O) -> RecomputeResult
    where
        O: HeightOracle + ?Sized,
    {
        if self.session.is_cancelled() {
            return RecomputeResult {
                generation: self.generation,
                outcome: RecomputeOutcome::Cancelled,
            };
        }

        let report = measure(document, oracle);
        if report.is_stale() {
            return RecomputeResult {
                generation: self.generation,
                outcome: RecomputeOutcome::NotSettled,
            };
        }

        let breaks = calculate_breaks(&report.measurements, self.capacity);
        tracing::debug!(
            generation = self.generation,
            blocks = report.measurements.len(),
            misses = report.misses.len(),
            breaks = breaks.len(),
            "recomputed page breaks"
        );
        RecomputeResult {
            generation: self.generation,
            outcome: RecomputeOutcome::Breaks(breaks),
        }
    }
}

/// What a recompute produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecomputeOutcome {
    Breaks(BreakList),
    /// Layout did not reflect the document yet
    NotSettled,
    /// The session was torn down before the ticket ran
    Cancelled,
}

/// Output of [`RecomputeTicket::run`], tagged with its generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecomputeResult {
    pub generation: u64,
    pub outcome: RecomputeOutcome,
}

/// What [`Paginator::apply`] did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Installed as the live state
    Applied,
    /// A newer generation is live; result dropped
    Discarded,
    /// Layout was not settled; recompute re-queued
    Deferred,
    /// Session is gone; nothing happened
    TornDown,
}

/// Change listener and sole writer of the pagination state
#[derive(Debug)]
pub struct Paginator {
    config: SchedulerConfig,
    capacity: f32,
    state: Rc<PaginationState>,
    queue: DeferredQueue<Recompute>,
    pending: Option<TaskHandle>,
    session: CancellationToken,
    phase: Phase,
    stats: SchedulerStats,
}

impl Paginator {
    /// Start a session: empty breaks at generation 0 and the initial
    /// recompute scheduled after `initial_delay_ms`
    pub fn mount(config: SchedulerConfig, capacity: f32, now_ms: u64) -> Self {
        let mut paginator = Self {
            config,
            capacity,
            state: Rc::new(PaginationState::initial()),
            queue: DeferredQueue::new(),
            pending: None,
            session: CancellationToken::new(),
            phase: Phase::Idle,
            stats: SchedulerStats::default(),
        };
        paginator.schedule(now_ms, config.initial_delay_ms);
        tracing::debug!(capacity, "pagination session mounted");
        paginator
    }

    /// The live state. A new `Rc` means new breaks.
    pub fn state(&self) -> Rc<PaginationState> {
        Rc::clone(&self.state)
    }

    pub fn page_count(&self) -> usize {
        self.state.page_count()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    /// Due time of the next queued recompute
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.next_due()
    }

    pub fn is_torn_down(&self) -> bool {
        self.phase == Phase::TornDown
    }

    fn schedule(&mut self, now_ms: u64, delay_ms: u64) {
        let handle = self.queue.schedule(
            now_ms,
            delay_ms,
            Recompute {
                generation: self.state.generation(),
            },
        );
        tracing::trace!(
            task = handle.id(),
            due_ms = handle.due_ms(),
            generation = self.state.generation(),
            "recompute scheduled"
        );
        self.pending = Some(handle);
        self.stats.scheduled += 1;
    }

    /// React to a document mutation: remap now, recompute later
    pub fn on_mutation(&mut self, mutation: &Mutation<'_>, now_ms: u64) {
        if self.is_torn_down() {
            tracing::debug!("mutation after teardown ignored");
            return;
        }
        if !mutation.doc_changed() {
            self.stats.ignored_mutations += 1;
            return;
        }

        self.stats.mutations += 1;
        self.state = Rc::new(self.state.remapped(mutation.mapping));

        if let Some(previous) = self.pending.take() {
            if self.queue.cancel(&previous) {
                self.stats.superseded += 1;
            }
        }
        self.schedule(now_ms, self.config.debounce_ms);
        self.phase = Phase::Remapped;

        tracing::debug!(
            version = mutation.after.version(),
            generation = self.state.generation(),
            breaks = self.state.breaks().len(),
            "breaks remapped"
        );
    }

    /// Hand out the next recompute due at `now_ms`
    pub fn take_due(&mut self, now_ms: u64) -> Option<RecomputeTicket> {
        if self.is_torn_down() {
            return None;
        }
        let (task, recompute) = self.queue.pop_due(now_ms)?;
        if self.pending.as_ref().is_some_and(|h| h.id() == task) {
            self.pending = None;
        }
        self.stats.started += 1;
        Some(RecomputeTicket {
            task,
            generation: recompute.generation,
            capacity: self.capacity,
            session: self.session.clone(),
        })
    }

    /// Install a recompute result if it is still relevant
    pub fn apply(&mut self, result: RecomputeResult, now_ms: u64) -> ApplyOutcome {
        if self.is_torn_down() {
            tracing::debug!(generation = result.generation, "result after teardown ignored");
            return ApplyOutcome::TornDown;
        }
        if result.generation < self.state.generation() {
            self.stats.discarded += 1;
            tracing::debug!(
                result_generation = result.generation,
                live_generation = self.state.generation(),
                "stale recompute discarded"
            );
            return ApplyOutcome::Discarded;
        }

        match result.outcome {
            RecomputeOutcome::Breaks(breaks) => {
                self.state = Rc::new(PaginationState::new(breaks, result.generation));
                self.stats.applied += 1;
                if self.pending.is_none() {
                    self.phase = Phase::Idle;
                }
                ApplyOutcome::Applied
            }
            RecomputeOutcome::NotSettled => {
                self.stats.deferred += 1;
                if self.pending.is_none() {
                    self.schedule(now_ms, self.config.settle_retry_ms.max(1));
                }
                ApplyOutcome::Deferred
            }
            RecomputeOutcome::Cancelled => ApplyOutcome::TornDown,
        }
    }

    /// Run every recompute due at `now_ms` against the settled layout.
    /// Returns the new state if one was installed.
    pub fn poll<O>(
        &mut self,
        now_ms: u64,
        document: &Document,
        oracle: &O,
    ) -> Option<Rc<PaginationState>>
    where
        O: HeightOracle + ?Sized,
    {
        let mut applied = false;
        while let Some(ticket) = self.take_due(now_ms) {
            let result = ticket.run(document, oracle);
            applied |= self.apply(result, now_ms) == ApplyOutcome::Applied;
        }
        applied.then(|| self.state())
    }

    /// End the session, cancelling all pending work. Idempotent.
    pub fn teardown(&mut self) -> usize {
        if self.is_torn_down() {
            return 0;
        }
        self.session.cancel();
        self.pending = None;
        let cancelled = self.queue.cancel_all();
        self.stats.cancelled_on_teardown += cancelled as u64;
        self.phase = Phase::TornDown;
        tracing::debug!(cancelled, "pagination session torn down");
        cancelled
    }
}

impl Drop for Paginator {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{EditOp, Mapping};

    const CAPACITY: f32 = 864.0;

    fn config() -> SchedulerConfig {
        SchedulerConfig::default()
    }

    /// Every top-level block renders 500px tall
    fn tall(_: usize) -> Option<f32> {
        Some(500.0)
    }

    fn edit(paginator: &mut Paginator, doc: &mut Document, op: EditOp, now_ms: u64) {
        let before = doc.clone();
        let result = doc.apply_edit(op).unwrap();
        paginator.on_mutation(
            &Mutation {
                before: &before,
                after: doc,
                mapping: &result.mapping,
            },
            now_ms,
        );
    }

    #[test]
    fn test_initial_recompute_after_mount_delay() {
        let doc = Document::from_text("a\nb\nc");
        let mut paginator = Paginator::mount(config(), CAPACITY, 0);
        assert_eq!(paginator.next_deadline(), Some(300));

        assert!(paginator.poll(299, &doc, &tall).is_none());
        let state = paginator.poll(300, &doc, &tall).unwrap();
        // 500 | 500 | 500
        assert_eq!(state.breaks(), &[3, 6]);
        assert_eq!(paginator.page_count(), 3);
        assert_eq!(paginator.phase(), Phase::Idle);
    }

    #[test]
    fn test_mutation_remaps_then_debounces() {
        let mut doc = Document::from_text("a\nb");
        let mut paginator = Paginator::mount(config(), CAPACITY, 0);
        paginator.poll(300, &doc, &tall);
        assert_eq!(paginator.state().breaks(), &[3]);

        edit(&mut paginator, &mut doc, EditOp::insert(1, "xyz"), 1000);
        assert_eq!(paginator.phase(), Phase::Remapped);
        assert_eq!(paginator.state().breaks(), &[6]);
        assert_eq!(paginator.next_deadline(), Some(1100));

        assert!(paginator.poll(1099, &doc, &tall).is_none());
        assert!(paginator.poll(1100, &doc, &tall).is_some());
        assert_eq!(paginator.phase(), Phase::Idle);
    }

    #[test]
    fn test_burst_of_edits_runs_one_recompute() {
        let mut doc = Document::from_text("a");
        let mut paginator = Paginator::mount(config(), CAPACITY, 0);
        paginator.poll(300, &doc, &tall);

        for (i, now) in [1000, 1030, 1060].into_iter().enumerate() {
            edit(&mut paginator, &mut doc, EditOp::insert(1 + i, "k"), now);
        }
        paginator.poll(2000, &doc, &tall);

        let stats = paginator.stats();
        assert_eq!(stats.superseded, 2);
        // initial + trailing
        assert_eq!(stats.started, 2);
        assert_eq!(stats.applied, 2);
    }

    #[test]
    fn test_in_flight_result_is_discarded_after_newer_mutation() {
        let mut doc = Document::from_text("a\nb");
        let mut paginator = Paginator::mount(config(), CAPACITY, 0);

        let ticket = paginator.take_due(300).unwrap();
        let result = ticket.run(&doc, &tall);

        edit(&mut paginator, &mut doc, EditOp::insert(1, "z"), 310);
        assert_eq!(paginator.apply(result, 320), ApplyOutcome::Discarded);
        assert_eq!(paginator.stats().discarded, 1);
        // remapped state stays live until the trailing recompute
        assert_eq!(paginator.state().generation(), 1);
        assert_eq!(paginator.phase(), Phase::Remapped);
    }

    #[test]
    fn test_unchanged_document_is_ignored() {
        let doc = Document::from_text("a");
        let mut paginator = Paginator::mount(config(), CAPACITY, 0);
        let before = paginator.state();
        paginator.on_mutation(
            &Mutation {
                before: &doc,
                after: &doc,
                mapping: &Mapping::new(),
            },
            50,
        );
        assert!(Rc::ptr_eq(&before, &paginator.state()));
        assert_eq!(paginator.stats().ignored_mutations, 1);
        assert_eq!(paginator.next_deadline(), Some(300));
    }

    #[test]
    fn test_not_settled_requeues() {
        struct Lagging;
        impl HeightOracle for Lagging {
            fn bounding_height(&self, _: usize) -> Option<f32> {
                Some(10.0)
            }
            fn layout_version(&self) -> Option<u64> {
                Some(0)
            }
        }

        let mut doc = Document::from_text("a");
        let mut paginator = Paginator::mount(config(), CAPACITY, 0);
        edit(&mut paginator, &mut doc, EditOp::insert(1, "b"), 0);

        assert!(paginator.poll(100, &doc, &Lagging).is_none());
        assert_eq!(paginator.stats().deferred, 1);
        assert_eq!(paginator.next_deadline(), Some(116));
    }

    #[test]
    fn test_teardown_cancels_pending_work() {
        let mut doc = Document::from_text("a");
        let mut paginator = Paginator::mount(config(), CAPACITY, 0);
        let ticket = paginator.take_due(300).unwrap();
        edit(&mut paginator, &mut doc, EditOp::insert(1, "b"), 400);

        assert_eq!(paginator.teardown(), 1);
        assert_eq!(paginator.phase(), Phase::TornDown);
        assert!(paginator.next_deadline().is_none());
        assert!(paginator.take_due(10_000).is_none());

        // a ticket already in flight becomes a no-op
        let result = ticket.run(&doc, &tall);
        assert_eq!(result.outcome, RecomputeOutcome::Cancelled);
        assert_eq!(paginator.apply(result, 10_000), ApplyOutcome::TornDown);

        // further mutations are ignored
        edit(&mut paginator, &mut doc, EditOp::insert(1, "c"), 500);
        assert!(paginator.next_deadline().is_none());
        assert_eq!(paginator.teardown(), 0);
    }
}
