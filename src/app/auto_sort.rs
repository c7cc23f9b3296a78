//! Auto-sort demo mode.
//!
//! [`AutoSortCycle`] is the pure state machine: one field active at a time,
//! ascending on entry, descending one step later, then on to the next field.
//! [`AutoSorter`] hands the entry sort back to the caller synchronously, then
//! drives the rest of the cycle from a single tokio task ticking once per step
//! and forwards each transition to the UI loop as a [`SortCommand`].
//!
//! Stopping aborts the task.  Every run gets a fresh generation id, and the UI
//! only applies commands whose generation matches the running one, so a
//! command that was already queued when the run stopped is dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::core::record::{Field, SortDirection};

// ───────────────────────────────────────── state machine ─────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Next step enters the current field with an ascending sort.
    Ascending,
    /// Ascending sort applied; next step sorts the same field descending.
    PendingDescend,
}

#[derive(Debug, Clone)]
pub struct AutoSortCycle {
    fields: Vec<Field>,
    index: usize,
    phase: Phase,
}

impl AutoSortCycle {
    /// Cycle over every column, starting at the first.
    pub fn new() -> Self {
        Self {
            fields: Field::ALL.to_vec(),
            index: 0,
            phase: Phase::Ascending,
        }
    }

    pub fn current_field(&self) -> Field {
        self.fields[self.index]
    }

    /// Produce the sort for this step and move to the next state.
    pub fn advance(&mut self) -> (Field, SortDirection) {
        let field = self.current_field();
        match self.phase {
            Phase::Ascending => {
                self.phase = Phase::PendingDescend;
                (field, SortDirection::Ascending)
            }
            Phase::PendingDescend => {
                self.phase = Phase::Ascending;
                self.index = (self.index + 1) % self.fields.len();
                (field, SortDirection::Descending)
            }
        }
    }
}

impl Default for AutoSortCycle {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────── scheduler ─────────

/// One scheduled sort, tagged with the run that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortCommand {
    pub generation: u64,
    pub field: Field,
    pub direction: SortDirection,
}

/// Owns the auto-sort task.  The task handle is the only cancellation handle;
/// there is no separate timer for the descending step.
pub struct AutoSorter {
    step: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SortCommand>,
}

impl AutoSorter {
    /// `step` is the delay between the ascending and the descending sort of a
    /// field; a full field cycle takes two steps.
    pub fn new(step: Duration, tx: mpsc::UnboundedSender<SortCommand>) -> Self {
        Self {
            step,
            generation: 0,
            task: None,
            tx,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start a new run from the first field.  Restarting stops the previous
    /// run first.
    ///
    /// Returns the ascending sort that enters the first field; the caller
    /// applies it right away.  The task's first command is the descending
    /// sort one step later.
    #[must_use = "the entry sort must be applied by the caller"]
    pub fn start(&mut self) -> (Field, SortDirection) {
        self.stop();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let step = self.step;
        let tx = self.tx.clone();

        let mut cycle = AutoSortCycle::new();
        let entry = cycle.advance();
        let first_tick = Instant::now() + step;

        tracing::info!(generation, step_ms = step.as_millis() as u64, "auto-sort started");
        self.task = Some(tokio::spawn(run_cycle(generation, first_tick, step, cycle, tx)));
        entry
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(generation = self.generation, "auto-sort stopped");
        }
    }

    /// Whether a received command belongs to the current, still running run.
    pub fn accepts(&self, command: &SortCommand) -> bool {
        self.is_running() && command.generation == self.generation
    }
}

impl Drop for AutoSorter {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_cycle(
    generation: u64,
    first_tick: Instant,
    step: Duration,
    mut cycle: AutoSortCycle,
    tx: mpsc::UnboundedSender<SortCommand>,
) {
    // The entry sort already happened in `start`; first tick is one step out.
    let mut ticker = tokio::time::interval_at(first_tick, step);
    // A late tick shifts the schedule rather than firing a burst of sorts.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let (field, direction) = cycle.advance();
        tracing::trace!(generation, %field, ?direction, "auto-sort step");
        let command = SortCommand {
            generation,
            field,
            direction,
        };
        if tx.send(command).is_err() {
            break; // receiver dropped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;
    use crate::core::table::RecordTable;

    use Field::*;
    use SortDirection::*;

    fn apply(table: &mut RecordTable, field: Field, direction: SortDirection) {
        match direction {
            Ascending => table.sort_ascending(field),
            Descending => table.sort_descending(field),
        }
    }

    fn two_movies() -> RecordTable {
        RecordTable::new(vec![
            Record::new(1, "B", 2000, 5.0),
            Record::new(2, "A", 1999, 9.5),
        ])
    }

    #[test]
    fn cycle_ascends_descends_then_advances() {
        let mut cycle = AutoSortCycle::new();
        assert_eq!(cycle.current_field(), Id);

        let steps: Vec<_> = (0..10).map(|_| cycle.advance()).collect();
        assert_eq!(
            steps,
            vec![
                (Id, Ascending),
                (Id, Descending),
                (Title, Ascending),
                (Title, Descending),
                (Year, Ascending),
                (Year, Descending),
                (Imdb, Ascending),
                (Imdb, Descending),
                (Id, Ascending),
                (Id, Descending),
            ]
        );
        assert_eq!(cycle.current_field(), Title);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_follows_two_step_cycle() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sorter = AutoSorter::new(Duration::from_secs(2), tx);
        let start = Instant::now();
        let entry = sorter.start();
        assert_eq!(entry, (Id, Ascending));

        let mut timeline = Vec::new();
        for _ in 0..8 {
            let cmd = rx.recv().await.unwrap();
            assert!(sorter.accepts(&cmd));
            timeline.push((start.elapsed().as_secs(), cmd.field, cmd.direction));
        }

        assert_eq!(
            timeline,
            vec![
                (2, Id, Descending),
                (4, Title, Ascending),
                (6, Title, Descending),
                (8, Year, Ascending),
                (10, Year, Descending),
                (12, Imdb, Ascending),
                (14, Imdb, Descending),
                (16, Id, Ascending),
            ]
        );
        sorter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_right_after_start_keeps_the_entry_sort() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sorter = AutoSorter::new(Duration::from_secs(2), tx);
        let mut table = two_movies();

        let (field, direction) = sorter.start();
        apply(&mut table, field, direction);
        sorter.stop();
        tokio::time::sleep(Duration::from_secs(20)).await;

        let mut applied = 0;
        while let Ok(cmd) = rx.try_recv() {
            if sorter.accepts(&cmd) {
                apply(&mut table, cmd.field, cmd.direction);
                applied += 1;
            }
        }
        assert!(applied <= 1);
        assert!(!sorter.is_running());
        assert_eq!(table.active_sort(), Some((Id, Ascending)));
        let ids: Vec<_> = table.rows().iter().map(|r| r.record.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_commands_from_a_stopped_run_are_rejected() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sorter = AutoSorter::new(Duration::from_secs(2), tx);

        let _ = sorter.start();

        // Let the descending step land in the channel, then stop before the
        // UI has drained it.
        tokio::time::sleep(Duration::from_secs(3)).await;
        sorter.stop();
        let pending = rx.try_recv().unwrap();
        assert_eq!((pending.field, pending.direction), (Id, Descending));
        assert!(!sorter.accepts(&pending));

        // A restart does not resurrect the old run's commands either.
        assert_eq!(sorter.start(), (Id, Ascending));
        assert!(!sorter.accepts(&pending));
        let fresh = rx.recv().await.unwrap();
        assert!(sorter.accepts(&fresh));
        assert_eq!((fresh.field, fresh.direction), (Id, Descending));
        sorter.stop();
    }
}
