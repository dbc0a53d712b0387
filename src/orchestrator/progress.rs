//! Analysis Progress
//!
//! Two timelines run side by side while an analysis is in flight: a
//! cosmetic, tick-driven walk through the named stages and the real
//! backend call. Only the real call decides the outcome; `reconcile` is
//! where the two meet.

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub name: &'static str,
    pub duration: Duration,
}

const fn stage(name: &'static str, secs: u64) -> StageSpec {
    StageSpec {
        name,
        duration: Duration::from_secs(secs),
    }
}

pub const STAGES: [StageSpec; 8] = [
    stage("Parsing business description", 8),
    stage("Analyzing market opportunity", 12),
    stage("Evaluating competition", 10),
    stage("Assessing financial viability", 8),
    stage("Checking technical feasibility", 6),
    stage("Reviewing legal compliance", 7),
    stage("Analyzing cultural fit", 9),
    stage("Generating final report", 5),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowState {
    Running,
    Completed,
    Failed,
}

/// How the real backend call has settled so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageProgress {
    pub name: &'static str,
    pub status: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub stages: Vec<StageProgress>,
    pub percent: u8,
    pub state: FlowState,
}

impl ProgressSnapshot {
    pub fn current_stage(&self) -> Option<&'static str> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::Running)
            .map(|s| s.name)
    }
}

/// The cosmetic timeline
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    stages: Vec<StageSpec>,
    statuses: Vec<StageStatus>,
    current: usize,
    elapsed: Duration,
    halted: bool,
}

impl ProgressTracker {
    pub fn new(stages: &[StageSpec]) -> Self {
        let mut statuses = vec![StageStatus::Pending; stages.len()];
        if let Some(first) = statuses.first_mut() {
            *first = StageStatus::Running;
        }
        Self {
            stages: stages.to_vec(),
            statuses,
            current: 0,
            elapsed: Duration::ZERO,
            halted: false,
        }
    }

    /// Advances the animation by `dt`, possibly across several stages
    pub fn tick(&mut self, dt: Duration) {
        if self.halted {
            return;
        }
        let mut remaining = dt;
        while self.current < self.stages.len() {
            let left = self.stages[self.current].duration.saturating_sub(self.elapsed);
            if remaining < left {
                self.elapsed += remaining;
                return;
            }
            remaining -= left;
            self.statuses[self.current] = StageStatus::Completed;
            self.current += 1;
            self.elapsed = Duration::ZERO;
            if let Some(next) = self.statuses.get_mut(self.current) {
                *next = StageStatus::Running;
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.stages.len()
    }

    pub fn status(&self, index: usize) -> Option<StageStatus> {
        self.statuses.get(index).copied()
    }

    /// Completed stages plus the fraction of the running one, capped at 100
    pub fn percent(&self) -> u8 {
        let n = self.stages.len();
        if n == 0 {
            return 100;
        }
        let completed = self
            .statuses
            .iter()
            .filter(|s| **s == StageStatus::Completed)
            .count() as f64;
        let fraction = match self.stages.get(self.current) {
            Some(spec) if !self.halted && !spec.duration.is_zero() => {
                (self.elapsed.as_secs_f64() / spec.duration.as_secs_f64()).min(1.0)
            }
            _ => 0.0,
        };
        ((completed * 100.0 + fraction * 100.0) / n as f64).min(100.0) as u8
    }

    pub fn complete_all(&mut self) {
        self.statuses.fill(StageStatus::Completed);
        self.current = self.stages.len();
        self.elapsed = Duration::ZERO;
        self.halted = true;
    }

    /// Marks the running stage as errored and stops the animation
    pub fn fail_current(&mut self) {
        if let Some(status) = self.statuses.get_mut(self.current) {
            *status = StageStatus::Error;
        }
        self.halted = true;
    }

    pub fn snapshot(&self, state: FlowState) -> ProgressSnapshot {
        ProgressSnapshot {
            stages: self
                .stages
                .iter()
                .zip(&self.statuses)
                .map(|(spec, status)| StageProgress {
                    name: spec.name,
                    status: *status,
                })
                .collect(),
            percent: self.percent(),
            state,
        }
    }
}

/// Joins the cosmetic timeline with the real outcome. A failed call fails
/// the whole flow whatever the animation shows.
pub fn reconcile(tracker: &mut ProgressTracker, outcome: AnalysisOutcome) -> FlowState {
    match outcome {
        AnalysisOutcome::Pending => FlowState::Running,
        AnalysisOutcome::Succeeded => {
            tracker.complete_all();
            FlowState::Completed
        }
        AnalysisOutcome::Failed => {
            tracker.fail_current();
            FlowState::Failed
        }
    }
}

pub struct ProgressRunner {
    stages: Vec<StageSpec>,
    tick: Duration,
}

impl ProgressRunner {
    pub fn new() -> Self {
        Self {
            stages: STAGES.to_vec(),
            tick: Duration::from_millis(500),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    pub fn with_stages(mut self, stages: &[StageSpec]) -> Self {
        self.stages = stages.to_vec();
        self
    }

    /// Snapshot to seed the watch channel with
    pub fn initial_snapshot(&self) -> ProgressSnapshot {
        ProgressTracker::new(&self.stages).snapshot(FlowState::Running)
    }

    /// Drives `analysis` and the animation together, publishing snapshots on
    /// `progress`. Returns `None` when every receiver is gone: the view was
    /// dismissed, so the analysis is dropped mid-flight and its result never
    /// reaches the caller.
    pub async fn run<F, T, E>(
        &self,
        analysis: F,
        progress: &watch::Sender<ProgressSnapshot>,
    ) -> Option<Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let mut tracker = ProgressTracker::new(&self.stages);
        let mut interval = tokio::time::interval(self.tick);
        // first tick fires immediately
        interval.tick().await;
        tokio::pin!(analysis);

        loop {
            tokio::select! {
                outcome = &mut analysis => {
                    let settled = if outcome.is_ok() {
                        AnalysisOutcome::Succeeded
                    } else {
                        AnalysisOutcome::Failed
                    };
                    let state = reconcile(&mut tracker, settled);
                    if progress.send(tracker.snapshot(state)).is_err() {
                        debug!("Progress view dismissed before the result was shown");
                        return None;
                    }
                    return Some(outcome);
                }
                _ = interval.tick() => {
                    tracker.tick(self.tick);
                    if progress.send(tracker.snapshot(FlowState::Running)).is_err() {
                        debug!("Progress view dismissed, cancelling analysis");
                        return None;
                    }
                }
            }
        }
    }
}

impl Default for ProgressRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_tracker_starts_on_first_stage() {
        let tracker = ProgressTracker::new(&STAGES);
        assert_eq!(tracker.status(0), Some(StageStatus::Running));
        assert_eq!(tracker.status(1), Some(StageStatus::Pending));
        assert_eq!(tracker.percent(), 0);
    }

    #[test]
    fn test_percent_formula() {
        let mut tracker = ProgressTracker::new(&STAGES);
        tracker.tick(Duration::from_secs(4));
        // half of one stage out of eight
        assert_eq!(tracker.percent(), 6);
        tracker.tick(Duration::from_secs(4));
        assert_eq!(tracker.status(0), Some(StageStatus::Completed));
        assert_eq!(tracker.status(1), Some(StageStatus::Running));
        assert_eq!(tracker.percent(), 12);
    }

    #[test]
    fn test_tick_crosses_several_stages() {
        let mut tracker = ProgressTracker::new(&STAGES);
        // 8 + 12 + 10 = 30
        tracker.tick(Duration::from_secs(31));
        assert_eq!(tracker.status(2), Some(StageStatus::Completed));
        assert_eq!(tracker.status(3), Some(StageStatus::Running));
    }

    #[test]
    fn test_cosmetic_timeline_reaches_hundred_on_its_own() {
        let mut tracker = ProgressTracker::new(&STAGES);
        tracker.tick(Duration::from_secs(600));
        assert!(tracker.is_finished());
        assert_eq!(tracker.percent(), 100);
    }

    #[test]
    fn test_reconcile_failure_overrides_cosmetic_state() {
        let mut tracker = ProgressTracker::new(&STAGES);
        tracker.tick(Duration::from_secs(600));
        assert_eq!(reconcile(&mut tracker, AnalysisOutcome::Failed), FlowState::Failed);

        let mut tracker = ProgressTracker::new(&STAGES);
        tracker.tick(Duration::from_secs(10));
        assert_eq!(reconcile(&mut tracker, AnalysisOutcome::Failed), FlowState::Failed);
        assert_eq!(tracker.status(1), Some(StageStatus::Error));
        tracker.tick(Duration::from_secs(60));
        assert_eq!(tracker.status(2), Some(StageStatus::Pending));
    }

    #[test]
    fn test_reconcile_success_completes_every_stage() {
        let mut tracker = ProgressTracker::new(&STAGES);
        tracker.tick(Duration::from_secs(3));
        assert_eq!(reconcile(&mut tracker, AnalysisOutcome::Succeeded), FlowState::Completed);
        let snapshot = tracker.snapshot(FlowState::Completed);
        assert!(snapshot.stages.iter().all(|s| s.status == StageStatus::Completed));
        assert_eq!(snapshot.percent, 100);
        assert_eq!(snapshot.current_stage(), None);
    }

    #[test]
    fn test_pending_outcome_keeps_running() {
        let mut tracker = ProgressTracker::new(&STAGES);
        assert_eq!(reconcile(&mut tracker, AnalysisOutcome::Pending), FlowState::Running);
        assert_eq!(tracker.status(0), Some(StageStatus::Running));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_success_before_animation_ends() {
        let runner = ProgressRunner::new();
        let (tx, rx) = watch::channel(runner.initial_snapshot());
        let analysis = async {
            tokio::time::sleep(Duration::from_secs(20)).await;
            Ok::<_, String>(42)
        };

        let outcome = runner.run(analysis, &tx).await;
        assert_eq!(outcome, Some(Ok(42)));
        let last = rx.borrow().clone();
        assert_eq!(last.state, FlowState::Completed);
        assert_eq!(last.percent, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_failure_after_animation_ends() {
        let runner = ProgressRunner::new();
        let (tx, rx) = watch::channel(runner.initial_snapshot());
        let analysis = async {
            tokio::time::sleep(Duration::from_secs(120)).await;
            Err::<u8, _>("both backends failed")
        };

        let outcome = runner.run(analysis, &tx).await;
        assert_eq!(outcome, Some(Err("both backends failed")));
        assert_eq!(rx.borrow().state, FlowState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismissed_view_cancels_analysis() {
        let runner = ProgressRunner::new();
        let (tx, rx) = watch::channel(runner.initial_snapshot());
        drop(rx);

        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let analysis = async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, String>(())
        };

        assert!(runner.run(analysis, &tx).await.is_none());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
