use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::assets::media::MediaRef;
use crate::foundation::error::{StudioError, StudioResult};
use crate::generate::history::{GenerationResult, History};
use crate::generate::request::GenerationRequest;
use crate::lifecycle::progress::{ProgressPlan, ProgressTicker};
use crate::lifecycle::state::{Failure, LifecycleState};

/// Per-site counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LifecycleStats {
    /// Requests accepted into `Pending`.
    pub submitted: u64,
    /// Requests that reached `Succeeded`.
    pub succeeded: u64,
    /// Requests that reached `Failed`, cancellations included.
    pub failed: u64,
    /// Submits rejected because a request was already pending.
    pub rejected_busy: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    rejected_busy: AtomicU64,
}

/// One independent user-facing operation with its own lifecycle and history.
///
/// At most one request is pending per site. Distinct sites never share state.
pub struct ActionSite {
    name: &'static str,
    state: watch::Sender<LifecycleState>,
    progress: Arc<watch::Sender<Option<String>>>,
    progress_plan: Option<ProgressPlan>,
    failure_message: Option<&'static str>,
    history: Mutex<History>,
    counters: Counters,
}

impl std::fmt::Debug for ActionSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSite")
            .field("name", &self.name)
            .field("state", &self.state.borrow().label())
            .field("stats", &self.stats())
            .finish()
    }
}

impl ActionSite {
    /// Create an idle site. `name` is used in logs and busy messages.
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        let (progress, _) = watch::channel(None);
        Self {
            name,
            state,
            progress: Arc::new(progress),
            progress_plan: None,
            failure_message: None,
            history: Mutex::new(History::new()),
            counters: Counters::default(),
        }
    }

    /// Rotate cosmetic progress messages while pending.
    pub fn with_progress(mut self, plan: ProgressPlan) -> Self {
        self.progress_plan = Some(plan);
        self
    }

    /// Show `message` on failure instead of the error's own text. Cancellation keeps its own text.
    pub fn with_failure_message(mut self, message: &'static str) -> Self {
        self.failure_message = Some(message);
        self
    }

    /// Site name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    /// Whether a request is in flight.
    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Current progress message, present only while pending with a progress plan.
    pub fn progress(&self) -> Option<String> {
        self.progress.borrow().clone()
    }

    /// Observe progress messages.
    pub fn subscribe_progress(&self) -> watch::Receiver<Option<String>> {
        self.progress.subscribe()
    }

    /// Results produced by this site, most recent first.
    pub fn history(&self) -> Vec<Arc<GenerationResult>> {
        self.lock_history().iter().cloned().collect()
    }

    /// Number of results produced by this site.
    pub fn history_len(&self) -> usize {
        self.lock_history().len()
    }

    /// Look up a result by id.
    pub fn find(&self, id: crate::generate::history::ResultId) -> Option<Arc<GenerationResult>> {
        self.lock_history().get(id).cloned()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> LifecycleStats {
        LifecycleStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            rejected_busy: self.counters.rejected_busy.load(Ordering::Relaxed),
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `Pending`, or reject with [`StudioError::Busy`] when already pending.
    fn begin(self: &Arc<Self>) -> StudioResult<PendingGuard> {
        let accepted = self.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            *state = LifecycleState::Pending;
            true
        });
        if !accepted {
            self.counters.rejected_busy.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(site = self.name, "rejected submit while pending");
            return Err(StudioError::busy(format!(
                "{} already has a request in flight",
                self.name
            )));
        }
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(site = self.name, "pending");
        Ok(PendingGuard {
            site: Arc::clone(self),
            ticker: None,
            resolved: false,
        })
    }

    /// Run `work` as this site's pending request.
    ///
    /// The transition to `Pending` (or the busy rejection) happens before this returns, so a
    /// second call made right after is rejected even if the first future has not been polled.
    /// Progress messages start at the same moment when called inside a tokio runtime, otherwise
    /// on the first poll. Cancelling `cancel` abandons `work` and fails the request with
    /// [`StudioError::Cancelled`]. Dropping the returned future before it resolves has the same
    /// effect.
    pub fn run<F>(
        self: &Arc<Self>,
        request: GenerationRequest,
        cancel: CancellationToken,
        work: F,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + use<F>
    where
        F: Future<Output = StudioResult<MediaRef>>,
    {
        let guard = self.begin().map(|mut guard| {
            if tokio::runtime::Handle::try_current().is_ok() {
                guard.start_progress();
            }
            guard
        });
        async move {
            let mut guard = guard?;
            guard.start_progress();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(StudioError::Cancelled),
                out = work => out,
            };
            match outcome {
                Ok(output) => Ok(guard.succeed(&request, output)),
                Err(err) => {
                    guard.fail(&err);
                    Err(err)
                }
            }
        }
    }
}

/// Exclusive claim on a site's `Pending` state.
///
/// Resolving consumes the guard. An unresolved guard fails the site as cancelled when dropped,
/// so no path leaves the site pending.
struct PendingGuard {
    site: Arc<ActionSite>,
    ticker: Option<ProgressTicker>,
    resolved: bool,
}

impl PendingGuard {
    fn start_progress(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        if let Some(plan) = self.site.progress_plan {
            self.ticker = Some(ProgressTicker::start(plan, Arc::clone(&self.site.progress)));
        }
    }

    fn succeed(mut self, request: &GenerationRequest, output: MediaRef) -> Arc<GenerationResult> {
        self.ticker = None;
        let entry = self
            .site
            .lock_history()
            .push(GenerationResult::new(request, output));
        self.site
            .state
            .send_replace(LifecycleState::Succeeded(Arc::clone(&entry)));
        self.site.counters.succeeded.fetch_add(1, Ordering::Relaxed);
        self.resolved = true;
        tracing::info!(site = self.site.name, id = entry.id.0, "succeeded");
        entry
    }

    fn fail(mut self, err: &StudioError) {
        self.ticker = None;
        let failure = match (self.site.failure_message, err) {
            (_, StudioError::Cancelled) | (None, _) => Failure::from_error(err),
            (Some(message), _) => Failure::with_message(err, message),
        };
        tracing::error!(site = self.site.name, error = %err, "failed");
        self.site.state.send_replace(LifecycleState::Failed(failure));
        self.site.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.resolved = true;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        self.ticker = None;
        tracing::warn!(site = self.site.name, "pending request dropped before completion");
        self.site
            .state
            .send_replace(LifecycleState::Failed(Failure::from_error(&StudioError::Cancelled)));
        self.site.counters.failed.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/site.rs"]
mod tests;
