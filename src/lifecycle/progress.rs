use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Messages rotated while a video job is pending.
pub const VIDEO_LOADING_MESSAGES: [&str; 6] = [
    "Warming up the digital director...",
    "Assembling pixels into motion...",
    "Rendering your cinematic vision...",
    "This can take a few minutes, hang tight!",
    "Choreographing the data stream...",
    "Final touches on the digital masterpiece...",
];

/// Fixed message list and the cadence it rotates at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressPlan {
    /// Messages shown in order, wrapping around.
    pub messages: &'static [&'static str],
    /// Time each message stays up.
    pub interval: Duration,
}

impl ProgressPlan {
    /// Video loading messages at the given cadence.
    pub fn video(interval: Duration) -> Self {
        Self {
            messages: &VIDEO_LOADING_MESSAGES,
            interval,
        }
    }
}

/// Repeating timer that publishes the current progress message.
///
/// Scoped to one pending request: dropping the ticker aborts the timer task and clears the
/// published message. A tick racing with the drop never republishes after the clear.
pub(crate) struct ProgressTicker {
    handle: JoinHandle<()>,
    stopped: Arc<AtomicBool>,
    out: Arc<watch::Sender<Option<String>>>,
}

impl ProgressTicker {
    /// Publish the first message immediately and rotate from there.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(plan: ProgressPlan, out: Arc<watch::Sender<Option<String>>>) -> Self {
        let stopped = Arc::new(AtomicBool::new(false));
        out.send_replace(plan.messages.first().map(|m| m.to_string()));

        let task_out = Arc::clone(&out);
        let task_stopped = Arc::clone(&stopped);
        let handle = tokio::spawn(async move {
            if plan.messages.len() < 2 || plan.interval.is_zero() {
                return;
            }
            let start = tokio::time::Instant::now() + plan.interval;
            let mut timer = tokio::time::interval_at(start, plan.interval);
            let mut index = 0usize;
            loop {
                timer.tick().await;
                index = (index + 1) % plan.messages.len();
                let next = plan.messages[index];
                task_out.send_if_modified(|current| {
                    if task_stopped.load(Ordering::SeqCst) {
                        return false;
                    }
                    *current = Some(next.to_string());
                    true
                });
            }
        });

        Self {
            handle,
            stopped,
            out,
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.handle.abort();
        self.out.send_replace(None);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/progress.rs"]
mod tests;
