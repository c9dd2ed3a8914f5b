//! Caption surface observation for the duration of one replay

use crate::captions::{read_caption_text, TranscriptAccumulator};
use crate::media::CaptionSurface;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle to a running caption observation
///
/// The observation stops when [`ObservationHandle::stop`] is called or the
/// handle is dropped, whichever comes first.
pub struct ObservationHandle {
    task: Option<JoinHandle<()>>,
    accumulator: Arc<Mutex<TranscriptAccumulator>>,
    /// Set under the accumulator lock; the task checks it under the same lock
    stopped: Arc<AtomicBool>,
}

/// Subscribe to the surface and stitch every reading into a fresh transcript
///
/// The subscription is taken before this returns, so mutations caused by a
/// seek issued right afterwards are not missed.
pub fn start_observation<S>(surface: Arc<S>) -> ObservationHandle
where
    S: CaptionSurface + 'static,
{
    let accumulator = Arc::new(Mutex::new(TranscriptAccumulator::new()));
    let stopped = Arc::new(AtomicBool::new(false));
    let mut mutations = surface.subscribe();
    let task_accumulator = accumulator.clone();
    let task_stopped = stopped.clone();

    let task = tokio::spawn(async move {
        let mut notifications = 0u64;
        loop {
            match mutations.recv().await {
                Ok(_) => {}
                // Missed notifications collapse into one re-read of the surface
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Caption observer lagged");
                }
                Err(RecvError::Closed) => break,
            }
            notifications += 1;

            let cleaned = read_caption_text(surface.as_ref());
            let mut acc = lock_accumulator(&task_accumulator);
            // abort() cannot interrupt a poll already running on another worker
            if task_stopped.load(Ordering::SeqCst) {
                break;
            }
            let outcome = acc.observe(&cleaned);
            debug!(?outcome, "Caption mutation");
        }
        debug!(notifications, "Caption surface closed");
    });

    info!("Caption observation started");
    ObservationHandle {
        task: Some(task),
        accumulator,
        stopped,
    }
}

impl ObservationHandle {
    /// Stop observing; later mutations are not recorded
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            {
                let _acc = lock_accumulator(&self.accumulator);
                self.stopped.store(true, Ordering::SeqCst);
            }
            task.abort();
            info!("Caption observation stopped");
        }
    }

    pub fn is_observing(&self) -> bool {
        self.task.is_some()
    }

    /// Shared access to the transcript being built
    pub fn accumulator(&self) -> Arc<Mutex<TranscriptAccumulator>> {
        self.accumulator.clone()
    }

    /// Copy of the transcript built so far
    pub fn transcript(&self) -> TranscriptAccumulator {
        snapshot_accumulator(&self.accumulator)
    }
}

impl Drop for ObservationHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_accumulator(
    accumulator: &Mutex<TranscriptAccumulator>,
) -> MutexGuard<'_, TranscriptAccumulator> {
    match accumulator.lock() {
        Ok(acc) => acc,
        Err(poisoned) => {
            warn!("Transcript mutex was poisoned, recovering data");
            poisoned.into_inner()
        }
    }
}

/// Clone the accumulator, recovering the data if the mutex is poisoned
pub(crate) fn snapshot_accumulator(
    accumulator: &Arc<Mutex<TranscriptAccumulator>>,
) -> TranscriptAccumulator {
    lock_accumulator(accumulator).clone()
}
