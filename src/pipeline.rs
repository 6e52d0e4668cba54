use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::audio::{CaptureStream, ChunkBlocker};
use crate::config::{AudioConfig, DrainConfig};
use crate::focus::{FocusTracker, WindowHandle};
use crate::inject::{InjectError, TextInjector};
use crate::recognition::{Outcome, SpeechEngine};
use crate::status::{preview, Status, StatusSink};

/// How long the recognition loop waits for a chunk before re-checking
/// the session state flag.
const CHUNK_POLL: Duration = Duration::from_millis(100);

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session active
    Idle,
    /// Capture worker running
    Recording,
    /// Stopped, waiting for the drain to type pending text
    Processing,
}

/// How the recognition loop ended
enum LoopEnd {
    /// State left Recording; proceed to the final flush
    Stopped,
    /// Stream or recognizer fault; abandon the session
    Faulted,
}

/// The capture/transcribe pipeline
///
/// Owns the session state machine, the pending-text accumulator, and
/// the one capture worker per session. `start`, `stop`, and `toggle`
/// are callable from the event loop or a hotkey callback; UI-visible
/// effects travel through the status sink.
pub struct Pipeline {
    inner: Arc<Shared>,
}

struct Shared {
    state: Mutex<SessionState>,
    /// Finalized utterances, in recognition order. Written only by the
    /// capture worker while Recording; drained only after it exits.
    pending: Mutex<Vec<String>>,
    saved_focus: Mutex<Option<WindowHandle>>,
    /// Bumped at every start; a drain holding a stale value aborts.
    generation: AtomicU64,
    engine: Option<Arc<Mutex<dyn SpeechEngine>>>,
    focus: Arc<dyn FocusTracker>,
    injector: Arc<dyn TextInjector>,
    status: StatusSink,
    audio: AudioConfig,
    drain: DrainConfig,
}

impl Shared {
    fn state(&self) -> SessionState {
        *self.lock_state()
    }

    fn set_state(&self, state: SessionState) {
        *self.lock_state() = state;
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<String>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Pipeline {
    /// Creates a pipeline wired to its collaborators
    ///
    /// `engine` is `None` when no model was found; `start()` is then
    /// rejected until the app is restarted with a model installed.
    #[must_use]
    pub fn new(
        engine: Option<Arc<Mutex<dyn SpeechEngine>>>,
        focus: Arc<dyn FocusTracker>,
        injector: Arc<dyn TextInjector>,
        status: StatusSink,
        audio: AudioConfig,
        drain: DrainConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: Mutex::new(SessionState::Idle),
                pending: Mutex::new(Vec::new()),
                saved_focus: Mutex::new(None),
                generation: AtomicU64::new(0),
                engine,
                focus,
                injector,
                status,
                audio,
                drain,
            }),
        }
    }

    /// Current session state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    /// Start or stop recording depending on the current state
    pub fn toggle(&self) {
        match self.state() {
            SessionState::Idle => self.start(),
            SessionState::Recording => self.stop(),
            SessionState::Processing => debug!("toggle ignored while processing"),
        }
    }

    /// Begin a recording session
    ///
    /// No-op unless Idle. Rejected with a "Model not found" status when
    /// no recognizer is loaded. Saves the focused window (best-effort),
    /// clears the accumulator, and spawns the one capture worker.
    pub fn start(&self) {
        let inner = &self.inner;

        let mut state = inner.lock_state();
        if *state != SessionState::Idle {
            debug!("start ignored in state {:?}", *state);
            return;
        }

        let Some(engine) = inner.engine.clone() else {
            info!("recording rejected: no model loaded");
            inner.status.publish(Status::ModelMissing);
            return;
        };

        // Save focus now, before the user's interaction with the toggle
        // control moves it. Failure leaves the handle unset.
        *inner
            .saved_focus
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = inner.focus.active_window();

        inner.lock_pending().clear();
        inner.generation.fetch_add(1, Ordering::SeqCst);
        *state = SessionState::Recording;
        drop(state);

        inner.status.publish(Status::Recording);

        let shared = Arc::clone(inner);
        std::thread::spawn(move || capture_worker(&shared, &engine));
    }

    /// End the current recording session
    ///
    /// No-op unless Recording. Flips the state flag so the capture
    /// worker exits cooperatively, then either returns straight to Idle
    /// (nothing recognized) or schedules the delayed drain that
    /// restores focus and types the accumulated text.
    pub fn stop(&self) {
        let inner = &self.inner;

        {
            let mut state = inner.lock_state();
            if *state != SessionState::Recording {
                debug!("stop ignored in state {:?}", *state);
                return;
            }
            *state = SessionState::Processing;
        }

        info!("recording stopped");
        inner.status.publish(Status::Processing);

        // Non-destructive peek; the worker's final flush may still land
        // during the drain delay.
        if inner.lock_pending().is_empty() {
            inner.set_state(SessionState::Idle);
            inner.status.publish(Status::Ready);
            return;
        }

        let generation = inner.generation.load(Ordering::SeqCst);
        let shared = Arc::clone(inner);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(shared.drain.delay_ms)).await;
            if let Err(e) = tokio::task::spawn_blocking(move || drain(&shared, generation)).await {
                error!("drain task panicked: {}", e);
            }
        });
    }
}

/// Session-scoped background task: owns the audio stream, feeds the
/// recognizer, and accumulates finalized utterances.
fn capture_worker(shared: &Arc<Shared>, engine: &Mutex<dyn SpeechEngine>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let fault = Arc::new(AtomicBool::new(false));

    let stream = match CaptureStream::open(&shared.audio, tx, Arc::clone(&fault)) {
        Ok(stream) => stream,
        Err(e) => {
            error!("failed to open audio stream: {}", e);
            shared.status.publish(Status::AudioFault);
            shared.set_state(SessionState::Idle);
            return;
        }
    };

    info!("recording started");

    let mut blocker = ChunkBlocker::new(shared.audio.block_size);
    let end = run_recognition_loop(shared, engine, &rx, &fault, &mut blocker);
    drop(stream);

    match end {
        LoopEnd::Faulted => {
            shared.status.publish(Status::AudioFault);
            shared.set_state(SessionState::Idle);
            return;
        }
        LoopEnd::Stopped => {}
    }

    // Flush audio still buffered in the recognizer into one last final
    let tail = match engine.lock() {
        Ok(mut engine) => {
            if let Some(rest) = blocker.flush() {
                if let Err(e) = engine.accept(&rest) {
                    warn!("tail block rejected: {}", e);
                }
            }
            engine.finalize()
        }
        Err(_) => {
            error!("recognizer lock poisoned during final flush");
            String::new()
        }
    };
    if !tail.is_empty() {
        info!(text = %tail, "final flush recognized");
        shared.lock_pending().push(tail);
    }

    debug!("capture worker exited");
}

/// Consume chunks until the state leaves Recording or a fault occurs
fn run_recognition_loop(
    shared: &Shared,
    engine: &Mutex<dyn SpeechEngine>,
    chunks: &Receiver<Vec<i16>>,
    fault: &AtomicBool,
    blocker: &mut ChunkBlocker,
) -> LoopEnd {
    while shared.state() == SessionState::Recording {
        if fault.load(Ordering::Relaxed) {
            return LoopEnd::Faulted;
        }

        let chunk = match chunks.recv_timeout(CHUNK_POLL) {
            Ok(chunk) => chunk,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return LoopEnd::Faulted,
        };

        for block in blocker.push(&chunk) {
            let outcome = {
                let Ok(mut engine) = engine.lock() else {
                    error!("recognizer lock poisoned");
                    return LoopEnd::Faulted;
                };
                engine.accept(&block)
            };

            match outcome {
                Ok(Outcome::Final(text)) => {
                    if !text.is_empty() {
                        info!(text = %text, "utterance recognized");
                        shared.lock_pending().push(text);
                    }
                }
                Ok(Outcome::Partial(text)) => {
                    if !text.is_empty() {
                        shared.status.publish(Status::Listening(preview(&text)));
                    }
                }
                Err(e) => {
                    error!("recognition failed: {}", e);
                    return LoopEnd::Faulted;
                }
            }
        }
    }

    LoopEnd::Stopped
}

/// Processing step: restore focus, join and type the pending text, and
/// return the pipeline to Idle. Runs once per session, after the grace
/// delay; aborts if a newer session has started since it was scheduled.
fn drain(shared: &Shared, generation: u64) {
    if shared.generation.load(Ordering::SeqCst) != generation {
        warn!("drain for a stale session discarded");
        return;
    }

    let saved = shared
        .saved_focus
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(window) = saved {
        match shared.focus.activate(&window) {
            Ok(()) => {
                // Brief pause for window activation
                std::thread::sleep(Duration::from_millis(shared.drain.focus_settle_ms));
            }
            Err(e) => warn!("focus restore failed: {}", e),
        }
    }

    let text = {
        let mut pending = shared.lock_pending();
        let joined = pending.join(" ");
        pending.clear();
        joined.trim().to_owned()
    };

    if text.is_empty() {
        shared.set_state(SessionState::Idle);
        shared.status.publish(Status::Ready);
        return;
    }

    let status = match shared.injector.type_text(&text) {
        Ok(()) => Status::Ready,
        Err(InjectError::ToolMissing) => {
            error!("xdotool not found - install with: sudo apt install xdotool");
            Status::InjectionToolMissing
        }
        Err(e @ InjectError::Failed { .. }) => {
            error!("failed to type text: {}", e);
            Status::InjectionFailed
        }
    };

    shared.set_state(SessionState::Idle);
    shared.status.publish(status);
}
