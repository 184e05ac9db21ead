//! Timer-driven progress sequence shown while a submission is in flight.
//!
//! The percentages are presentation only: the inference service reports no
//! progress of its own. A [`ProgressScript`] describes the named stages and
//! their tick rates; [`ProgressHandle::spawn`] plays it on a tokio task and
//! reports through a [`ProgressCallback`].
//!
//! The scripted ticks stop at [`ProgressScript::hold_at`] (99 % by default)
//! and wait there for the real request. [`ProgressHandle::finish`] jumps to
//! 100 % and fires `on_done` at once; [`ProgressHandle::abort`] (or dropping
//! the handle) stops the timers without `on_done`.
//!
//! # Example
//!
//! ```rust
//! use fieldsense::{ProgressCallback, ProgressHandle, ProgressScript};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ProgressCallback for Printer {
//!     fn on_tick(&self, percent: u8) {
//!         eprint!("\r{percent:>3}%");
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let handle = ProgressHandle::spawn(ProgressScript::default(), Arc::new(Printer));
//! // ... await the request ...
//! handle.finish().await;
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

/// One named stage of the sequence: ticks from `from` to `to`, one percent
/// every `tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStage {
    pub name: String,
    pub from: u8,
    pub to: u8,
    pub tick: Duration,
}

impl ProgressStage {
    pub fn new(name: impl Into<String>, from: u8, to: u8, tick: Duration) -> Self {
        Self {
            name: name.into(),
            from: from.min(100),
            to: to.min(100),
            tick,
        }
    }
}

/// The full sequence plus its completion rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressScript {
    pub stages: Vec<ProgressStage>,
    /// Pause between reaching 100 % and `on_done` when the script completes
    /// on its own.
    pub settle: Duration,
    /// Highest percentage the timers may show before the handle is finished.
    /// `100` lets the script complete without waiting.
    pub hold_at: u8,
}

impl Default for ProgressScript {
    fn default() -> Self {
        let ms = Duration::from_millis;
        Self {
            stages: vec![
                ProgressStage::new("Analyzing Structure", 0, 25, ms(60)),
                ProgressStage::new("Detecting Fields", 25, 50, ms(80)),
                ProgressStage::new("Reading Text", 50, 80, ms(100)),
                ProgressStage::new("Processing Data", 80, 100, ms(60)),
            ],
            settle: ms(500),
            hold_at: 99,
        }
    }
}

impl ProgressScript {
    pub fn new(stages: Vec<ProgressStage>) -> Self {
        Self {
            stages,
            ..Self::default()
        }
    }

    pub fn with_hold_at(mut self, hold_at: u8) -> Self {
        self.hold_at = hold_at.min(100);
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

/// Receives progress events. All methods default to no-ops.
///
/// Events arrive from a tokio task, hence `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// A stage started. `index` is its position in [`ProgressScript::stages`].
    fn on_stage(&self, index: usize, stage: &ProgressStage) {
        let _ = (index, stage);
    }

    /// The shown percentage changed. Strictly increasing within one run.
    fn on_tick(&self, percent: u8) {
        let _ = percent;
    }

    /// The sequence reached 100 % and settled.
    fn on_done(&self) {}
}

/// Callback that ignores every event.
pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {}

/// Shared callback handle as stored by the session and the CLI.
pub type ProgressCallbackRef = Arc<dyn ProgressCallback>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Run,
    Finish,
    Abort,
}

enum Step {
    Continue,
    Finish,
    Abort,
}

/// A running progress sequence.
pub struct ProgressHandle {
    control: watch::Sender<Signal>,
    task: Option<JoinHandle<()>>,
}

impl ProgressHandle {
    /// Start playing `script` on a new tokio task.
    pub fn spawn(script: ProgressScript, callback: ProgressCallbackRef) -> Self {
        let (control, rx) = watch::channel(Signal::Run);
        let task = tokio::spawn(run_script(script, callback, rx));
        Self {
            control,
            task: Some(task),
        }
    }

    /// The request resolved: jump to 100 %, fire `on_done`, wait for the task.
    pub async fn finish(mut self) {
        let _ = self.control.send(Signal::Finish);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Progress task ended abnormally: {}", e);
            }
        }
    }

    /// Stop the timers without `on_done`.
    pub fn abort(self) {
        // Drop sends the signal.
    }

    /// Whether the task has stopped (done, finished or aborted).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.control.send(Signal::Abort);
        }
    }
}

async fn run_script(
    script: ProgressScript,
    callback: ProgressCallbackRef,
    mut control: watch::Receiver<Signal>,
) {
    let cb = callback.as_ref();
    let mut last: Option<u8> = None;
    let mut held = false;

    'stages: for (index, stage) in script.stages.iter().enumerate() {
        cb.on_stage(index, stage);
        let mut percent = stage.from;
        loop {
            if percent > script.hold_at {
                held = true;
                break 'stages;
            }
            emit(cb, &mut last, percent);
            if percent >= stage.to {
                break;
            }
            match wait(&mut control, Some(stage.tick)).await {
                Step::Continue => percent += 1,
                Step::Finish => return complete(cb, &mut last),
                Step::Abort => return aborted(),
            }
        }
    }

    let delay = if held { None } else { Some(script.settle) };
    match wait(&mut control, delay).await {
        Step::Continue | Step::Finish => complete(cb, &mut last),
        Step::Abort => aborted(),
    }
}

fn emit(cb: &dyn ProgressCallback, last: &mut Option<u8>, percent: u8) {
    if last.map_or(true, |l| percent > l) {
        cb.on_tick(percent);
        *last = Some(percent);
    }
}

fn complete(cb: &dyn ProgressCallback, last: &mut Option<u8>) {
    emit(cb, last, 100);
    cb.on_done();
    debug!("Progress sequence done");
}

fn aborted() {
    debug!("Progress sequence aborted");
}

/// Sleep for `delay` (or forever when `None`) unless a control signal
/// arrives first. A dropped sender counts as abort.
async fn wait(control: &mut watch::Receiver<Signal>, delay: Option<Duration>) -> Step {
    loop {
        let signal = *control.borrow_and_update();
        match signal {
            Signal::Finish => return Step::Finish,
            Signal::Abort => return Step::Abort,
            Signal::Run => {}
        }
        match delay {
            Some(d) => {
                tokio::select! {
                    _ = sleep(d) => return Step::Continue,
                    changed = control.changed() => {
                        if changed.is_err() {
                            return Step::Abort;
                        }
                    }
                }
            }
            None => {
                if control.changed().await.is_err() {
                    return Step::Abort;
                }
            }
        }
    }
}
