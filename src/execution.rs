//! Asynchronous transform execution.
//!
//! Each submitted transform gets its own worker thread. The caller keeps an
//! [`ExecutionHandle`] to poll the status, block until the worker finishes
//! (optionally with a timeout), read the diagnostic messages and take the
//! output grid once the run succeeded.
//!
//! Lifecycle: `NotStarted` → `Running` → `Success` | `Failure`. There is no
//! cancellation; a timeout only ends the caller's wait, the worker keeps
//! going until it finishes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Result, TransformError};
use crate::grid::PixelGrid;
use crate::transform::{Diagnostics, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    NotStarted,
    Running,
    Success,
    Failure,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Failure)
    }
}

struct State {
    status: ExecutionStatus,
    /// Work waiting for `submit`
    pending: Option<(Transform, Arc<PixelGrid>)>,
    result: Option<PixelGrid>,
    result_taken: bool,
}

struct Shared {
    name: String,
    parallel: bool,
    state: Mutex<State>,
    finished: Condvar,
    diagnostics: Diagnostics,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Caller-side token for one transform run. Clones observe the same run.
#[derive(Clone)]
pub struct ExecutionHandle {
    shared: Arc<Shared>,
}

impl ExecutionHandle {
    /// Prepare a run of `transform` over `input`; nothing starts until
    /// [`submit`](Self::submit).
    pub fn new(transform: Transform, input: impl Into<Arc<PixelGrid>>) -> Self {
        Self::with_parallel_visits(transform, input, false)
    }

    pub fn with_parallel_visits(
        transform: Transform,
        input: impl Into<Arc<PixelGrid>>,
        parallel: bool,
    ) -> Self {
        let shared = Shared {
            name: transform.name().to_string(),
            parallel,
            state: Mutex::new(State {
                status: ExecutionStatus::NotStarted,
                pending: Some((transform, input.into())),
                result: None,
                result_taken: false,
            }),
            finished: Condvar::new(),
            diagnostics: Diagnostics::new(),
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Name of the transform this handle runs.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Start the worker thread. The status is `Running` when this returns.
    pub fn submit(&self) -> Result<()> {
        let (transform, input) = {
            let mut state = self.shared.lock();
            if state.status != ExecutionStatus::NotStarted {
                return Err(TransformError::InvalidState(format!(
                    "transform '{}' was already submitted",
                    self.shared.name
                )));
            }
            let Some(work) = state.pending.take() else {
                return Err(TransformError::InvalidState(format!(
                    "transform '{}' has no pending work",
                    self.shared.name
                )));
            };
            state.status = ExecutionStatus::Running;
            work
        };

        debug!(
            "Submitting '{}' on {}x{} grid",
            self.shared.name,
            input.width(),
            input.height()
        );

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("gridstag-{}", self.shared.name))
            .spawn(move || run_worker(shared, transform, input));

        if let Err(err) = spawned {
            self.shared
                .diagnostics
                .warn(format!("could not start '{}': {err}", self.shared.name));
            self.shared.lock().status = ExecutionStatus::Failure;
            self.shared.finished.notify_all();
            return Err(TransformError::Spawn(err));
        }
        Ok(())
    }

    pub fn status(&self) -> ExecutionStatus {
        self.shared.lock().status
    }

    /// Block until the run reaches `Success` or `Failure`, or until
    /// `timeout` elapses, and return the status at that point.
    ///
    /// A handle that was never submitted returns `NotStarted` immediately.
    pub fn wait_until_finished(&self, timeout: Option<Duration>) -> ExecutionStatus {
        let state = self.shared.lock();
        if state.status == ExecutionStatus::NotStarted {
            return state.status;
        }
        let still_running = |s: &mut State| !s.status.is_terminal();
        match timeout {
            None => {
                self.shared
                    .finished
                    .wait_while(state, still_running)
                    .unwrap_or_else(PoisonError::into_inner)
                    .status
            }
            Some(timeout) => {
                self.shared
                    .finished
                    .wait_timeout_while(state, timeout, still_running)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
                    .status
            }
        }
    }

    /// Diagnostic messages recorded so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.shared.diagnostics.messages()
    }

    /// Take the output grid. Only valid once, after `Success`.
    pub fn result(&self) -> Result<PixelGrid> {
        let mut state = self.shared.lock();
        match state.status {
            ExecutionStatus::Success => {
                if state.result_taken {
                    return Err(TransformError::InvalidState(format!(
                        "result of '{}' was already taken",
                        self.shared.name
                    )));
                }
                state.result_taken = true;
                state.result.take().ok_or_else(|| {
                    TransformError::InvalidState(format!("'{}' has no result", self.shared.name))
                })
            }
            status => Err(TransformError::InvalidState(format!(
                "result of '{}' requested while {:?}",
                self.shared.name, status
            ))),
        }
    }
}

impl std::fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("name", &self.shared.name)
            .field("status", &self.status())
            .finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn run_worker(shared: Arc<Shared>, transform: Transform, input: Arc<PixelGrid>) {
    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        transform.run(&input, &shared.diagnostics, shared.parallel)
    }))
    .unwrap_or_else(|payload| {
        Err(TransformError::failure(
            &shared.name,
            format!("panicked: {}", panic_message(payload)),
        ))
    });

    // Messages land before the status flips so woken waiters see them
    let (status, result) = match outcome {
        Ok(grid) => {
            shared.diagnostics.note(format!(
                "'{}' finished in {:.1?}",
                shared.name,
                started.elapsed()
            ));
            (ExecutionStatus::Success, Some(grid))
        }
        Err(err) => {
            shared.diagnostics.warn(format!("'{}' failed: {err}", shared.name));
            (ExecutionStatus::Failure, None)
        }
    };

    {
        let mut state = shared.lock();
        state.status = status;
        state.result = result;
    }
    shared.finished.notify_all();
}

/// Submits transforms with a shared set of options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    parallel_visits: bool,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spread independent visits over the rayon pool.
    pub fn with_parallel_visits(mut self, parallel: bool) -> Self {
        self.parallel_visits = parallel;
        self
    }

    pub fn parallel_visits(&self) -> bool {
        self.parallel_visits
    }

    /// Create a handle and start it in one step.
    pub fn submit(&self, transform: Transform, input: impl Into<Arc<PixelGrid>>) -> Result<ExecutionHandle> {
        let handle = ExecutionHandle::with_parallel_visits(transform, input, self.parallel_visits);
        handle.submit()?;
        Ok(handle)
    }

    /// Submit, wait without a timeout, and return the output grid.
    pub fn run(&self, transform: Transform, input: impl Into<Arc<PixelGrid>>) -> Result<PixelGrid> {
        let handle = self.submit(transform, input)?;
        match handle.wait_until_finished(None) {
            ExecutionStatus::Success => handle.result(),
            _ => Err(TransformError::failure(handle.name(), handle.messages().join("; "))),
        }
    }
}
