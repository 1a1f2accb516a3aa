use super::queue::{Payload, SharedQueues, Task, WorkFn};
use super::worker::Worker;
use super::JobId;
use crate::config::RuntimeConfig;
use crate::error::Result;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace, warn};

/// Completion callback, always invoked on the thread that owns the scheduler
type DoneFn = Box<dyn FnOnce(bool, Payload)>;

/// Result of looking a job up for cancellation
enum Lookup {
    Running,
    Queued(Task),
    Completed(Payload),
    Unknown,
}

/// Single-worker job scheduler
///
/// Work functions must be `Send` and only see their own payload. Completion
/// callbacks are kept in a table owned by the scheduler and never leave the
/// owning thread, which is why `JobScheduler` is neither `Send` nor `Sync`.
/// Callbacks can therefore capture `Rc`/`RefCell` main-thread state.
///
/// Blocking calls (`wait`, `cancel` of a running job, `wait_for_all`) have no
/// timeout: a work function that never returns blocks them forever.
pub struct JobScheduler {
    shared: Arc<SharedQueues>,
    worker: Worker,
    callbacks: FxHashMap<JobId, DoneFn>,
    wait_poll: Duration,
    wait_all_budget: Duration,
}

impl JobScheduler {
    /// Create a scheduler with default timings and start its worker
    pub fn new() -> Result<Self> {
        Self::with_config(&RuntimeConfig::default())
    }

    /// Create a scheduler using the timings from `config`
    pub fn with_config(config: &RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let shared = Arc::new(SharedQueues::new());
        let worker = Worker::spawn(Arc::clone(&shared))?;
        Ok(Self {
            shared,
            worker,
            callbacks: FxHashMap::default(),
            wait_poll: config.wait_poll(),
            wait_all_budget: config.wait_all_drain_budget(),
        })
    }

    /// Queue `work` for the worker; `on_done` runs later on this thread
    ///
    /// `on_done` receives `canceled == true` (and the untouched payload) when
    /// the job is canceled before it starts. After [`JobScheduler::shutdown`]
    /// the job is canceled right away and `on_done` runs before this returns.
    /// Never blocks.
    pub fn submit<P, W, D>(&mut self, payload: P, work: W, on_done: D) -> JobId
    where
        P: Send + 'static,
        W: FnOnce(&mut P) + Send + 'static,
        D: FnOnce(bool, P) + 'static,
    {
        let id = JobId::next();
        let done: DoneFn = Box::new(move |canceled, payload: Payload| {
            match payload.downcast::<P>() {
                Ok(payload) => on_done(canceled, *payload),
                Err(_) => error!(job = %id, "job payload has an unexpected type"),
            }
        });
        self.callbacks.insert(id, done);
        self.enqueue(id, Box::new(payload), erase_work(work), true);
        id
    }

    /// Queue `work` without a completion callback (fire and forget)
    pub fn submit_detached<P, W>(&mut self, payload: P, work: W) -> JobId
    where
        P: Send + 'static,
        W: FnOnce(&mut P) + Send + 'static,
    {
        let id = JobId::next();
        self.enqueue(id, Box::new(payload), erase_work(work), false);
        id
    }

    fn enqueue(&mut self, id: JobId, payload: Payload, work: WorkFn, has_callback: bool) {
        let rejected = {
            let mut state = self.shared.state.lock();
            state.outstanding += 1;
            if state.shutting_down {
                Some(payload)
            } else {
                state.tasks.push(Task {
                    id,
                    payload,
                    work,
                    has_callback,
                });
                None
            }
        };

        match rejected {
            // No worker left to run it
            Some(payload) => {
                warn!(job = %id, "job submitted after shutdown, canceling");
                self.finalize(id, true, payload);
            }
            None => {
                self.shared.work_available.notify_one();
                trace!(job = %id, has_callback, "job submitted");
            }
        }
    }

    /// Run completion callbacks for finished jobs, in finish order
    ///
    /// Stops when the completion queue is empty or once `budget` has elapsed
    /// since the call started. The budget is checked after each callback, so
    /// a non-empty queue always makes progress. Returns the number of
    /// callbacks run.
    pub fn drain_completed(&mut self, budget: Duration) -> usize {
        let start = Instant::now();
        let mut finalized = 0;

        loop {
            let next = self.shared.state.lock().completed.pop();
            let Some(finished) = next else {
                break;
            };
            self.finalize(finished.id, false, finished.payload);
            finalized += 1;

            if start.elapsed() >= budget {
                break;
            }
        }

        finalized
    }

    /// Block until job `id` has executed and its callback has run
    ///
    /// If the job already sits in the completion queue its callback runs
    /// right here. Unknown or already finalized ids return immediately.
    pub fn wait(&mut self, id: JobId) {
        let completed = {
            let mut state = self.shared.state.lock();
            while state.is_in_flight(id) {
                self.shared.job_finished.wait_for(&mut state, self.wait_poll);
            }
            state.completed.remove(id)
        };

        if let Some(finished) = completed {
            self.finalize(finished.id, false, finished.payload);
        }
    }

    /// Cancel job `id`
    ///
    /// A queued job is removed and its callback runs with `canceled == true`;
    /// its work function never runs. A running or already completed job
    /// cannot be suppressed: this behaves like [`JobScheduler::wait`].
    /// Unknown ids are ignored.
    pub fn cancel(&mut self, id: JobId) {
        let lookup = {
            let mut state = self.shared.state.lock();
            if state.running == Some(id) {
                Lookup::Running
            } else if let Some(task) = state.tasks.remove(id) {
                Lookup::Queued(task)
            } else if let Some(finished) = state.completed.remove(id) {
                Lookup::Completed(finished.payload)
            } else {
                Lookup::Unknown
            }
        };

        match lookup {
            Lookup::Running => {
                trace!(job = %id, "cancel: job is running, waiting for it");
                self.wait(id);
            }
            Lookup::Queued(task) => {
                trace!(job = %id, "job canceled before it started");
                self.finalize(task.id, true, task.payload);
            }
            Lookup::Completed(payload) => self.finalize(id, false, payload),
            Lookup::Unknown => trace!(job = %id, "cancel: job already finalized"),
        }
    }

    /// Submitted jobs that have not been finalized yet
    pub fn outstanding_count(&self) -> u32 {
        self.shared.state.lock().outstanding
    }

    /// Jobs waiting for the worker
    pub fn queued_count(&self) -> usize {
        self.shared.state.lock().tasks.len()
    }

    /// Jobs waiting for [`JobScheduler::drain_completed`]
    pub fn completed_count(&self) -> usize {
        self.shared.state.lock().completed.len()
    }

    /// Drain and block until no job is outstanding
    pub fn wait_for_all(&mut self) {
        loop {
            self.drain_completed(self.wait_all_budget);

            let mut state = self.shared.state.lock();
            if state.outstanding == 0 {
                break;
            }
            if state.completed.is_empty() {
                self.shared.job_finished.wait_for(&mut state, self.wait_poll);
            }
        }
    }

    /// Stop the worker
    ///
    /// Queued jobs are canceled, the running job is allowed to finish and
    /// every remaining completion callback runs before this returns. Called
    /// automatically on drop; calling it twice is harmless.
    pub fn shutdown(&mut self) {
        if !self.worker.is_running() {
            return;
        }

        let canceled = {
            let mut state = self.shared.state.lock();
            state.shutting_down = true;
            state.tasks.take_all()
        };
        self.shared.work_available.notify_all();

        for task in canceled {
            self.finalize(task.id, true, task.payload);
        }

        self.worker.join();

        let leftovers = self.shared.state.lock().completed.take_all();
        for finished in leftovers {
            self.finalize(finished.id, false, finished.payload);
        }
    }

    /// Run the callback (if any) and retire the job
    fn finalize(&mut self, id: JobId, canceled: bool, payload: Payload) {
        if let Some(done) = self.callbacks.remove(&id) {
            done(canceled, payload);
        }

        let mut state = self.shared.state.lock();
        debug_assert!(state.outstanding > 0, "outstanding job count underflow");
        state.outstanding = state.outstanding.saturating_sub(1);
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn erase_work<P, W>(work: W) -> WorkFn
where
    P: Send + 'static,
    W: FnOnce(&mut P) + Send + 'static,
{
    Box::new(move |payload: &mut (dyn Any + Send)| {
        if let Some(payload) = payload.downcast_mut::<P>() {
            work(payload);
        }
    })
}
