use super::queue::{Finished, SharedQueues, Task};
use crate::error::Result;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace};

/// Owner of the background thread
pub(crate) struct Worker {
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Start the worker thread on the given queues
    pub fn spawn(shared: Arc<SharedQueues>) -> Result<Self> {
        let handle = thread::Builder::new()
            .name("asset-jobs".to_string())
            .spawn(move || run(&shared))?;
        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Wait for the thread to exit; the caller must have set `shutting_down`
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("job worker thread panicked outside of a work function");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

fn run(shared: &SharedQueues) {
    debug!("job worker started");

    while let Some(task) = next_task(shared) {
        let Task {
            id,
            mut payload,
            work,
            has_callback,
        } = task;

        trace!(job = %id, "job started");
        // A panicking work function must not take the worker down with it;
        // the payload still goes to the completion callback, which sees
        // whatever output the work function left behind.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(payload.as_mut())));
        if outcome.is_err() {
            error!(job = %id, "work function panicked");
        }

        {
            let mut state = shared.state.lock();
            state.running = None;
            if has_callback {
                state.completed.push(Finished { id, payload });
            } else {
                state.outstanding = state.outstanding.saturating_sub(1);
            }
        }
        shared.job_finished.notify_all();
        trace!(job = %id, "job finished");
    }

    debug!("job worker stopped");
}

/// Block until a task is available; `None` once shutdown was requested
fn next_task(shared: &SharedQueues) -> Option<Task> {
    let mut state = shared.state.lock();
    loop {
        if state.shutting_down {
            return None;
        }
        if let Some(task) = state.tasks.pop() {
            state.running = Some(task.id);
            return Some(task);
        }
        shared.work_available.wait(&mut state);
    }
}
