use super::JobId;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::VecDeque;

/// Type-erased job payload; owned by whichever queue holds the job
pub(crate) type Payload = Box<dyn Any + Send>;

/// Type-erased work function, run on the worker thread
pub(crate) type WorkFn = Box<dyn FnOnce(&mut (dyn Any + Send)) + Send>;

/// A submitted job that has not started yet
pub(crate) struct Task {
    pub id: JobId,
    pub payload: Payload,
    pub work: WorkFn,
    /// False for fire-and-forget jobs; the worker finalizes those itself
    pub has_callback: bool,
}

/// A job whose work function returned, waiting for its completion callback
pub(crate) struct Finished {
    pub id: JobId,
    pub payload: Payload,
}

pub(crate) trait Queued {
    fn job_id(&self) -> JobId;
}

impl Queued for Task {
    fn job_id(&self) -> JobId {
        self.id
    }
}

impl Queued for Finished {
    fn job_id(&self) -> JobId {
        self.id
    }
}

/// FIFO of jobs with removal by id (used by cancel and wait)
pub(crate) struct JobQueue<T> {
    items: VecDeque<T>,
}

impl<T: Queued> JobQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.items.iter().any(|item| item.job_id() == id)
    }

    pub fn remove(&mut self, id: JobId) -> Option<T> {
        let index = self.items.iter().position(|item| item.job_id() == id)?;
        self.items.remove(index)
    }

    pub fn take_all(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Jobs submitted but not yet picked up by the worker
pub(crate) type TaskQueue = JobQueue<Task>;

/// Jobs executed and waiting for the main thread
pub(crate) type CompletionQueue = JobQueue<Finished>;

/// Everything both threads touch; guarded by one mutex
pub(crate) struct QueueState {
    pub tasks: TaskQueue,
    pub completed: CompletionQueue,
    /// Job the worker is executing right now
    pub running: Option<JobId>,
    /// Submitted jobs not yet finalized (queued, running or completed)
    pub outstanding: u32,
    pub shutting_down: bool,
}

impl QueueState {
    /// Queued or currently executing
    pub fn is_in_flight(&self, id: JobId) -> bool {
        self.running == Some(id) || self.tasks.contains(id)
    }
}

/// Queue state plus the two wake-up signals
pub(crate) struct SharedQueues {
    pub state: Mutex<QueueState>,
    /// Signaled on submit and on shutdown
    pub work_available: Condvar,
    /// Signaled each time the worker finishes a job
    pub job_finished: Condvar,
}

impl SharedQueues {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: TaskQueue::new(),
                completed: CompletionQueue::new(),
                running: None,
                outstanding: 0,
                shutting_down: false,
            }),
            work_available: Condvar::new(),
            job_finished: Condvar::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(id: JobId) -> Finished {
        Finished {
            id,
            payload: Box::new(()),
        }
    }

    #[test]
    fn test_queue_fifo() {
        let (a, b) = (JobId::next(), JobId::next());
        let mut queue = CompletionQueue::new();
        queue.push(finished(a));
        queue.push(finished(b));
        assert_eq!(queue.pop().map(|f| f.id), Some(a));
        assert_eq!(queue.pop().map(|f| f.id), Some(b));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_queue_remove_by_id() {
        let ids: Vec<_> = (0..3).map(|_| JobId::next()).collect();
        let mut queue = CompletionQueue::new();
        for &id in &ids {
            queue.push(finished(id));
        }

        assert!(queue.contains(ids[1]));
        assert_eq!(queue.remove(ids[1]).map(|f| f.id), Some(ids[1]));
        assert!(!queue.contains(ids[1]));
        assert!(queue.remove(ids[1]).is_none());
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|f| f.id), Some(ids[0]));
    }

    #[test]
    fn test_in_flight() {
        let shared = SharedQueues::new();
        let id = JobId::next();
        let mut state = shared.state.lock();
        assert!(!state.is_in_flight(id));
        state.running = Some(id);
        assert!(state.is_in_flight(id));
    }
}
