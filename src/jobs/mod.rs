//! Background job scheduler
//!
//! A single worker thread executes submitted work functions in FIFO order.
//! Finished jobs wait in a completion queue until the owning (main) thread
//! drains them, which is the only place completion callbacks run:
//!
//! ```
//! use asset_runtime::jobs::JobScheduler;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut scheduler = JobScheduler::new().unwrap();
//! let total = Rc::new(Cell::new(0u64));
//! let sink = total.clone();
//!
//! let id = scheduler.submit(
//!     (1..=10u64).collect::<Vec<_>>(),
//!     |numbers: &mut Vec<u64>| numbers.push(numbers.iter().sum()),
//!     move |canceled, numbers: Vec<u64>| {
//!         assert!(!canceled);
//!         sink.set(*numbers.last().unwrap());
//!     },
//! );
//!
//! scheduler.wait(id);
//! assert_eq!(total.get(), 55);
//! assert_eq!(scheduler.outstanding_count(), 0);
//! ```

mod queue;
mod scheduler;
mod worker;

pub use scheduler::JobScheduler;

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique job identifier
///
/// Ids start at 1 and are never reused; "no job" is `Option::<JobId>::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(NonZeroU64);

impl JobId {
    /// Allocate the next id
    pub fn next() -> Self {
        let raw = NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
