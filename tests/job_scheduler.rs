use asset_runtime::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_three_jobs_drained_after_sleep() {
    let mut scheduler = JobScheduler::new().unwrap();
    let counter = Rc::new(Cell::new(0));

    for ms in [10u64, 5, 1] {
        let counter = counter.clone();
        scheduler.submit(
            Duration::from_millis(ms),
            |duration: &mut Duration| thread::sleep(*duration),
            move |_, _| counter.set(counter.get() + 1),
        );
    }

    thread::sleep(Duration::from_millis(50));
    scheduler.drain_completed(Duration::from_secs(60));

    assert_eq!(counter.get(), 3);
    assert_eq!(scheduler.outstanding_count(), 0);
}

#[test]
fn test_cancel_before_start() {
    let mut scheduler = JobScheduler::new().unwrap();

    // Keep the worker busy so the next job stays queued
    let gate = Arc::new(AtomicBool::new(false));
    let open = gate.clone();
    scheduler.submit_detached((), move |_: &mut ()| {
        while !open.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(1));
        }
    });

    let ran = Arc::new(AtomicBool::new(false));
    let ran_in_work = ran.clone();
    let callbacks = Rc::new(RefCell::new(Vec::new()));
    let sink = callbacks.clone();
    let id = scheduler.submit(
        (),
        move |_: &mut ()| ran_in_work.store(true, Ordering::Release),
        move |canceled, _| sink.borrow_mut().push(canceled),
    );

    scheduler.cancel(id);
    gate.store(true, Ordering::Release);
    scheduler.wait_for_all();

    assert_eq!(*callbacks.borrow(), vec![true]);
    assert!(!ran.load(Ordering::Acquire));
}

#[test]
fn test_wait_runs_callback_exactly_once() {
    let mut scheduler = JobScheduler::new().unwrap();
    let calls = Rc::new(Cell::new(0));
    let sink = calls.clone();
    let id = scheduler.submit(
        String::from("payload"),
        |text: &mut String| text.push_str(" decoded"),
        move |canceled, text: String| {
            assert!(!canceled);
            assert_eq!(text, "payload decoded");
            sink.set(sink.get() + 1);
        },
    );

    scheduler.wait(id);
    assert_eq!(calls.get(), 1);
    scheduler.wait(id);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_finish_order_not_submit_order() {
    let mut scheduler = JobScheduler::new().unwrap();
    let order = Rc::new(RefCell::new(Vec::new()));

    // A single worker finishes jobs in submission order, so callbacks
    // follow it even when the later jobs are much shorter.
    for (index, ms) in [20u64, 1, 5].into_iter().enumerate() {
        let order = order.clone();
        scheduler.submit(
            ms,
            |ms: &mut u64| thread::sleep(Duration::from_millis(*ms)),
            move |_, _| order.borrow_mut().push(index),
        );
    }

    scheduler.wait_for_all();
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}

#[test]
fn test_drain_budget_leaves_work_for_next_frame() {
    let mut scheduler = JobScheduler::new().unwrap();
    let done = Rc::new(Cell::new(0));

    for _ in 0..4 {
        let done = done.clone();
        scheduler.submit(
            (),
            |_: &mut ()| {},
            move |_, _| {
                thread::sleep(Duration::from_millis(5));
                done.set(done.get() + 1);
            },
        );
    }
    while scheduler.completed_count() < 4 {
        thread::sleep(Duration::from_millis(1));
    }

    let first = scheduler.drain_completed(Duration::from_millis(1));
    assert_eq!(first, 1);
    assert_eq!(scheduler.outstanding_count(), 3);

    scheduler.wait_for_all();
    assert_eq!(done.get(), 4);
}
