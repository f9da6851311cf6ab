//! Frame-coalesced pointer-move handling.
//!
//! Raw pointer-move events can arrive many times per frame. [`MoveCoalescer`]
//! keeps only the latest one and asks a [`FrameScheduler`] for a single flush
//! on the next frame.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use workflow_canvas::{ManualScheduler, MoveCoalescer};
//!
//! let scheduler = ManualScheduler::new();
//! let moves = MoveCoalescer::new(scheduler.clone());
//! let applied = Rc::new(Cell::new(0));
//!
//! for x in 0..10 {
//!     let applied = applied.clone();
//!     moves.submit((x, 0), move |(x, _)| applied.set(x));
//! }
//! assert_eq!(scheduler.pending(), 1);
//! scheduler.run_pending();
//! assert_eq!(applied.get(), 9);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Runs a callback once on the next frame.
pub trait FrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>);
}

/// Scheduler driven by hand, for headless use and tests.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run everything queued so far. Callbacks queued while running wait for
    /// the next call.
    pub fn run_pending(&self) {
        let callbacks = std::mem::take(&mut *self.queue.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push(callback);
    }
}

/// Runs callbacks immediately, i.e. no coalescing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl FrameScheduler for ImmediateScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        callback();
    }
}

/// Pending update plus a scheduled flag.
///
/// Clone to share between the event handler and the flush callback.
pub struct MoveCoalescer<T> {
    pending: Rc<RefCell<Option<T>>>,
    scheduled: Rc<Cell<bool>>,
    scheduler: Rc<dyn FrameScheduler>,
}

impl<T> Clone for MoveCoalescer<T> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            scheduled: self.scheduled.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: 'static> MoveCoalescer<T> {
    pub fn new<S: FrameScheduler + 'static>(scheduler: S) -> Self {
        Self::with_scheduler(Rc::new(scheduler))
    }

    pub fn with_scheduler(scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            pending: Rc::new(RefCell::new(None)),
            scheduled: Rc::new(Cell::new(false)),
            scheduler,
        }
    }

    /// Store `value` as the latest update. The first submit in a frame
    /// schedules a flush that hands the latest value to `apply`.
    pub fn submit<F>(&self, value: T, apply: F)
    where
        F: FnOnce(T) + 'static,
    {
        *self.pending.borrow_mut() = Some(value);
        if self.scheduled.replace(true) {
            return;
        }
        let pending = self.pending.clone();
        let scheduled = self.scheduled.clone();
        self.scheduler.request_frame(Box::new(move || {
            scheduled.set(false);
            let value = pending.borrow_mut().take();
            if let Some(value) = value {
                apply(value);
            }
        }));
    }

    /// Take the pending value without waiting for the frame. The scheduled
    /// flush then finds nothing to do.
    pub fn take(&self) -> Option<T> {
        self.pending.borrow_mut().take()
    }

    /// Drop the pending value.
    pub fn discard(&self) {
        self.pending.borrow_mut().take();
    }

    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}
