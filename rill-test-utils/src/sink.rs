// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rill_error::RillError;
use rill_interop::{ExternalSink, Readiness};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// An external consumer that records what it is given.
///
/// A sink built with [`RecordingSink::stalling_at`] refuses the write that
/// brings it to `limit` values and stays stalled until [`RecordingSink::ready`]
/// is called.
pub struct RecordingSink<T> {
    values: RefCell<Vec<T>>,
    errors: RefCell<Vec<RillError>>,
    ends: Cell<usize>,
    stall_at: Option<usize>,
    stalled: Cell<bool>,
    readiness: RefCell<Option<Readiness>>,
}

impl<T> RecordingSink<T> {
    pub fn new() -> Rc<Self> {
        Self::build(None)
    }

    pub fn stalling_at(limit: usize) -> Rc<Self> {
        Self::build(Some(limit))
    }

    fn build(stall_at: Option<usize>) -> Rc<Self> {
        Rc::new(Self {
            values: RefCell::new(Vec::new()),
            errors: RefCell::new(Vec::new()),
            ends: Cell::new(0),
            stall_at,
            stalled: Cell::new(false),
            readiness: RefCell::new(None),
        })
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled.get()
    }

    pub fn errors(&self) -> Vec<RillError> {
        self.errors.borrow().clone()
    }

    /// How many times `end` was called.
    pub fn end_count(&self) -> usize {
        self.ends.get()
    }

    /// Clear the stall and signal readiness to the pipe.
    pub fn ready(&self) {
        self.stalled.set(false);
        let readiness = self.readiness.borrow().clone();
        if let Some(readiness) = readiness {
            readiness.signal();
        }
    }
}

impl<T: Clone> RecordingSink<T> {
    pub fn values(&self) -> Vec<T> {
        self.values.borrow().clone()
    }
}

impl<T> ExternalSink<T> for RecordingSink<T> {
    fn write(&self, value: T) -> bool {
        let len = {
            let mut values = self.values.borrow_mut();
            values.push(value);
            values.len()
        };
        if self.stall_at == Some(len) {
            self.stalled.set(true);
            return false;
        }
        true
    }

    fn error(&self, error: RillError) {
        self.errors.borrow_mut().push(error);
    }

    fn end(&self) {
        self.ends.set(self.ends.get() + 1);
    }

    fn on_ready(&self, readiness: Readiness) {
        *self.readiness.borrow_mut() = Some(readiness);
    }
}
