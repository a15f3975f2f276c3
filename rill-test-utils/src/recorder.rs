// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A call counter that can be moved into `'static` closures.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    count: Rc<Cell<usize>>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.count.set(self.count.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.count.get()
    }
}

/// A shared, append-only log of values seen by closures.
#[derive(Debug)]
pub struct Recorder<T> {
    items: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            items: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T> Recorder<T> {
    pub fn record(&self, item: T) {
        self.items.borrow_mut().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Everything recorded so far, leaving the recorder empty.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.borrow_mut())
    }
}

impl<T: Clone> Recorder<T> {
    pub fn values(&self) -> Vec<T> {
        self.items.borrow().clone()
    }
}

pub fn recorder<T>() -> Recorder<T> {
    Recorder::default()
}
