// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::recorder::Counter;
use rill_interop::{ExternalSource, SourceEmitter};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// An external producer that emits the items of a vector as fast as it is
/// allowed to, then ends.
///
/// Emission is synchronous: the first item is emitted as soon as the
/// producer is started, and again every time it is resumed.
pub struct VecReadable<T> {
    items: RefCell<VecDeque<T>>,
    emitter: RefCell<Option<SourceEmitter<T>>>,
    paused: Cell<bool>,
    flowing: Cell<bool>,
    ended: Cell<bool>,
    pauses: Counter,
    resumes: Counter,
}

impl<T: 'static> VecReadable<T> {
    pub fn new(items: Vec<T>) -> Rc<Self> {
        Rc::new(Self {
            items: RefCell::new(items.into()),
            emitter: RefCell::new(None),
            paused: Cell::new(false),
            flowing: Cell::new(false),
            ended: Cell::new(false),
            pauses: Counter::new(),
            resumes: Counter::new(),
        })
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Items not emitted yet.
    pub fn remaining(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn pause_count(&self) -> usize {
        self.pauses.get()
    }

    pub fn resume_count(&self) -> usize {
        self.resumes.get()
    }

    fn flow(&self) {
        if self.flowing.replace(true) {
            return;
        }
        while !self.paused.get() {
            let Some(emitter) = self.emitter.borrow().clone() else {
                break;
            };
            let item = self.items.borrow_mut().pop_front();
            match item {
                Some(item) => {
                    emitter.data(item);
                }
                None => {
                    if !self.ended.replace(true) {
                        emitter.end();
                    }
                    break;
                }
            }
        }
        self.flowing.set(false);
    }
}

impl<T: 'static> ExternalSource<T> for VecReadable<T> {
    fn start(&self, emitter: SourceEmitter<T>) {
        *self.emitter.borrow_mut() = Some(emitter);
        self.flow();
    }

    fn pause(&self) {
        self.pauses.increment();
        self.paused.set(true);
    }

    fn resume(&self) {
        self.resumes.increment();
        self.paused.set(false);
        self.flow();
    }
}
