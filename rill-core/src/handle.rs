// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::stream::Stream;
use crate::stream_item::StreamItem;
use rill_error::RillError;
use std::cell::Cell;
use std::rc::Rc;

/// Emits items into a stream from a generator or a consumer handler.
///
/// `Push` is `Clone + 'static`: move it into deferred work to produce
/// asynchronously. Items pushed while the stream is paused are buffered.
pub struct Push<T> {
    stream: Stream<T>,
}

impl<T> Clone for Push<T> {
    fn clone(&self) -> Self {
        Self {
            stream: self.stream.clone(),
        }
    }
}

impl<T: 'static> Push<T> {
    pub(crate) fn new(stream: Stream<T>) -> Self {
        Self { stream }
    }

    /// Push a raw item. Returns `false` when the stream stopped flowing.
    pub fn send(&self, item: StreamItem<T>) -> bool {
        self.stream.write_local(item)
    }

    pub fn value(&self, value: T) -> bool {
        self.send(StreamItem::Value(value))
    }

    pub fn error(&self, error: RillError) -> bool {
        self.send(StreamItem::Error(error))
    }

    /// End the stream. Nothing pushed afterwards is delivered.
    pub fn end(&self) {
        self.send(StreamItem::End);
    }

    pub(crate) fn release_upstream(&self) {
        self.stream.release_upstream();
    }
}

/// Whether the consumer asked for more while its handler was running.
#[derive(Default)]
pub(crate) struct Demand {
    in_handler: Cell<bool>,
    next_called: Cell<bool>,
}

impl Demand {
    pub(crate) fn begin(&self) {
        self.in_handler.set(true);
        self.next_called.set(false);
    }

    /// Leave the handler, returning whether `next()` was called during it.
    pub(crate) fn finish(&self) -> bool {
        self.in_handler.set(false);
        self.next_called.replace(false)
    }

    pub(crate) fn in_handler(&self) -> bool {
        self.in_handler.get()
    }
}

/// Requests the next call of a generator or consumer handler.
///
/// Calling [`Next::call`] from inside the generator or handler continues the
/// current drain loop; calling it later resumes production.
pub struct Next<T> {
    stream: Stream<T>,
    demand: Option<Rc<Demand>>,
}

impl<T> Clone for Next<T> {
    fn clone(&self) -> Self {
        Self {
            stream: self.stream.clone(),
            demand: self.demand.clone(),
        }
    }
}

impl<T: 'static> Next<T> {
    pub(crate) fn for_generator(stream: Stream<T>) -> Self {
        Self {
            stream,
            demand: None,
        }
    }

    pub(crate) fn for_consumer(stream: Stream<T>, demand: Rc<Demand>) -> Self {
        Self {
            stream,
            demand: Some(demand),
        }
    }

    pub fn call(&self) {
        match &self.demand {
            Some(demand) if demand.in_handler() => demand.next_called.set(true),
            Some(_) => self.stream.resume_local(),
            None => {
                let paused = {
                    let mut st = self.stream.inner.state.borrow_mut();
                    st.generator_running = false;
                    st.paused
                };
                if !paused {
                    self.stream.resume_local();
                }
            }
        }
    }

    /// Hand all future production over to `to`.
    ///
    /// Items already pushed are delivered first. Then the consumers of this
    /// stream move to `to` and this stream forwards to it from now on. A
    /// generator is dropped; a consumer output leaves its upstream.
    pub fn redirect(&self, to: Stream<T>) {
        self.stream.pause_local();
        self.stream.enqueue_redirect(to);
        match &self.demand {
            Some(demand) => {
                if demand.in_handler() {
                    demand.next_called.set(true);
                }
                self.stream.resume_local();
            }
            None => {
                self.stream.inner.state.borrow_mut().generator_running = false;
                self.stream.check_back_pressure();
            }
        }
    }
}
