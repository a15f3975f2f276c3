// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::handle::{Demand, Next, Push};
use crate::link::{Feed, Sink};
use crate::stream::{Source, Stream};
use crate::stream_item::StreamItem;
use rill_error::Result;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

type Handler<T, U> = Box<dyn FnMut(StreamItem<T>, &Push<U>, &Next<U>)>;

/// Connects an upstream stream to the output stream of a consumer handler.
struct ConsumeLink<T, U> {
    upstream: RefCell<Stream<T>>,
    output: Stream<U>,
    handler: RefCell<Option<Handler<T, U>>>,
    // Items that arrived while the handler was busy or the output paused
    pending: RefCell<VecDeque<StreamItem<T>>>,
    demand: Rc<Demand>,
    finished: Cell<bool>,
}

impl<T: 'static, U: 'static> ConsumeLink<T, U> {
    fn upstream(&self) -> Stream<T> {
        self.upstream.borrow().clone()
    }

    fn deliver(&self, item: StreamItem<T>) {
        if self.finished.get() {
            return;
        }
        let handler = self.handler.borrow_mut().take();
        let Some(mut handler) = handler else {
            self.pending.borrow_mut().push_back(item);
            return;
        };

        let is_end = item.is_end();
        if is_end {
            self.finished.set(true);
        }

        self.demand.begin();
        let push = Push::new(self.output.clone());
        let next = Next::for_consumer(self.output.clone(), Rc::clone(&self.demand));
        handler(item, &push, &next);
        let next_called = self.demand.finish();

        if is_end {
            drop(handler);
            return;
        }
        *self.handler.borrow_mut() = Some(handler);
        if !next_called {
            self.output.pause_local();
        }
    }

    fn drain_pending(&self) {
        loop {
            if self.output.paused_local() || self.demand.in_handler() {
                return;
            }
            let item = self.pending.borrow_mut().pop_front();
            match item {
                Some(item) => self.deliver(item),
                None => return,
            }
        }
    }
}

impl<T: 'static, U: 'static> Sink<T> for ConsumeLink<T, U> {
    fn id(&self) -> u64 {
        self.output.id()
    }

    fn write(&self, item: StreamItem<T>) {
        let blocked = self.output.paused_local()
            || self.demand.in_handler()
            || !self.pending.borrow().is_empty();
        if blocked {
            self.pending.borrow_mut().push_back(item);
            return;
        }
        self.deliver(item);
        self.drain_pending();
    }

    fn is_paused(&self) -> bool {
        self.output.paused_local()
    }

    fn rebind(&self, upstream: Stream<T>) {
        *self.upstream.borrow_mut() = upstream;
    }
}

impl<T: 'static, U: 'static> Feed for ConsumeLink<T, U> {
    fn pull(&self) {
        self.drain_pending();
        if self.output.paused_local() || !self.pending.borrow().is_empty() {
            return;
        }
        self.upstream().check_back_pressure();
    }

    fn on_pause(&self) {
        self.upstream().check_back_pressure();
    }

    fn detach(&self) {
        self.upstream().remove_consumer(self.output.id());
    }
}

impl<T: 'static> Stream<T> {
    /// Register `handler` as the consumer of this stream.
    ///
    /// The handler receives every item, including the final `End`, and
    /// writes to the returned output stream through `push`. It calls
    /// `next.call()` to receive the next item; a handler that returns
    /// without doing so pauses the output until `next` is called later.
    ///
    /// Nothing flows until the output stream is resumed.
    ///
    /// # Panics
    ///
    /// Panics with [`RillError::AlreadyConsumed`](rill_error::RillError) if
    /// the stream already has a consumer. See [`Stream::try_consume`].
    pub fn consume<U, F>(&self, handler: F) -> Stream<U>
    where
        U: 'static,
        F: FnMut(StreamItem<T>, &Push<U>, &Next<U>) + 'static,
    {
        match self.try_consume(handler) {
            Ok(output) => output,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Stream::consume`], failing instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns `RillError::AlreadyConsumed` if a consumer is registered.
    pub fn try_consume<U, F>(&self, handler: F) -> Result<Stream<U>>
    where
        U: 'static,
        F: FnMut(StreamItem<T>, &Push<U>, &Next<U>) + 'static,
    {
        let upstream = self.resolve();
        let output = Stream::new();
        let link = Rc::new(ConsumeLink {
            upstream: RefCell::new(upstream.clone()),
            output: output.clone(),
            handler: RefCell::new(Some(Box::new(handler))),
            pending: RefCell::new(VecDeque::new()),
            demand: Rc::new(Demand::default()),
            finished: Cell::new(false),
        });
        upstream.add_consumer(link.clone())?;
        output.inner.state.borrow_mut().source = Source::Upstream(link);
        Ok(output)
    }
}
