// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Listener-style access to a stream.

use rill_core::{Push, Result, RillError, Stream, StreamItem};
use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

type DataListener<T> = Box<dyn FnMut(&T)>;
type ErrorListener = Box<dyn FnMut(&RillError)>;
type EndListener = Box<dyn FnOnce()>;

struct Listeners<T> {
    data: RefCell<Vec<DataListener<T>>>,
    error: RefCell<Vec<ErrorListener>>,
    end: RefCell<Vec<EndListener>>,
    completed: Cell<bool>,
}

impl<T> Listeners<T> {
    // Listeners are taken out while they run so they may register more.
    fn emit_data(&self, value: &T) {
        let mut running = mem::take(&mut *self.data.borrow_mut());
        for listener in &mut running {
            listener(value);
        }
        let mut slot = self.data.borrow_mut();
        let added = mem::replace(&mut *slot, running);
        slot.extend(added);
    }

    fn emit_error(&self, error: &RillError) -> bool {
        let mut running = mem::take(&mut *self.error.borrow_mut());
        let handled = !running.is_empty();
        for listener in &mut running {
            listener(error);
        }
        let mut slot = self.error.borrow_mut();
        let added = mem::replace(&mut *slot, running);
        slot.extend(added);
        handled
    }

    fn complete(&self) {
        self.completed.set(true);
        loop {
            let pending = mem::take(&mut *self.end.borrow_mut());
            if pending.is_empty() {
                return;
            }
            for listener in pending {
                listener();
            }
        }
    }
}

/// A stream seen through data, error and end listeners.
///
/// The first data listener registers the surface as the stream's consumer
/// and starts it. Values are read as fast as the stream produces them.
pub struct EventSurface<T> {
    stream: Stream<T>,
    listeners: Rc<Listeners<T>>,
    output: RefCell<Option<Stream<()>>>,
}

impl<T: 'static> EventSurface<T> {
    fn new(stream: Stream<T>) -> Self {
        Self {
            stream,
            listeners: Rc::new(Listeners {
                data: RefCell::new(Vec::new()),
                error: RefCell::new(Vec::new()),
                end: RefCell::new(Vec::new()),
                completed: Cell::new(false),
            }),
            output: RefCell::new(None),
        }
    }

    /// Add a data listener, starting the stream on first use.
    ///
    /// # Errors
    ///
    /// Returns `RillError::AlreadyConsumed` if something else consumes the
    /// stream.
    ///
    /// # Panics
    ///
    /// A failure arriving while no error listener is attached panics with
    /// `UnhandledFailure`.
    pub fn on_data<F>(&self, listener: F) -> Result<()>
    where
        F: FnMut(&T) + 'static,
    {
        self.listeners.data.borrow_mut().push(Box::new(listener));
        if self.output.borrow().is_some() {
            return Ok(());
        }

        let listeners = Rc::clone(&self.listeners);
        let output = self
            .stream
            .try_consume(move |item, _push: &Push<()>, next| match item {
                StreamItem::Value(x) => {
                    listeners.emit_data(&x);
                    next.call();
                }
                StreamItem::Error(e) => {
                    if !listeners.emit_error(&e) {
                        panic!("{}", e.into_unhandled());
                    }
                    next.call();
                }
                StreamItem::End => listeners.complete(),
            })
            .inspect_err(|_| {
                self.listeners.data.borrow_mut().pop();
            })?;

        debug!("{}: event listeners attached", self.stream.label());
        *self.output.borrow_mut() = Some(output.clone());
        output.resume();
        Ok(())
    }

    /// Add an error listener. Failures are no longer fatal once one is set.
    pub fn on_error<F>(&self, listener: F)
    where
        F: FnMut(&RillError) + 'static,
    {
        self.listeners.error.borrow_mut().push(Box::new(listener));
    }

    /// Add a completion listener. Fires at once if the stream already ended.
    pub fn on_end<F>(&self, listener: F)
    where
        F: FnOnce() + 'static,
    {
        if self.listeners.completed.get() {
            listener();
        } else {
            self.listeners.end.borrow_mut().push(Box::new(listener));
        }
    }

    pub fn is_completed(&self) -> bool {
        self.listeners.completed.get()
    }
}

/// Extension trait providing the event surface for streams.
pub trait EventsExt<T> {
    /// Wrap the stream in an [`EventSurface`]. Nothing is read until the
    /// first data listener is added.
    fn events(&self) -> EventSurface<T>;
}

impl<T: 'static> EventsExt<T> for Stream<T> {
    fn events(&self) -> EventSurface<T> {
        EventSurface::new(self.clone())
    }
}
