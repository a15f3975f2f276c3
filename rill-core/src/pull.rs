// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::handle::Next;
use crate::stream::Stream;
use crate::stream_item::StreamItem;
use rill_error::Result;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

type PullCallback<T> = Box<dyn FnOnce(StreamItem<T>)>;

/// Callbacks waiting on a stream, served in order by one transient consumer.
pub(crate) struct PullQueue<T> {
    link_id: Cell<u64>,
    waiting: RefCell<VecDeque<PullCallback<T>>>,
}

impl<T> PullQueue<T> {
    fn new(first: PullCallback<T>) -> Self {
        Self {
            link_id: Cell::new(0),
            waiting: RefCell::new(VecDeque::from([first])),
        }
    }

    pub(crate) fn link_id(&self) -> u64 {
        self.link_id.get()
    }

    fn enqueue(&self, callback: PullCallback<T>) {
        self.waiting.borrow_mut().push_back(callback);
    }

    /// The next callback and whether others are still waiting behind it.
    fn take_next(&self) -> (Option<PullCallback<T>>, bool) {
        let mut waiting = self.waiting.borrow_mut();
        let next = waiting.pop_front();
        (next, !waiting.is_empty())
    }

    fn take_all(&self) -> Vec<PullCallback<T>> {
        self.waiting.borrow_mut().drain(..).collect()
    }
}

impl<T: 'static> Stream<T> {
    /// Read exactly one item, which may be `End`.
    ///
    /// Several pulls may be outstanding; they are served in call order.
    ///
    /// # Panics
    ///
    /// Panics with `RillError::AlreadyConsumed` if the stream has a standing
    /// consumer. See [`Stream::try_pull`].
    pub fn pull<F>(&self, callback: F)
    where
        F: FnOnce(StreamItem<T>) + 'static,
    {
        if let Err(e) = self.try_pull(callback) {
            panic!("{e}");
        }
    }

    /// Like [`Stream::pull`], failing instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns `RillError::AlreadyConsumed` if a standing consumer is
    /// registered on the stream.
    pub fn try_pull<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(StreamItem<T>) + 'static,
    {
        let upstream = self.resolve();
        let active = upstream.inner.state.borrow().pull_queue.clone();
        if let Some(queue) = active {
            queue.enqueue(Box::new(callback));
            return Ok(());
        }

        let queue = Rc::new(PullQueue::new(Box::new(callback)));
        let waiting = Rc::clone(&queue);
        let output: Stream<()> = upstream.try_consume(move |item, push, next| {
            if item.is_end() {
                let callbacks = waiting.take_all();
                push.release_upstream();
                for callback in callbacks {
                    callback(StreamItem::End);
                }
                return;
            }

            let (callback, more) = waiting.take_next();
            if !more {
                push.release_upstream();
            }
            if let Some(callback) = callback {
                callback(item);
            }
            if more {
                next.call();
            }
        })?;

        queue.link_id.set(output.id());
        upstream.inner.state.borrow_mut().pull_queue = Some(queue);
        output.resume_local();
        Ok(())
    }
}

/// A standing registration that reads one item per request.
///
/// Unlike [`Stream::try_pull`], the reader keeps the stream claimed between
/// requests, so no other consumer can attach while it exists. Between
/// requests the stream is paused.
pub struct Reader<T> {
    output: Stream<()>,
    queue: Rc<ReadQueue<T>>,
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        Self {
            output: self.output.clone(),
            queue: Rc::clone(&self.queue),
        }
    }
}

struct ReadQueue<T> {
    waiting: RefCell<VecDeque<PullCallback<T>>>,
    // Items that arrived before anyone asked for them
    stash: RefCell<VecDeque<StreamItem<T>>>,
    next: RefCell<Option<Next<()>>>,
    ended: Cell<bool>,
}

impl<T: 'static> Reader<T> {
    /// Read exactly one item, which may be `End`. Requests are served in
    /// call order; once the stream ended every request receives `End`.
    pub fn pull<F>(&self, callback: F)
    where
        F: FnOnce(StreamItem<T>) + 'static,
    {
        let stashed = self.queue.stash.borrow_mut().pop_front();
        if let Some(item) = stashed {
            callback(item);
            return;
        }
        if self.queue.ended.get() {
            callback(StreamItem::End);
            return;
        }

        self.queue.waiting.borrow_mut().push_back(Box::new(callback));
        let next = self.queue.next.borrow().clone();
        match next {
            Some(next) => next.call(),
            None => self.output.resume_local(),
        }
    }
}

impl<T: 'static> Stream<T> {
    /// Claim the stream for one-at-a-time reading.
    ///
    /// # Panics
    ///
    /// Panics with `RillError::AlreadyConsumed` if the stream already has a
    /// consumer. See [`Stream::try_reader`].
    pub fn reader(&self) -> Reader<T> {
        match self.try_reader() {
            Ok(reader) => reader,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Stream::reader`], failing instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns `RillError::AlreadyConsumed` if a consumer is registered.
    pub fn try_reader(&self) -> Result<Reader<T>> {
        let queue = Rc::new(ReadQueue {
            waiting: RefCell::new(VecDeque::new()),
            stash: RefCell::new(VecDeque::new()),
            next: RefCell::new(None),
            ended: Cell::new(false),
        });

        let shared = Rc::clone(&queue);
        let output: Stream<()> = self.try_consume(move |item, _push, next| {
            *shared.next.borrow_mut() = Some(next.clone());
            if item.is_end() {
                shared.ended.set(true);
                let callbacks: Vec<_> = shared.waiting.borrow_mut().drain(..).collect();
                for callback in callbacks {
                    callback(StreamItem::End);
                }
                return;
            }

            let callback = shared.waiting.borrow_mut().pop_front();
            match callback {
                Some(callback) => callback(item),
                None => shared.stash.borrow_mut().push_back(item),
            }
            if !shared.waiting.borrow().is_empty() {
                next.call();
            }
        })?;

        Ok(Reader { output, queue })
    }
}
