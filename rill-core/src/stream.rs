// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::handle::{Next, Push};
use crate::link::{Feed, Sink};
use crate::multicast::Group;
use crate::pull::PullQueue;
use crate::stream_item::StreamItem;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) type Generator<T> = Box<dyn FnMut(&Push<T>, &Next<T>)>;
pub(crate) type Listener = Rc<dyn Fn()>;

/// An entry of a stream's incoming buffer.
pub(crate) enum Queued<T> {
    Item(StreamItem<T>),
    /// Hand all future production over to another stream once reached
    Redirect(Stream<T>),
}

/// Where a stream gets its items from once its buffer is drained.
pub(crate) enum Source<T> {
    /// Manual writes only
    Empty,
    Sequence(Box<dyn Iterator<Item = T>>),
    /// `None` while the generator is running
    Generator(Option<Generator<T>>),
    /// The stream consumes another stream
    Upstream(Rc<dyn Feed>),
    /// Production was delegated to another stream
    Redirect(Stream<T>),
}

impl<T: 'static> Source<T> {
    pub(crate) fn delegate(&self) -> Option<Stream<T>> {
        match self {
            Source::Redirect(to) => Some(to.clone()),
            _ => None,
        }
    }

    pub(crate) fn feed(&self) -> Option<Rc<dyn Feed>> {
        match self {
            Source::Upstream(feed) => Some(Rc::clone(feed)),
            _ => None,
        }
    }

    pub(crate) fn take_feed(&mut self) -> Option<Rc<dyn Feed>> {
        match mem::replace(self, Source::Empty) {
            Source::Upstream(feed) => Some(feed),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Swap out anything that can still produce items, leaving `Empty`.
    pub(crate) fn retire(&mut self) -> Source<T> {
        match self {
            Source::Sequence(_) | Source::Generator(_) | Source::Upstream(_) => {
                mem::replace(self, Source::Empty)
            }
            Source::Empty | Source::Redirect(_) => Source::Empty,
        }
    }
}

/// Whoever reads a stream.
pub(crate) enum Consumers<T> {
    None,
    Single(Rc<dyn Sink<T>>),
    Group(Rc<dyn Group<T>>),
}

impl<T> Clone for Consumers<T> {
    fn clone(&self) -> Self {
        match self {
            Consumers::None => Consumers::None,
            Consumers::Single(sink) => Consumers::Single(Rc::clone(sink)),
            Consumers::Group(group) => Consumers::Group(Rc::clone(group)),
        }
    }
}

impl<T> Consumers<T> {
    /// A reader that drives production is registered.
    pub(crate) fn is_attached(&self) -> bool {
        match self {
            Consumers::None => false,
            Consumers::Single(_) => true,
            Consumers::Group(group) => group.has_primary(),
        }
    }

    pub(crate) fn is_present(&self) -> bool {
        !matches!(self, Consumers::None)
    }

    pub(crate) fn sinks(&self) -> Vec<Rc<dyn Sink<T>>> {
        match self {
            Consumers::None => Vec::new(),
            Consumers::Single(sink) => vec![Rc::clone(sink)],
            Consumers::Group(group) => group.sinks(),
        }
    }
}

pub(crate) struct State<T> {
    pub(crate) label: String,
    pub(crate) paused: bool,
    pub(crate) ended: bool,
    pub(crate) end_queued: bool,
    pub(crate) incoming: VecDeque<Queued<T>>,
    pub(crate) source: Source<T>,
    pub(crate) consumers: Consumers<T>,
    pub(crate) resume_running: bool,
    pub(crate) repeat_resume: bool,
    pub(crate) generator_running: bool,
    pub(crate) drain_listeners: Vec<Listener>,
    pub(crate) pause_listeners: Vec<Listener>,
    pub(crate) pull_queue: Option<Rc<PullQueue<T>>>,
    /// Redirected streams whose source points here
    pub(crate) forwarders: Vec<Weak<Inner<T>>>,
}

pub(crate) struct Inner<T> {
    pub(crate) id: u64,
    pub(crate) state: RefCell<State<T>>,
}

/// A lazy, back-pressure aware stream of `T`.
///
/// A `Stream` is a cheap handle: clones share one identity. Streams start
/// paused and produce nothing until a consumer resumes them. Items are
/// delivered strictly in order, one consumer at a time; use [`Stream::fork`]
/// or [`Stream::observe`] to share a stream.
///
/// Streams are single-threaded (`!Send`) and are driven synchronously by
/// whoever writes to or resumes them. Asynchronous producers simply call
/// [`Push`] and [`Next`] later.
///
/// # Examples
///
/// ```
/// use rill_core::{Push, Stream, StreamItem};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
///
/// let numbers = Stream::from(vec![1, 2, 3]);
/// let out: Stream<()> = numbers.consume(move |item, _push: &Push<()>, next| {
///     if let StreamItem::Value(x) = item {
///         sink.borrow_mut().push(x);
///         next.call();
///     }
/// });
/// out.resume();
///
/// assert_eq!(*seen.borrow(), vec![1, 2, 3]);
/// ```
pub struct Stream<T> {
    pub(crate) inner: Rc<Inner<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// A non-owning reference to a [`Stream`].
pub struct WeakStream<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Clone for WeakStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> WeakStream<T> {
    /// The stream, if it is still alive.
    pub fn upgrade(&self) -> Option<Stream<T>> {
        self.inner.upgrade().map(|inner| Stream { inner })
    }
}

impl<T: 'static> Stream<T> {
    /// A stream with no source: items only arrive through [`Stream::write`].
    pub fn new() -> Self {
        Self::with_source(Source::Empty)
    }

    /// A stream driven by a generator closure.
    ///
    /// The generator is called whenever the stream needs items and has none
    /// buffered. It may push any number of items, then calls `next.call()`
    /// to be invoked again, possibly later from asynchronous work. It is
    /// never invoked again once it pushed `End`.
    pub fn generator<F>(generator: F) -> Self
    where
        F: FnMut(&Push<T>, &Next<T>) + 'static,
    {
        Self::with_source(Source::Generator(Some(Box::new(generator))))
    }

    /// A finite stream over the items of an iterator, pulled lazily.
    pub fn from_iterator<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::with_source(Source::Sequence(Box::new(items.into_iter())))
    }

    pub(crate) fn with_source(source: Source<T>) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: Rc::new(Inner {
                id,
                state: RefCell::new(State {
                    label: format!("stream-{id}"),
                    paused: true,
                    ended: false,
                    end_queued: false,
                    incoming: VecDeque::new(),
                    source,
                    consumers: Consumers::None,
                    resume_running: false,
                    repeat_resume: false,
                    generator_running: false,
                    drain_listeners: Vec::new(),
                    pause_listeners: Vec::new(),
                    pull_queue: None,
                    forwarders: Vec::new(),
                }),
            }),
        }
    }

    /// Builder-style [`Stream::set_label`].
    #[must_use]
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    /// Unique identity of this stream.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Human readable name used in diagnostics.
    pub fn label(&self) -> String {
        self.inner.state.borrow().label.clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        self.inner.state.borrow_mut().label = label.into();
    }

    /// Whether both handles refer to the same stream.
    pub fn ptr_eq(&self, other: &Stream<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakStream<T> {
        WeakStream {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Stop producing and propagate back-pressure to the upstream.
    ///
    /// Buffered items stay buffered. Production that is already in flight
    /// lands in the buffer.
    pub fn pause(&self) {
        self.resolve().pause_local();
    }

    /// Start or continue delivering items to the consumer.
    ///
    /// Idempotent and safe to call from inside handlers: a nested call only
    /// requests another pass of the running drain loop.
    pub fn resume(&self) {
        self.resolve().resume_local();
    }

    /// Push an item into the stream by hand.
    ///
    /// Returns `false` when the item had to be buffered (the stream is paused
    /// or has no consumer) or when the consumer paused while handling it.
    /// Items written after `End` are ignored.
    pub fn write(&self, item: StreamItem<T>) -> bool {
        self.resolve().write_local(item)
    }

    /// Register a callback invoked whenever the stream is resumed with an
    /// empty buffer and nothing else to pull from.
    pub fn on_drain<F>(&self, listener: F)
    where
        F: Fn() + 'static,
    {
        self.resolve()
            .inner
            .state
            .borrow_mut()
            .drain_listeners
            .push(Rc::new(listener));
    }

    /// Register a callback invoked whenever the stream stops flowing.
    pub fn on_pause<F>(&self, listener: F)
    where
        F: Fn() + 'static,
    {
        self.resolve()
            .inner
            .state
            .borrow_mut()
            .pause_listeners
            .push(Rc::new(listener));
    }

    pub fn is_paused(&self) -> bool {
        self.resolve().paused_local()
    }

    /// `End` has been delivered to a consumer.
    pub fn is_ended(&self) -> bool {
        self.resolve().inner.state.borrow().ended
    }

    /// Number of items waiting in the incoming buffer.
    pub fn buffered_len(&self) -> usize {
        self.resolve()
            .inner
            .state
            .borrow()
            .incoming
            .iter()
            .filter(|queued| matches!(queued, Queued::Item(_)))
            .count()
    }

    /// Snapshot of the items waiting in the incoming buffer.
    pub fn buffered(&self) -> Vec<StreamItem<T>>
    where
        T: Clone,
    {
        self.resolve()
            .inner
            .state
            .borrow()
            .incoming
            .iter()
            .filter_map(|queued| match queued {
                Queued::Item(item) => Some(item.clone()),
                Queued::Redirect(_) => None,
            })
            .collect()
    }

    /// End the stream now.
    ///
    /// Clears the buffer, drops the source, leaves the upstream this stream
    /// consumes and delivers `End` to the consumer if one is attached.
    pub fn destroy(&self) {
        self.resolve().destroy_local();
    }
}

impl<T: 'static> Default for Stream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> From<Vec<T>> for Stream<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_iterator(items)
    }
}

impl<T: 'static> FromIterator<T> for Stream<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Stream");
        debug.field("id", &self.inner.id);
        if let Ok(state) = self.inner.state.try_borrow() {
            debug
                .field("label", &state.label)
                .field("paused", &state.paused)
                .field("ended", &state.ended)
                .field("buffered", &state.incoming.len());
        }
        debug.finish()
    }
}
