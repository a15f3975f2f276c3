// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sharing one upstream between several sibling streams.
//!
//! Synchronized siblings (forks) read a shared cache through their own
//! cursor. The upstream only produces when every synchronized sibling is
//! flowing and has read the whole cache, so forks advance in lockstep and
//! a slow fork holds everyone back. Passive siblings (observers) get a copy
//! of every item as it is produced and buffer it themselves.

use crate::link::{Feed, Sink};
use crate::stream::{Consumers, Source, Stream};
use crate::stream_item::StreamItem;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Discipline {
    Synchronized,
    Passive,
}

/// Delivery to a set of sibling sinks.
pub(crate) trait Group<T> {
    fn join(&self, sink: Rc<dyn Sink<T>>, discipline: Discipline);

    fn leave(&self, id: u64) -> Option<Rc<dyn Sink<T>>>;

    fn is_empty(&self) -> bool;

    /// At least one synchronized sibling drives production.
    fn has_primary(&self) -> bool;

    fn broadcast(&self, item: StreamItem<T>);

    /// Replay cached entries to flowing siblings, then report whether the
    /// upstream may produce the next entry.
    fn ready(&self) -> bool;

    fn sinks(&self) -> Vec<Rc<dyn Sink<T>>>;
}

struct Sibling<T> {
    sink: Rc<dyn Sink<T>>,
    discipline: Discipline,
    // Absolute index of the next cache entry to deliver
    cursor: usize,
}

struct Cache<T> {
    entries: VecDeque<StreamItem<T>>,
    // Absolute index of `entries[0]`
    base: usize,
    siblings: Vec<Sibling<T>>,
    end_cached: bool,
}

impl<T> Cache<T> {
    fn end(&self) -> usize {
        self.base + self.entries.len()
    }

    fn synchronized(&self) -> impl Iterator<Item = &Sibling<T>> {
        self.siblings
            .iter()
            .filter(|s| s.discipline == Discipline::Synchronized)
    }
}

pub(crate) struct Multicast<T> {
    label: String,
    cache: RefCell<Cache<T>>,
}

impl<T: Clone + 'static> Multicast<T> {
    fn new(label: String) -> Self {
        Self {
            label,
            cache: RefCell::new(Cache {
                entries: VecDeque::new(),
                base: 0,
                siblings: Vec::new(),
                end_cached: false,
            }),
        }
    }

    /// Deliver cached entries to flowing synchronized siblings, oldest first.
    fn flush(&self) {
        loop {
            let delivery = {
                let mut guard = self.cache.borrow_mut();
                let cache = &mut *guard;
                let end = cache.base + cache.entries.len();
                let base = cache.base;
                let entries = &cache.entries;
                cache
                    .siblings
                    .iter_mut()
                    .filter(|s| {
                        s.discipline == Discipline::Synchronized
                            && s.cursor < end
                            && !s.sink.is_paused()
                    })
                    .min_by_key(|s| s.cursor)
                    .map(|s| {
                        let item = entries[s.cursor - base].clone();
                        s.cursor += 1;
                        (Rc::clone(&s.sink), item)
                    })
            };
            match delivery {
                Some((sink, item)) => sink.write(item),
                None => break,
            }
        }
        self.evict();
    }

    /// Drop entries every synchronized sibling has read.
    fn evict(&self) {
        let mut cache = self.cache.borrow_mut();
        let end = cache.end();
        let low = cache.synchronized().map(|s| s.cursor).min().unwrap_or(end);
        let mut evicted = 0;
        while cache.base < low && cache.entries.pop_front().is_some() {
            cache.base += 1;
            evicted += 1;
        }
        if evicted > 0 {
            trace!("{}: evicted {} cached entries", self.label, evicted);
        }
    }
}

impl<T: Clone + 'static> Group<T> for Multicast<T> {
    fn join(&self, sink: Rc<dyn Sink<T>>, discipline: Discipline) {
        let mut cache = self.cache.borrow_mut();
        let cursor = cache.end();
        cache.siblings.push(Sibling {
            sink,
            discipline,
            cursor,
        });
    }

    fn leave(&self, id: u64) -> Option<Rc<dyn Sink<T>>> {
        let left = {
            let mut cache = self.cache.borrow_mut();
            let position = cache.siblings.iter().position(|s| s.sink.id() == id)?;
            cache.siblings.remove(position).sink
        };
        self.evict();
        Some(left)
    }

    fn is_empty(&self) -> bool {
        self.cache.borrow().siblings.is_empty()
    }

    fn has_primary(&self) -> bool {
        self.cache.borrow().synchronized().next().is_some()
    }

    fn broadcast(&self, item: StreamItem<T>) {
        let observers = {
            let mut cache = self.cache.borrow_mut();
            if cache.end_cached {
                if !item.is_end() {
                    warn!("{}: item produced after End was dropped", self.label);
                    return;
                }
                // Replayed End: only for siblings that have nothing left to read
                let end = cache.end();
                let late: Vec<_> = cache
                    .siblings
                    .iter()
                    .filter(|s| s.discipline == Discipline::Passive || s.cursor >= end)
                    .map(|s| Rc::clone(&s.sink))
                    .collect();
                drop(cache);
                for sink in late {
                    sink.write(StreamItem::End);
                }
                return;
            }

            if item.is_end() {
                cache.end_cached = true;
            }
            if cache.synchronized().next().is_some() {
                cache.entries.push_back(item.clone());
            }
            cache
                .siblings
                .iter()
                .filter(|s| s.discipline == Discipline::Passive)
                .map(|s| Rc::clone(&s.sink))
                .collect::<Vec<_>>()
        };

        self.flush();
        for sink in observers {
            sink.write(item.clone());
        }
    }

    fn ready(&self) -> bool {
        self.flush();
        let cache = self.cache.borrow();
        let end = cache.end();
        let mut synchronized = cache.synchronized().peekable();
        synchronized.peek().is_some()
            && synchronized.all(|s| s.cursor >= end && !s.sink.is_paused())
    }

    fn sinks(&self) -> Vec<Rc<dyn Sink<T>>> {
        self.cache
            .borrow()
            .siblings
            .iter()
            .map(|s| Rc::clone(&s.sink))
            .collect()
    }
}

/// Feeds a sibling stream from the shared upstream.
struct ForwardLink<T> {
    upstream: RefCell<Stream<T>>,
    output: Stream<T>,
}

impl<T: 'static> Sink<T> for ForwardLink<T> {
    fn id(&self) -> u64 {
        self.output.id()
    }

    fn write(&self, item: StreamItem<T>) {
        if self.output.end_queued() {
            return;
        }
        self.output.write_local(item);
    }

    fn is_paused(&self) -> bool {
        self.output.paused_local()
    }

    fn rebind(&self, upstream: Stream<T>) {
        *self.upstream.borrow_mut() = upstream;
    }
}

impl<T: 'static> Feed for ForwardLink<T> {
    fn pull(&self) {
        let upstream = self.upstream.borrow().clone();
        upstream.check_back_pressure();
    }

    fn on_pause(&self) {
        let upstream = self.upstream.borrow().clone();
        upstream.check_back_pressure();
    }

    fn detach(&self) {
        let upstream = self.upstream.borrow().clone();
        upstream.remove_consumer(self.output.id());
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Create a synchronized sibling of this stream.
    ///
    /// An existing consumer becomes the first sibling. Every sibling sees the
    /// same items in the same order and the upstream produces each item once,
    /// only when all siblings are flowing.
    pub fn fork(&self) -> Stream<T> {
        let branch = self.branch(Discipline::Synchronized);
        self.resolve().check_back_pressure();
        branch
    }

    /// Create an observer of this stream.
    ///
    /// The observer receives a copy of every item produced for the other
    /// consumers and buffers it while paused. It never causes or holds back
    /// production.
    pub fn observe(&self) -> Stream<T> {
        self.branch(Discipline::Passive)
    }

    fn branch(&self, discipline: Discipline) -> Stream<T> {
        let upstream = self.resolve();
        let branch = Stream::new();
        let link = Rc::new(ForwardLink {
            upstream: RefCell::new(upstream.clone()),
            output: branch.clone(),
        });
        upstream.group().join(link.clone(), discipline);
        branch.inner.state.borrow_mut().source = Source::Upstream(link);
        debug!(
            "{}: {:?} sibling {} joined",
            upstream.label(),
            discipline,
            branch.label()
        );
        branch
    }

    /// The multicast group of this stream, created on first use.
    fn group(&self) -> Rc<dyn Group<T>> {
        let mut st = self.inner.state.borrow_mut();
        if let Consumers::Group(group) = &st.consumers {
            return Rc::clone(group);
        }
        let group = Rc::new(Multicast::new(st.label.clone()));
        if let Consumers::Single(sink) = mem::replace(&mut st.consumers, Consumers::None) {
            group.join(sink, Discipline::Synchronized);
        }
        st.consumers = Consumers::Group(group.clone());
        group
    }
}
