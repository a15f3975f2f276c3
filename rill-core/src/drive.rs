// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The drain loop and the state transitions behind the public [`Stream`] API.
//!
//! No `RefCell` borrow of a stream is ever held while a sink, generator,
//! feed or listener runs: every step copies what it needs out of the state,
//! releases the borrow and only then calls out.

use crate::handle::{Next, Push};
use crate::link::Sink;
use crate::multicast::Discipline;
use crate::pull::PullQueue;
use crate::stream::{Consumers, Inner, Listener, Queued, Source, Stream};
use crate::stream_item::StreamItem;
use rill_error::{Result, RillError};
use std::mem;
use std::rc::{Rc, Weak};

/// One step of pulling from a stream's source.
enum Step<T> {
    Nothing,
    Idle(Vec<Listener>),
    Emit(StreamItem<T>),
    ReplayEnd,
    Generate,
    Feed(Rc<dyn crate::link::Feed>),
}

impl<T: 'static> Stream<T> {
    /// Follow redirections to the stream that currently produces.
    pub(crate) fn resolve(&self) -> Stream<T> {
        let mut current = self.clone();
        loop {
            let delegate = current.inner.state.borrow().source.delegate();
            match delegate {
                Some(to) => current = to,
                None => return current,
            }
        }
    }

    pub(crate) fn paused_local(&self) -> bool {
        self.inner.state.borrow().paused
    }

    pub(crate) fn end_queued(&self) -> bool {
        self.inner.state.borrow().end_queued
    }

    pub(crate) fn write_local(&self, item: StreamItem<T>) -> bool {
        let (ready, feed, unattached) = {
            let mut st = self.inner.state.borrow_mut();
            if st.end_queued {
                warn!("{}: item written after End was ignored", st.label);
                return false;
            }
            let feed = if item.is_end() {
                st.end_queued = true;
                st.source.take_feed()
            } else {
                None
            };
            let attached = st.consumers.is_attached();
            if st.paused || !attached {
                st.incoming.push_back(Queued::Item(item));
                (None, feed, !attached)
            } else {
                (Some(item), feed, false)
            }
        };

        // Leave the upstream before End travels on so that it can be consumed
        // again from completion callbacks.
        if let Some(feed) = feed {
            feed.detach();
        }

        match ready {
            Some(item) => {
                self.send(item);
                let st = self.inner.state.borrow();
                !st.paused && st.consumers.is_attached()
            }
            None => {
                if unattached {
                    self.pause_local();
                }
                false
            }
        }
    }

    /// Hand one item to the consumers, or put it back if there are none.
    pub(crate) fn send(&self, item: StreamItem<T>) {
        let (consumers, retired) = {
            let mut st = self.inner.state.borrow_mut();
            if !st.consumers.is_attached() {
                st.incoming.push_front(Queued::Item(item));
                drop(st);
                self.pause_local();
                return;
            }
            let retired = if item.is_end() {
                st.ended = true;
                st.end_queued = true;
                st.source.retire()
            } else {
                Source::Empty
            };
            (st.consumers.clone(), retired)
        };

        if let Source::Upstream(feed) = &retired {
            feed.detach();
        }
        drop(retired);

        match consumers {
            Consumers::Single(sink) => sink.write(item),
            Consumers::Group(group) => group.broadcast(item),
            Consumers::None => {}
        }
    }

    pub(crate) fn pause_local(&self) {
        let (feed, listeners) = {
            let mut st = self.inner.state.borrow_mut();
            let listeners = if st.paused {
                Vec::new()
            } else {
                trace!("{} paused", st.label);
                st.pause_listeners.clone()
            };
            st.paused = true;
            (st.source.feed(), listeners)
        };
        if let Some(feed) = feed {
            feed.on_pause();
        }
        for listener in listeners {
            listener();
        }
    }

    /// Drive the stream until it stalls.
    ///
    /// A redirect met on the way hands the loop over to the delegate, so
    /// chains of redirecting generators run in constant stack depth.
    pub(crate) fn resume_local(&self) {
        let mut current = self.clone();
        loop {
            {
                let mut st = current.inner.state.borrow_mut();
                st.paused = false;
                if st.resume_running {
                    st.repeat_resume = true;
                    return;
                }
                st.resume_running = true;
            }

            match current.drain() {
                Some(to) if to.wants_items() => current = to,
                Some(to) => {
                    to.pause_local();
                    return;
                }
                None => return,
            }
        }
    }

    /// One drain loop. Returns the delegate if the stream was redirected.
    fn drain(&self) -> Option<Stream<T>> {
        loop {
            self.inner.state.borrow_mut().repeat_resume = false;
            let redirected = self.drain_incoming();
            let produced = redirected.is_none() && self.pull_source();

            let mut st = self.inner.state.borrow_mut();
            if redirected.is_none() && (st.repeat_resume || produced) && !st.paused {
                continue;
            }
            st.resume_running = false;
            return redirected;
        }
    }

    fn drain_incoming(&self) -> Option<Stream<T>> {
        loop {
            let queued = {
                let mut st = self.inner.state.borrow_mut();
                if st.paused {
                    return None;
                }
                st.incoming.pop_front()?
            };
            match queued {
                Queued::Item(item) => self.send(item),
                Queued::Redirect(to) => return self.redirect(to),
            }
        }
    }

    /// Take one step from the source. Returns `true` when a sequence item was
    /// delivered and the loop should keep going.
    fn pull_source(&self) -> bool {
        let step = {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            if st.paused || !st.incoming.is_empty() {
                Step::Nothing
            } else if st.ended {
                Step::ReplayEnd
            } else {
                match &mut st.source {
                    Source::Empty if st.end_queued => Step::Nothing,
                    Source::Empty => Step::Idle(st.drain_listeners.clone()),
                    Source::Sequence(items) => Step::Emit(items.next().into()),
                    Source::Generator(_) => Step::Generate,
                    Source::Upstream(feed) => Step::Feed(Rc::clone(feed)),
                    Source::Redirect(_) => Step::Nothing,
                }
            }
        };

        match step {
            Step::Nothing => false,
            Step::Idle(listeners) => {
                for listener in listeners {
                    listener();
                }
                false
            }
            Step::Emit(item) => {
                let more = !item.is_end();
                self.send(item);
                more
            }
            // Late consumers of an ended stream get End straight away
            Step::ReplayEnd => {
                self.send(StreamItem::End);
                false
            }
            Step::Generate => {
                self.run_generator();
                false
            }
            Step::Feed(feed) => {
                feed.pull();
                false
            }
        }
    }

    fn run_generator(&self) {
        let mut generator = {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            if st.generator_running || st.end_queued {
                return;
            }
            let generator = match &mut st.source {
                Source::Generator(slot) => slot.take(),
                _ => None,
            };
            let Some(generator) = generator else {
                return;
            };
            st.generator_running = true;
            generator
        };

        let push = Push::new(self.clone());
        let next = Next::for_generator(self.clone());
        generator(&push, &next);

        // Put the generator back unless it ended or production moved elsewhere
        let retired = {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            match &mut st.source {
                Source::Generator(slot) if slot.is_none() && !st.end_queued => {
                    *slot = Some(generator);
                    None
                }
                _ => Some(generator),
            }
        };
        drop(retired);
    }

    pub(crate) fn enqueue_redirect(&self, to: Stream<T>) {
        self.inner
            .state
            .borrow_mut()
            .incoming
            .push_back(Queued::Redirect(to));
    }

    /// Transfer consumers and all future production to `to`.
    ///
    /// Returns the stream that now produces, for the caller to drive.
    pub(crate) fn redirect(&self, to: Stream<T>) -> Option<Stream<T>> {
        let to = to.resolve();
        if to.ptr_eq(self) {
            warn!("{}: redirect to itself ignored", self.label());
            return None;
        }

        let (consumers, pull_queue, leftovers, retired, forwarders) = {
            let mut st = self.inner.state.borrow_mut();
            let consumers = mem::replace(&mut st.consumers, Consumers::None);
            let pull_queue = st.pull_queue.take();
            let leftovers = mem::take(&mut st.incoming);
            let retired = mem::replace(&mut st.source, Source::Redirect(to.clone()));
            let forwarders = mem::take(&mut st.forwarders);
            st.paused = true;
            st.generator_running = false;
            (consumers, pull_queue, leftovers, retired, forwarders)
        };
        debug!("{} redirected to {}", self.label(), to.label());

        if let Source::Upstream(feed) = &retired {
            feed.detach();
        }
        drop(retired);
        if !leftovers.is_empty() {
            warn!(
                "{}: {} items queued behind a redirect were dropped",
                self.label(),
                leftovers.len()
            );
        }
        drop(leftovers);
        to.adopt_forwarders(forwarders, Rc::downgrade(&self.inner));

        for sink in consumers.sinks() {
            sink.rebind(to.clone());
        }
        to.adopt(consumers, pull_queue);
        Some(to)
    }

    /// Point every stream that forwarded to a redirected stream straight at
    /// `self`, keeping redirect chains one hop long.
    fn adopt_forwarders(&self, forwarders: Vec<Weak<Inner<T>>>, redirected: Weak<Inner<T>>) {
        let mut live = Vec::with_capacity(forwarders.len() + 1);
        for weak in forwarders {
            let Some(inner) = weak.upgrade() else {
                continue;
            };
            let previous = {
                let mut guard = inner.state.borrow_mut();
                let st = &mut *guard;
                if !matches!(st.source, Source::Redirect(_)) {
                    continue;
                }
                mem::replace(&mut st.source, Source::Redirect(self.clone()))
            };
            drop(previous);
            live.push(weak);
        }
        live.push(redirected);
        self.inner.state.borrow_mut().forwarders.extend(live);
    }

    /// Take over the consumers of a redirected stream.
    fn adopt(&self, consumers: Consumers<T>, pull_queue: Option<Rc<PullQueue<T>>>) {
        if !consumers.is_present() {
            return;
        }

        let rejected = {
            let mut st = self.inner.state.borrow_mut();
            let open_group = match &st.consumers {
                Consumers::Group(group) if !group.has_primary() => Some(Rc::clone(group)),
                _ => None,
            };
            if st.consumers.is_present() {
                // Observers registered on `to` keep their place next to the newcomer
                match (open_group, consumers) {
                    (Some(group), Consumers::Single(sink)) => {
                        group.join(sink, Discipline::Synchronized);
                        None
                    }
                    (_, consumers) => Some(consumers),
                }
            } else {
                st.consumers = consumers;
                st.pull_queue = pull_queue;
                None
            }
        };

        if let Some(rejected) = rejected {
            let error = RillError::already_consumed(self.label());
            warn!("{}", error);
            for sink in rejected.sinks() {
                sink.write(StreamItem::Error(error.clone()));
                sink.write(StreamItem::End);
            }
        }
    }

    fn wants_items(&self) -> bool {
        let consumers = self.inner.state.borrow().consumers.clone();
        match consumers {
            Consumers::None => false,
            Consumers::Single(sink) => !sink.is_paused(),
            Consumers::Group(group) => group.ready(),
        }
    }

    /// Resume or pause according to whether the consumers want more.
    pub(crate) fn check_back_pressure(&self) {
        if self.wants_items() {
            self.resume_local();
        } else {
            self.pause_local();
        }
    }

    /// Register a standing consumer.
    pub(crate) fn add_consumer(&self, sink: Rc<dyn Sink<T>>) -> Result<()> {
        {
            let mut st = self.inner.state.borrow_mut();
            let group = match &st.consumers {
                Consumers::None => None,
                Consumers::Group(group) if !group.has_primary() => Some(Rc::clone(group)),
                _ => return Err(RillError::already_consumed(st.label.clone())),
            };
            match group {
                Some(group) => group.join(sink, Discipline::Synchronized),
                None => st.consumers = Consumers::Single(sink),
            }
            trace!("{}: consumer registered", st.label);
        }
        self.check_back_pressure();
        Ok(())
    }

    pub(crate) fn remove_consumer(&self, id: u64) {
        let retired = {
            let mut st = self.inner.state.borrow_mut();
            let pull_done = st
                .pull_queue
                .as_ref()
                .is_some_and(|queue| queue.link_id() == id);
            let pull_queue = if pull_done { st.pull_queue.take() } else { None };

            let (remove, left) = match &st.consumers {
                Consumers::Single(sink) => (sink.id() == id, None),
                Consumers::Group(group) => {
                    let left = group.leave(id);
                    (group.is_empty(), left)
                }
                Consumers::None => (false, None),
            };
            let consumers = if remove {
                mem::replace(&mut st.consumers, Consumers::None)
            } else {
                Consumers::None
            };
            trace!("{}: consumer {} removed", st.label, id);
            (consumers, left, pull_queue)
        };
        drop(retired);
        self.check_back_pressure();
    }

    pub(crate) fn destroy_local(&self) {
        let (retired, leftovers, drained, paused) = {
            let mut st = self.inner.state.borrow_mut();
            if st.ended {
                return;
            }
            st.end_queued = true;
            st.generator_running = false;
            (
                mem::replace(&mut st.source, Source::Empty),
                mem::take(&mut st.incoming),
                mem::take(&mut st.drain_listeners),
                mem::take(&mut st.pause_listeners),
            )
        };
        debug!("{} destroyed", self.label());

        if let Source::Upstream(feed) = &retired {
            feed.detach();
        }
        drop((retired, leftovers, drained, paused));
        self.send(StreamItem::End);
    }

    /// Leave the upstream this stream consumes without ending.
    pub(crate) fn release_upstream(&self) {
        let feed = self.inner.state.borrow_mut().source.take_feed();
        if let Some(feed) = feed {
            feed.detach();
        }
    }
}
