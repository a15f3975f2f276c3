// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Wrapping external push-style producers as streams.

use rill_core::{RillError, Stream, StreamItem, WeakStream};
use std::rc::{Rc, Weak};

/// An external producer that pushes data on its own schedule.
///
/// The producer receives a [`SourceEmitter`] once, when it is attached to a
/// stream. It must stop emitting after `pause()` and may continue after
/// `resume()`. Data emitted while paused is not lost, only buffered.
pub trait ExternalSource<T> {
    /// Begin producing into `emitter`.
    fn start(&self, emitter: SourceEmitter<T>);

    fn pause(&self);

    fn resume(&self);
}

/// Handle an external producer writes through.
///
/// Holds only weak references: a producer that outlives its stream emits
/// into nothing.
pub struct SourceEmitter<T> {
    stream: WeakStream<T>,
    source: Weak<dyn ExternalSource<T>>,
}

impl<T> Clone for SourceEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            stream: self.stream.clone(),
            source: Weak::clone(&self.source),
        }
    }
}

impl<T: 'static> SourceEmitter<T> {
    /// Emit a value. Returns `false`, after pausing the producer, when the
    /// stream pushed back.
    pub fn data(&self, value: T) -> bool {
        self.emit(StreamItem::Value(value))
    }

    /// Emit a failure in position.
    pub fn error(&self, error: RillError) -> bool {
        self.emit(StreamItem::Error(error))
    }

    /// The producer is exhausted.
    pub fn end(&self) {
        if let Some(stream) = self.stream.upgrade() {
            stream.write(StreamItem::End);
        }
    }

    fn emit(&self, item: StreamItem<T>) -> bool {
        let Some(stream) = self.stream.upgrade() else {
            return false;
        };
        if stream.write(item) {
            return true;
        }
        if let Some(source) = self.source.upgrade() {
            trace!("{}: pausing external producer", stream.label());
            source.pause();
        }
        false
    }
}

/// Extension trait attaching external producers to existing streams.
pub trait AttachSourceExt<T> {
    /// Feed this stream from `source`.
    ///
    /// The producer is started immediately. Its output is buffered until the
    /// stream is consumed. The producer is paused whenever the stream stops
    /// flowing or refuses a write, and resumed every time the stream runs dry
    /// while its consumer still wants more.
    fn attach_source<S>(&self, source: Rc<S>)
    where
        S: ExternalSource<T> + 'static;
}

impl<T: 'static> AttachSourceExt<T> for Stream<T> {
    fn attach_source<S>(&self, source: Rc<S>)
    where
        S: ExternalSource<T> + 'static,
    {
        debug!("{}: external producer attached", self.label());
        let label = self.label();
        let producer = Rc::clone(&source);
        self.on_drain(move || {
            trace!("{}: drained, resuming external producer", label);
            producer.resume();
        });
        let producer = Rc::clone(&source);
        self.on_pause(move || producer.pause());

        let erased: Rc<dyn ExternalSource<T>> = source.clone();
        source.start(SourceEmitter {
            stream: self.downgrade(),
            source: Rc::downgrade(&erased),
        });
    }
}

/// Wrap an external producer as a new stream.
///
/// # Examples
///
/// ```rust
/// use rill_core::StreamItem;
/// use rill_interop::{from_source, ExternalSource, SourceEmitter};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// struct Once(RefCell<Option<SourceEmitter<u8>>>);
///
/// impl ExternalSource<u8> for Once {
///     fn start(&self, emitter: SourceEmitter<u8>) {
///         emitter.data(7);
///         emitter.end();
///         *self.0.borrow_mut() = Some(emitter);
///     }
///     fn pause(&self) {}
///     fn resume(&self) {}
/// }
///
/// let stream = from_source(Rc::new(Once(RefCell::new(None))));
/// assert_eq!(stream.buffered(), vec![StreamItem::Value(7), StreamItem::End]);
/// ```
pub fn from_source<T, S>(source: Rc<S>) -> Stream<T>
where
    T: 'static,
    S: ExternalSource<T> + 'static,
{
    let stream = Stream::new().with_label("external");
    stream.attach_source(source);
    stream
}
