// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rill_core::{RillError, Stream, StreamItem};
use rill_interop::{from_source, AttachSourceExt, ExternalSource, SourceEmitter};
use rill_test_utils::{recorder, VecReadable};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_producer_is_paused_until_the_stream_is_consumed() {
    // Arrange
    let readable = VecReadable::new(vec![1, 2, 3, 4]);

    // Act
    let stream = from_source(Rc::clone(&readable));

    // Assert
    assert!(readable.is_paused());
    assert_eq!(stream.buffered(), vec![StreamItem::Value(1)]);
    assert_eq!(readable.remaining(), 3);
}

#[test]
fn test_consumer_resumes_producer_when_drained() {
    // Arrange
    let readable = VecReadable::new(vec![1, 2, 3, 4]);
    let stream = from_source(Rc::clone(&readable));
    let seen = recorder();
    let sink = seen.clone();
    let out: Stream<()> = stream.consume(move |item, _push, next| {
        let end = item.is_end();
        sink.record(item);
        if !end {
            next.call();
        }
    });

    // Act
    out.resume();

    // Assert
    assert_eq!(
        seen.take(),
        vec![
            StreamItem::Value(1),
            StreamItem::Value(2),
            StreamItem::Value(3),
            StreamItem::Value(4),
            StreamItem::End
        ]
    );
    assert_eq!(readable.pause_count(), 1);
    assert_eq!(readable.resume_count(), 1);
    assert!(stream.is_ended());
}

#[test]
fn test_slow_consumer_pauses_producer() {
    // Arrange
    let readable = VecReadable::new(vec!["a", "b", "c"]);
    let stream = from_source(Rc::clone(&readable));
    let seen = recorder();
    let sink = seen.clone();
    // Handles one item per resume of its output
    let out: Stream<()> = stream.consume(move |item, _push, _next| sink.record(item));

    // Act
    out.resume();

    // Assert
    assert_eq!(seen.take(), vec![StreamItem::Value("a")]);
    assert!(readable.is_paused());

    // Act
    out.resume();

    // Assert
    assert_eq!(seen.take(), vec![StreamItem::Value("b")]);
    assert!(readable.is_paused());
    assert_eq!(readable.remaining(), 1);
}

#[derive(Default)]
struct Manual {
    calls: RefCell<Vec<&'static str>>,
}

impl ExternalSource<u8> for Manual {
    fn start(&self, _emitter: SourceEmitter<u8>) {}

    fn pause(&self) {
        self.calls.borrow_mut().push("pause");
    }

    fn resume(&self) {
        self.calls.borrow_mut().push("resume");
    }
}

#[test]
fn test_producer_is_paused_as_soon_as_the_stream_pauses() {
    // Arrange
    let source = Rc::new(Manual::default());
    let stream = from_source(Rc::clone(&source));
    let out: Stream<()> = stream.consume(|_item, _push, next| next.call());
    out.resume();
    assert_eq!(*source.calls.borrow(), vec!["resume"]);

    // Act
    out.pause();

    // Assert
    assert_eq!(*source.calls.borrow(), vec!["resume", "pause"]);
    assert!(stream.is_paused());
}

struct Failing {
    emitter: RefCell<Option<SourceEmitter<u8>>>,
}

impl ExternalSource<u8> for Failing {
    fn start(&self, emitter: SourceEmitter<u8>) {
        *self.emitter.borrow_mut() = Some(emitter);
    }

    fn pause(&self) {}

    fn resume(&self) {
        let emitter = self.emitter.borrow().clone();
        if let Some(emitter) = emitter {
            emitter.error(RillError::producer_failure("disk unplugged"));
            emitter.end();
        }
    }
}

#[test]
fn test_producer_failures_are_forwarded_in_position() {
    // Arrange
    let stream = Stream::new().with_label("device");
    stream.attach_source(Rc::new(Failing {
        emitter: RefCell::new(None),
    }));
    let seen = recorder();
    let sink = seen.clone();
    let out: Stream<()> = stream.consume(move |item, _push, next| {
        sink.record(item);
        next.call();
    });

    // Act
    out.resume();

    // Assert
    let items = seen.take();
    assert_eq!(items.len(), 2);
    assert!(matches!(
        &items[0],
        StreamItem::Error(RillError::ProducerFailure { context }) if context == "disk unplugged"
    ));
    assert!(items[1].is_end());
}

#[test]
fn test_emitter_outliving_its_stream_is_inert() {
    // Arrange
    let readable = VecReadable::new(vec![1]);
    let stream = from_source(Rc::clone(&readable));

    // Act
    drop(stream);
    readable.resume();

    // Assert
    assert_eq!(readable.remaining(), 0);
}
