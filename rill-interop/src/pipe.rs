// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Piping streams into external consumers.

use rill_core::{Push, RillError, Stream, StreamItem};
use std::fmt;
use std::rc::Rc;

/// An external consumer with its own notion of back-pressure.
pub trait ExternalSink<T> {
    /// Accept a value. Returning `false` asks the pipe to stop until the
    /// sink signals [`Readiness`].
    fn write(&self, value: T) -> bool;

    /// A failure travelled down the stream. Piping continues afterwards.
    fn error(&self, _error: RillError) {}

    /// Called exactly once, after the last value.
    fn end(&self);

    /// Receives the handle used to restart a stalled pipe.
    fn on_ready(&self, _readiness: Readiness) {}
}

/// Restarts a pipe that stopped because its sink refused a write.
#[derive(Clone)]
pub struct Readiness {
    resume: Rc<dyn Fn()>,
}

impl Readiness {
    fn new(resume: impl Fn() + 'static) -> Self {
        Self {
            resume: Rc::new(resume),
        }
    }

    /// The sink can take more values.
    pub fn signal(&self) {
        (self.resume)();
    }
}

impl fmt::Debug for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Readiness")
    }
}

/// Extension trait providing `pipe` for streams.
pub trait PipeExt<T> {
    /// Write every value of the stream into `dest` and start the stream.
    ///
    /// # Panics
    ///
    /// Panics with `AlreadyConsumed` if the stream already has a consumer.
    fn pipe<D>(&self, dest: Rc<D>)
    where
        D: ExternalSink<T> + 'static;
}

impl<T: 'static> PipeExt<T> for Stream<T> {
    fn pipe<D>(&self, dest: Rc<D>)
    where
        D: ExternalSink<T> + 'static,
    {
        let sink = Rc::clone(&dest);
        let output: Stream<()> = self
            .consume(move |item, _push: &Push<()>, next| match item {
                StreamItem::Value(x) => {
                    if sink.write(x) {
                        next.call();
                    }
                }
                StreamItem::Error(e) => {
                    sink.error(e);
                    next.call();
                }
                StreamItem::End => sink.end(),
            })
            .with_label(format!("{}.pipe", self.label()));

        let pipe = output.downgrade();
        let label = output.label();
        dest.on_ready(Readiness::new(move || {
            if let Some(output) = pipe.upgrade() {
                trace!("{}: sink ready", label);
                output.resume();
            }
        }));

        debug!("{}: piping into external sink", output.label());
        output.resume();
    }
}
