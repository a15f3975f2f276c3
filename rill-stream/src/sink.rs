// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal consumers that resume a stream and read it to the end.
//!
//! `each`, `to_vec` and `done` have no failure channel: a failure that
//! reaches them panics with [`RillError::UnhandledFailure`]. Use
//! [`SinkExt::collect`] or the `errors` operator to handle failures.

use futures::channel::oneshot;
use pin_project::pin_project;
use rill_core::{Push, Result, RillError, Stream, StreamItem};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Extension trait providing terminal consumers for streams.
pub trait SinkExt<T> {
    /// Calls `f` with every value and starts the stream.
    ///
    /// # Panics
    ///
    /// Panics with `UnhandledFailure` when a failure arrives, and with
    /// `AlreadyConsumed` if the stream already has a consumer.
    fn each<F>(&self, f: F)
    where
        F: FnMut(T) + 'static;

    /// Collects every value and passes them to `f` once the stream ends.
    ///
    /// # Panics
    ///
    /// Same as [`SinkExt::each`].
    fn to_vec<F>(&self, f: F)
    where
        F: FnOnce(Vec<T>) + 'static;

    /// Reads the stream to its end, discarding values, then calls `f`.
    ///
    /// # Panics
    ///
    /// Same as [`SinkExt::each`].
    fn done<F>(&self, f: F)
    where
        F: FnOnce() + 'static;

    /// Collects every value into a future.
    ///
    /// The future resolves once the stream ends, or with the first failure.
    /// Reading stops at that failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rill_core::Stream;
    /// use rill_stream::SinkExt;
    ///
    /// # async fn example() -> rill_core::Result<()> {
    /// let values = Stream::from(vec![1, 2, 3]).collect().await?;
    /// assert_eq!(values, vec![1, 2, 3]);
    /// # Ok(())
    /// # }
    /// ```
    fn collect(&self) -> Collect<T>;
}

fn unhandled(error: RillError) -> ! {
    panic!("{}", error.into_unhandled())
}

impl<T: 'static> SinkExt<T> for Stream<T> {
    fn each<F>(&self, mut f: F)
    where
        F: FnMut(T) + 'static,
    {
        let out: Stream<()> = self.consume(move |item, _push, next| match item {
            StreamItem::Value(x) => {
                f(x);
                next.call();
            }
            StreamItem::Error(e) => unhandled(e),
            StreamItem::End => {}
        });
        out.resume();
    }

    fn to_vec<F>(&self, f: F)
    where
        F: FnOnce(Vec<T>) + 'static,
    {
        let mut values = Vec::new();
        let mut callback = Some(f);
        let out: Stream<()> = self.consume(move |item, _push, next| match item {
            StreamItem::Value(x) => {
                values.push(x);
                next.call();
            }
            StreamItem::Error(e) => unhandled(e),
            StreamItem::End => {
                if let Some(callback) = callback.take() {
                    callback(std::mem::take(&mut values));
                }
            }
        });
        out.resume();
    }

    fn done<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        let mut callback = Some(f);
        let out: Stream<()> = self.consume(move |item, _push, next| match item {
            StreamItem::Value(_) => next.call(),
            StreamItem::Error(e) => unhandled(e),
            StreamItem::End => {
                if let Some(callback) = callback.take() {
                    callback();
                }
            }
        });
        out.resume();
    }

    fn collect(&self) -> Collect<T> {
        let (sender, receiver) = oneshot::channel();
        let mut sender = Some(sender);
        let mut values = Vec::new();

        let out: Stream<()> = self.consume(move |item, _push: &Push<()>, next| {
            let outcome = match item {
                StreamItem::Value(x) => {
                    values.push(x);
                    next.call();
                    return;
                }
                StreamItem::Error(e) => Err(e),
                StreamItem::End => Ok(std::mem::take(&mut values)),
            };
            if let Some(sender) = sender.take() {
                if sender.send(outcome).is_err() {
                    warn!("collect future dropped before the stream finished");
                }
            }
        });
        out.resume();

        Collect { receiver }
    }
}

/// Future returned by [`SinkExt::collect`].
#[pin_project]
#[must_use = "futures do nothing unless polled"]
pub struct Collect<T> {
    #[pin]
    receiver: oneshot::Receiver<Result<Vec<T>>>,
}

impl<T> Future for Collect<T> {
    type Output = Result<Vec<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        match this.receiver.poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(RillError::producer_failure(
                "stream was dropped before it ended",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}
