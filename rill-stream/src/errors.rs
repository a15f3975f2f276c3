// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rill_core::{Push, RillError, Stream, StreamItem};

/// Extension trait providing the `errors` operator for streams.
pub trait ErrorsExt<T> {
    /// Intercepts failures.
    ///
    /// `handler` receives every failure instead of the downstream consumer
    /// and may push replacement values or failures in its place. Values and
    /// `End` pass through unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rill_core::{RillError, Stream, StreamItem};
    /// use rill_stream::{ErrorsExt, SinkExt};
    ///
    /// let source = Stream::new();
    /// source.write(StreamItem::Value(1));
    /// source.write(StreamItem::Error(RillError::producer_failure("lost")));
    /// source.write(StreamItem::End);
    ///
    /// source
    ///     .errors(|_err, push| {
    ///         push.value(0);
    ///     })
    ///     .to_vec(|xs| assert_eq!(xs, vec![1, 0]));
    /// ```
    fn errors<F>(&self, handler: F) -> Stream<T>
    where
        F: FnMut(RillError, &Push<T>) + 'static;
}

impl<T: 'static> ErrorsExt<T> for Stream<T> {
    fn errors<F>(&self, mut handler: F) -> Stream<T>
    where
        F: FnMut(RillError, &Push<T>) + 'static,
    {
        let label = format!("{}.errors", self.label());
        self.consume(move |item, push, next| match item {
            StreamItem::Value(x) => {
                push.value(x);
                next.call();
            }
            StreamItem::Error(e) => {
                handler(e, push);
                next.call();
            }
            StreamItem::End => push.end(),
        })
        .with_label(label)
    }
}
