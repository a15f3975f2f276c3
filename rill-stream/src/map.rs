// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Map operator that transforms every value of a stream.

use rill_core::{Stream, StreamItem};

/// Extension trait providing the `map` operator for streams.
pub trait MapExt<T> {
    /// Applies `f` to every value.
    ///
    /// Failures and `End` pass through unchanged. The returned stream
    /// consumes `self`, so `self` cannot get another consumer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rill_core::Stream;
    /// use rill_stream::{MapExt, SinkExt};
    ///
    /// Stream::from(vec![1, 2, 3])
    ///     .map(|x| x * 10)
    ///     .to_vec(|xs| assert_eq!(xs, vec![10, 20, 30]));
    /// ```
    fn map<U, F>(&self, f: F) -> Stream<U>
    where
        U: 'static,
        F: FnMut(T) -> U + 'static;
}

impl<T: 'static> MapExt<T> for Stream<T> {
    fn map<U, F>(&self, mut f: F) -> Stream<U>
    where
        U: 'static,
        F: FnMut(T) -> U + 'static,
    {
        let label = format!("{}.map", self.label());
        self.consume(move |item, push, next| match item {
            StreamItem::Value(x) => {
                push.value(f(x));
                next.call();
            }
            StreamItem::Error(e) => {
                push.error(e);
                next.call();
            }
            StreamItem::End => push.end(),
        })
        .with_label(label)
    }
}
