// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Take operator that limits a stream to its first n values.

use rill_core::{Stream, StreamItem};

/// Extension trait providing the `take` operator for streams.
pub trait TakeExt<T> {
    /// Emits the first `n` values, then ends.
    ///
    /// As soon as the last value is taken the output releases `self`, which
    /// is paused and can be consumed again. The source is never asked for
    /// more than `n` values.
    ///
    /// # Error Handling
    ///
    /// Failures are forwarded and do not count towards the limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rill_core::Stream;
    /// use rill_stream::{SinkExt, TakeExt};
    ///
    /// let numbers = Stream::from(vec![1, 2, 3, 4]);
    /// numbers.take(2).to_vec(|xs| assert_eq!(xs, vec![1, 2]));
    /// numbers.take(2).to_vec(|xs| assert_eq!(xs, vec![3, 4]));
    /// ```
    fn take(&self, n: usize) -> Stream<T>;
}

impl<T: 'static> TakeExt<T> for Stream<T> {
    fn take(&self, n: usize) -> Stream<T> {
        let label = format!("{}.take({n})", self.label());
        if n == 0 {
            return Stream::from(Vec::new()).with_label(label);
        }

        let mut remaining = n;
        self.consume(move |item, push, next| match item {
            StreamItem::Value(x) => {
                remaining -= 1;
                push.value(x);
                if remaining > 0 {
                    next.call();
                } else {
                    push.end();
                }
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
