// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rill_core::{Stream, StreamItem};

/// Extension trait providing the `filter` operator for streams.
pub trait FilterExt<T> {
    /// Keeps only the values for which `predicate` returns `true`.
    ///
    /// Failures are always forwarded.
    fn filter<F>(&self, predicate: F) -> Stream<T>
    where
        F: FnMut(&T) -> bool + 'static;
}

impl<T: 'static> FilterExt<T> for Stream<T> {
    fn filter<F>(&self, mut predicate: F) -> Stream<T>
    where
        F: FnMut(&T) -> bool + 'static,
    {
        let label = format!("{}.filter", self.label());
        self.consume(move |item, push, next| match item {
            StreamItem::Value(x) => {
                if predicate(&x) {
                    push.value(x);
                }
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
