// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sequence operator that concatenates a stream of streams.

use rill_core::{IntoStream, Stream, StreamItem};
use std::cell::RefCell;
use std::rc::Rc;

/// Extension trait providing the `sequence` operator for streams of sources.
pub trait SequenceExt<T> {
    /// Concatenates the nested sources, in order.
    ///
    /// Each nested source is turned into a stream and read to its end before
    /// the next one is taken from the outer stream. Nested sources are only
    /// started when the downstream asks for their items, and their items are
    /// never unwrapped further.
    ///
    /// # Error Handling
    ///
    /// Failures from the outer stream or a nested stream are forwarded in
    /// position. A nested stream that already has a consumer contributes an
    /// `AlreadyConsumed` failure and ends the sequence.
    ///
    /// # Panics
    ///
    /// Panics with `AlreadyConsumed` if the outer stream already has a
    /// consumer. The outer stream stays claimed by the sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rill_core::Stream;
    /// use rill_stream::{SequenceExt, SinkExt};
    ///
    /// Stream::from(vec![vec![1, 2], vec![3], vec![]])
    ///     .sequence()
    ///     .to_vec(|xs| assert_eq!(xs, vec![1, 2, 3]));
    /// ```
    fn sequence(&self) -> Stream<T>;
}

impl<S, T> SequenceExt<T> for Stream<S>
where
    S: IntoStream<T> + 'static,
    T: 'static,
{
    fn sequence(&self) -> Stream<T> {
        let label = format!("{}.sequence", self.label());
        let outer = self.reader();
        let current: Rc<RefCell<Option<Stream<T>>>> = Rc::new(RefCell::new(None));

        Stream::generator(move |push, next| {
            let nested = current.borrow().clone();
            let (push_item, next_item, slot) = (push.clone(), next.clone(), Rc::clone(&current));

            let Some(source) = nested else {
                outer.pull(move |item| match item {
                    StreamItem::Value(source) => {
                        let source = source.into_stream();
                        trace!("sequence moves on to {}", source.label());
                        *slot.borrow_mut() = Some(source);
                        next_item.call();
                    }
                    StreamItem::Error(e) => {
                        push_item.error(e);
                        next_item.call();
                    }
                    StreamItem::End => push_item.end(),
                });
                return;
            };

            let pulled = source.try_pull(move |item| match item {
                StreamItem::Value(x) => {
                    push_item.value(x);
                    next_item.call();
                }
                StreamItem::Error(e) => {
                    push_item.error(e);
                    next_item.call();
                }
                StreamItem::End => {
                    *slot.borrow_mut() = None;
                    next_item.call();
                }
            });

            if let Err(e) = pulled {
                push.error(e);
                push.end();
            }
        })
        .with_label(label)
    }
}
