// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Flatten operator that recursively unwraps nested values and streams.

use rill_core::{Reader, Result, Stream, StreamItem};
use std::cell::RefCell;
use std::rc::Rc;

/// A value, a nested sequence or a nested stream, at any depth.
#[derive(Debug, Clone)]
pub enum Nested<T> {
    Value(T),
    Seq(Vec<Nested<T>>),
    Stream(Stream<Nested<T>>),
}

impl<T> From<T> for Nested<T> {
    fn from(value: T) -> Self {
        Nested::Value(value)
    }
}

/// One level of the flatten traversal.
enum Level<T> {
    /// The stream `flatten` was called on, claimed for its whole lifetime
    Outer(Reader<Nested<T>>),
    /// A nested sequence or stream, read by transient pulls
    Inner(Stream<Nested<T>>),
}

impl<T> Clone for Level<T> {
    fn clone(&self) -> Self {
        match self {
            Level::Outer(reader) => Level::Outer(reader.clone()),
            Level::Inner(stream) => Level::Inner(stream.clone()),
        }
    }
}

impl<T: 'static> Level<T> {
    fn pull<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(StreamItem<Nested<T>>) + 'static,
    {
        match self {
            Level::Outer(reader) => {
                reader.pull(callback);
                Ok(())
            }
            Level::Inner(stream) => stream.try_pull(callback),
        }
    }
}

/// Extension trait providing the `flatten` operator for nested streams.
pub trait FlattenExt<T> {
    /// Emits every leaf value in encounter order, recursing through nested
    /// sequences and streams at any depth.
    ///
    /// Nested streams are read only as far as the downstream demands and
    /// stay free for other consumers between reads. Failures are forwarded
    /// in position.
    ///
    /// # Panics
    ///
    /// Panics with `AlreadyConsumed` if the stream already has a consumer.
    /// The stream stays claimed by the flatten.
    fn flatten(&self) -> Stream<T>;
}

impl<T: 'static> FlattenExt<T> for Stream<Nested<T>> {
    fn flatten(&self) -> Stream<T> {
        let label = format!("{}.flatten", self.label());
        // Levels being read, innermost last
        let stack = Rc::new(RefCell::new(vec![Level::Outer(self.reader())]));

        Stream::generator(move |push, next| {
            let top = stack.borrow().last().cloned();
            let Some(current) = top else {
                push.end();
                return;
            };

            let (push_item, next_item, nesting) = (push.clone(), next.clone(), Rc::clone(&stack));
            let pulled = current.pull(move |item| match item {
                StreamItem::Value(Nested::Value(x)) => {
                    push_item.value(x);
                    next_item.call();
                }
                StreamItem::Value(Nested::Seq(items)) => {
                    nesting.borrow_mut().push(Level::Inner(Stream::from(items)));
                    next_item.call();
                }
                StreamItem::Value(Nested::Stream(inner)) => {
                    trace!("flatten descends into {}", inner.label());
                    nesting.borrow_mut().push(Level::Inner(inner));
                    next_item.call();
                }
                StreamItem::Error(e) => {
                    push_item.error(e);
                    next_item.call();
                }
                StreamItem::End => {
                    nesting.borrow_mut().pop();
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

/// Flattens a nested vector into a stream of its leaf values.
///
/// # Examples
///
/// ```rust
/// use rill_stream::{flatten, Nested, SinkExt};
///
/// let nested = vec![
///     Nested::Value(1),
///     Nested::Seq(vec![Nested::Value(2), Nested::Seq(vec![Nested::Value(3)])]),
/// ];
/// flatten(nested).to_vec(|xs| assert_eq!(xs, vec![1, 2, 3]));
/// ```
pub fn flatten<T: 'static>(items: Vec<Nested<T>>) -> Stream<T> {
    Stream::from(items).flatten()
}
