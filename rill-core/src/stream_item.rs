// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rill_error::RillError;

/// An item travelling through a stream.
///
/// Values and failures share one ordered channel: a failure does not end the
/// stream on its own. `End` is the terminal sentinel and is the last item any
/// consumer ever receives from a stream.
#[derive(Debug, Clone)]
pub enum StreamItem<T> {
    /// A successful value
    Value(T),
    /// A failure reported by a producer, forwarded in position
    Error(RillError),
    /// The stream has no further items
    End,
}

impl<T: PartialEq> PartialEq for StreamItem<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StreamItem::Value(a), StreamItem::Value(b)) => a == b,
            (StreamItem::End, StreamItem::End) => true,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> StreamItem<T> {
    /// Returns `true` if this is a `Value`.
    pub const fn is_value(&self) -> bool {
        matches!(self, StreamItem::Value(_))
    }

    /// Returns `true` if this is an `Error`.
    pub const fn is_error(&self) -> bool {
        matches!(self, StreamItem::Error(_))
    }

    /// Returns `true` if this is the `End` sentinel.
    pub const fn is_end(&self) -> bool {
        matches!(self, StreamItem::End)
    }

    /// Converts from `StreamItem<T>` to `Option<T>`, discarding errors and `End`.
    pub fn ok(self) -> Option<T> {
        match self {
            StreamItem::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Converts from `StreamItem<T>` to `Option<RillError>`, discarding values and `End`.
    pub fn err(self) -> Option<RillError> {
        match self {
            StreamItem::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Maps a `StreamItem<T>` to `StreamItem<U>` by applying a function to the contained value.
    ///
    /// Errors and `End` are propagated unchanged.
    pub fn map<U, F>(self, f: F) -> StreamItem<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            StreamItem::Value(v) => StreamItem::Value(f(v)),
            StreamItem::Error(e) => StreamItem::Error(e),
            StreamItem::End => StreamItem::End,
        }
    }

    /// Maps a `StreamItem<T>` to `StreamItem<U>` by applying a function that can fail.
    ///
    /// Errors and `End` are propagated unchanged.
    pub fn and_then<U, F>(self, f: F) -> StreamItem<U>
    where
        F: FnOnce(T) -> StreamItem<U>,
    {
        match self {
            StreamItem::Value(v) => f(v),
            StreamItem::Error(e) => StreamItem::Error(e),
            StreamItem::End => StreamItem::End,
        }
    }

    /// Converts into an optional result: `None` for `End`.
    pub fn into_result(self) -> Option<Result<T, RillError>> {
        match self {
            StreamItem::Value(v) => Some(Ok(v)),
            StreamItem::Error(e) => Some(Err(e)),
            StreamItem::End => None,
        }
    }

    /// Returns the contained value.
    ///
    /// # Panics
    ///
    /// Panics if the item is an `Error` or `End`.
    pub fn unwrap(self) -> T {
        match self {
            StreamItem::Value(v) => v,
            StreamItem::Error(e) => {
                panic!("called `StreamItem::unwrap()` on an `Error` value: {:?}", e)
            }
            StreamItem::End => panic!("called `StreamItem::unwrap()` on `End`"),
        }
    }

    /// Returns the contained value, panicking with a custom message otherwise.
    ///
    /// # Panics
    ///
    /// Panics with the provided message if the item is an `Error` or `End`.
    pub fn expect(self, msg: &str) -> T {
        match self {
            StreamItem::Value(v) => v,
            StreamItem::Error(e) => panic!("{}: {:?}", msg, e),
            StreamItem::End => panic!("{}: End", msg),
        }
    }
}

impl<T> From<Result<T, RillError>> for StreamItem<T> {
    fn from(result: Result<T, RillError>) -> Self {
        match result {
            Ok(v) => StreamItem::Value(v),
            Err(e) => StreamItem::Error(e),
        }
    }
}

impl<T> From<Option<T>> for StreamItem<T> {
    /// `None` maps to `End`.
    fn from(value: Option<T>) -> Self {
        value.map_or(StreamItem::End, StreamItem::Value)
    }
}
