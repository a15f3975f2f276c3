// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::stream::Stream;

/// A trait for values that can be turned into a [`Stream`].
///
/// Lets operators such as `sequence` accept plain vectors and streams alike.
pub trait IntoStream<T> {
    /// Converts this value into a stream.
    fn into_stream(self) -> Stream<T>;
}

impl<T: 'static> IntoStream<T> for Stream<T> {
    fn into_stream(self) -> Stream<T> {
        self
    }
}

impl<T: 'static> IntoStream<T> for Vec<T> {
    fn into_stream(self) -> Stream<T> {
        Stream::from(self)
    }
}
