// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::stream::Stream;
use crate::stream_item::StreamItem;

/// Receives the items of the stream it is registered on.
pub(crate) trait Sink<T> {
    fn id(&self) -> u64;

    fn write(&self, item: StreamItem<T>);

    /// A paused sink must not be handed items by a synchronized upstream.
    fn is_paused(&self) -> bool;

    /// The stream this sink reads from was redirected.
    fn rebind(&self, upstream: Stream<T>);
}

/// The upstream side of a stream that is fed by another stream.
pub(crate) trait Feed {
    /// The fed stream resumed with nothing buffered.
    fn pull(&self);

    fn on_pause(&self);

    /// The fed stream ended, was redirected or destroyed.
    fn detach(&self);
}
