// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Rill
//!
//! Lazy, back-pressure aware streams for single-threaded pipelines.
//!
//! ## Overview
//!
//! A [`Stream`] produces nothing until a consumer asks for it. Items flow
//! one at a time from a source (a vector, a lazy iterator, a generator
//! closure or an external producer) through a chain of consumers, and a
//! consumer that stops asking pauses everything upstream of it. Values,
//! failures and the end of the stream travel down the same ordered channel
//! as [`StreamItem`]s.
//!
//! - Generators keep [`Push`] and [`Next`] handles to produce asynchronously,
//!   and may hand the rest of their production over to another stream with
//!   [`Next::redirect`].
//! - [`Stream::fork`] shares one upstream between siblings that advance in
//!   lockstep; [`Stream::observe`] taps it without holding it back.
//! - Operators live in [`rill_stream`], adapters for external producers and
//!   consumers in [`rill_interop`].
//!
//! ## Quick Start
//!
//! ```rust
//! use rill::prelude::*;
//!
//! let mut n = 0;
//! let naturals = Stream::generator(move |push, next| {
//!     n += 1;
//!     push.value(n);
//!     next.call();
//! });
//!
//! naturals
//!     .filter(|x| x % 2 == 1)
//!     .map(|x| x * x)
//!     .take(3)
//!     .to_vec(|xs| assert_eq!(xs, vec![1, 9, 25]));
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

// Re-export core types
pub use rill_core::into_stream::IntoStream;
pub use rill_core::{Next, Push, Reader, Stream, StreamItem, WeakStream};
pub use rill_error::{IntoRillError, Result, ResultExt, RillError};

// Re-export operators and adapters
pub use rill_interop::{
    from_source, AttachSourceExt, EventSurface, EventsExt, ExternalSink, ExternalSource, PipeExt,
    Readiness, SourceEmitter,
};
pub use rill_stream::{
    flatten, Collect, ErrorsExt, FilterExt, FlattenExt, MapExt, Nested, SequenceExt, SinkExt,
    TakeExt,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use rill_core::into_stream::IntoStream;
    pub use rill_core::{Next, Push, Stream, StreamItem};
    pub use rill_error::{Result, RillError};
    pub use rill_interop::{AttachSourceExt, EventsExt, PipeExt};
    pub use rill_stream::prelude::*;
}
