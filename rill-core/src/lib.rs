// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! The lazy stream state machine at the heart of Rill.
//!
//! A [`Stream`] buffers items in an incoming queue, pulls more from its
//! source (a sequence, a generator, another stream) only when its consumer
//! asks for them, and propagates pauses back up the chain of consumers.
//! Everything runs on one thread: producers that want to be asynchronous
//! keep the [`Push`] and [`Next`] handles and use them later.

#[macro_use]
mod logging;

mod consume;
mod drive;
mod handle;
mod link;
mod multicast;
mod pull;
mod stream;

pub mod into_stream;
pub mod stream_item;

pub use self::handle::{Next, Push};
pub use self::into_stream::IntoStream;
pub use self::pull::Reader;
pub use self::stream::{Stream, WeakStream};
pub use self::stream_item::StreamItem;
pub use rill_error::{IntoRillError, Result, ResultExt, RillError};
