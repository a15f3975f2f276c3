// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Interoperability between Rill streams and external resources.
//!
//! - [`from_source`] wraps an external push-style producer as a stream,
//!   pausing the producer whenever the stream pushes back and resuming it
//!   once the stream drains.
//! - [`PipeExt::pipe`] drives an external sink, waiting for its readiness
//!   signal whenever a write is refused.
//! - [`EventsExt::events`] exposes a stream through data, error and end
//!   listeners.

#[macro_use]
mod logging;

pub mod events;
pub mod external;
pub mod pipe;

pub use self::events::{EventSurface, EventsExt};
pub use self::external::{from_source, AttachSourceExt, ExternalSource, SourceEmitter};
pub use self::pipe::{ExternalSink, PipeExt, Readiness};
