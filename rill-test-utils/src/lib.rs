// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Rill workspace.
//!
//! Rill streams are single threaded, so asynchronous tests run their
//! producers on a [`tokio::task::LocalSet`]:
//!
//! ```rust
//! use rill_test_utils::{completion, defer, run_local};
//!
//! # async fn example() {
//! run_local(async {
//!     let (done, finished) = completion();
//!     defer(move || done.complete(42));
//!     assert_eq!(finished.await.ok(), Some(42));
//! })
//! .await;
//! # }
//! ```
//!
//! # Module Organization
//!
//! - `runtime` - local executor helpers and callback-to-future bridging
//! - `recorder` - shared counters and recorders for closures
//! - `fixtures` - asynchronous generator streams
//! - `readable` - an external producer over a vector
//! - `sink` - an external consumer that records and can push back

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod fixtures;
pub mod readable;
pub mod recorder;
pub mod runtime;
pub mod sink;

pub use fixtures::{countdown, named_countdown};
pub use readable::VecReadable;
pub use recorder::{recorder, Counter, Recorder};
pub use runtime::{completion, defer, defer_after, run_local, Completer};
pub use sink::RecordingSink;
