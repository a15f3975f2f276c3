// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Operators and terminal consumers for Rill streams.
//!
//! Every operator is an extension trait implemented for
//! [`rill_core::Stream`]. Operators consume the stream they are called on
//! and return a new, paused stream; nothing runs until a terminal consumer
//! such as [`SinkExt::each`] resumes the end of the chain.
//!
//! ```rust
//! use rill_core::Stream;
//! use rill_stream::prelude::*;
//!
//! Stream::from(vec![1, 2, 3, 4, 5, 6])
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * 10)
//!     .take(2)
//!     .to_vec(|xs| assert_eq!(xs, vec![20, 40]));
//! ```

#[macro_use]
mod logging;

pub mod errors;
pub mod filter;
pub mod flatten;
pub mod map;
pub mod prelude;
pub mod sequence;
pub mod sink;
pub mod take;

pub use self::errors::ErrorsExt;
pub use self::filter::FilterExt;
pub use self::flatten::{flatten, FlattenExt, Nested};
pub use self::map::MapExt;
pub use self::sequence::SequenceExt;
pub use self::sink::{Collect, SinkExt};
pub use self::take::TakeExt;
