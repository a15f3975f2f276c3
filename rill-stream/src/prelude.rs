// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting all stream operators.
//!
//! ```ignore
//! use rill_stream::prelude::*;
//! ```

pub use crate::errors::ErrorsExt;
pub use crate::filter::FilterExt;
pub use crate::flatten::{flatten, FlattenExt, Nested};
pub use crate::map::MapExt;
pub use crate::sequence::SequenceExt;
pub use crate::sink::SinkExt;
pub use crate::take::TakeExt;
