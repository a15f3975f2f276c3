// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the Rill lazy stream library
//!
//! This crate defines the root [`RillError`] type shared by every Rill crate.
//! Failures travel through streams in the same ordered channel as values, so
//! the error type is cheap to clone and carries enough context to be reported
//! by whichever terminal consumer finally sees it.
//!
//! # Examples
//!
//! ```
//! use rill_error::{RillError, Result};
//!
//! fn register() -> Result<()> {
//!     Err(RillError::already_consumed("numbers"))
//! }
//!
//! assert!(register().unwrap_err().is_programming_error());
//! ```

/// Root error type for all Rill operations
#[derive(Debug, thiserror::Error)]
pub enum RillError {
    /// A second standing consumer was registered on a stream
    ///
    /// A stream hands every item to exactly one consumer. Use `fork()` or
    /// `observe()` to share a stream between several consumers.
    #[error("Stream already being consumed ({label}): use fork() or observe()")]
    AlreadyConsumed {
        /// Label of the stream that rejected the registration
        label: String,
    },

    /// A failure reached a terminal consumer that has no failure handling
    #[error("Unhandled stream failure: {context}")]
    UnhandledFailure {
        /// Description of the failure that went unhandled
        context: String,
    },

    /// A generator or external producer reported a failure
    ///
    /// Producer failures are forwarded downstream in order, exactly like
    /// values, and do not end the stream on their own.
    #[error("Producer failure: {context}")]
    ProducerFailure {
        /// Description of what went wrong while producing
        context: String,
    },

    /// Custom error from user code
    ///
    /// Wraps errors returned by user-provided generators and handlers.
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RillError {
    /// Create an already-consumed error for the stream with the given label
    pub fn already_consumed(label: impl Into<String>) -> Self {
        Self::AlreadyConsumed {
            label: label.into(),
        }
    }

    /// Create an unhandled-failure error
    pub fn unhandled(context: impl Into<String>) -> Self {
        Self::UnhandledFailure {
            context: context.into(),
        }
    }

    /// Create a producer failure with the given context
    pub fn producer_failure(context: impl Into<String>) -> Self {
        Self::ProducerFailure {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Wrap this failure as the cause of an [`RillError::UnhandledFailure`]
    #[must_use]
    pub fn into_unhandled(self) -> Self {
        match self {
            unhandled @ Self::UnhandledFailure { .. } => unhandled,
            other => Self::unhandled(other.to_string()),
        }
    }

    /// Errors raised by misuse of the stream API rather than by data
    #[must_use]
    pub const fn is_programming_error(&self) -> bool {
        matches!(self, Self::AlreadyConsumed { .. })
    }

    /// Errors that travel through streams as items
    #[must_use]
    pub const fn is_producer_failure(&self) -> bool {
        matches!(self, Self::ProducerFailure { .. } | Self::UserError(_))
    }
}

impl Clone for RillError {
    fn clone(&self) -> Self {
        match self {
            Self::AlreadyConsumed { label } => Self::AlreadyConsumed {
                label: label.clone(),
            },
            Self::UnhandledFailure { context } => Self::UnhandledFailure {
                context: context.clone(),
            },
            Self::ProducerFailure { context } => Self::ProducerFailure {
                context: context.clone(),
            },
            // Boxed user errors cannot be cloned, keep their message
            Self::UserError(e) => Self::ProducerFailure {
                context: format!("User error: {e}"),
            },
        }
    }
}

/// Specialized Result type for Rill operations
///
/// # Examples
///
/// ```
/// use rill_error::Result;
///
/// fn process() -> Result<String> {
///     Ok("processed".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, RillError>;

/// Extension trait for converting errors into `RillError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`.
pub trait IntoRillError {
    /// Convert this error into a `RillError`
    fn into_rill_error(self) -> RillError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoRillError for E {
    fn into_rill_error(self) -> RillError {
        RillError::user_error(self)
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(RillError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(RillError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<RillError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        let context = context.into();
        self.with_context(|| context)
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            RillError::UserError(inner) => RillError::ProducerFailure {
                context: format!("{}: {inner}", f()),
            },
            other => other,
        })
    }
}
