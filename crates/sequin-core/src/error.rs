// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Sequin bot.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum SequinError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A delivery channel call failed.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// A dispatch run was requested with nothing queued.
    #[error("queue is empty")]
    QueueEmpty,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure kinds reported by a [`DeliveryChannel`](crate::DeliveryChannel).
///
/// The dispatch pipeline branches on these: `RateLimited` earns one retry
/// after the signaled pause, everything else skips the item.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The channel asked the caller to back off.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Any other failure: unknown destination, deleted source, transport error.
    #[error("delivery failed: {message}")]
    Failed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DeliveryError {
    /// Convenience constructor for a failure without an underlying cause.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the requested pause when this is a rate-limit signal.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            Self::Failed { .. } => None,
        }
    }
}
