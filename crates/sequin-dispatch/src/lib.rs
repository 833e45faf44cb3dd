// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion queues and the ordered dispatch pipeline.
//!
//! Files arrive one message at a time and are parked in a [`QueueManager`]
//! keyed by user. A [`DispatchPipeline`] run drains one user's queue,
//! orders the files, and re-emits them through the delivery channel,
//! tolerating per-item failures.

pub mod pipeline;
pub mod queue;
pub mod report;

pub use pipeline::{DispatchPipeline, Requester};
pub use queue::{Notice, QueueManager, UserQueue};
pub use report::{RunReport, format_elapsed};
