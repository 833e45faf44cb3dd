// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure text heuristics behind file ordering.
//!
//! - [`extract`] pulls episode, season, quality and a normalized title out of
//!   free-form file names and captions.
//! - [`compose_key`] and [`order_items`] turn those fields into a stable,
//!   mode-dependent ordering.
//! - [`render`] fills a caption template from the same fields.
//!
//! Nothing here performs I/O and nothing here fails: unparsable input
//! degrades to absent fields.

pub mod caption;
pub mod extract;
pub mod sort_key;

pub use caption::render;
pub use extract::{ExtractedFields, Quality, extract};
pub use sort_key::{Ordered, Rank, SortKey, compose_key, order_items};
