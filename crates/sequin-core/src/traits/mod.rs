// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the dispatch pipeline.
//!
//! Adapters extend [`PluginAdapter`]; the stores are plain object-safe
//! traits so in-memory and SQLite implementations can be swapped freely.
//! Everything uses `#[async_trait]` for dynamic dispatch.

pub mod adapter;
pub mod delivery;
pub mod store;

pub use adapter::PluginAdapter;
pub use delivery::DeliveryChannel;
pub use store::{LeaderboardStore, SettingsStore, StatsStore, StorageAdapter, UserStore};
