// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mode-dependent composite sort keys.

use sequin_core::SortMode;

use crate::extract::{ExtractedFields, extract};

/// A numeric key component. `Missing` orders after every known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Known(u32),
    Missing,
}

impl From<Option<u32>> for Rank {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Rank::Missing, Rank::Known)
    }
}

/// Composite key compared lexicographically.
///
/// Keys of different modes never meet in a single run, so the cross-variant
/// ordering derived here carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Episode(Rank),
    Quality(Rank, Rank),
    Title(String, Rank),
    Both(String, Rank, Rank),
    Season(Rank, Rank, Rank),
}

pub fn compose_key(fields: &ExtractedFields, mode: SortMode) -> SortKey {
    let episode = Rank::from(fields.episode);
    let quality = Rank::from(fields.quality.map(|q| q.rank()));

    match mode {
        SortMode::Episode => SortKey::Episode(episode),
        SortMode::Quality => SortKey::Quality(quality, episode),
        SortMode::Title => SortKey::Title(fields.title.to_lowercase(), episode),
        SortMode::Both => SortKey::Both(fields.title.to_lowercase(), quality, episode),
        SortMode::Season => SortKey::Season(Rank::from(fields.season), quality, episode),
    }
}

/// An item paired with the fields extracted from its text.
#[derive(Debug, Clone)]
pub struct Ordered<T> {
    pub fields: ExtractedFields,
    pub item: T,
}

/// Extracts fields for every item and returns them in `mode` order.
///
/// Items with equal keys keep their arrival order.
pub fn order_items<T>(
    items: Vec<T>,
    mode: SortMode,
    text_of: impl Fn(&T) -> &str,
) -> Vec<Ordered<T>> {
    let mut keyed: Vec<(SortKey, Ordered<T>)> = items
        .into_iter()
        .map(|item| {
            let fields = extract(text_of(&item));
            (compose_key(&fields, mode), Ordered { fields, item })
        })
        .collect();

    // `sort_by` is stable.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, ordered)| ordered).collect()
}
