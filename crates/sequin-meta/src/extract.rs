// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Episode, season, quality and title extraction from release names.
//!
//! Episode detection is layered. Explicit markers (`Episode 5`, `ep05`,
//! `E07`) are trusted first, then a number fenced by brackets or separators,
//! then any standalone number. The two weaker tiers ignore common
//! resolutions and anything that looks like a year.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Marker-word episode pattern, matched against lowercased text.
static EPISODE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:episode|ep|e)\s*[-:#]?\s*(\d{1,4})").unwrap());

/// A number with a delimiter on both sides: `[07]`, `- 07 -`, `_07.`
static EPISODE_FENCED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[(\s\-_.](\d{1,4})[\])\s\-_.]").unwrap());

static EPISODE_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,4})\b").unwrap());

static SEASON_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\bseason\s*[-:#]?\s*(\d{1,2})\b").unwrap(),
        // Also accepts the compact `s02e07` form.
        Regex::new(r"\bs\s*[-:#]?\s*(\d{1,2})(?:\b|e\d)").unwrap(),
        Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\s+season\b").unwrap(),
    ]
});

/// Everything removed from a name before it becomes a title, in order.
static TITLE_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\[[^\]]*\]").unwrap(),
        Regex::new(r"\([^)]*\)").unwrap(),
        Regex::new(r"\{[^}]*\}").unwrap(),
        Regex::new(r"(?i)\b(?:360p|480p|720p|1080p|2160p|4k)\b").unwrap(),
        Regex::new(r"(?i)\bs\s*\d{1,2}\s*e\s*\d{1,4}\b").unwrap(),
        Regex::new(r"(?i)\b(?:episode|ep|e)\s*[-:#]?\s*\d{1,4}\b").unwrap(),
        Regex::new(r"(?i)\bseason\s*[-:#]?\s*\d{1,2}\b").unwrap(),
        Regex::new(r"(?i)\bs\s*[-:#]?\s*\d{1,2}\b").unwrap(),
        Regex::new(
            r"(?i)\b(?:x264|x265|h\.?264|h\.?265|hevc|avc|hdrip|webrip|web-dl|bluray|bdrip)\b",
        )
        .unwrap(),
    ]
});

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_.\-]").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Numbers the weak episode tiers never accept as episodes.
const RESOLUTION_NUMBERS: [u32; 4] = [360, 480, 720, 1080];

/// Inclusive range of numbers treated as release years.
const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1900..=2100;

const MAX_TITLE_CHARS: usize = 120;

/// Title used when nothing survives normalization.
pub const UNKNOWN_TITLE: &str = "unknown";

/// Recognized video qualities, ordered by resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quality {
    P360,
    P480,
    P720,
    P1080,
}

impl Quality {
    /// Checked in this order; the first one contained in the text wins.
    pub const ALL: [Quality; 4] = [Quality::P360, Quality::P480, Quality::P720, Quality::P1080];

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
        }
    }

    /// Vertical resolution, used as the sort rank.
    pub fn rank(self) -> u32 {
        match self {
            Quality::P360 => 360,
            Quality::P480 => 480,
            Quality::P720 => 720,
            Quality::P1080 => 1080,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields recovered from one item's metadata text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub episode: Option<u32>,
    pub season: Option<u32>,
    pub quality: Option<Quality>,
    /// Normalized title, never empty.
    pub title: String,
}

/// Extracts every field from `text`.
pub fn extract(text: &str) -> ExtractedFields {
    let lower = text.to_lowercase();
    ExtractedFields {
        episode: episode_number(&lower),
        season: season_number(&lower),
        quality: quality(&lower),
        title: title(text),
    }
}

fn is_plausible_episode(n: u32) -> bool {
    !RESOLUTION_NUMBERS.contains(&n) && !YEAR_RANGE.contains(&n)
}

fn episode_number(lower: &str) -> Option<u32> {
    if let Some(n) = EPISODE_MARKER
        .captures(lower)
        .and_then(|c| c[1].parse::<u32>().ok())
    {
        return Some(n);
    }

    // Resume just after the digits so a closing delimiter can open the next token.
    let mut at = 0;
    while let Some(caps) = EPISODE_FENCED.captures_at(lower, at) {
        let digits = caps.get(1)?;
        if let Ok(n) = digits.as_str().parse::<u32>()
            && is_plausible_episode(n)
        {
            return Some(n);
        }
        at = digits.end();
    }

    EPISODE_BARE
        .captures_iter(lower)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .find(|n| is_plausible_episode(*n))
}

fn season_number(lower: &str) -> Option<u32> {
    SEASON_PATTERNS
        .iter()
        .find_map(|re| re.captures(lower).and_then(|c| c[1].parse::<u32>().ok()))
}

fn quality(lower: &str) -> Option<Quality> {
    Quality::ALL.into_iter().find(|q| lower.contains(q.as_str()))
}

fn title(text: &str) -> String {
    let mut cleaned = text.to_string();
    for re in TITLE_NOISE.iter() {
        cleaned = re.replace_all(&cleaned, " ").into_owned();
    }
    let cleaned = SEPARATORS.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let truncated: String = cleaned.trim().chars().take(MAX_TITLE_CHARS).collect();
    let truncated = truncated.trim_end();

    if truncated.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        truncated.to_string()
    }
}
