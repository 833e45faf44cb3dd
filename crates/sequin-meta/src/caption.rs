// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caption templates.
//!
//! Recognized placeholders are `{file_name}`, `{episode}` and `{quality}`.
//! Anything else in the template is copied literally.

use crate::extract::ExtractedFields;

const FILE_NAME_MAX_CHARS: usize = 200;
const FILE_NAME_FALLBACK: &str = "File";

/// Renders `template` for one item.
///
/// Returns `None` when there is no template, or when substitution leaves
/// no letters or digits; the delivered caption is then left untouched.
pub fn render(template: Option<&str>, raw_text: &str, fields: &ExtractedFields) -> Option<String> {
    let template = template?;
    if template.trim().is_empty() {
        return None;
    }

    let file_name: String = raw_text.trim().chars().take(FILE_NAME_MAX_CHARS).collect();
    let file_name = if file_name.is_empty() {
        FILE_NAME_FALLBACK.to_string()
    } else {
        file_name
    };
    let episode = fields.episode.map(|e| e.to_string()).unwrap_or_default();
    let quality = fields.quality.map(|q| q.as_str()).unwrap_or_default();

    let rendered = template
        .replace("{file_name}", &file_name)
        .replace("{episode}", &episode)
        .replace("{quality}", quality);
    let rendered = rendered.trim();

    if !rendered.chars().any(char::is_alphanumeric) {
        None
    } else {
        Some(rendered.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Quality;

    fn fields(episode: Option<u32>, quality: Option<Quality>) -> ExtractedFields {
        ExtractedFields {
            episode,
            season: None,
            quality,
            title: "unknown".into(),
        }
    }

    #[test]
    fn fills_episode_and_quality() {
        let out = render(
            Some("{episode} - {quality}"),
            "whatever",
            &fields(Some(3), Some(Quality::P720)),
        );
        assert_eq!(out.as_deref(), Some("3 - 720p"));
    }

    #[test]
    fn nothing_to_fill_means_no_caption() {
        assert_eq!(render(Some("{episode} - {quality}"), "x", &fields(None, None)), None);
    }

    #[test]
    fn unicode_separators_alone_mean_no_caption() {
        let empty = fields(None, None);
        assert_eq!(render(Some("{episode} – {quality}"), "x", &empty), None);
        assert_eq!(render(Some("《{episode}》 · {quality}"), "x", &empty), None);
        assert_eq!(
            render(Some("{episode} – {quality}"), "x", &fields(Some(2), None)).as_deref(),
            Some("2 –")
        );
    }

    #[test]
    fn absent_or_blank_template_means_no_caption() {
        let f = fields(Some(1), None);
        assert_eq!(render(None, "x", &f), None);
        assert_eq!(render(Some(""), "x", &f), None);
        assert_eq!(render(Some("   "), "x", &f), None);
    }

    #[test]
    fn file_name_is_trimmed_and_truncated() {
        let raw = format!("  {}  ", "n".repeat(250));
        let out = render(Some("{file_name}"), &raw, &fields(None, None)).unwrap();
        assert_eq!(out.len(), FILE_NAME_MAX_CHARS);
    }

    #[test]
    fn empty_file_name_falls_back() {
        let out = render(Some("[{file_name}]"), "   ", &fields(None, None));
        assert_eq!(out.as_deref(), Some("[File]"));
    }

    #[test]
    fn literal_text_and_unknown_braces_survive() {
        let out = render(
            Some("Ep {episode} {lang} @channel"),
            "x",
            &fields(Some(12), None),
        );
        assert_eq!(out.as_deref(), Some("Ep 12 {lang} @channel"));
    }

    #[test]
    fn partial_fill_is_trimmed() {
        let out = render(Some("{quality} Episode {episode}"), "x", &fields(Some(5), None));
        assert_eq!(out.as_deref(), Some("Episode 5"));
    }
}
