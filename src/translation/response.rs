/*!
 * Reconciliation of a delimited multi-translation response with its batch.
 *
 * Whatever the model sends back, the output has exactly one entry per
 * input entry, in input order. Positions that cannot be filled carry the
 * source text plus one of the markers below.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::SubtitleEntry;

/// Separator the prompt asks the model to put between translations
pub const SEPARATOR: &str = "|||";

/// Suffixes appended to the source text when a position has no usable translation
pub mod markers {
    pub const EMPTY_TRANSLATION: &str = " [Empty Translation]";
    pub const EMPTY_IN_FALLBACK: &str = " [Empty in Fallback]";
    pub const NO_TRANSLATION_IN_FALLBACK: &str = " [No Translation in Fallback]";
    pub const API_ERROR: &str = " [API Error]";
    pub const FALLBACK_ERROR: &str = " [Fallback Error]";
    pub const EMPTY_RESPONSE: &str = " [Empty Response]";
    pub const MALFORMED_RESPONSE: &str = " [Malformed Response]";
}

static NUMBERING_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*").unwrap());
static BARE_NUMBERING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.$").unwrap());

/// Split a response into trimmed segments.
///
/// With the separator present, empty segments are kept so the count
/// reflects the response structure. Without it, lines are used instead and
/// blank or bare-numbering lines are dropped.
pub fn split_segments(response_text: &str) -> Vec<String> {
    if response_text.contains(SEPARATOR) {
        response_text.split(SEPARATOR)
            .map(|segment| segment.trim().to_string())
            .collect()
    } else {
        response_text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !BARE_NUMBERING_REGEX.is_match(line))
            .map(str::to_string)
            .collect()
    }
}

/// Remove a leading `N.` numbering the model may have added
pub fn strip_numbering(segment: &str) -> &str {
    match NUMBERING_PREFIX_REGEX.find(segment) {
        Some(prefix) => &segment[prefix.end()..],
        None => segment,
    }
}

/// Remove blank lines inside a translation; a blank line would end the SRT block early
pub fn without_blank_lines(translation: &str) -> String {
    translation.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mark every entry of a batch with the same error suffix
pub fn mark_all(batch: &[SubtitleEntry], marker: &str) -> Vec<SubtitleEntry> {
    batch.iter().map(|entry| entry.with_marker(marker)).collect()
}

/// Assign translations from `response_text` to the entries of `batch`
pub fn reconcile(batch: &[SubtitleEntry], response_text: &str) -> Vec<SubtitleEntry> {
    let response_text = response_text.trim();
    if !response_text.contains(SEPARATOR) {
        warn!(
            "Response for batch {} did not contain '{}' separator. Falling back to newline splitting.",
            sequence_range(batch), SEPARATOR
        );
    }

    let segments = split_segments(response_text);
    if segments.len() == batch.len() {
        return batch.iter()
            .zip(segments.iter())
            .map(|(entry, segment)| {
                let translation = without_blank_lines(strip_numbering(segment));
                if translation.is_empty() {
                    warn!("Empty translation for entry {}; keeping original with marker", entry.seq_num);
                    entry.with_marker(markers::EMPTY_TRANSLATION)
                } else {
                    entry.with_translation(translation)
                }
            })
            .collect();
    }

    warn!(
        "Translation count mismatch for batch {}. Expected {}, got {}. Falling back to per-entry marking.",
        sequence_range(batch), batch.len(), segments.len()
    );
    fallback(batch, &segments)
}

/// Per-position fill used when the segment count does not match the batch
fn fallback(batch: &[SubtitleEntry], segments: &[String]) -> Vec<SubtitleEntry> {
    batch.iter()
        .enumerate()
        .map(|(position, entry)| match segments.get(position) {
            Some(segment) => {
                let translation = without_blank_lines(strip_numbering(segment));
                if translation.is_empty() {
                    debug!("Fallback: empty translation for entry {}", entry.seq_num);
                    entry.with_marker(markers::EMPTY_IN_FALLBACK)
                } else {
                    debug!("Fallback: using partial translation for entry {}", entry.seq_num);
                    entry.with_translation(translation)
                }
            },
            None => {
                debug!("Fallback: no translation available for entry {}", entry.seq_num);
                entry.with_marker(markers::NO_TRANSLATION_IN_FALLBACK)
            },
        })
        .collect()
}

/// `first-last` sequence numbers of a batch, for log messages
pub fn sequence_range(batch: &[SubtitleEntry]) -> String {
    match (batch.first(), batch.last()) {
        (Some(first), Some(last)) => format!("{}-{}", first.seq_num, last.seq_num),
        _ => "(empty)".to_string(),
    }
}
