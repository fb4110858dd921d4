//! Property-based test generators using proptest.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

/// Strategy for whole-second UTC timestamps between 2010 and 2035.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (1_262_304_000i64..2_051_222_400i64).prop_map(|secs| {
        Utc.timestamp_opt(secs, 0)
            .single()
            .expect("timestamp in range")
    })
}

/// Strategy for plausible snippet filenames.
pub fn filename_strategy() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex"),
        prop::sample::select(vec!["py", "rs", "js", "md", "sh", "txt", "json"]),
    )
        .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
}

/// Strategy for declared languages, unknown and missing ones included.
pub fn language_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        prop::sample::select(vec![
            "Python", "Rust", "JavaScript", "Markdown", "Shell", "JSON", "Text", "Brainfuck",
        ])
        .prop_map(str::to_owned),
    )
}

/// Strategy for 1 to `max` distinct files as `(filename, language, body)`.
pub fn files_strategy(max: usize) -> impl Strategy<Value = Vec<(String, Option<String>, String)>> {
    prop::collection::btree_map(
        filename_strategy(),
        (language_strategy(), "[ -~]{0,64}"),
        1..=max.max(1),
    )
    .prop_map(|files| {
        files
            .into_iter()
            .map(|(name, (language, body))| (name, language, body))
            .collect()
    })
}

/// Strategy for an ordered sequence of modification times, possibly repeating.
pub fn revision_times_strategy(max: usize) -> impl Strategy<Value = Vec<DateTime<Utc>>> {
    prop::collection::vec(timestamp_strategy(), 1..=max.max(1))
}
