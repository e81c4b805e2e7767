// src/storage/sanitize.rs
//! Template-name to filename sanitization.

/// Characters that are unsafe in filenames on at least one supported
/// platform. Each is replaced with `_`.
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Map a free-form template name to a filesystem-safe filename stem.
///
/// Replaces unsafe characters with `_`, then trims surrounding whitespace.
/// Total: never fails, but may return an empty string for all-whitespace
/// input. Callers must treat an empty result as an invalid name, since it
/// would collide with every other empty-named template.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();
    replaced.trim().to_string()
}
