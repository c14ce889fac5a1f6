//! The Normalizer component (§4.1): projects a raw line to its canonical
//! key form — the first K delimiter-separated fields, rejoined.

use memchr::memchr_iter;

/// Strip leading/trailing ASCII whitespace, matching the Scanner's own trim
/// so a line that reaches the Normalizer is never re-trimmed differently.
#[inline]
pub fn trim_ascii(line: &[u8]) -> &[u8] {
    let mut start = 0;
    let mut end = line.len();
    while start < end && line[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && line[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    &line[start..end]
}

/// Produce the NormalizedKey for `line` (already raw bytes of one record):
/// the first `min(k, fields)` delimiter-separated fields, rejoined with
/// `delimiter`. If `line` has fewer than `k` fields, the whole trimmed line
/// is the key. An empty trimmed line yields an empty key.
///
/// Returns a borrowed slice of `line` whenever possible (the common case: a
/// contiguous run from the start of the trimmed line) to avoid an
/// allocation per record on the hot path.
pub fn normalize_key(line: &[u8], delimiter: u8, k: usize) -> &[u8] {
    let trimmed = trim_ascii(line);
    if k == 0 || trimmed.is_empty() {
        return trimmed;
    }

    // At most k splits: find the k-th delimiter occurrence (0-indexed k-1).
    // Everything up to (but not including) that delimiter is the key; if
    // fewer than k delimiters exist, the whole trimmed line is the key.
    let mut count = 0usize;
    for pos in memchr_iter(delimiter, trimmed) {
        count += 1;
        if count == k {
            return &trimmed[..pos];
        }
    }
    trimmed
}
