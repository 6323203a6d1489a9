//! The padded source buffer (spec §3.1).
//!
//! Three trailing newlines are appended so that every lookahead the scanner
//! primitives perform (`A[cur+1]`, `A[cur..cur+8]`) is safe without bounds
//! checks -- mirrors `snow-lexer/src/cursor.rs`'s byte-offset cursor, but
//! owns a padded copy instead of borrowing the caller's `&str` since the
//! padding itself requires an allocation.
pub struct Buffer {
    padded: String,
    /// Byte length of the real source text, before padding.
    source_len: usize,
}

/// Trailing padding appended to the source so every `A[cur+k]` lookahead
/// used by the scanner primitives is in-bounds.
const PADDING: &str = "\n\n\n";

impl Buffer {
    pub fn new(source: &str) -> Self {
        let mut padded = String::with_capacity(source.len() + PADDING.len());
        padded.push_str(source);
        let source_len = padded.len();
        padded.push_str(PADDING);
        Self { padded, source_len }
    }

    /// Total length of the padded buffer.
    pub fn len(&self) -> usize {
        self.padded.len()
    }

    /// Byte length of the real source text (excludes the padding).
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Character at byte offset `i`. Always defined (even past the real
    /// source) because of the padding; only panics if `i` runs past the
    /// padded buffer entirely, which would itself be a parser bug.
    pub fn ch(&self, i: usize) -> char {
        self.padded.as_bytes()[i] as char
    }

    /// Whether the cursor has walked off the real source into the padding
    /// (spec §4.10: "end of buffer when the remaining padding is <= 2
    /// characters"). One full padding character of slack past `source_len`
    /// is intentional: a construct whose natural close sits exactly at the
    /// real end of input (no trailing junk) must still see that closing
    /// character before EOF is reported.
    pub fn at_eof(&self, i: usize) -> bool {
        self.padded.len().saturating_sub(i) <= 2
    }

    /// Verbatim slice `[start, end)` of the padded buffer.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.padded[start..end]
    }

    /// Whether `self.padded[i..]` starts with `needle`.
    pub fn starts_with(&self, i: usize, needle: &str) -> bool {
        self.padded.len() >= i + needle.len() && &self.padded[i..i + needle.len()] == needle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_safe_to_look_ahead_past_source_end() {
        let buf = Buffer::new("x");
        assert_eq!(buf.source_len(), 1);
        // looking two past the real end must not panic
        assert_eq!(buf.ch(buf.source_len() + 1), '\n');
    }

    #[test]
    fn slice_returns_real_text() {
        let buf = Buffer::new("a = 1");
        assert_eq!(buf.slice(0, 5), "a = 1");
    }

    #[test]
    fn starts_with_checks_multi_char_operator() {
        let buf = Buffer::new("a .* b");
        assert!(buf.starts_with(2, ".*"));
        assert!(!buf.starts_with(2, ".^"));
    }
}
