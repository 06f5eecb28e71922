//! Byte-offset motions over the draft used by cursor movement and deletion.
//!
//! Offsets are always char boundaries of `text`.

/// Characters that make up a word for word motions (readline rules).
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the character ending at `pos`, or 0 at the start of `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .chars()
        .next_back()
        .map_or(0, |c| pos - c.len_utf8())
}

/// End of the character starting at `pos`, or `pos` at the end of `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(pos, |c| pos + c.len_utf8())
}

/// Start of the word before `pos`, skipping any separators first.
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let head = text[..pos].trim_end_matches(|c: char| !is_word_char(c));
    head.trim_end_matches(is_word_char).len()
}

/// End of the word after `pos`, skipping any separators first.
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let tail = text[pos..].trim_start_matches(|c: char| !is_word_char(c));
    text.len() - tail.trim_start_matches(is_word_char).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_boundaries_multibyte() {
        let s = "café";
        assert_eq!(prev_char_boundary(s, 5), 3);
        assert_eq!(next_char_boundary(s, 3), 5);
        assert_eq!(next_char_boundary(s, 2), 3);
        assert_eq!(next_char_boundary(s, 5), 5);
        assert_eq!(prev_char_boundary(s, 0), 0);
    }

    #[test]
    fn char_boundaries_emoji() {
        let s = "a🔥b";
        assert_eq!(prev_char_boundary(s, 5), 1);
        assert_eq!(next_char_boundary(s, 1), 5);
    }

    #[test]
    fn word_boundaries() {
        assert_eq!(prev_word_boundary("hello world", 11), 6);
        assert_eq!(prev_word_boundary("hello world", 6), 0);
        assert_eq!(prev_word_boundary("foo.bar", 7), 4);
        assert_eq!(prev_word_boundary("  ", 2), 0);
        assert_eq!(next_word_boundary("hello world", 0), 5);
        assert_eq!(next_word_boundary("hello world", 5), 11);
        assert_eq!(next_word_boundary("hello_world test", 0), 11);
        assert_eq!(next_word_boundary("hello", 5), 5);
    }

    #[test]
    fn word_boundaries_multibyte() {
        let s = "naïve café";
        assert_eq!(next_word_boundary(s, 0), 6);
        assert_eq!(prev_word_boundary(s, s.len()), 7);
    }
}
