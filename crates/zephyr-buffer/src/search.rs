//! Literal substring search over the buffer content.
//!
//! The scan is a single left-to-right pass that never revisits text it
//! has already matched, so results are non-overlapping and sorted.
//! Case-insensitive search folds both sides one char at a time; a char
//! whose folded form is not a single char is kept as is, which keeps
//! every match offset valid in the original content.

use crate::{Selection, TextBuffer};

/// Chars that delimit a whole word.
const WORD_SEPARATORS: [char; 4] = [' ', '\t', '\r', '\n'];

/// Returns true if `c` delimits a whole-word match.
pub fn is_word_separator(c: char) -> bool {
    WORD_SEPARATORS.contains(&c)
}

/// Lower-cases a char when that yields exactly one char.
pub(crate) fn to_lower(c: char) -> char {
    single(c, c.to_lowercase())
}

/// Upper-cases a char when that yields exactly one char.
pub(crate) fn to_upper(c: char) -> char {
    single(c, c.to_uppercase())
}

fn single(original: char, mut folded: impl Iterator<Item = char>) -> char {
    match (folded.next(), folded.next()) {
        (Some(c), None) => c,
        _ => original,
    }
}

impl TextBuffer {
    /// Finds every occurrence of `pattern`.
    ///
    /// Returns the ascending char offsets of all non-overlapping matches.
    /// An empty pattern or an empty buffer yields no matches.
    ///
    /// With `whole_word`, a match only counts when the chars right before
    /// and right after it are absent or one of space, tab, `'\r'`, `'\n'`.
    ///
    /// # Example
    /// ```
    /// use zephyr_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::from("double string double int double char");
    /// assert_eq!(buffer.find("double", false, true), vec![0, 14, 25]);
    /// ```
    pub fn find(&self, pattern: &str, whole_word: bool, match_case: bool) -> Vec<usize> {
        if pattern.is_empty() || self.is_empty() {
            return Vec::new();
        }

        let fold = |c: char| if match_case { c } else { to_lower(c) };
        let haystack: Vec<char> = self.chars().map(fold).collect();
        let needle: Vec<char> = pattern.chars().map(fold).collect();
        let n = needle.len();

        let mut matches = Vec::new();
        let mut i = 0;
        while i + n <= haystack.len() {
            if haystack[i..i + n] == needle[..] {
                matches.push(i);
                i += n;
            } else {
                i += 1;
            }
        }

        if whole_word {
            matches.retain(|&start| {
                let before = start.checked_sub(1).map(|j| haystack[j]);
                let after = haystack.get(start + n).copied();
                before.is_none_or(is_word_separator) && after.is_none_or(is_word_separator)
            });
        }

        matches
    }

    /// Returns true if the text in `selection` equals `pattern`, comparing
    /// with the same case rule as [`TextBuffer::find`].
    ///
    /// A selection outside the buffer never matches.
    pub fn matches_at(&self, selection: Selection, pattern: &str, match_case: bool) -> bool {
        let Ok(text) = self.read(selection.start, selection.len()) else {
            return false;
        };
        let fold = |c: char| if match_case { c } else { to_lower(c) };
        text.chars().map(fold).eq(pattern.chars().map(fold))
    }
}
