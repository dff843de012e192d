//! Delimiter-driven slicing primitives.
//!
//! Every primitive takes the [`Cursor`] bounding the unconsumed text and
//! returns the extracted [`Span`] (if any) along with the updated cursor.
//! Consumed text is never scanned again: [`begin_part`] only advances
//! `start`, [`end_part`] only retracts `end`.

use crate::pct_enc::EStr;
use core::ops::Range;

/// A validity predicate, called with a byte and its offset from where the scan began.
pub type Predicate = fn(u8, usize) -> bool;

/// The unconsumed range `[start, end)` of the text being parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    /// Start of the unconsumed text.
    pub start: usize,
    /// One byte past the end of the unconsumed text.
    pub end: usize,
}

impl Cursor {
    /// Creates a cursor covering the whole text.
    #[must_use]
    pub fn new(text: &EStr) -> Self {
        Self {
            start: 0,
            end: text.len(),
        }
    }

    /// Creates a cursor covering the given span.
    #[must_use]
    pub fn over(span: Span) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

/// A range `[start, end)` of the text being parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Index of the first byte.
    pub start: usize,
    /// One byte past the last byte.
    pub end: usize,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at `i`.
    #[must_use]
    pub const fn empty(i: usize) -> Self {
        Self { start: i, end: i }
    }

    /// Returns the length of the span.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Checks whether the span is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Converts the span to a range.
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

/// Options for [`end_part`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EndPart {
    /// Include the delimiter in the extracted span.
    pub keep_delim: bool,
    /// Match the last delimiter instead of the first.
    pub from_end: bool,
    /// Every byte after the delimiter must satisfy this predicate.
    pub valid: Option<Predicate>,
}

impl EndPart {
    /// Matches the first delimiter, excluding it from the span.
    pub const FIRST: EndPart = EndPart {
        keep_delim: false,
        from_end: false,
        valid: None,
    };

    /// Matches the last delimiter, excluding it from the span.
    pub const LAST: EndPart = EndPart {
        keep_delim: false,
        from_end: true,
        valid: None,
    };

    /// Includes the delimiter in the span.
    #[must_use]
    pub const fn keep_delim(mut self) -> Self {
        self.keep_delim = true;
        self
    }

    /// Requires every byte after the delimiter to satisfy `valid`.
    #[must_use]
    pub const fn valid(mut self, valid: Predicate) -> Self {
        self.valid = Some(valid);
        self
    }
}

/// Extracts the part before the first `delim` in the cursor.
///
/// On a match, returns `[cur.start, i)` where `i` is the index of the
/// delimiter, and advances `cur.start` to `i + 1`. If `valid` is given, every
/// byte before the delimiter must satisfy it. On no match, returns `None`
/// with the cursor untouched.
///
/// # Examples
///
/// ```
/// use uri_parts::{extract::{begin_part, Cursor, Span}, pct_enc::{table::is_scheme_char, EStr}};
///
/// let text = EStr::new_or_panic("urn:example:animal");
/// let (scheme, cur) = begin_part(text, ':', Cursor::new(text), Some(is_scheme_char));
/// assert_eq!(scheme, Some(Span::new(0, 3)));
/// assert_eq!(cur.start, 4);
///
/// let text = EStr::new_or_panic("a/b:c");
/// let (scheme, cur) = begin_part(text, ':', Cursor::new(text), Some(is_scheme_char));
/// assert_eq!((scheme, cur), (None, Cursor::new(text)));
/// ```
#[must_use]
pub fn begin_part(
    text: &EStr,
    delim: char,
    cur: Cursor,
    valid: Option<Predicate>,
) -> (Option<Span>, Cursor) {
    match text.find_delim(delim, cur.start..cur.end, valid) {
        Some(i) => (
            Some(Span::new(cur.start, i)),
            Cursor {
                start: i + 1,
                end: cur.end,
            },
        ),
        None => (None, cur),
    }
}

/// Extracts everything within the cursor.
#[must_use]
pub fn middle_part(cur: Cursor) -> Span {
    Span::new(cur.start, cur.end)
}

/// Extracts the part after a `delim` in the cursor.
///
/// On a match at index `i`, returns `[i + 1, cur.end)` (or `[i, cur.end)`
/// with `keep_delim`) and retracts `cur.end` to `i`. A match whose trailing
/// part fails `opts.valid` is discarded. On no match, returns `None` with the
/// cursor untouched.
///
/// # Examples
///
/// ```
/// use uri_parts::{extract::{end_part, Cursor, EndPart, Span}, pct_enc::{table::is_digit, EStr}};
///
/// let text = EStr::new_or_panic("u:p@host:80");
/// let (port, cur) = end_part(text, ':', Cursor::new(text), EndPart::LAST.valid(is_digit));
/// assert_eq!(port, Some(Span::new(9, 11)));
/// assert_eq!(cur.end, 8);
///
/// let text = EStr::new_or_panic("host:http");
/// let (port, cur) = end_part(text, ':', Cursor::new(text), EndPart::LAST.valid(is_digit));
/// assert_eq!((port, cur), (None, Cursor::new(text)));
/// ```
#[must_use]
pub fn end_part(text: &EStr, delim: char, cur: Cursor, opts: EndPart) -> (Option<Span>, Cursor) {
    let found = if opts.from_end {
        text.rfind_delim(delim, cur.start..cur.end, opts.valid)
    } else {
        text.find_delim(delim, cur.start..cur.end, None).filter(|&i| {
            opts.valid.map_or(true, |valid| {
                text.as_str().as_bytes()[i + 1..cur.end]
                    .iter()
                    .enumerate()
                    .all(|(j, &x)| valid(x, j))
            })
        })
    };

    match found {
        Some(i) => {
            let start = if opts.keep_delim { i } else { i + 1 };
            (
                Some(Span::new(start, cur.end)),
                Cursor {
                    start: cur.start,
                    end: i,
                },
            )
        }
        None => (None, cur),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pct_enc::table::is_digit;

    fn text(s: &str) -> &EStr {
        EStr::new_or_panic(s)
    }

    #[test]
    fn begin_part_without_predicate() {
        let t = text("user:pw@host");
        let (userinfo, cur) = begin_part(t, '@', Cursor::new(t), None);
        assert_eq!(userinfo, Some(Span::new(0, 7)));
        assert_eq!(cur, Cursor { start: 8, end: 12 });

        let (userinfo, cur) = begin_part(t, '@', cur, None);
        assert_eq!(userinfo, None);
        assert_eq!(cur, Cursor { start: 8, end: 12 });
    }

    #[test]
    fn begin_part_respects_cursor_end() {
        let t = text("ab#c:d");
        let cur = Cursor { start: 0, end: 2 };
        assert_eq!(begin_part(t, ':', cur, None), (None, cur));
    }

    #[test]
    fn middle_part_is_a_plain_slice() {
        assert_eq!(middle_part(Cursor { start: 2, end: 5 }), Span::new(2, 5));
    }

    #[test]
    fn end_part_first_and_last() {
        let t = text("a?b?c");
        let (q, cur) = end_part(t, '?', Cursor::new(t), EndPart::FIRST);
        assert_eq!(q, Some(Span::new(2, 5)));
        assert_eq!(cur.end, 1);

        let (q, cur) = end_part(t, '?', Cursor::new(t), EndPart::LAST);
        assert_eq!(q, Some(Span::new(4, 5)));
        assert_eq!(cur.end, 3);
    }

    #[test]
    fn end_part_keeps_delimiter() {
        let t = text("host/a/b");
        let (path, cur) = end_part(t, '/', Cursor::new(t), EndPart::FIRST.keep_delim());
        assert_eq!(path, Some(Span::new(4, 8)));
        assert_eq!(cur, Cursor { start: 0, end: 4 });
    }

    #[test]
    fn end_part_discards_invalid_match() {
        let t = text("a:1b:2c");
        let cur = Cursor::new(t);
        assert_eq!(end_part(t, ':', cur, EndPart::FIRST.valid(is_digit)), (None, cur));
        assert_eq!(end_part(t, ':', cur, EndPart::LAST.valid(is_digit)), (None, cur));

        let t = text("a:12");
        let (port, _) = end_part(t, ':', Cursor::new(t), EndPart::FIRST.valid(is_digit));
        assert_eq!(port, Some(Span::new(2, 4)));
    }

    #[test]
    fn empty_trailing_part() {
        let t = text("host:");
        let (port, cur) = end_part(t, ':', Cursor::new(t), EndPart::LAST.valid(is_digit));
        assert_eq!(port, Some(Span::empty(5)));
        assert_eq!(cur.end, 4);
    }
}
