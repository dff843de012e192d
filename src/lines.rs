//! Reading URI literals line by line.

use crate::{
    error::ParseError,
    log::trace,
    parse::{Generic, UriParser},
    Uri,
};
use std::io::{self, BufRead};

/// Returns an iterator over the URI literals in `reader`, one per line.
///
/// Surrounding whitespace is trimmed and blank lines are skipped.
/// Every other line is parsed with the [`Generic`] dialect.
///
/// # Examples
///
/// ```
/// let input = b"foo://example.com:8042/over/there\n\nurn:example:animal:ferret:nose\n100%\n";
/// let mut lines = uri_parts::lines(&input[..]);
///
/// assert_eq!(lines.next().unwrap()?.unwrap().as_str(), "foo://example.com:8042/over/there");
/// assert_eq!(lines.next().unwrap()?.unwrap().as_str(), "urn:example:animal:ferret:nose");
/// assert_eq!(lines.next().unwrap()?.unwrap_err().input(), "100%");
/// assert!(lines.next().is_none());
/// # Ok::<_, std::io::Error>(())
/// ```
pub fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines {
        inner: reader.lines(),
        parser: Generic,
    }
}

/// An iterator over the URI literals in a reader.
///
/// This struct is created by [`lines`].
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Lines<R, P = Generic> {
    inner: io::Lines<R>,
    parser: P,
}

impl<R> Lines<R> {
    /// Parses the remaining lines with the given parser instead.
    pub fn with_parser<P: UriParser>(self, parser: P) -> Lines<R, P> {
        Lines {
            inner: self.inner,
            parser,
        }
    }
}

impl<R: BufRead, P: UriParser> Iterator for Lines<R, P> {
    type Item = io::Result<Result<Uri<String>, ParseError<String>>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.inner.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            trace!("parsing line {:?}", line);
            return Some(Ok(Uri::parse_str_with(&self.parser, line)));
        }
    }
}
