//! Error types.

use core::fmt;

/// Detailed cause of a [`ParseError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// Invalid percent-encoded octet that is either non-hexadecimal or incomplete.
    ///
    /// The error index points to the percent character "%" of the octet.
    InvalidOctet,
    /// A component that must be decoded to text is not valid UTF-8 once decoded.
    ///
    /// The error index points to the start of the component.
    InvalidUtf8,
    /// The host was rejected by IDN mapping.
    ///
    /// The error index points to the start of the host.
    InvalidHost,
    /// Unexpected character that is not allowed by the component grammar.
    ///
    /// Only reported by the [`Strict`](crate::parse::Strict) dialect.
    /// The error index points to the character.
    UnexpectedChar,
}

/// An error occurred when canonicalising or parsing a URI literal.
///
/// The type parameter `I` is the input that was attempted to parse,
/// or `()` when it has been erased.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseError<I = ()> {
    pub(crate) index: usize,
    pub(crate) kind: ParseErrorKind,
    pub(crate) input: I,
}

impl ParseError {
    /// Creates an error without input.
    ///
    /// Intended for custom [`UriParser`](crate::parse::UriParser) dialects
    /// rejecting a component in [`check`](crate::parse::UriParser::check).
    #[must_use]
    pub const fn new(index: usize, kind: ParseErrorKind) -> Self {
        Self {
            index,
            kind,
            input: (),
        }
    }

    pub(crate) fn with_input<I>(self, input: I) -> ParseError<I> {
        ParseError {
            index: self.index,
            kind: self.kind,
            input,
        }
    }
}

impl<I> ParseError<I> {
    /// Returns the index at which the error occurred.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Returns the input that was attempted to parse.
    #[inline]
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Recovers the input that was attempted to parse.
    #[inline]
    pub fn into_input(self) -> I {
        self.input
    }

    /// Returns the error with input erased.
    #[inline]
    #[must_use]
    pub fn plain(&self) -> ParseError {
        ParseError::new(self.index, self.kind)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ParseErrorKind::InvalidOctet => "invalid percent-encoded octet at index ",
            ParseErrorKind::InvalidUtf8 => "invalid UTF-8 in component at index ",
            ParseErrorKind::InvalidHost => "invalid host at index ",
            ParseErrorKind::UnexpectedChar => "unexpected character at index ",
        };
        write!(f, "{}{}", msg, self.index)
    }
}

impl<I: Input> fmt::Display for ParseError<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid URI format {:?}: {}",
            self.input.as_ref(),
            self.plain()
        )
    }
}

#[cfg(feature = "impl-error")]
impl crate::Error for ParseError {}

#[cfg(feature = "impl-error")]
impl<I: Input + fmt::Debug> crate::Error for ParseError<I> {}

/// A literal kept by a [`ParseError`] for reporting.
pub trait Input: AsRef<str> + sealed::Sealed {}

mod sealed {
    pub trait Sealed {}
}

macro_rules! impl_input {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Input for $ty {}
        )*
    };
}

impl_input!(&str, alloc::string::String, &crate::pct_enc::EStr);
