//! Percent-encoding utilities.
//!
//! Text is kept in *canonical* form: every byte is either an unreserved
//! character, a reserved character, or part of a `%XY` triplet (uppercase hex)
//! whose octet is neither. Percent-encoded unreserved octets are stored as
//! the characters themselves, while reserved octets keep whatever form they
//! arrived in, so `%2F` and `/` never compare equal.

mod estring;
pub mod table;

pub use estring::EString;
pub use table::{Class, Table};

use crate::error::{ParseError, ParseErrorKind};
use alloc::{
    borrow::{Cow, ToOwned},
    string::String,
    vec::Vec,
};
use core::{cmp::Ordering, fmt, hash, iter::FusedIterator, ops::Range, str};
use ref_cast::{ref_cast_custom, RefCastCustom};
use table::{is_unencoded, is_unreserved};

/// A single octet of encoded text, tagged with the form it is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    /// An octet written as itself.
    Raw(u8),
    /// An octet written as a percent-encoded triplet.
    Escaped(u8),
}

impl Unit {
    /// Returns the octet regardless of its form.
    #[must_use]
    pub fn octet(self) -> u8 {
        match self {
            Unit::Raw(x) | Unit::Escaped(x) => x,
        }
    }
}

/// Canonicalises arbitrary bytes into [`Unit`]s.
///
/// Yields one error and stops at the first malformed percent-encoded octet.
#[derive(Clone, Debug)]
pub(crate) struct Units<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Units<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
}

impl Iterator for Units<'_> {
    type Item = Result<Unit, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let x = *self.bytes.get(self.pos)?;
        if x != b'%' {
            self.pos += 1;
            return Some(Ok(if is_unencoded(x) {
                Unit::Raw(x)
            } else {
                Unit::Escaped(x)
            }));
        }

        match self.bytes[self.pos + 1..] {
            [hi, lo, ..] if is_hexdig_pair(hi, lo) => {
                self.pos += 3;
                let x = decode_octet(hi, lo);
                Some(Ok(if is_unreserved(x) {
                    Unit::Raw(x)
                } else {
                    Unit::Escaped(x)
                }))
            }
            _ => {
                let index = self.pos;
                self.pos = self.bytes.len();
                Some(Err(ParseError::new(index, ParseErrorKind::InvalidOctet)))
            }
        }
    }
}

impl FusedIterator for Units<'_> {}

/// Checks whether the bytes are in canonical form.
const fn is_canonical(s: &[u8]) -> bool {
    let mut i = 0;
    while i < s.len() {
        let x = s[i];
        if x == b'%' {
            if i + 2 >= s.len() {
                return false;
            }
            let (hi, lo) = (s[i + 1], s[i + 2]);
            if !is_upper_hexdig(hi) || !is_upper_hexdig(lo) || is_unreserved(decode_octet(hi, lo)) {
                return false;
            }
            i += 3;
        } else if is_unencoded(x) {
            i += 1;
        } else {
            return false;
        }
    }
    true
}

/// Percent-encoded text in canonical form.
///
/// The owned counterpart of `EStr` is [`EString`], whose constructor
/// canonicalises arbitrary input.
///
/// # Comparison
///
/// `EStr` slices are compared by their canonical bytes, which is the same as
/// comparing their [`Unit`]s: `"%41"` equals `"A"`, but `"%2F"` does not
/// equal `"/"`. Comparison against a plain `str` canonicalises it first.
///
/// # Examples
///
/// ```
/// use uri_parts::pct_enc::EString;
///
/// let s = EString::new("%41b%2fc")?;
/// assert_eq!(s.as_str(), "Ab%2Fc");
/// assert_eq!(s, "A%62%2Fc");
/// assert_ne!(s, "Ab/c");
/// # Ok::<_, uri_parts::ParseError>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct EStr {
    inner: str,
}

impl EStr {
    /// Converts a string slice to an `EStr` slice assuming canonical form.
    #[ref_cast_custom]
    pub(crate) const fn new_validated(s: &str) -> &Self;

    /// An empty `EStr` slice.
    pub const EMPTY: &'static Self = Self::new_validated("");

    /// Converts a string slice to an `EStr` slice.
    ///
    /// # Panics
    ///
    /// Panics if the string is not in canonical form.
    /// For a non-panicking variant, use [`new`](Self::new).
    #[must_use]
    pub const fn new_or_panic(s: &str) -> &Self {
        match Self::new(s) {
            Some(s) => s,
            None => panic!("string not in canonical form"),
        }
    }

    /// Converts a string slice to an `EStr` slice, returning `None` if the
    /// string is not already in canonical form.
    ///
    /// Use [`EString::new`] to canonicalise arbitrary input.
    #[must_use]
    pub const fn new(s: &str) -> Option<&Self> {
        if is_canonical(s.as_bytes()) {
            Some(Self::new_validated(s))
        } else {
            None
        }
    }

    /// Yields the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the length of the `EStr` slice in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks whether the `EStr` slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over the units of the `EStr` slice.
    pub fn units(&self) -> impl Iterator<Item = Unit> + '_ {
        Units::new(self.inner.as_bytes()).flatten()
    }

    /// Checks whether the `EStr` slice starts with the given encoded text.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.inner.starts_with(prefix)
    }

    fn is_unit_boundary(&self, i: usize) -> bool {
        let bytes = self.inner.as_bytes();
        !(i >= 1 && bytes[i - 1] == b'%' || i >= 2 && bytes[i - 2] == b'%')
    }

    /// Returns the `count` bytes starting at `start`.
    ///
    /// Returns `None` if the range is out of bounds or would split
    /// a percent-encoded triplet.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::pct_enc::EStr;
    ///
    /// let s = EStr::new_or_panic("a%20b");
    /// assert_eq!(s.substring(1, 3).unwrap(), "%20");
    /// assert!(s.substring(2, 2).is_none());
    /// assert!(s.substring(4, 2).is_none());
    /// ```
    #[must_use]
    pub fn substring(&self, start: usize, count: usize) -> Option<&Self> {
        let end = start.checked_add(count)?;
        let s = self.inner.get(start..end)?;
        if self.is_unit_boundary(start) && self.is_unit_boundary(end) {
            Some(Self::new_validated(s))
        } else {
            None
        }
    }

    /// Slices by a range known to lie on unit boundaries.
    pub(crate) fn slice(&self, range: Range<usize>) -> &Self {
        debug_assert!(self.is_unit_boundary(range.start) && self.is_unit_boundary(range.end));
        Self::new_validated(&self.inner[range])
    }

    /// Returns an iterator used to decode the `EStr` slice.
    ///
    /// Always **split before decoding**, as otherwise the data may be
    /// mistaken for component delimiters.
    ///
    /// Note that the iterator will **not** decode `U+002B` (+) as `0x20` (space).
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::pct_enc::EStr;
    ///
    /// let dec = EStr::new_or_panic("%C2%A1Hola%21").decode();
    /// assert_eq!(*dec.clone().to_bytes(), [0xc2, 0xa1, 0x48, 0x6f, 0x6c, 0x61, 0x21]);
    /// assert_eq!(dec.to_string().unwrap(), "¡Hola!");
    /// ```
    pub fn decode(&self) -> Decode<'_> {
        Decode::new(&self.inner)
    }

    /// Returns an iterator over subslices of the `EStr` slice separated by the given delimiter.
    ///
    /// Always yields at least one item.
    ///
    /// # Panics
    ///
    /// Panics if the delimiter is not a [reserved] character.
    ///
    /// [reserved]: https://datatracker.ietf.org/doc/html/rfc3986#section-2.2
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::pct_enc::EStr;
    ///
    /// assert!(EStr::new_or_panic("a,b,c").split(',').eq(["a", "b", "c"]));
    /// assert!(EStr::new_or_panic(",").split(',').eq(["", ""]));
    /// assert!(EStr::EMPTY.split(',').eq([""]));
    /// ```
    pub fn split(&self, delim: char) -> Split<'_> {
        assert_reserved(delim);
        Split {
            inner: self.inner.split(delim),
        }
    }

    /// Splits the `EStr` slice on the first occurrence of the given delimiter and
    /// returns prefix before delimiter and suffix after delimiter.
    ///
    /// Returns `None` if the delimiter is not found.
    ///
    /// # Panics
    ///
    /// Panics if the delimiter is not a [reserved] character.
    ///
    /// [reserved]: https://datatracker.ietf.org/doc/html/rfc3986#section-2.2
    #[must_use]
    pub fn split_once(&self, delim: char) -> Option<(&Self, &Self)> {
        assert_reserved(delim);
        self.inner
            .split_once(delim)
            .map(|(a, b)| (Self::new_validated(a), Self::new_validated(b)))
    }

    /// Splits the `EStr` slice on the last occurrence of the given delimiter and
    /// returns prefix before delimiter and suffix after delimiter.
    ///
    /// Returns `None` if the delimiter is not found.
    ///
    /// # Panics
    ///
    /// Panics if the delimiter is not a [reserved] character.
    ///
    /// [reserved]: https://datatracker.ietf.org/doc/html/rfc3986#section-2.2
    #[must_use]
    pub fn rsplit_once(&self, delim: char) -> Option<(&Self, &Self)> {
        assert_reserved(delim);
        self.inner
            .rsplit_once(delim)
            .map(|(a, b)| (Self::new_validated(a), Self::new_validated(b)))
    }

    /// Returns the index of the first `delim` within `range`.
    ///
    /// If `valid` is given, it is called with every byte seen before the
    /// delimiter along with its offset from `range.start`, and the search
    /// gives up with `None` on the first byte it rejects.
    ///
    /// Returns `None` if the delimiter is not found or `range` is out of bounds.
    ///
    /// # Panics
    ///
    /// Panics if the delimiter is not a [reserved] character.
    ///
    /// [reserved]: https://datatracker.ietf.org/doc/html/rfc3986#section-2.2
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::pct_enc::{table::is_scheme_char, EStr};
    ///
    /// let s = EStr::new_or_panic("urn:a:b");
    /// assert_eq!(s.find_delim(':', 0..s.len(), Some(is_scheme_char)), Some(3));
    /// assert_eq!(s.find_delim(':', 4..s.len(), None), Some(5));
    ///
    /// let s = EStr::new_or_panic("//host:80");
    /// assert_eq!(s.find_delim(':', 0..s.len(), Some(is_scheme_char)), None);
    /// ```
    #[must_use]
    pub fn find_delim(
        &self,
        delim: char,
        range: Range<usize>,
        valid: Option<fn(u8, usize) -> bool>,
    ) -> Option<usize> {
        assert_reserved(delim);
        let bytes = self.inner.as_bytes().get(range.clone())?;
        for (i, &x) in bytes.iter().enumerate() {
            if x == delim as u8 {
                return Some(range.start + i);
            }
            if matches!(valid, Some(valid) if !valid(x, i)) {
                return None;
            }
        }
        None
    }

    /// Returns the index of the last `delim` within `range`.
    ///
    /// Scans from `range.end` backwards. If `valid` is given, it is called
    /// with every byte seen after the delimiter along with its distance from
    /// `range.end - 1`, and the search gives up with `None` on the first byte
    /// it rejects.
    ///
    /// # Panics
    ///
    /// Panics if the delimiter is not a [reserved] character.
    ///
    /// [reserved]: https://datatracker.ietf.org/doc/html/rfc3986#section-2.2
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::pct_enc::{table::is_digit, EStr};
    ///
    /// let s = EStr::new_or_panic("user:pw@host:8080");
    /// assert_eq!(s.rfind_delim(':', 0..s.len(), Some(is_digit)), Some(12));
    ///
    /// let s = EStr::new_or_panic("[2a00::5678]");
    /// assert_eq!(s.rfind_delim(':', 0..s.len(), Some(is_digit)), None);
    /// ```
    #[must_use]
    pub fn rfind_delim(
        &self,
        delim: char,
        range: Range<usize>,
        valid: Option<fn(u8, usize) -> bool>,
    ) -> Option<usize> {
        assert_reserved(delim);
        let bytes = self.inner.as_bytes().get(range.clone())?;
        for (i, &x) in bytes.iter().rev().enumerate() {
            if x == delim as u8 {
                return Some(range.end - 1 - i);
            }
            if matches!(valid, Some(valid) if !valid(x, i)) {
                return None;
            }
        }
        None
    }
}

fn assert_reserved(delim: char) {
    assert!(
        delim.is_ascii() && table::is_reserved(delim as u8),
        "delimiter is not a reserved character"
    );
}

impl AsRef<Self> for EStr {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl AsRef<str> for EStr {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl PartialEq for EStr {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl PartialEq<str> for EStr {
    fn eq(&self, other: &str) -> bool {
        let mut lhs = self.units();
        let mut rhs = Units::new(other.as_bytes());
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => return true,
                (Some(a), Some(Ok(b))) if a == b => {}
                _ => return false,
            }
        }
    }
}

impl PartialEq<&str> for EStr {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<EStr> for str {
    fn eq(&self, other: &EStr) -> bool {
        other == self
    }
}

impl Eq for EStr {}

impl hash::Hash for EStr {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl PartialOrd for EStr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EStr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}

impl Default for &EStr {
    /// Creates an empty `EStr` slice.
    fn default() -> Self {
        EStr::EMPTY
    }
}

impl ToOwned for EStr {
    type Owned = EString;

    fn to_owned(&self) -> EString {
        EString::new_validated(self.inner.to_owned())
    }
}

impl fmt::Debug for EStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for EStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

const fn gen_octet_table(hi: bool) -> [u8; 256] {
    let mut out = [0xff; 256];
    let shift = if hi { 4 } else { 0 };

    let mut i = 0;
    while i < 10 {
        out[(i + b'0') as usize] = i << shift;
        i += 1;
    }
    while i < 16 {
        out[(i - 10 + b'A') as usize] = i << shift;
        out[(i - 10 + b'a') as usize] = i << shift;
        i += 1;
    }
    out
}

const OCTET_TABLE_HI: &[u8; 256] = &gen_octet_table(true);
const OCTET_TABLE_LO: &[u8; 256] = &gen_octet_table(false);

const fn is_hexdig(x: u8) -> bool {
    OCTET_TABLE_LO[x as usize] != 0xff
}

pub(crate) const fn is_hexdig_pair(hi: u8, lo: u8) -> bool {
    is_hexdig(hi) && is_hexdig(lo)
}

const fn is_upper_hexdig(x: u8) -> bool {
    matches!(x, b'0'..=b'9' | b'A'..=b'F')
}

/// Decodes a percent-encoded octet, assuming that the bytes are hexadecimal.
const fn decode_octet(hi: u8, lo: u8) -> u8 {
    OCTET_TABLE_HI[hi as usize] | OCTET_TABLE_LO[lo as usize]
}

/// Percent-encodes a byte, always yielding a `%XY` triplet with uppercase hex.
///
/// The triplet is plain text; feed it to [`EString::new`] to get canonical form.
///
/// # Examples
///
/// ```
/// use uri_parts::pct_enc::{encode_byte, EString};
///
/// assert_eq!(encode_byte(b' '), "%20");
/// assert_eq!(encode_byte(b'A'), "%41");
/// assert_eq!(EString::new(encode_byte(b'A'))?.as_str(), "A");
/// # Ok::<_, uri_parts::ParseError>(())
/// ```
#[must_use]
pub fn encode_byte(x: u8) -> &'static str {
    const TABLE: &[u8; 256 * 3] = &{
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut i = 0;
        let mut table = [0; 256 * 3];
        while i < 256 {
            table[i * 3] = b'%';
            table[i * 3 + 1] = HEX_DIGITS[i >> 4];
            table[i * 3 + 2] = HEX_DIGITS[i & 0b1111];
            i += 1;
        }
        table
    };

    const TABLE_STR: &str = match str::from_utf8(TABLE) {
        Ok(s) => s,
        Err(_) => unreachable!(),
    };

    &TABLE_STR[x as usize * 3..x as usize * 3 + 3]
}

/// An iterator used to decode an [`EStr`] slice.
///
/// This struct is created by [`EStr::decode`]. Normally you'll use the methods below
/// instead of iterating over a `Decode` manually.
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Decode<'a> {
    source: &'a str,
}

/// An item returned by the [`Decode`] iterator.
#[derive(Clone, Copy, Debug)]
pub enum DecodedChunk<'a> {
    /// An unencoded subslice.
    Unencoded(&'a str),
    /// A percent-encoded octet, decoded (for example, `"%20"` decoded as `0x20`).
    PctDecoded(u8),
}

impl<'a> Decode<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn next_if_unencoded(&mut self) -> Option<&'a str> {
        let i = self
            .source
            .bytes()
            .position(|x| x == b'%')
            .unwrap_or(self.source.len());

        if i == 0 {
            None
        } else {
            let s;
            (s, self.source) = self.source.split_at(i);
            Some(s)
        }
    }

    fn decoded_len(&self) -> usize {
        self.source.len() - self.source.bytes().filter(|&x| x == b'%').count() * 2
    }

    /// Decodes the slice to bytes.
    ///
    /// This method allocates only when the slice contains any percent-encoded octet.
    #[must_use]
    pub fn to_bytes(mut self) -> Cow<'a, [u8]> {
        let mut buf = match self.next_if_unencoded() {
            Some(s) if self.source.is_empty() => return Cow::Borrowed(s.as_bytes()),
            Some(s) => {
                let mut buf = Vec::with_capacity(s.len() + self.decoded_len());
                buf.extend_from_slice(s.as_bytes());
                buf
            }
            None if self.source.is_empty() => return Cow::Borrowed(&[]),
            None => Vec::with_capacity(self.decoded_len()),
        };

        for chunk in self {
            match chunk {
                DecodedChunk::Unencoded(s) => buf.extend_from_slice(s.as_bytes()),
                DecodedChunk::PctDecoded(x) => buf.push(x),
            }
        }
        Cow::Owned(buf)
    }

    /// Attempts to decode the slice to a string.
    ///
    /// This method allocates only when the slice contains any percent-encoded octet.
    ///
    /// # Errors
    ///
    /// Returns `Err` containing the decoded bytes if they are not valid UTF-8.
    pub fn to_string(self) -> Result<Cow<'a, str>, Vec<u8>> {
        match self.to_bytes() {
            Cow::Borrowed(bytes) => str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|_| bytes.to_vec()),
            Cow::Owned(bytes) => String::from_utf8(bytes)
                .map(Cow::Owned)
                .map_err(|e| e.into_bytes()),
        }
    }

    /// Decodes the slice to a string, replacing any invalid UTF-8 sequences with
    /// [`U+FFFD REPLACEMENT CHARACTER`][U+FFFD].
    ///
    /// [U+FFFD]: char::REPLACEMENT_CHARACTER
    #[must_use]
    pub fn to_string_lossy(self) -> Cow<'a, str> {
        match self.to_string() {
            Ok(s) => s,
            Err(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

impl<'a> Iterator for Decode<'a> {
    type Item = DecodedChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.source.is_empty() {
            None
        } else if let Some(s) = self.next_if_unencoded() {
            Some(DecodedChunk::Unencoded(s))
        } else {
            let s;
            (s, self.source) = self.source.split_at(3);
            let x = decode_octet(s.as_bytes()[1], s.as_bytes()[2]);
            Some(DecodedChunk::PctDecoded(x))
        }
    }
}

impl FusedIterator for Decode<'_> {}

/// An iterator over subslices of an [`EStr`] slice separated by a delimiter.
///
/// This struct is created by [`EStr::split`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Split<'a> {
    inner: str::Split<'a, char>,
}

impl<'a> Iterator for Split<'a> {
    type Item = &'a EStr;

    fn next(&mut self) -> Option<&'a EStr> {
        self.inner.next().map(EStr::new_validated)
    }
}

impl<'a> DoubleEndedIterator for Split<'a> {
    fn next_back(&mut self) -> Option<&'a EStr> {
        self.inner.next_back().map(EStr::new_validated)
    }
}

impl FusedIterator for Split<'_> {}
