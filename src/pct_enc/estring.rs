use super::{encode_byte, table, EStr, Unit, Units};
use crate::error::ParseError;
use alloc::{borrow::ToOwned, string::String};
use core::{
    borrow::Borrow,
    cmp::Ordering,
    fmt, hash,
    ops::{Add, AddAssign, Deref},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Percent-encoded text in canonical form, owned and growable.
///
/// The borrowed counterpart of `EString` is [`EStr`].
/// See its documentation for the canonical form and comparison rules.
///
/// # Examples
///
/// Canonicalise a literal and build onto it:
///
/// ```
/// use uri_parts::pct_enc::{EStr, EString};
///
/// let mut buf = EString::new("/caf%c3%a9 menu")?;
/// assert_eq!(buf.as_str(), "/caf%C3%A9%20menu");
///
/// buf.push('?');
/// buf.push_encoded("lang=fr")?;
/// let buf = buf + EStr::new_or_panic("#top");
/// assert_eq!(buf.as_str(), "/caf%C3%A9%20menu?lang=fr#top");
/// # Ok::<_, uri_parts::ParseError>(())
/// ```
#[derive(Clone, Default)]
pub struct EString {
    pub(crate) buf: String,
}

impl Deref for EString {
    type Target = EStr;

    fn deref(&self) -> &EStr {
        EStr::new_validated(&self.buf)
    }
}

fn push_unit(buf: &mut String, unit: Unit) {
    match unit {
        // Raw units are always ASCII.
        Unit::Raw(x) => buf.push(x as char),
        Unit::Escaped(x) => buf.push_str(encode_byte(x)),
    }
}

impl EString {
    pub(crate) fn new_validated(buf: String) -> Self {
        Self { buf }
    }

    /// Canonicalises a literal into an `EString`.
    ///
    /// Literal octets that are neither reserved nor unreserved are
    /// percent-encoded; percent-encoded unreserved octets are decoded;
    /// every other percent-encoded octet is kept with uppercase hex digits.
    ///
    /// # Errors
    ///
    /// Returns `Err` with [`InvalidOctet`] if a `'%'` is not followed by
    /// two hexadecimal digits.
    ///
    /// [`InvalidOctet`]: crate::ParseErrorKind::InvalidOctet
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::{pct_enc::EString, ParseErrorKind};
    ///
    /// assert_eq!(EString::new("%7euser/%2f")?.as_str(), "~user/%2F");
    /// assert_eq!(EString::new("🤪")?.as_str(), "%F0%9F%A4%AA");
    ///
    /// let e = EString::new("100%").unwrap_err();
    /// assert_eq!((e.index(), e.kind()), (3, ParseErrorKind::InvalidOctet));
    /// # Ok::<_, uri_parts::ParseError>(())
    /// ```
    pub fn new<S: AsRef<[u8]> + ?Sized>(s: &S) -> Result<Self, ParseError> {
        let bytes = s.as_ref();
        let mut buf = String::with_capacity(bytes.len());
        for unit in Units::new(bytes) {
            push_unit(&mut buf, unit?);
        }
        Ok(Self::new_validated(buf))
    }

    /// Creates a new empty `EString` with at least the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new_validated(String::with_capacity(capacity))
    }

    /// Coerces to an `EStr` slice.
    #[must_use]
    pub fn as_estr(&self) -> &EStr {
        self
    }

    /// Consumes this `EString` and yields the underlying `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Appends an unencoded character onto the end of this `EString`.
    ///
    /// # Panics
    ///
    /// Panics if the character is neither reserved nor unreserved.
    pub fn push(&mut self, ch: char) {
        assert!(
            ch.is_ascii() && table::is_unencoded(ch as u8),
            "character must be reserved or unreserved"
        );
        self.buf.push(ch);
    }

    /// Appends an `EStr` slice onto the end of this `EString`.
    pub fn push_estr(&mut self, s: &EStr) {
        self.buf.push_str(s.as_str());
    }

    /// Canonicalises a literal and appends it onto the end of this `EString`.
    ///
    /// # Errors
    ///
    /// Returns `Err` under the same conditions as [`new`](Self::new),
    /// in which case this `EString` is left unchanged.
    pub fn push_encoded<S: AsRef<[u8]> + ?Sized>(&mut self, s: &S) -> Result<(), ParseError> {
        let len = self.buf.len();
        for unit in Units::new(s.as_ref()) {
            match unit {
                Ok(unit) => push_unit(&mut self.buf, unit),
                Err(e) => {
                    self.buf.truncate(len);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Truncates this `EString`, removing all contents.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl AsRef<EStr> for EString {
    fn as_ref(&self) -> &EStr {
        self
    }
}

impl AsRef<str> for EString {
    fn as_ref(&self) -> &str {
        &self.buf
    }
}

impl Borrow<EStr> for EString {
    fn borrow(&self) -> &EStr {
        self
    }
}

impl From<&EStr> for EString {
    fn from(s: &EStr) -> Self {
        s.to_owned()
    }
}

impl FromStr for EString {
    type Err = ParseError;

    /// Equivalent to [`EString::new`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Add<&EStr> for EString {
    type Output = EString;

    fn add(mut self, rhs: &EStr) -> EString {
        self.push_estr(rhs);
        self
    }
}

impl AddAssign<&EStr> for EString {
    fn add_assign(&mut self, rhs: &EStr) {
        self.push_estr(rhs);
    }
}

impl Add<&EStr> for &EStr {
    type Output = EString;

    fn add(self, rhs: &EStr) -> EString {
        let mut buf = EString::with_capacity(self.len() + rhs.len());
        buf.push_estr(self);
        buf.push_estr(rhs);
        buf
    }
}

impl PartialEq for EString {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl PartialEq<EStr> for EString {
    fn eq(&self, other: &EStr) -> bool {
        self.as_estr() == other
    }
}

impl PartialEq<EString> for EStr {
    fn eq(&self, other: &EString) -> bool {
        self == other.as_estr()
    }
}

impl PartialEq<&EStr> for EString {
    fn eq(&self, other: &&EStr) -> bool {
        self.as_estr() == *other
    }
}

impl PartialEq<EString> for &EStr {
    fn eq(&self, other: &EString) -> bool {
        *self == other.as_estr()
    }
}

impl PartialEq<str> for EString {
    fn eq(&self, other: &str) -> bool {
        self.as_estr() == other
    }
}

impl PartialEq<&str> for EString {
    fn eq(&self, other: &&str) -> bool {
        self.as_estr() == *other
    }
}

impl PartialEq<EString> for &str {
    fn eq(&self, other: &EString) -> bool {
        other == self
    }
}

impl Eq for EString {}

impl hash::Hash for EString {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.as_estr().hash(state);
    }
}

impl PartialOrd for EString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_estr().cmp(other.as_estr())
    }
}

impl fmt::Debug for EString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_estr(), f)
    }
}

impl fmt::Display for EString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_estr(), f)
    }
}

#[cfg(feature = "serde")]
impl Serialize for EString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for EString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EString::new(&s).map_err(|e| {
            de::Error::custom(format_args!("failed to canonicalise {s:?}: {e}"))
        })
    }
}
