use crate::{
    component::{Components, Credential, Meta},
    error::{ParseError, ParseErrorKind},
    parse::{Generic, UriParser},
    pct_enc::{EStr, EString},
};
use alloc::{
    borrow::{Cow, ToOwned},
    collections::BTreeMap,
    string::String,
};
use borrow_or_share::{BorrowOrShare, Bos};
use core::{borrow::Borrow, cmp::Ordering, fmt, hash, iter::FusedIterator, str::FromStr};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A parsed URI literal in canonical form.
///
/// # Variants
///
/// Two variants of `Uri` are available: `Uri<&str>` (borrowed) and
/// `Uri<String>` (owned). `Uri<&'a str>` outputs references with lifetime
/// `'a` where possible (thanks to [`borrow-or-share`](borrow_or_share)).
///
/// # Comparison
///
/// `Uri`s are compared by their canonical text, so `%41` and `A` are the
/// same while `%2F` and `/` are not.
///
/// # Examples
///
/// ```
/// use uri_parts::Uri;
///
/// let uri = Uri::parse_str("foo://user:pw@example.com:8042/over/there?name=ferret#nose")?;
/// let c = uri.components();
///
/// assert_eq!(c.scheme().unwrap().as_str(), "foo");
/// let auth = c.authority().unwrap();
/// assert_eq!(auth.userinfo().unwrap(), "user:pw");
/// assert_eq!(auth.host().dns_safe(), "example.com");
/// assert_eq!(auth.port(), Some(8042));
/// assert_eq!(c.segments(), ["", "over", "there"]);
///
/// let cred = uri.credential().unwrap();
/// assert_eq!((cred.username(), cred.password()), ("user", Some("pw")));
/// assert_eq!(uri.query_map()?["name"].as_deref(), Some("ferret"));
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Uri<T> {
    /// Canonical text.
    val: T,
    /// Parser output with `val` as input.
    meta: Meta,
}

impl<'a> Uri<&'a str> {
    /// Parses canonical text with the [`Generic`] dialect.
    ///
    /// # Errors
    ///
    /// Returns `Err` under the conditions of [`UriParser::parse`].
    pub fn parse(text: &'a EStr) -> Result<Self, ParseError<&'a EStr>> {
        Self::parse_with(&Generic, text)
    }

    /// Parses canonical text with the given parser.
    ///
    /// # Errors
    ///
    /// Returns `Err` under the conditions of [`UriParser::parse`].
    pub fn parse_with<P: UriParser + ?Sized>(
        parser: &P,
        text: &'a EStr,
    ) -> Result<Self, ParseError<&'a EStr>> {
        match parser.parse(text).map(Components::into_meta) {
            Ok(meta) => Ok(Uri {
                val: text.as_str(),
                meta,
            }),
            Err(e) => Err(e.with_input(text)),
        }
    }

    /// Creates a new `Uri<String>` by cloning the contents of this `Uri<&str>`.
    #[must_use]
    pub fn to_owned(&self) -> Uri<String> {
        Uri {
            val: self.val.to_owned(),
            meta: self.meta.clone(),
        }
    }
}

impl Uri<String> {
    /// Canonicalises a literal and parses it with the [`Generic`] dialect.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the literal contains a malformed percent-encoded
    /// octet, in which case the error carries the literal as given, or under
    /// the conditions of [`UriParser::parse`], in which case it carries the
    /// canonical text. The error index refers to the text it carries.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::{ParseErrorKind, Uri};
    ///
    /// let e = Uri::parse_str("http://example.com/%zz").unwrap_err();
    /// assert_eq!(e.kind(), ParseErrorKind::InvalidOctet);
    /// assert_eq!(e.index(), 19);
    /// assert_eq!(e.input(), "http://example.com/%zz");
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, ParseError<String>> {
        Self::parse_str_with(&Generic, s)
    }

    /// Canonicalises a literal and parses it with the given parser.
    ///
    /// # Errors
    ///
    /// Returns `Err` under the same conditions as [`parse_str`](Self::parse_str).
    pub fn parse_str_with<P: UriParser + ?Sized>(
        parser: &P,
        s: &str,
    ) -> Result<Self, ParseError<String>> {
        let text = EString::new(s).map_err(|e| e.with_input(s.to_owned()))?;
        match parser.parse(&text).map(Components::into_meta) {
            Ok(meta) => Ok(Uri {
                val: text.into_string(),
                meta,
            }),
            Err(e) => Err(e.with_input(text.into_string())),
        }
    }

    /// Canonicalises a literal and parses it with the [`Generic`] dialect,
    /// returning `None` on failure.
    #[must_use]
    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse_str(s).ok()
    }

    /// Borrows this `Uri<String>` as `Uri<&str>`.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn borrow(&self) -> Uri<&str> {
        Uri {
            val: &self.val,
            meta: self.meta.clone(),
        }
    }

    /// Consumes this `Uri<String>` and yields the underlying [`String`].
    #[must_use]
    pub fn into_string(self) -> String {
        self.val
    }
}

impl<'i, 'o, T: BorrowOrShare<'i, 'o, str>> Uri<T> {
    /// Returns the canonical text as a string slice.
    #[must_use]
    pub fn as_str(&'i self) -> &'o str {
        self.val.borrow_or_share()
    }

    /// Returns the canonical text as an `EStr` slice.
    #[must_use]
    pub fn as_estr(&'i self) -> &'o EStr {
        EStr::new_validated(self.as_str())
    }
}

impl<T: Bos<str>> Uri<T> {
    /// Returns the parsed components.
    #[must_use]
    pub fn components(&self) -> Components<'_> {
        Components::new(self.as_estr(), Cow::Borrowed(&self.meta))
    }

    /// Returns the decoded credential pair from the user information.
    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.meta.auth.as_ref()?.credential.as_ref()
    }

    /// Returns an iterator over the `&`-separated pairs of the query, split
    /// at the first `'='`.
    ///
    /// Empty pairs are skipped and a pair without `'='` has no value. Pairs are
    /// yielded in order, duplicate keys included.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::{pct_enc::EStr, Uri};
    ///
    /// let uri = Uri::parse_str("foo:bar?a=1&&b&a=%C3%A9=x")?;
    /// let pairs: Vec<_> = uri.query_pairs().collect();
    /// assert_eq!(
    ///     pairs,
    ///     [
    ///         (EStr::new_or_panic("a"), Some(EStr::new_or_panic("1"))),
    ///         (EStr::new_or_panic("b"), None),
    ///         (EStr::new_or_panic("a"), Some(EStr::new_or_panic("%C3%A9=x"))),
    ///     ]
    /// );
    /// # Ok::<_, uri_parts::ParseError<String>>(())
    /// ```
    pub fn query_pairs(&self) -> QueryPairs<'_> {
        let query = self.components().query().unwrap_or(EStr::EMPTY);
        QueryPairs {
            inner: query.split('&'),
        }
    }

    /// Decodes the query into a map.
    ///
    /// When a key appears more than once, the last value wins.
    ///
    /// # Errors
    ///
    /// Returns `Err` with [`InvalidUtf8`] if a key or value is not valid UTF-8
    /// once decoded. The index points to the start of the offending key or value.
    ///
    /// [`InvalidUtf8`]: crate::ParseErrorKind::InvalidUtf8
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::Uri;
    ///
    /// let uri = Uri::parse_str("foo:bar?a=1&b&a=caf%C3%A9")?;
    /// let map = uri.query_map()?;
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map["a"].as_deref(), Some("café"));
    /// assert_eq!(map["b"], None);
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn query_map(&self) -> Result<BTreeMap<String, Option<String>>, ParseError> {
        let mut map = BTreeMap::new();
        let Some(span) = self.meta.query else {
            return Ok(map);
        };

        let decode = |s: &EStr, index| {
            s.decode()
                .to_string()
                .map(Cow::into_owned)
                .map_err(|_| ParseError::new(index, ParseErrorKind::InvalidUtf8))
        };

        let mut start = span.start;
        for pair in self.as_estr().slice(span.range()).split('&') {
            let pair_start = start;
            start += pair.len() + 1;
            if pair.is_empty() {
                continue;
            }
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, Some((value, pair_start + key.len() + 1))),
                None => (pair, None),
            };
            let key = decode(key, pair_start)?;
            let value = value.map(|(value, i)| decode(value, i)).transpose()?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// An iterator over the pairs of a query.
///
/// This struct is created by [`Uri::query_pairs`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct QueryPairs<'a> {
    inner: crate::pct_enc::Split<'a>,
}

impl<'a> Iterator for QueryPairs<'a> {
    type Item = (&'a EStr, Option<&'a EStr>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (pair, None),
            })
    }
}

impl FusedIterator for QueryPairs<'_> {}

impl<T: Bos<str>, U: Bos<str>> PartialEq<Uri<U>> for Uri<T> {
    fn eq(&self, other: &Uri<U>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<T: Bos<str>> PartialEq<str> for Uri<T> {
    /// Canonicalises `other` before comparing.
    fn eq(&self, other: &str) -> bool {
        self.as_estr() == other
    }
}

impl<T: Bos<str>> PartialEq<&str> for Uri<T> {
    fn eq(&self, other: &&str) -> bool {
        self.as_estr() == *other
    }
}

impl<T: Bos<str>> Eq for Uri<T> {}

impl<T: Bos<str>> hash::Hash for Uri<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl<T: Bos<str>> PartialOrd for Uri<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Bos<str>> Ord for Uri<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl<T: Bos<str>> AsRef<str> for Uri<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T: Bos<str>> AsRef<EStr> for Uri<T> {
    fn as_ref(&self) -> &EStr {
        self.as_estr()
    }
}

impl<T: Bos<str>> Borrow<str> for Uri<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<'a> TryFrom<&'a EStr> for Uri<&'a str> {
    type Error = ParseError<&'a EStr>;

    /// Equivalent to [`parse`](Uri::parse).
    fn try_from(value: &'a EStr) -> Result<Self, Self::Error> {
        Uri::parse(value)
    }
}

impl<'a> From<Uri<&'a str>> for &'a str {
    /// Equivalent to [`as_str`](Uri::as_str).
    fn from(value: Uri<&'a str>) -> &'a str {
        value.val
    }
}

impl From<Uri<String>> for String {
    /// Equivalent to [`into_string`](Uri::into_string).
    fn from(value: Uri<String>) -> String {
        value.val
    }
}

impl From<Uri<&str>> for Uri<String> {
    /// Equivalent to [`to_owned`](Uri::to_owned).
    fn from(value: Uri<&str>) -> Self {
        value.to_owned()
    }
}

impl FromStr for Uri<String> {
    type Err = ParseError<String>;

    /// Equivalent to [`parse_str`](Uri::parse_str).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse_str(s)
    }
}

impl<T: Bos<str>> fmt::Debug for Uri<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.components();
        f.debug_struct("Uri")
            .field("scheme", &c.scheme())
            .field("authority", &c.authority())
            .field("path", &c.path())
            .field("query", &c.query())
            .field("fragment", &c.fragment())
            .finish()
    }
}

impl<T: Bos<str>> fmt::Display for Uri<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

#[cfg(feature = "serde")]
impl<T: Bos<str>> Serialize for Uri<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Uri<String> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Uri::parse_str(&s)
            .map_err(|e| de::Error::custom(format_args!("failed to parse {s:?} as URI: {e}")))
    }
}
