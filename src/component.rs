//! URI components.

use crate::{
    extract::Span,
    pct_enc::{table, EStr, EString},
};
use alloc::{borrow::Cow, string::String, vec::Vec};
use core::{fmt, hash};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// Spans and decoded values produced by a parser.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Meta {
    pub(crate) scheme: Option<Span>,
    pub(crate) hier_part: Span,
    pub(crate) auth: Option<AuthMeta>,
    pub(crate) path: Span,
    pub(crate) segments: Vec<String>,
    pub(crate) query: Option<Span>,
    pub(crate) fragment: Option<Span>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct AuthMeta {
    pub(crate) span: Span,
    pub(crate) userinfo: Option<Span>,
    pub(crate) credential: Option<Credential>,
    pub(crate) host: Span,
    pub(crate) dns_safe_host: String,
    pub(crate) idn_host: String,
    pub(crate) port: Option<Span>,
    pub(crate) port_num: Option<u16>,
}

/// A [scheme] component.
///
/// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
///
/// # Comparison
///
/// `Scheme`s are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use uri_parts::{component::Scheme, Uri};
///
/// const SCHEME_HTTP: &Scheme = Scheme::new_or_panic("http");
///
/// let uri = Uri::parse_str("HTTP://EXAMPLE.COM/")?;
/// let components = uri.components();
/// let scheme = components.scheme().unwrap();
///
/// // Case-insensitive comparison.
/// assert_eq!(scheme, SCHEME_HTTP);
/// // Case-sensitive comparison.
/// assert_eq!(scheme.as_str(), "HTTP");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct Scheme {
    inner: str,
}

impl Scheme {
    #[ref_cast_custom]
    #[inline]
    pub(crate) const fn new_validated(scheme: &str) -> &Scheme;

    /// Converts a string slice to `&Scheme`.
    ///
    /// # Panics
    ///
    /// Panics if the string is not a valid scheme name according to
    /// [Section 3.1 of RFC 3986][scheme]. For a non-panicking variant,
    /// use [`new`](Self::new).
    ///
    /// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
    #[inline]
    #[must_use]
    pub const fn new_or_panic(s: &str) -> &Scheme {
        match Self::new(s) {
            Some(scheme) => scheme,
            None => panic!("invalid scheme"),
        }
    }

    /// Converts a string slice to `&Scheme`, returning `None` if the conversion fails.
    #[must_use]
    pub const fn new(s: &str) -> Option<&Scheme> {
        let bytes = s.as_bytes();
        if bytes.is_empty() {
            return None;
        }
        let mut i = 0;
        while i < bytes.len() {
            if !table::is_scheme_char(bytes[i], i) {
                return None;
            }
            i += 1;
        }
        Some(Scheme::new_validated(s))
    }

    /// Returns the scheme component as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl PartialEq for Scheme {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq_ignore_ascii_case(&other.inner)
    }
}

impl Eq for Scheme {}

impl hash::Hash for Scheme {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        for x in self.inner.bytes() {
            state.write_u8(x.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Debug for Scheme {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Scheme {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

/// A decoded username and optional password taken from the user-info subcomponent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Credential {
    pub(crate) username: String,
    pub(crate) password: Option<String>,
}

impl Credential {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: String, password: Option<String>) -> Self {
        Self { username, password }
    }

    /// Returns the decoded username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the decoded password, if any.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// The [authority] component.
///
/// [authority]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2
#[derive(Clone, Copy)]
pub struct Authority<'a> {
    text: &'a EStr,
    meta: &'a AuthMeta,
}

impl<'a> Authority<'a> {
    /// Returns the authority component as an `EStr` slice.
    #[must_use]
    pub fn as_estr(&self) -> &'a EStr {
        self.text.slice(self.meta.span.range())
    }

    /// Returns the raw [userinfo] subcomponent.
    ///
    /// [userinfo]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.1
    #[must_use]
    pub fn userinfo(&self) -> Option<&'a EStr> {
        self.meta.userinfo.map(|s| self.text.slice(s.range()))
    }

    /// Returns the decoded credential pair split from the userinfo subcomponent.
    #[must_use]
    pub fn credential(&self) -> Option<&'a Credential> {
        self.meta.credential.as_ref()
    }

    /// Returns the [host] subcomponent.
    ///
    /// [host]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.2
    #[must_use]
    pub fn host(&self) -> Host<'a> {
        Host {
            raw: self.text.slice(self.meta.host.range()),
            dns_safe: &self.meta.dns_safe_host,
            idn: &self.meta.idn_host,
        }
    }

    /// Returns the raw [port] subcomponent.
    ///
    /// The port may be empty, as in `http://example.com:/`.
    ///
    /// [port]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.3
    #[must_use]
    pub fn port_raw(&self) -> Option<&'a EStr> {
        self.meta.port.map(|s| self.text.slice(s.range()))
    }

    /// Returns the port as a number.
    ///
    /// Returns `None` if the port is absent, empty, or does not fit in `u16`.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.meta.port_num
    }
}

impl PartialEq for Authority<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_estr() == other.as_estr()
            && self.userinfo() == other.userinfo()
            && self.credential() == other.credential()
            && self.host() == other.host()
            && self.port_raw() == other.port_raw()
            && self.port() == other.port()
    }
}

impl Eq for Authority<'_> {}

impl fmt::Debug for Authority<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authority")
            .field("userinfo", &self.userinfo())
            .field("credential", &self.credential())
            .field("host", &self.host())
            .field("port", &self.port_raw())
            .finish()
    }
}

/// The [host] subcomponent in its three forms.
///
/// [host]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.2
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Host<'a> {
    raw: &'a EStr,
    dns_safe: &'a str,
    idn: &'a str,
}

impl<'a> Host<'a> {
    /// Returns the host as written, still encoded.
    #[must_use]
    pub fn as_estr(&self) -> &'a EStr {
        self.raw
    }

    /// Checks whether the host is an IP literal, i.e., enclosed in square brackets.
    #[must_use]
    pub fn is_ip_literal(&self) -> bool {
        is_ip_literal(self.raw.as_str())
    }

    /// Returns the decoded host with IP literal brackets stripped,
    /// suitable for name-resolution APIs.
    #[must_use]
    pub fn dns_safe(&self) -> &'a str {
        self.dns_safe
    }

    /// Returns the ASCII-compatible form of the host after IDN mapping.
    ///
    /// IP literals and empty hosts are left as they are.
    #[must_use]
    pub fn idn(&self) -> &'a str {
        self.idn
    }

    /// Maps the host to its Unicode form, decoding any punycode labels.
    ///
    /// Labels that fail to decode are left as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::Uri;
    ///
    /// let uri = Uri::parse_str("foo://xn--bpo-bma/")?;
    /// let components = uri.components();
    /// let host = components.authority().unwrap().host();
    /// assert_eq!(host.to_unicode(), "bépo");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn to_unicode(&self) -> String {
        if self.is_ip_literal() || self.idn.is_empty() {
            return self.dns_safe.into();
        }
        let (unicode, _) = idna::domain_to_unicode(self.idn);
        unicode
    }
}

pub(crate) fn is_ip_literal(host: &str) -> bool {
    host.len() >= 2 && host.starts_with('[') && host.ends_with(']')
}

impl fmt::Debug for Host<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("raw", &self.raw)
            .field("dns_safe", &self.dns_safe)
            .field("idn", &self.idn)
            .finish()
    }
}

/// The components of a parsed URI literal.
///
/// Created by a [`UriParser`](crate::parse::UriParser) or borrowed from a
/// [`Uri`](crate::Uri). Components borrow the canonical text they were
/// parsed from.
///
/// # Comparison
///
/// Two `Components` are equal when every component and derived value
/// (decoded host forms, port, credential, path segments) is equal.
#[derive(Clone)]
pub struct Components<'a> {
    text: &'a EStr,
    meta: Cow<'a, Meta>,
}

impl<'a> Components<'a> {
    pub(crate) fn new(text: &'a EStr, meta: Cow<'a, Meta>) -> Self {
        Self { text, meta }
    }

    pub(crate) fn into_meta(self) -> Meta {
        self.meta.into_owned()
    }

    /// Returns the text the components were parsed from.
    #[must_use]
    pub fn as_estr(&self) -> &'a EStr {
        self.text
    }

    fn slice(&self, span: Span) -> &'a EStr {
        self.text.slice(span.range())
    }

    /// Returns the [scheme] component.
    ///
    /// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
    #[must_use]
    pub fn scheme(&self) -> Option<&'a Scheme> {
        self.meta
            .scheme
            .map(|s| Scheme::new_validated(self.slice(s).as_str()))
    }

    /// Returns the hier-part: everything between the scheme and the query or fragment.
    #[must_use]
    pub fn hier_part(&self) -> &'a EStr {
        self.slice(self.meta.hier_part)
    }

    /// Returns the [authority] component.
    ///
    /// [authority]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2
    #[must_use]
    pub fn authority(&self) -> Option<Authority<'_>> {
        self.meta.auth.as_ref().map(|meta| Authority {
            text: self.text,
            meta,
        })
    }

    /// Returns the [path] component, which is always present but may be empty.
    ///
    /// [path]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.3
    #[must_use]
    pub fn path(&self) -> &'a EStr {
        self.slice(self.meta.path)
    }

    /// Returns the decoded path segments, separated by `'/'`.
    ///
    /// There is always at least one segment; `/a/b` yields `["", "a", "b"]`.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.meta.segments
    }

    /// Returns the [query] component.
    ///
    /// [query]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.4
    #[must_use]
    pub fn query(&self) -> Option<&'a EStr> {
        self.meta.query.map(|s| self.slice(s))
    }

    /// Returns the [fragment] component.
    ///
    /// [fragment]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.5
    #[must_use]
    pub fn fragment(&self) -> Option<&'a EStr> {
        self.meta.fragment.map(|s| self.slice(s))
    }

    /// Serializes the components back into a literal.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::{parse::{Generic, UriParser}, pct_enc::EString};
    ///
    /// let text = EString::new("foo://Ex%61mple.com:8042/over/there?name=ferret#nose")?;
    /// let components = Generic.parse(&text)?;
    /// assert_eq!(
    ///     components.to_estring(),
    ///     "foo://Example.com:8042/over/there?name=ferret#nose"
    /// );
    /// # Ok::<_, uri_parts::ParseError>(())
    /// ```
    #[must_use]
    pub fn to_estring(&self) -> EString {
        let mut buf = EString::with_capacity(self.text.len());
        if let Some(scheme) = self.scheme() {
            buf += EStr::new_validated(scheme.as_str());
            buf.push(':');
        }
        if let Some(auth) = self.authority() {
            buf.push('/');
            buf.push('/');
            buf += auth.as_estr();
        }
        buf += self.path();
        if let Some(query) = self.query() {
            buf.push('?');
            buf += query;
        }
        if let Some(fragment) = self.fragment() {
            buf.push('#');
            buf += fragment;
        }
        buf
    }
}

impl PartialEq for Components<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.scheme() == other.scheme()
            && self.hier_part() == other.hier_part()
            && self.authority() == other.authority()
            && self.path() == other.path()
            && self.segments() == other.segments()
            && self.query() == other.query()
            && self.fragment() == other.fragment()
    }
}

impl Eq for Components<'_> {}

impl fmt::Debug for Components<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Components")
            .field("scheme", &self.scheme())
            .field("authority", &self.authority())
            .field("path", &self.path())
            .field("segments", &self.segments())
            .field("query", &self.query())
            .field("fragment", &self.fragment())
            .finish()
    }
}

impl fmt::Display for Components<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_estring(), f)
    }
}
