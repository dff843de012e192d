//! URI parsers.
//!
//! A parser is a [`UriParser`]: every extraction step is a trait method with a
//! default implementation, so a dialect overrides only the steps it changes.
//! Two dialects are provided. [`Generic`] accepts anything that can be matched
//! structurally, while [`Strict`] additionally validates every component
//! against the grammar of RFC 3986 and requires a scheme.

use crate::{
    component::{self, AuthMeta, Components, Credential, Meta},
    error::{ParseError, ParseErrorKind},
    extract::{begin_part, end_part, middle_part, Cursor, EndPart, Span},
    log::{debug, trace},
    pct_enc::{table, EStr, Table},
};
use alloc::{borrow::Cow, string::String, vec::Vec};
use core::net::Ipv6Addr;

type Result<T> = core::result::Result<T, ParseError>;

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError::new($index, ParseErrorKind::$kind))
    };
}

/// A component located by a parser, passed to [`UriParser::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Part {
    /// The scheme, without the trailing `':'`.
    Scheme,
    /// The user information, without the trailing `'@'`.
    Userinfo,
    /// The host, brackets included for an IP literal.
    Host,
    /// The port, without the leading `':'`.
    Port,
    /// The path.
    Path,
    /// The query, without the leading `'?'`.
    Query,
    /// The fragment, without the leading `'#'`.
    Fragment,
}

/// The subcomponents of an authority located by [`UriParser::split_authority`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorityParts {
    /// The user information, if an `'@'` is present.
    pub userinfo: Option<Span>,
    /// The host, which is always present but may be empty.
    pub host: Span,
    /// The port, if a trailing `':'` followed by digits only is present.
    pub port: Option<Span>,
}

/// A URI parser.
///
/// Each step receives the canonical text and the [`Cursor`] left by the
/// previous step. See [`parse`](Self::parse) for the order of the steps.
///
/// # Examples
///
/// A dialect that refuses user information:
///
/// ```
/// use uri_parts::{
///     extract::Span,
///     parse::{Generic, Part, UriParser},
///     pct_enc::{EStr, EString},
///     ParseError, ParseErrorKind,
/// };
///
/// struct NoUserinfo;
///
/// impl UriParser for NoUserinfo {
///     fn check(&self, _text: &EStr, part: Part, span: Option<Span>) -> Result<(), ParseError> {
///         match (part, span) {
///             (Part::Userinfo, Some(span)) => {
///                 Err(ParseError::new(span.start, ParseErrorKind::UnexpectedChar))
///             }
///             _ => Ok(()),
///         }
///     }
/// }
///
/// let text = EString::new("http://user@example.com/")?;
/// let e = NoUserinfo.parse(&text).unwrap_err();
/// assert_eq!(e.index(), 7);
/// assert!(Generic.parse(&text).is_ok());
/// # Ok::<_, ParseError>(())
/// ```
pub trait UriParser {
    /// Extracts the scheme: the text before the first `':'`, if it is made of
    /// scheme characters only and is not empty.
    fn extract_scheme(&self, text: &EStr, cur: Cursor) -> (Option<Span>, Cursor) {
        match begin_part(text, ':', cur, Some(table::is_scheme_char)) {
            (Some(span), _) if span.is_empty() => (None, cur),
            res => res,
        }
    }

    /// Extracts the fragment: the text after the first `'#'`.
    fn extract_fragment(&self, text: &EStr, cur: Cursor) -> (Option<Span>, Cursor) {
        end_part(text, '#', cur, EndPart::FIRST)
    }

    /// Extracts the query: the text after the first `'?'`.
    fn extract_query(&self, text: &EStr, cur: Cursor) -> (Option<Span>, Cursor) {
        end_part(text, '?', cur, EndPart::FIRST)
    }

    /// Splits the hier-part into an optional authority and a path.
    ///
    /// An authority is present when the hier-part starts with `"//"`. It runs
    /// up to the next `'/'`, which starts the path; without one the path is
    /// empty.
    fn split_hier_part(&self, text: &EStr, hier_part: Span) -> (Option<Span>, Span) {
        if !text.slice(hier_part.range()).starts_with("//") {
            return (None, hier_part);
        }
        let cur = Cursor {
            start: hier_part.start + 2,
            end: hier_part.end,
        };
        match end_part(text, '/', cur, EndPart::FIRST.keep_delim()) {
            (Some(path), cur) => (Some(middle_part(cur)), path),
            (None, cur) => (Some(middle_part(cur)), Span::empty(hier_part.end)),
        }
    }

    /// Splits an authority into user information, host and port.
    fn split_authority(&self, text: &EStr, authority: Span) -> AuthorityParts {
        let (userinfo, cur) = begin_part(text, '@', Cursor::over(authority), None);
        let (port, cur) = end_part(text, ':', cur, EndPart::LAST.valid(table::is_digit));
        AuthorityParts {
            userinfo,
            host: middle_part(cur),
            port,
        }
    }

    /// Splits user information into a username and an optional password
    /// at the first `':'`.
    fn split_userinfo(&self, text: &EStr, userinfo: Span) -> (Span, Option<Span>) {
        let (password, cur) = end_part(text, ':', Cursor::over(userinfo), EndPart::FIRST);
        (middle_part(cur), password)
    }

    /// Maps a decoded registered name to its ASCII-compatible form.
    ///
    /// Returns `None` if the name is rejected.
    fn map_host(&self, host: &str) -> Option<String> {
        idna::domain_to_ascii(host).ok()
    }

    /// Validates a located component.
    ///
    /// Called once for every [`Part`], with `None` when the part is absent.
    /// The default accepts anything.
    ///
    /// # Errors
    ///
    /// Returns `Err` to reject the literal.
    fn check(&self, _text: &EStr, _part: Part, _span: Option<Span>) -> Result<()> {
        Ok(())
    }

    /// Parses canonical text into its components.
    ///
    /// The steps run in this order: scheme, fragment, query, hier-part,
    /// authority (user information, host, port), path segments.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a decoded component is not valid UTF-8, if the host
    /// is rejected by [`map_host`](Self::map_host), or if [`check`](Self::check)
    /// rejects a component.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_parts::{parse::{Generic, UriParser}, pct_enc::EString};
    ///
    /// let text = EString::new("foo://example.com:8042/over/there?name=ferret#nose")?;
    /// let c = Generic.parse(&text)?;
    /// assert_eq!(c.scheme().unwrap().as_str(), "foo");
    /// let auth = c.authority().unwrap();
    /// assert_eq!(auth.host().dns_safe(), "example.com");
    /// assert_eq!(auth.port(), Some(8042));
    /// assert_eq!(c.path(), "/over/there");
    /// assert_eq!(c.query().unwrap(), "name=ferret");
    /// assert_eq!(c.fragment().unwrap(), "nose");
    /// # Ok::<_, uri_parts::ParseError>(())
    /// ```
    fn parse<'a>(&self, text: &'a EStr) -> Result<Components<'a>> {
        parse_meta(self, text).map(|meta| Components::new(text, Cow::Owned(meta)))
    }
}

fn parse_meta<P: UriParser + ?Sized>(parser: &P, text: &EStr) -> Result<Meta> {
    let cur = Cursor::new(text);

    let (scheme, cur) = parser.extract_scheme(text, cur);
    parser.check(text, Part::Scheme, scheme)?;

    let (fragment, cur) = parser.extract_fragment(text, cur);
    let (query, cur) = parser.extract_query(text, cur);
    let hier_part = middle_part(cur);
    trace!(
        "scheme {:?}, hier-part {:?}, query {:?}, fragment {:?}",
        scheme,
        hier_part,
        query,
        fragment
    );

    let (authority, path) = parser.split_hier_part(text, hier_part);
    let auth = match authority {
        Some(span) => Some(parse_authority(parser, text, span)?),
        None => {
            for part in [Part::Userinfo, Part::Host, Part::Port] {
                parser.check(text, part, None)?;
            }
            None
        }
    };

    parser.check(text, Part::Path, Some(path))?;
    parser.check(text, Part::Query, query)?;
    parser.check(text, Part::Fragment, fragment)?;

    let mut segments = Vec::new();
    let mut start = path.start;
    for seg in text.slice(path.range()).split('/') {
        segments.push(decode(text, Span::new(start, start + seg.len()))?);
        start += seg.len() + 1;
    }

    Ok(Meta {
        scheme,
        hier_part,
        auth,
        path,
        segments,
        query,
        fragment,
    })
}

fn parse_authority<P: UriParser + ?Sized>(
    parser: &P,
    text: &EStr,
    span: Span,
) -> Result<AuthMeta> {
    let parts = parser.split_authority(text, span);
    parser.check(text, Part::Userinfo, parts.userinfo)?;
    parser.check(text, Part::Host, Some(parts.host))?;
    parser.check(text, Part::Port, parts.port)?;

    let credential = match parts.userinfo {
        Some(userinfo) => {
            let (username, password) = parser.split_userinfo(text, userinfo);
            Some(Credential {
                username: decode(text, username)?,
                password: password.map(|span| decode(text, span)).transpose()?,
            })
        }
        None => None,
    };

    let host = parts.host;
    let is_ip_literal = component::is_ip_literal(text.slice(host.range()).as_str());
    let dns_safe_host = if is_ip_literal {
        decode(text, Span::new(host.start + 1, host.end - 1))?
    } else {
        decode(text, host)?
    };

    let idn_host = if is_ip_literal || dns_safe_host.is_empty() {
        dns_safe_host.clone()
    } else {
        match parser.map_host(&dns_safe_host) {
            Some(mapped) => mapped,
            None => {
                debug!("IDN mapping rejected host {:?}", dns_safe_host);
                err!(host.start, InvalidHost)
            }
        }
    };

    let port_num = parts.port.and_then(|port| {
        let raw = text.slice(port.range()).as_str();
        let num = raw.parse().ok();
        if num.is_none() && !raw.is_empty() {
            debug!("port {:?} does not fit in u16, discarding", raw);
        }
        num
    });

    Ok(AuthMeta {
        span,
        userinfo: parts.userinfo,
        credential,
        host,
        dns_safe_host,
        idn_host,
        port: parts.port,
        port_num,
    })
}

/// Decodes a span to a string, failing on invalid UTF-8.
fn decode(text: &EStr, span: Span) -> Result<String> {
    match text.slice(span.range()).decode().to_string() {
        Ok(s) => Ok(s.into_owned()),
        Err(_) => err!(span.start, InvalidUtf8),
    }
}

/// The generic dialect.
///
/// Accepts any text that can be split structurally. A port that does not
/// fit in `u16` is kept in its raw form and reported as absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct Generic;

impl UriParser for Generic {}

/// The strict dialect.
///
/// On top of the [`Generic`] behavior, requires a scheme and validates every
/// component against the grammar of [RFC 3986]. Errors are reported as
/// [`UnexpectedChar`] at the offending character.
///
/// [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986
/// [`UnexpectedChar`]: ParseErrorKind::UnexpectedChar
///
/// # Examples
///
/// ```
/// use uri_parts::{parse::{Generic, Strict, UriParser}, pct_enc::EString, ParseErrorKind};
///
/// let text = EString::new("http://[::1]:65536/")?;
/// assert_eq!(Generic.parse(&text)?.authority().unwrap().port(), None);
///
/// let e = Strict.parse(&text).unwrap_err();
/// assert_eq!((e.index(), e.kind()), (13, ParseErrorKind::UnexpectedChar));
/// # Ok::<_, uri_parts::ParseError>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Strict;

impl UriParser for Strict {
    fn check(&self, text: &EStr, part: Part, span: Option<Span>) -> Result<()> {
        let Some(span) = span else {
            if part == Part::Scheme {
                err!(0, UnexpectedChar);
            }
            return Ok(());
        };

        let table = match part {
            Part::Scheme => table::SCHEME,
            Part::Userinfo => table::USERINFO,
            Part::Host => return check_host(text, span),
            Part::Port => {
                if !span.is_empty() && text.slice(span.range()).as_str().parse::<u16>().is_err() {
                    err!(span.start, UnexpectedChar);
                }
                return Ok(());
            }
            Part::Path => table::PATH,
            Part::Query => table::QUERY,
            Part::Fragment => table::FRAGMENT,
        };
        validate(text, span, table)
    }
}

fn validate(text: &EStr, span: Span, table: Table) -> Result<()> {
    match table.validate(text.slice(span.range()).as_str().as_bytes()) {
        Some(i) => err!(span.start + i, UnexpectedChar),
        None => Ok(()),
    }
}

fn check_host(text: &EStr, span: Span) -> Result<()> {
    let host = text.slice(span.range()).as_str();
    if !host.starts_with('[') {
        return validate(text, span, table::REG_NAME);
    }
    if !component::is_ip_literal(host) {
        err!(span.start, UnexpectedChar);
    }

    let inner = Span::new(span.start + 1, span.end - 1);
    let addr = &host[1..host.len() - 1];
    if let Some(rest) = addr.strip_prefix(['v', 'V']) {
        // IPvFuture = "v" 1*HEXDIG "." 1*( unreserved / sub-delims / ":" )
        let ver_len = rest.bytes().take_while(u8::is_ascii_hexdigit).count();
        let Some(tail) = rest[ver_len..].strip_prefix('.').filter(|_| ver_len != 0) else {
            err!(inner.start + 1 + ver_len, UnexpectedChar);
        };
        if tail.is_empty() {
            err!(inner.end, UnexpectedChar);
        }
        let tail_start = inner.start + 2 + ver_len;
        return validate(
            text,
            Span::new(tail_start, inner.end),
            table::UNRESERVED.or(table::SUB_DELIMS).or(Table::new(b":")),
        );
    }

    validate(text, inner, table::IPV6)?;
    if addr.parse::<Ipv6Addr>().is_err() {
        err!(inner.start, UnexpectedChar);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pct_enc::EString;

    fn parts(s: &str) -> (Option<Span>, Span) {
        let text = EString::new(s).unwrap();
        Generic.split_hier_part(&text, Span::new(0, text.len()))
    }

    #[test]
    fn hier_part_split() {
        assert_eq!(parts("//host/a/b"), (Some(Span::new(2, 6)), Span::new(6, 10)));
        assert_eq!(parts("//host"), (Some(Span::new(2, 6)), Span::empty(6)));
        assert_eq!(parts("//"), (Some(Span::empty(2)), Span::empty(2)));
        assert_eq!(parts("/a/b"), (None, Span::new(0, 4)));
        assert_eq!(parts("example:animal"), (None, Span::new(0, 14)));
    }

    #[test]
    fn authority_split() {
        let text = EStr::new_or_panic("user:pw@host:80");
        let parts = Generic.split_authority(text, Span::new(0, text.len()));
        assert_eq!(
            parts,
            AuthorityParts {
                userinfo: Some(Span::new(0, 7)),
                host: Span::new(8, 12),
                port: Some(Span::new(13, 15)),
            }
        );
        assert_eq!(
            Generic.split_userinfo(text, Span::new(0, 7)),
            (Span::new(0, 4), Some(Span::new(5, 7)))
        );

        let text = EStr::new_or_panic("[::1]");
        let parts = Generic.split_authority(text, Span::new(0, text.len()));
        assert_eq!(parts.host, Span::new(0, 5));
        assert_eq!(parts.port, None);
    }

    #[test]
    fn empty_scheme_is_absent() {
        let text = EStr::new_or_panic(":foo");
        let cur = Cursor::new(text);
        assert_eq!(Generic.extract_scheme(text, cur), (None, cur));
    }

    #[test]
    fn strict_hosts() {
        let check = |s: &str| {
            let text = EString::new(s).unwrap();
            check_host(&text, Span::new(0, text.len())).map_err(|e| e.index())
        };
        assert_eq!(check("example.com"), Ok(()));
        assert_eq!(check("[2a00::5678]"), Ok(()));
        assert_eq!(check("[v7.fe80::a+en1]"), Ok(()));
        assert_eq!(check("[::1"), Err(0));
        assert_eq!(check("[1::2::3]"), Err(1));
        assert_eq!(check("[v.x]"), Err(2));
        assert_eq!(check("exa[mple"), Err(3));
    }
}
