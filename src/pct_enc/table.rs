//! Character classes and byte pattern tables from RFC 3986.
//!
//! [`Class`] answers "which syntactic roles does this byte play", and is what
//! percent-encoding canonicalisation and the extraction predicates run on.
//! [`Table`] answers "may this byte appear in that component", and is what the
//! [`Strict`](crate::parse::Strict) dialect validates with.
//!
//! The predefined table constants in this module are documented with
//! the ABNF notation of [RFC 5234].
//!
//! [RFC 5234]: https://datatracker.ietf.org/doc/html/rfc5234

use core::fmt;

/// A set of syntactic roles a byte plays in a URI.
///
/// Non-ASCII bytes and ASCII bytes with no role in RFC 3986 (controls, space,
/// `"`, `<`, `%` and friends) map to [`Class::NONE`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Class(u8);

impl Class {
    /// No role at all.
    pub const NONE: Class = Class(0);
    /// `gen-delims = ":" / "/" / "?" / "#" / "[" / "]" / "@"`
    pub const GEN_DELIM: Class = Class(0x01);
    /// `sub-delims = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="`
    pub const SUB_DELIM: Class = Class(0x02);
    /// `reserved = gen-delims / sub-delims`
    pub const RESERVED: Class = Class(0x03);
    /// `ALPHA = %x41-5A / %x61-7A`
    pub const ALPHA: Class = Class(0x10);
    /// `DIGIT = %x30-39`
    pub const DIGIT: Class = Class(0x20);
    /// Uppercase letters, a subset of [`ALPHA`](Self::ALPHA).
    pub const UPPERCASE: Class = Class(0x40);
    /// `"-" / "." / "_" / "~"`
    pub const OTHER_UNRESERVED: Class = Class(0x80);
    /// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"`
    pub const UNRESERVED: Class = Class(0x10 | 0x20 | 0x80);

    /// Returns the class of the given byte.
    #[inline]
    #[must_use]
    pub const fn of(x: u8) -> Class {
        CLASSES[x as usize]
    }

    /// Checks whether `self` shares at least one role with `other`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Class) -> bool {
        self.0 & other.0 != 0
    }

    /// Combines two classes into one.
    #[must_use]
    pub const fn or(self, other: Class) -> Class {
        Class(self.0 | other.0)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Class, &str); 6] = [
            (Class::GEN_DELIM, "GEN_DELIM"),
            (Class::SUB_DELIM, "SUB_DELIM"),
            (Class::ALPHA, "ALPHA"),
            (Class::DIGIT, "DIGIT"),
            (Class::UPPERCASE, "UPPERCASE"),
            (Class::OTHER_UNRESERVED, "OTHER_UNRESERVED"),
        ];

        let mut set = f.debug_set();
        for (class, name) in NAMES {
            if self.intersects(class) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

const fn mark(mut table: [Class; 256], mut bytes: &[u8], class: Class) -> [Class; 256] {
    while let [cur, rem @ ..] = bytes {
        table[*cur as usize] = table[*cur as usize].or(class);
        bytes = rem;
    }
    table
}

const CLASSES: &[Class; 256] = &{
    let mut t = [Class::NONE; 256];
    t = mark(t, b":/?#[]@", Class::GEN_DELIM);
    t = mark(t, b"!$&'()*+,;=", Class::SUB_DELIM);
    t = mark(t, b"abcdefghijklmnopqrstuvwxyz", Class::ALPHA);
    t = mark(t, b"ABCDEFGHIJKLMNOPQRSTUVWXYZ", Class::ALPHA.or(Class::UPPERCASE));
    t = mark(t, b"0123456789", Class::DIGIT);
    t = mark(t, b"-._~", Class::OTHER_UNRESERVED);
    t
};

/// Checks whether the byte is an unreserved character.
#[inline]
#[must_use]
pub const fn is_unreserved(x: u8) -> bool {
    Class::of(x).intersects(Class::UNRESERVED)
}

/// Checks whether the byte is a reserved character.
#[inline]
#[must_use]
pub const fn is_reserved(x: u8) -> bool {
    Class::of(x).intersects(Class::RESERVED)
}

/// Checks whether the byte may appear unencoded in canonical text.
#[inline]
#[must_use]
pub const fn is_unencoded(x: u8) -> bool {
    Class::of(x).intersects(Class::RESERVED.or(Class::UNRESERVED))
}

/// Checks whether the byte is an ASCII decimal digit.
///
/// The index argument is ignored; the signature matches the extraction predicates.
#[inline]
#[must_use]
pub const fn is_digit(x: u8, _index: usize) -> bool {
    Class::of(x).intersects(Class::DIGIT)
}

/// Checks whether the byte may appear at `index` of a scheme.
///
/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
#[inline]
#[must_use]
pub const fn is_scheme_char(x: u8, index: usize) -> bool {
    let class = Class::of(x);
    if index == 0 {
        class.intersects(Class::ALPHA)
    } else {
        class.intersects(Class::ALPHA.or(Class::DIGIT)) || matches!(x, b'+' | b'-' | b'.')
    }
}

const MASK_PCT_ENCODED: u64 = 1 << b'%';

/// A table specifying the byte patterns allowed in a component.
#[derive(Clone, Copy, Debug)]
pub struct Table(u64, u64);

impl Table {
    /// Creates a table that only allows the given unencoded bytes.
    ///
    /// # Panics
    ///
    /// Panics if any of the bytes is not ASCII or equals `b'%'`.
    #[must_use]
    pub const fn new(mut bytes: &[u8]) -> Self {
        let mut table = 0;
        while let [cur, rem @ ..] = bytes {
            assert!(
                !matches!(cur, b'%' | 128..),
                "cannot allow non-ASCII byte or %"
            );
            table |= 1u128 << *cur as u32;
            bytes = rem;
        }
        Self(table as u64, (table >> 64) as u64)
    }

    /// Combines two tables into one.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0, self.1 | other.1)
    }

    /// Marks this table as allowing percent-encoded octets.
    #[must_use]
    pub const fn or_pct_encoded(self) -> Self {
        Self(self.0 | MASK_PCT_ENCODED, self.1)
    }

    /// Subtracts `other` from this table.
    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self(self.0 & !other.0, self.1 & !other.1)
    }

    /// Checks whether the given unencoded byte is allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows(self, x: u8) -> bool {
        let table = if x < 64 {
            self.0 & !MASK_PCT_ENCODED
        } else if x < 128 {
            self.1
        } else {
            0
        };
        table & 1u64.wrapping_shl(x as u32) != 0
    }

    /// Checks whether percent-encoded octets are allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows_pct_encoded(self) -> bool {
        self.0 & MASK_PCT_ENCODED != 0
    }

    /// Validates canonical text with the table.
    ///
    /// Returns the index of the first byte that is not allowed.
    #[must_use]
    pub const fn validate(self, s: &[u8]) -> Option<usize> {
        let mut i = 0;
        while i < s.len() {
            let x = s[i];
            if x == b'%' && self.allows_pct_encoded() {
                i += 3;
            } else if self.allows(x) {
                i += 1;
            } else {
                return Some(i);
            }
        }
        None
    }
}

const fn new(bytes: &[u8]) -> Table {
    Table::new(bytes)
}

/// `ALPHA = %x41-5A / %x61-7A`
pub const ALPHA: Table = new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");

/// `DIGIT = %x30-39`
pub const DIGIT: Table = new(b"0123456789");

/// `HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"`
pub const HEXDIG: Table = DIGIT.or(new(b"ABCDEFabcdef"));

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub const UNRESERVED: Table = ALPHA.or(DIGIT).or(new(b"-._~"));

/// `gen-delims = ":" / "/" / "?" / "#" / "[" / "]" / "@"`
pub const GEN_DELIMS: Table = new(b":/?#[]@");

/// `sub-delims = "!" / "$" / "&" / "'" / "(" / ")"
///             / "*" / "+" / "," / ";" / "="`
pub const SUB_DELIMS: Table = new(b"!$&'()*+,;=");

/// `reserved = gen-delims / sub-delims`
pub const RESERVED: Table = GEN_DELIMS.or(SUB_DELIMS);

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub const SCHEME: Table = ALPHA.or(DIGIT).or(new(b"+-."));

/// `userinfo = *( unreserved / pct-encoded / sub-delims / ":" )`
pub const USERINFO: Table = UNRESERVED.or(SUB_DELIMS).or(new(b":")).or_pct_encoded();

/// `reg-name = *( unreserved / pct-encoded / sub-delims )`
pub const REG_NAME: Table = UNRESERVED.or(SUB_DELIMS).or_pct_encoded();

/// `IPv6address` characters: `HEXDIG / ":" / "."`
pub const IPV6: Table = HEXDIG.or(new(b":."));

/// `pchar = unreserved / pct-encoded / sub-delims / ":" / "@"`
pub const PCHAR: Table = UNRESERVED.or(SUB_DELIMS).or(new(b":@")).or_pct_encoded();

/// `path = *( pchar / "/" )`
pub const PATH: Table = PCHAR.or(new(b"/"));

/// `query = *( pchar / "/" / "?" )`
pub const QUERY: Table = PCHAR.or(new(b"/?"));

/// `fragment = *( pchar / "/" / "?" )`
pub const FRAGMENT: Table = QUERY;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(Class::of(b'a'), Class::ALPHA);
        assert_eq!(Class::of(b'Q'), Class::ALPHA.or(Class::UPPERCASE));
        assert_eq!(Class::of(b'7'), Class::DIGIT);
        assert_eq!(Class::of(b'~'), Class::OTHER_UNRESERVED);
        assert_eq!(Class::of(b'/'), Class::GEN_DELIM);
        assert_eq!(Class::of(b'='), Class::SUB_DELIM);
        assert_eq!(Class::of(b'%'), Class::NONE);
        assert_eq!(Class::of(b' '), Class::NONE);
        assert_eq!(Class::of(0xe4), Class::NONE);

        assert!(is_reserved(b'#') && !is_unreserved(b'#'));
        assert!(is_unreserved(b'_') && !is_reserved(b'_'));
        assert!(!is_unencoded(b'"'));
    }

    #[test]
    fn scheme_chars() {
        assert!(is_scheme_char(b'h', 0));
        assert!(!is_scheme_char(b'1', 0));
        assert!(!is_scheme_char(b'+', 0));
        assert!(is_scheme_char(b'1', 1));
        assert!(is_scheme_char(b'+', 3));
        assert!(!is_scheme_char(b'/', 3));
    }

    #[test]
    fn tables_agree_with_classes() {
        for x in 0..=255u8 {
            assert_eq!(UNRESERVED.allows(x), is_unreserved(x), "{x:#04x}");
            assert_eq!(RESERVED.allows(x), is_reserved(x), "{x:#04x}");
        }
    }

    #[test]
    fn validate() {
        assert_eq!(REG_NAME.validate(b"example.com"), None);
        assert_eq!(REG_NAME.validate(b"ex%20ample"), None);
        assert_eq!(REG_NAME.validate(b"exa:mple"), Some(3));
        assert_eq!(IPV6.validate(b"2001:db8::7"), None);
        assert_eq!(DIGIT.validate(b"80a"), Some(2));
    }
}
