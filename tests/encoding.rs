use std::collections::HashSet;

use uri_parts::{
    pct_enc::{encode_byte, table, EStr, EString, Unit},
    ParseErrorKind,
};

#[test]
fn canonicalise() {
    let cases = [
        ("", ""),
        ("abc", "abc"),
        ("%41%62%63", "Abc"),
        ("%7euser", "~user"),
        ("%2f", "%2F"),
        ("%2F", "%2F"),
        ("/", "/"),
        ("a b", "a%20b"),
        ("%e9", "%E9"),
        ("é", "%C3%A9"),
        ("\"<>\\^`{|}", "%22%3C%3E%5C%5E%60%7B%7C%7D"),
        ("%25", "%25"),
    ];
    for (input, canonical) in cases {
        assert_eq!(EString::new(input).unwrap().as_str(), canonical, "{input:?}");
    }
}

#[test]
fn canonicalisation_is_idempotent() {
    for input in ["%41%2f/é?#", "foo://[::1]:80/a%20b", "%ff%FE"] {
        let once = EString::new(input).unwrap();
        let twice = EString::new(once.as_str()).unwrap();
        assert_eq!(once.as_str(), twice.as_str());
        assert!(EStr::new(once.as_str()).is_some());
    }
}

#[test]
fn invalid_octets() {
    let cases = [("%", 0), ("%4", 0), ("a%", 1), ("ab%4", 2), ("%4G", 0), ("%%41", 0), ("x%zz", 1)];
    for (input, index) in cases {
        let e = EString::new(input).unwrap_err();
        assert_eq!(e.kind(), ParseErrorKind::InvalidOctet, "{input:?}");
        assert_eq!(e.index(), index, "{input:?}");
    }

    let mut buf = EString::new("a").unwrap();
    assert!(buf.push_encoded("b%").is_err());
    assert_eq!(buf.as_str(), "a");
}

#[test]
fn borrowed_constructor_requires_canonical_form() {
    assert!(EStr::new("abc/%2F").is_some());
    assert!(EStr::new("%41").is_none());
    assert!(EStr::new("%2f").is_none());
    assert!(EStr::new("a b").is_none());
    assert!(EStr::new("%2").is_none());
    assert!(EStr::new("é").is_none());
}

#[test]
fn every_byte_round_trips() {
    for x in 0..=255u8 {
        let s = EString::new(encode_byte(x)).unwrap();
        assert_eq!(*s.decode().to_bytes(), [x]);

        let expected = if table::is_unreserved(x) {
            Unit::Raw(x)
        } else {
            Unit::Escaped(x)
        };
        assert!(s.units().eq([expected]), "{x:#04x}");
    }
}

#[test]
fn reserved_characters_keep_their_form() {
    let raw = EString::new("a/b").unwrap();
    let escaped = EString::new("a%2Fb").unwrap();
    assert_ne!(raw, escaped);
    assert_eq!(raw.decode().to_bytes(), escaped.decode().to_bytes());

    assert!(raw.units().eq([Unit::Raw(b'a'), Unit::Raw(b'/'), Unit::Raw(b'b')]));
    assert!(escaped
        .units()
        .eq([Unit::Raw(b'a'), Unit::Escaped(b'/'), Unit::Raw(b'b')]));
}

#[test]
fn compare_with_str() {
    let s = EStr::new_or_panic("A%2F");
    assert_eq!(s, "A%2F");
    assert_eq!(s, "%41%2f");
    assert_ne!(s, "A/");
    assert_ne!(s, "A%2");
    assert_ne!(s, "A%2FB");
    assert_ne!(s, "A");
}

#[test]
fn hash_follows_equality() {
    let mut set = HashSet::new();
    set.insert(EString::new("%41bc").unwrap());
    set.insert(EString::new("Abc").unwrap());
    set.insert(EString::new("A%62c").unwrap());
    assert_eq!(set.len(), 1);

    set.insert(EString::new("Abc%2F").unwrap());
    set.insert(EString::new("Abc/").unwrap());
    assert_eq!(set.len(), 3);
}

#[test]
fn decode() {
    let s = EStr::new_or_panic("caf%C3%A9%20au%20lait");
    assert_eq!(s.decode().to_string().unwrap(), "café au lait");

    let s = EStr::new_or_panic("%FFa");
    assert_eq!(s.decode().to_string().unwrap_err(), [0xff, b'a']);
    assert_eq!(s.decode().to_string_lossy(), "\u{FFFD}a");

    assert_eq!(EStr::EMPTY.decode().to_string().unwrap(), "");
}

#[test]
fn substring_and_split() {
    let s = EStr::new_or_panic("a%20b/c");
    assert_eq!(s.len(), 7);
    assert_eq!(s.substring(0, 4).unwrap(), "a%20");
    assert_eq!(s.substring(4, 3).unwrap(), "b/c");
    assert!(s.substring(0, 2).is_none());
    assert!(s.substring(3, 1).is_none());
    assert!(s.substring(5, 5).is_none());

    assert!(s.split('/').eq(["a%20b", "c"]));
    assert_eq!(s.split_once('/'), Some((EStr::new_or_panic("a%20b"), EStr::new_or_panic("c"))));
    assert_eq!(s.rsplit_once('?'), None);
}

#[test]
fn search_stops_at_invalid_byte() {
    let s = EStr::new_or_panic("ab1:c");
    assert_eq!(s.find_delim(':', 0..s.len(), Some(table::is_scheme_char)), Some(3));
    assert_eq!(s.find_delim(':', 4..s.len(), None), None);

    let s = EStr::new_or_panic("1b:c");
    assert_eq!(s.find_delim(':', 0..s.len(), Some(table::is_scheme_char)), None);

    let s = EStr::new_or_panic("h:1:2a");
    assert_eq!(s.rfind_delim(':', 0..s.len(), Some(table::is_digit)), None);
    assert_eq!(s.rfind_delim(':', 0..3, Some(table::is_digit)), Some(1));
    assert_eq!(s.rfind_delim(':', 0..s.len(), None), Some(3));
}

#[test]
fn build() {
    let mut buf = EString::with_capacity(16);
    buf.push_encoded("pa th").unwrap();
    buf.push('/');
    buf += EStr::new_or_panic("%2F");
    buf.push('?');
    buf.push_estr(EStr::new_or_panic("q"));
    assert_eq!(buf, "pa%20th/%2F?q");

    let joined = EStr::new_or_panic("a") + EStr::new_or_panic("b");
    assert_eq!(joined.as_str(), "ab");

    buf.clear();
    assert!(buf.is_empty());
}

#[test]
#[should_panic]
fn push_rejects_unencoded_character() {
    EString::new("").unwrap().push(' ');
}
