use std::collections::HashSet;

use uri_parts::{
    parse::{Generic, Strict},
    pct_enc::{EStr, EString},
    ParseErrorKind, Uri,
};

#[test]
fn parse_borrowed_and_owned() {
    let text = EString::new("http://example.com/a%20b").unwrap();
    let uri: Uri<&str> = Uri::parse(&text).unwrap();
    assert_eq!(uri.as_str(), "http://example.com/a%20b");

    let owned: Uri<String> = uri.to_owned();
    assert_eq!(owned, uri);
    let borrowed: Uri<&str> = owned.borrow();
    assert_eq!(borrowed.components(), uri.components());

    let parsed = Uri::parse_str("http://example.com/a b").unwrap();
    assert_eq!(parsed, owned);
    assert_eq!(parsed.into_string(), "http://example.com/a%20b");
}

#[test]
fn borrowed_text_outlives_uri() {
    let text = EString::new("foo:bar").unwrap();
    let s = Uri::parse(&text).unwrap().as_str();
    assert_eq!(s, "foo:bar");
}

#[test]
fn try_parse() {
    assert!(Uri::try_parse("foo://example.com:8042/over/there?name=ferret#nose").is_some());
    assert!(Uri::try_parse("").is_some());
    assert!(Uri::try_parse("foo://example.com/100%").is_none());
    assert!(Uri::try_parse("foo://%FF/").is_none());
}

#[test]
fn errors_carry_input() {
    let e = Uri::parse_str("a%zb").unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::InvalidOctet);
    assert_eq!(e.index(), 1);
    assert_eq!(e.input(), "a%zb");
    assert_eq!(
        e.to_string(),
        "invalid URI format \"a%zb\": invalid percent-encoded octet at index 1"
    );

    // Parser errors point into the canonical text.
    let e = Uri::parse_str("f o://%FF/").unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::InvalidUtf8);
    assert_eq!(e.input(), "f%20o://%FF/");
    assert_eq!(e.index(), 8);
    assert_eq!(e.plain().to_string(), "invalid UTF-8 in component at index 8");

    let text = EString::new("//host").unwrap();
    let e = Uri::parse_with(&Strict, &text).unwrap_err();
    assert_eq!(*e.input(), &*text);
    assert!(Uri::parse_with(&Generic, &text).is_ok());
}

#[test]
fn idempotent() {
    let cases = [
        "foo://example.com:8042/over/there?name=ferret#nose",
        "urn:example:animal:ferret:nose",
        "foo://[2a00::5678]:1234",
        "HTTP://us%65r:p%40ss@B%C3%A9po:80/%7e/a%2fb?q=%41#%23",
        "mailto:?to=a@b&cc=c@d",
        "a b c",
    ];
    for input in cases {
        let once = Uri::parse_str(input).unwrap();
        let twice = Uri::parse_str(once.as_str()).unwrap();
        assert_eq!(once, twice, "{input:?}");
        assert_eq!(once.components(), twice.components(), "{input:?}");
        assert_eq!(once.components().to_estring(), once.as_str());
    }
}

#[test]
fn compare_and_hash() {
    let a = Uri::parse_str("foo://%41/%7e").unwrap();
    let b = Uri::parse_str("foo://A/~").unwrap();
    let c = Uri::parse_str("foo://A/%2F").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, "foo://A/%7E");
    assert_ne!(c, "foo://A//");

    let set: HashSet<_> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn credential() {
    let uri = Uri::parse_str("ftp://user:pass:word@host/").unwrap();
    let cred = uri.credential().unwrap();
    assert_eq!(cred.username(), "user");
    assert_eq!(cred.password(), Some("pass:word"));

    assert!(Uri::parse_str("ftp://host/").unwrap().credential().is_none());
    assert!(Uri::parse_str("urn:a@b").unwrap().credential().is_none());
}

#[test]
fn query_pairs() {
    let uri = Uri::parse_str("foo:?a=1&b=&c&&=d&a=%3D2").unwrap();
    let pairs: Vec<_> = uri
        .query_pairs()
        .map(|(k, v)| (k.as_str(), v.map(EStr::as_str)))
        .collect();
    assert_eq!(
        pairs,
        [
            ("a", Some("1")),
            ("b", Some("")),
            ("c", None),
            ("", Some("d")),
            ("a", Some("%3D2")),
        ]
    );

    assert_eq!(Uri::parse_str("foo:bar").unwrap().query_pairs().count(), 0);
    assert_eq!(Uri::parse_str("foo:bar?").unwrap().query_pairs().count(), 0);
    assert_eq!(Uri::parse_str("foo:bar?#a=1").unwrap().query_pairs().count(), 0);
}

#[test]
fn query_map_last_write_wins() {
    let uri = Uri::parse_str("foo:?a=1&b&a=2&c=caf%C3%A9&b=x+y&a=%3D3").unwrap();
    let map = uri.query_map().unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map["a"].as_deref(), Some("=3"));
    assert_eq!(map["b"].as_deref(), Some("x+y"));
    assert_eq!(map["c"].as_deref(), Some("café"));

    let uri = Uri::parse_str("foo:?a=1&b").unwrap();
    let map = uri.query_map().unwrap();
    assert_eq!(map["b"], None);

    assert!(Uri::parse_str("foo:bar").unwrap().query_map().unwrap().is_empty());
}

#[test]
fn query_map_rejects_invalid_utf8() {
    let uri = Uri::parse_str("foo:?ok=1&k=%FF").unwrap();
    let e = uri.query_map().unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::InvalidUtf8);
    assert_eq!(e.index(), 12);

    let uri = Uri::parse_str("foo:?%FF=1").unwrap();
    assert_eq!(uri.query_map().unwrap_err().index(), 5);
}

#[test]
fn conversions() {
    let uri: Uri<String> = "foo:b%61r".parse().unwrap();
    assert_eq!(uri.to_string(), "foo:bar");
    assert!(format!("{uri:?}").starts_with("Uri {"));

    let s: String = uri.clone().into();
    assert_eq!(s, "foo:bar");

    let text = EString::new("foo:bar").unwrap();
    let borrowed = Uri::<&str>::try_from(&*text).unwrap();
    let owned: Uri<String> = borrowed.clone().into();
    assert_eq!(owned, uri);
    let s: &str = borrowed.into();
    assert_eq!(s, "foo:bar");
}

#[test]
fn lines() {
    let input = "foo://example.com\r\n  \n urn:a:b \nbad%\n//host\n";

    let uris: Vec<_> = uri_parts::lines(input.as_bytes())
        .map(|res| res.unwrap().map(|uri| uri.into_string()))
        .collect();
    assert_eq!(uris.len(), 4);
    assert_eq!(uris[0].as_deref(), Ok("foo://example.com"));
    assert_eq!(uris[1].as_deref(), Ok("urn:a:b"));
    assert_eq!(uris[2].as_ref().unwrap_err().index(), 3);
    assert_eq!(uris[3].as_deref(), Ok("//host"));

    let strict: Vec<_> = uri_parts::lines(input.as_bytes())
        .with_parser(Strict)
        .map(|res| res.unwrap().is_ok())
        .collect();
    assert_eq!(strict, [true, true, false, false]);
}

#[cfg(feature = "serde")]
#[test]
fn serde() {
    use serde::de::{value::StrDeserializer, Deserialize, IntoDeserializer};

    let de: StrDeserializer<'_, serde::de::value::Error> = "foo:%7ebar".into_deserializer();
    let uri = Uri::<String>::deserialize(de).unwrap();
    assert_eq!(uri.as_str(), "foo:~bar");

    let de: StrDeserializer<'_, serde::de::value::Error> = "foo:%".into_deserializer();
    assert!(Uri::<String>::deserialize(de).is_err());

    let de: StrDeserializer<'_, serde::de::value::Error> = "%41%2f".into_deserializer();
    assert_eq!(EString::deserialize(de).unwrap().as_str(), "A%2F");
}
