use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use rstest::rstest;

use super::fixtures::Person;
use crate::{BString, Codec, Decoder, DecoderOptions, Value, json::JsonDecoder, json::from_str};

fn decode<T: Codec + Default>(input: &str) -> T {
    let mut v = T::default();
    from_str(input, &mut v).unwrap();
    v
}

#[rstest]
#[case("0", 0)]
#[case("-128", -128)]
#[case("\"42\"", 42)]
#[case(" 7 ", 7)]
fn integers(#[case] input: &str, #[case] expected: i32) {
    assert_eq!(decode::<i32>(input), expected);
}

#[rstest]
#[case("true", true)]
#[case("false", false)]
#[case("\"1\"", true)]
#[case("\"FALSE\"", false)]
#[case("\"\"", false)]
fn booleans(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(decode::<bool>(input), expected);
}

#[test]
fn widths_follow_the_destination() {
    assert_eq!(decode::<u64>("18446744073709551615"), u64::MAX);
    assert_eq!(decode::<i64>("-9223372036854775808"), i64::MIN);
    assert_eq!(decode::<f32>("1.5e2"), 150.0);
    assert_eq!(decode::<usize>("3"), 3);
}

#[test]
fn strings_and_escapes() {
    assert_eq!(decode::<String>(r#""a\nbé😀""#), "a\nbé😀");
    assert_eq!(decode::<BString>(r#""raw""#), BString::from("raw"));
    // A number falls back to the string capability.
    assert_eq!(decode::<String>("12.50"), "12.50");
}

#[test]
fn null_leaves_plain_values_and_clears_options() {
    assert_eq!(decode::<i32>("null"), 0);
    assert_eq!(decode::<Option<i32>>("null"), None);
    assert_eq!(decode::<Option<i32>>("5"), Some(5));

    let mut opt = Some(String::from("old"));
    from_str("null", &mut opt).unwrap();
    assert_eq!(opt, None);
}

#[test]
fn record_with_nested_sequence() {
    let p: Person = decode(r#"{"name":"Ada","age":36,"tags":["math","engines"],"email":null}"#);
    assert_eq!(p.name, "Ada");
    assert_eq!(p.age, 36);
    assert_eq!(p.email, None);
    assert_eq!(p.tags, ["math", "engines"]);
    assert_eq!(
        p.seen,
        vec![
            (0, "name".to_string()),
            (1, "age".to_string()),
            (2, "tags".to_string()),
            (3, "email".to_string()),
        ]
    );
}

#[test]
fn unknown_members_are_skipped() {
    let p: Person = decode(r#"{"id":{"deep":[1,{"x":null}]},"name":"Bo","extra":[true]}"#);
    assert_eq!(p.name, "Bo");
    assert_eq!(p.seen_names(), ["id", "name", "extra"]);
}

#[test]
fn arrays_replace_sequence_contents() {
    let mut v = vec![9_u8, 9, 9];
    from_str("[1,2]", &mut v).unwrap();
    assert_eq!(v, [1, 2]);
    from_str("[]", &mut v).unwrap();
    assert!(v.is_empty());
}

#[test]
fn maps_merge_members() {
    let mut m: BTreeMap<String, u8> = BTreeMap::new();
    m.insert("keep".into(), 1);
    from_str(r#"{"add":2,"keep":3}"#, &mut m).unwrap();
    assert_eq!(
        m.into_iter().collect::<Vec<_>>(),
        [(String::from("add"), 2), (String::from("keep"), 3)]
    );
}

#[test]
fn aggregates_into_scalars_are_skipped() {
    // A destination without aggregate capabilities ignores the whole object.
    assert_eq!(decode::<i32>(r#"{"a":1}"#), 0);
    assert_eq!(decode::<String>("[1,2]"), "");
}

#[test]
fn empty_input_is_success() {
    let mut v = 3_i32;
    from_str("   ", &mut v).unwrap();
    assert_eq!(v, 3);
}

#[test]
fn dynamic_values() {
    let v: Value = decode(r#"{"a":[1,"x",null,{}],"b":{"c":false}}"#);
    assert_eq!(v.to_string(), r#"{"a":[1,"x",null,{}],"b":{"c":false}}"#);
    assert_eq!(decode::<Value>("[]"), Value::Array(vec![]));
}

#[test]
fn concatenated_values() {
    let mut dec = JsonDecoder::new("1 [2] {\"n\":3}\n\"four\"");
    let mut out = Vec::new();
    while !dec.at_end() {
        let mut v = Value::Null;
        dec.decode(&mut v).unwrap();
        out.push(v.to_string());
    }
    assert_eq!(out, ["1", "[2]", r#"{"n":3}"#, r#""four""#]);
    // Past the end, decode succeeds without touching the destination.
    let mut untouched = 5_u8;
    dec.decode(&mut untouched).unwrap();
    assert_eq!(untouched, 5);
}

#[test]
fn depth_within_limit() {
    let mut dec = JsonDecoder::with_options(
        "[[1]]",
        DecoderOptions {
            max_depth: Some(2),
            ..Default::default()
        },
    );
    let mut v = Value::Null;
    dec.decode(&mut v).unwrap();
    assert_eq!(v.to_string(), "[[1]]");
}

#[test]
fn from_slice_accepts_utf8() {
    let mut s = String::new();
    crate::json::from_slice("\"ü\"".as_bytes(), &mut s).unwrap();
    assert_eq!(s, "ü");
}
