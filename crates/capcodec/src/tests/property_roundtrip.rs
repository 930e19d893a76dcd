use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use std::dbg;

use quickcheck::{QuickCheck, TestResult};
use quickcheck_macros::quickcheck;

use crate::{
    Decoder, Value,
    json::{JsonDecoder, from_str, to_string},
};

fn tests() -> u64 {
    if is_ci::cached() { 10_000 } else { 1_000 }
}

/// Property: encoding a value and decoding the text yields the same value.
#[test]
fn value_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value) -> TestResult {
        let text = match to_string(&value) {
            Ok(text) => text,
            Err(err) => {
                dbg!(&value, err);
                return TestResult::failed();
            }
        };
        // The output is JSON as another implementation reads it.
        if let Err(err) = serde_json::from_str::<serde_json::Value>(&text) {
            dbg!(&text, err);
            return TestResult::failed();
        }
        let mut decoded = Value::Null;
        if let Err(err) = from_str(&text, &mut decoded) {
            dbg!(&text, err);
            return TestResult::failed();
        }
        if decoded != value {
            dbg!(&text, &value, &decoded);
        }
        TestResult::from_bool(decoded == value)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Value) -> TestResult);
}

/// Property: a whitespace-separated stream of roots decodes to the same
/// sequence of values, one `decode` call per root.
#[test]
fn multi_value_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(values: Vec<Value>, newlines: bool) -> TestResult {
        if values.is_empty() {
            return TestResult::discard();
        }
        let separator = if newlines { "\n" } else { " " };
        let payload: String = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator);

        let mut dec = JsonDecoder::new(&payload);
        let mut decoded = Vec::new();
        while !dec.at_end() {
            let mut v = Value::Null;
            if let Err(err) = dec.decode(&mut v) {
                dbg!(&payload, err);
                return TestResult::failed();
            }
            decoded.push(v);
        }
        TestResult::from_bool(decoded == values)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<Value>, bool) -> TestResult);
}

#[quickcheck]
fn integers_decode_exactly(n: i64, m: u64) -> bool {
    let mut a = 0_i64;
    let mut b = 0_u64;
    from_str(&n.to_string(), &mut a).is_ok()
        && from_str(&m.to_string(), &mut b).is_ok()
        && (a, b) == (n, m)
}

#[quickcheck]
fn serde_json_output_decodes(value: Value) -> bool {
    let Ok(text) = serde_json::to_string(&value) else {
        return false;
    };
    let mut decoded = Value::Null;
    from_str(&text, &mut decoded).is_ok() && decoded == value
}

#[test]
fn value_roundtrip_repro() {
    let text = "{\"\\u0000\\u2028\":[-0,1e-7,\"\\ud83d\\ude00\"]}";
    let mut v = Value::Null;
    from_str(text, &mut v).unwrap();
    let again = to_string(&v).unwrap();
    let mut w = Value::Null;
    from_str(&again, &mut w).unwrap();
    assert_eq!(v, w);
    assert_eq!(w.get("\u{0}\u{2028}").map(Value::is_aggregate), Some(true));
}
