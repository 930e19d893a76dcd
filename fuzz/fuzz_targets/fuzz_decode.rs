#![no_main]

use arbitrary::Arbitrary;
use capcodec::{
    Decoder, DecoderOptions, Value,
    json::{self, JsonDecoder},
    xml::{Document, XmlDecoder},
};
use libfuzzer_sys::fuzz_target;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    xml: bool,
    trim_text: bool,
    text: &'a str,
}

fn options(trim_text: bool) -> DecoderOptions {
    DecoderOptions {
        max_depth: Some(MAX_DEPTH),
        trim_text,
    }
}

/// Every value the decoder accepts must survive an encode/decode round trip,
/// and whatever serde_json accepts (within the depth limit) we accept too.
fn check_json(text: &str) {
    let mut dec = JsonDecoder::with_options(text, options(false));
    let mut value = Value::Null;
    let ours = dec.decode(&mut value).and_then(|()| dec.end());

    if let Err(err) = &ours {
        if let (false, Ok(theirs)) = (
            matches!(err, capcodec::Error::DepthLimitExceeded { .. }),
            serde_json::from_str::<serde_json::Value>(text),
        ) {
            panic!("rejected valid JSON {text:?} ({theirs}): {err}");
        }
        return;
    }

    // Out-of-range numbers decode to infinities, which have no JSON form.
    let Ok(encoded) = json::to_string(&value) else {
        return;
    };
    let mut again = Value::Null;
    json::from_str(&encoded, &mut again).expect("encoded values decode");
    assert_eq!(value, again, "{encoded}");
}

fn check_xml(text: &str, trim_text: bool) {
    let mut doc = Document::<Value>::default();
    let mut dec = XmlDecoder::with_options(text.as_bytes(), options(trim_text));
    let _ = dec.decode(&mut doc);
}

fuzz_target!(|input: Input<'_>| {
    if input.xml {
        check_xml(input.text, input.trim_text);
    } else {
        check_json(input.text);
    }
});
