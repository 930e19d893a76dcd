use alloc::{collections::BTreeMap, string::String, vec, vec::Vec};

use rstest::rstest;

use super::fixtures::Person;
use crate::xml::{Document, from_str, to_string};

#[rstest]
#[case("Ada", 36, None, vec![])]
#[case("O'Brien & <Sons>", 255, Some("ob@example.com"), vec!["a", "b"])]
#[case("", 0, Some(""), vec!["", "x y"])]
#[case("Ünïcödé 😀", 1, None, vec!["\"quoted\""])]
fn person_roundtrip(
    #[case] name: &str,
    #[case] age: u8,
    #[case] email: Option<&str>,
    #[case] tags: Vec<&str>,
) {
    let person = Person {
        name: name.into(),
        age,
        email: email.map(String::from),
        tags: tags.iter().map(|t| String::from(*t)).collect(),
        seen: vec![],
    };
    let text = to_string(&Document::new("person", &person)).unwrap();

    let mut doc = Document::<Person>::default();
    from_str(&text, &mut doc).unwrap();
    assert_eq!(doc.name.as_deref(), Some("person"), "{text}");
    let back = doc.root;
    assert_eq!(back.name, person.name, "{text}");
    assert_eq!(back.age, person.age);
    assert_eq!(back.tags, person.tags);
    // An empty element carries no text, so an empty email reads back as unset.
    let expected_email = person.email.filter(|e| !e.is_empty());
    assert_eq!(back.email, expected_email);
}

#[test]
fn nested_maps_roundtrip() {
    let mut inner = BTreeMap::new();
    inner.insert(String::from("x"), 1.5_f64);
    inner.insert(String::from("y"), -2.0);
    let mut outer: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    outer.insert("point".into(), inner);

    let text = to_string(&Document::new("shape", &outer)).unwrap();
    assert_eq!(text, "<shape><point><x>1.5</x><y>-2</y></point></shape>");

    let mut doc = Document::<BTreeMap<String, BTreeMap<String, f64>>>::default();
    from_str(&text, &mut doc).unwrap();
    assert_eq!(doc.root, outer);
}
