use serde_json::json;

use crate::{from_bytes, Compound, SkipList, Tag, Value};

use super::builder::Builder;

#[test]
fn integer_coercion() {
    assert_eq!(Value::Byte(-1).as_i64(), Some(-1));
    assert_eq!(Value::Short(300).as_i64(), Some(300));
    assert_eq!(Value::Int(7).as_i64(), Some(7));
    assert_eq!(Value::Long(1 << 40).as_i64(), Some(1 << 40));
    assert_eq!(Value::Float(1.0).as_i64(), None);
    assert_eq!(Value::String("1".to_owned()).as_i64(), None);

    assert_eq!(Value::Long(1 << 40).as_i32(), None);
    assert_eq!(Value::Long(-5).as_i32(), Some(-5));
}

#[test]
fn integer_contents_of_arrays_and_lists() {
    assert_eq!(
        Value::ByteArray(vec![-1, 2]).to_i64_vec(),
        Some(vec![-1, 2])
    );
    assert_eq!(Value::IntArray(vec![3]).to_i64_vec(), Some(vec![3]));
    assert_eq!(Value::LongArray(vec![4, 5]).to_i64_vec(), Some(vec![4, 5]));
    assert_eq!(
        Value::List(Tag::Long, vec![Value::Long(6)]).to_i64_vec(),
        Some(vec![6])
    );
    assert_eq!(
        Value::List(Tag::String, vec![Value::String("x".to_owned())]).to_i64_vec(),
        None
    );
    assert_eq!(Value::Int(1).to_i64_vec(), None);
}

#[test]
fn get_only_works_on_compounds() {
    let mut c = Compound::new();
    c.insert("a".to_owned(), Value::Int(1));

    assert_eq!(Value::Compound(c).get("a"), Some(&Value::Int(1)));
    assert_eq!(Value::Int(1).get("a"), None);
    assert_eq!(Value::List(Tag::End, vec![]).get("a"), None);
}

#[test]
fn tags_match_variants() {
    assert_eq!(Value::Byte(0).tag(), Tag::Byte);
    assert_eq!(Value::List(Tag::Int, vec![]).tag(), Tag::List);
    assert_eq!(Value::Compound(Compound::new()).tag(), Tag::Compound);
    assert_eq!(Value::LongArray(vec![]).tag(), Tag::LongArray);
}

#[test]
fn serializes_to_json_in_read_order() {
    let data = Builder::new()
        .root()
        .int("zPos", -7)
        .int("xPos", 3)
        .byte_array("Biomes", &[1, 4])
        .start_list("Tags", Tag::String, 1)
        .name("a")
        .start_compound("Nested")
        .double("d", 0.5)
        .end_compound()
        .end_compound()
        .build();

    let root = from_bytes(&data, &SkipList::empty()).unwrap();
    let out = serde_json::to_string(&root).unwrap();

    assert_eq!(
        out,
        r#"{"zPos":-7,"xPos":3,"Biomes":[1,4],"Tags":["a"],"Nested":{"d":0.5}}"#
    );
    assert_eq!(
        serde_json::to_value(&root).unwrap(),
        json!({"xPos": 3, "zPos": -7, "Biomes": [1, 4], "Tags": ["a"], "Nested": {"d": 0.5}})
    );
}
