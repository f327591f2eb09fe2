use crate::{
    error::ErrorKind, from_bytes, skip_value, Cursor, Decoder, SkipList, Tag,
    CHUNK_SUMMARY_PREFIXES,
};

use super::builder::Builder;

/// A value of every tag, encoded without a name, followed by a sentinel byte
/// that neither parsing nor skipping should touch.
fn every_value() -> Vec<(Tag, Vec<u8>)> {
    let nested_compound = Builder::new()
        .int("a", 1)
        .start_compound("inner")
        .long_array("longs", &[1, 2, 3])
        .start_list("strings", Tag::String, 2)
        .name("x")
        .name("yz")
        .end_compound()
        .string("Heightmaps", "skipped when parsed")
        .end_compound();

    vec![
        (Tag::Byte, Builder::new().byte_payload(-1).build()),
        (Tag::Short, Builder::new().short_payload(300).build()),
        (Tag::Int, Builder::new().int_payload(-7).build()),
        (Tag::Long, Builder::new().long_payload(1 << 40).build()),
        (Tag::Float, Builder::new().float_payload(0.5).build()),
        (Tag::Double, Builder::new().double_payload(1e100).build()),
        (
            Tag::ByteArray,
            Builder::new().int_payload(3).raw_bytes(&[1, 2, 3]).build(),
        ),
        (Tag::String, Builder::new().name("minecraft:plains").build()),
        (Tag::String, Builder::new().name("").build()),
        (
            Tag::IntArray,
            Builder::new().int_payload(2).int_payload(9).int_payload(-9).build(),
        ),
        (
            Tag::LongArray,
            Builder::new().int_payload(1).long_payload(5).build(),
        ),
        (
            Tag::List,
            Builder::new()
                .tag(Tag::Long)
                .int_payload(2)
                .long_payload(1)
                .long_payload(2)
                .build(),
        ),
        (Tag::List, Builder::new().tag(Tag::End).int_payload(0).build()),
        (
            Tag::List,
            Builder::new()
                .tag(Tag::List)
                .int_payload(2)
                .tag(Tag::Int)
                .int_payload(1)
                .int_payload(4)
                .tag(Tag::String)
                .int_payload(1)
                .name("deep")
                .build(),
        ),
        (
            Tag::List,
            Builder::new()
                .tag(Tag::Compound)
                .int_payload(2)
                .int("Status", 1)
                .end_compound()
                .end_compound()
                .build(),
        ),
        (Tag::Compound, Builder::new().end_compound().build()),
        (Tag::Compound, nested_compound.build()),
    ]
}

#[test]
fn skip_ends_where_parse_ends() {
    let skip = SkipList::chunk_summary();

    for (tag, mut data) in every_value() {
        let len = data.len();
        data.push(0xAA);

        let mut parsed = Cursor::new(&data[..]);
        Decoder::new(skip).parse_value(&mut parsed, tag).unwrap();

        let mut skipped = Cursor::new(&data[..]);
        skip_value(&mut skipped, tag).unwrap();

        assert_eq!(parsed.position(), skipped.position(), "{:?}", tag);
        assert_eq!(skipped.position(), len, "{:?}", tag);
    }
}

#[test]
fn skip_on_empty_list_and_parse_agree() {
    let mut parse_everything = SkipList::empty();
    for (tag, data) in every_value() {
        let mut parsed = Cursor::new(&data[..]);
        Decoder::new(&parse_everything)
            .parse_value(&mut parsed, tag)
            .unwrap();
        assert!(parsed.is_empty(), "{:?}", tag);
    }

    parse_everything = parse_everything.with_prefixes(["nothing"]).unwrap();
    assert!(!parse_everything.skips("Heightmaps"));
}

#[test]
fn skipping_end_is_an_error() {
    let mut c = Cursor::new(vec![0]);
    assert_eq!(
        skip_value(&mut c, Tag::End).unwrap_err().kind(),
        &ErrorKind::UnexpectedEnd
    );
}

#[test]
fn skipping_cut_array_is_truncated() {
    let data = Builder::new().int_payload(10).int_payload(1).build();
    let mut c = Cursor::new(data);
    assert!(skip_value(&mut c, Tag::IntArray).unwrap_err().is_truncated());
}

#[test]
fn skipping_fixed_width_list_checks_length() {
    let data = Builder::new()
        .tag(Tag::Double)
        .int_payload(3)
        .double_payload(1.0)
        .build();
    let mut c = Cursor::new(data);
    assert!(skip_value(&mut c, Tag::List).unwrap_err().is_truncated());
}

#[test]
fn skipping_negative_length_is_invalid() {
    let data = Builder::new().int_payload(-1).build();
    let mut c = Cursor::new(data);
    assert_eq!(
        skip_value(&mut c, Tag::LongArray).unwrap_err().kind(),
        &ErrorKind::InvalidLength(-1)
    );
}

#[test]
fn built_in_skip_list_is_valid() {
    let list = SkipList::new(CHUNK_SUMMARY_PREFIXES).unwrap();
    assert_eq!(&list, SkipList::chunk_summary());
    assert_eq!(list.prefixes().count(), 12);
}

#[test]
fn overlapping_prefixes_are_rejected() {
    for prefixes in [vec!["He", "Hei"], vec!["Til", "Ti"], vec!["Bl", "Bl"]] {
        let err = SkipList::new(prefixes).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidSkipList);
    }

    let err = SkipList::new(["Li", ""]).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidSkipList);
}

#[test]
fn extending_the_built_in_list_is_checked() {
    let list = SkipList::chunk_summary()
        .with_prefixes(["Str", "Ref"])
        .unwrap();
    assert!(list.skips("Structures"));
    assert!(list.skips("References"));
    assert!(list.skips("Sections"));

    assert!(SkipList::chunk_summary().with_prefixes(["Entities"]).is_err());
    assert!(SkipList::chunk_summary().with_prefixes(["E"]).is_err());
}

#[test]
fn skip_decision_is_by_name_prefix_only() {
    let skip = SkipList::chunk_summary();
    let names = [
        "Heightmaps",
        "BlockLight",
        "SkyLight",
        "UpgradeData",
        "Sections",
        "LiquidTicks",
        "TileEntities",
        "Entities",
        "ChildProperties",
        "ToBeTicked",
        "CarvingMasks",
        "PostProcessing",
        "Biomes",
        "xPos",
        "Status",
        "heightmaps",
        "Ti",
        "En",
        "Structures",
    ];

    for name in names {
        for (tag, value) in every_value() {
            // the same field at the root and two compounds deep.
            let shallow = Builder::new()
                .root()
                .tag(tag)
                .name(name)
                .raw_bytes(&value)
                .end_compound()
                .build();
            let deep = Builder::new()
                .root()
                .start_compound("Level")
                .start_compound("Data")
                .tag(tag)
                .name(name)
                .raw_bytes(&value)
                .end_compound()
                .end_compound()
                .end_compound()
                .build();

            let shallow = from_bytes(&shallow, skip).unwrap();
            let deep = from_bytes(&deep, skip).unwrap();
            let deep = deep.get("Level").and_then(|l| l.get("Data")).unwrap();

            let expected = !skip.skips(name);
            assert_eq!(shallow.get(name).is_some(), expected, "{} {:?}", name, tag);
            assert_eq!(deep.get(name).is_some(), expected, "{} {:?}", name, tag);
        }
    }
}

#[test]
fn skipping_deep_lists_stops_at_the_limit() {
    let mut b = Builder::new();
    for _ in 0..1000 {
        b = b.tag(Tag::List).int_payload(1);
    }
    let mut c = Cursor::new(b.build());

    let err = skip_value(&mut c, Tag::List).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DepthLimit);
}
