use std::convert::TryFrom;

use crate::Tag;


mod skip;
mod value;

macro_rules! check_tags {
    {$($tag:ident = $val:literal),* $(,)?} => {
        $(
            assert_eq!(u8::from(Tag::$tag), $val);
            assert_eq!(Tag::try_from($val as u8), Ok(Tag::$tag));
        )*
    };
}

#[test]
fn exhaustive_tag_check() {
    check_tags! {
        End = 0,
        Byte = 1,
        Short = 2,
        Int = 3,
        Long = 4,
        Float = 5,
        Double = 6,
        ByteArray = 7,
        String = 8,
        List = 9,
        Compound = 10,
        IntArray = 11,
        LongArray = 12,
    }

    for value in 13..=u8::MAX {
        assert!(Tag::try_from(value).is_err())
    }
}

#[test]
fn fixed_widths() {
    assert_eq!(Tag::Byte.fixed_width(), Some(1));
    assert_eq!(Tag::Short.fixed_width(), Some(2));
    assert_eq!(Tag::Int.fixed_width(), Some(4));
    assert_eq!(Tag::Float.fixed_width(), Some(4));
    assert_eq!(Tag::Long.fixed_width(), Some(8));
    assert_eq!(Tag::Double.fixed_width(), Some(8));

    for tag in [
        Tag::End,
        Tag::ByteArray,
        Tag::String,
        Tag::List,
        Tag::Compound,
        Tag::IntArray,
        Tag::LongArray,
    ] {
        assert_eq!(tag.fixed_width(), None);
    }
}
