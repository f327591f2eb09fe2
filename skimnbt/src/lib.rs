//! skimnbt decodes the NBT data Minecraft stores its chunks in, but only the
//! parts you ask for. Chunk NBT is dominated by block states, light arrays,
//! entity lists and tick queues. A map renderer needs none of that, so the
//! decoder checks every field name against a [`SkipList`] of prefixes and walks
//! past matching values without allocating anything for them.
//!
//! * For decompressing the payload of a region file chunk see [`inflate()`].
//! * For the bounds checked big-endian reader see [`Cursor`].
//! * For the decoder and the skip list see [`de`].
//! * For the sparse tree the decoder produces see [`Value`].
//!
//! # Quick example
//!
//! ```no_run
//! use skimnbt::{decode_chunk_payload, SkipList};
//!
//! # fn main() -> skimnbt::error::Result<()> {
//! # let compressed: Vec<u8> = vec![];
//! let root = decode_chunk_payload(&compressed, SkipList::chunk_summary())?;
//!
//! if let Some(level) = root.get("Level") {
//!     println!("chunk at {:?}, {:?}", level.get("xPos"), level.get("zPos"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Partial data
//!
//! Corrupted saves are common. A compound whose data ends before its end tag
//! is returned with the fields read so far rather than failing the whole
//! chunk. A value cut off half way through is still an error, as is nesting
//! compounds or lists deeper than [`MAX_DEPTH`].

pub mod de;
pub mod error;

mod cursor;
mod inflate;
mod value;

pub use cursor::*;
pub use de::{
    decode_chunk_payload, from_bytes, skip_value, Decoder, SkipList, CHUNK_SUMMARY_PREFIXES,
    MAX_DEPTH,
};
pub use inflate::*;
pub use value::*;

#[cfg(test)]
mod test;

use std::convert::TryFrom;

/// An NBT tag. This does not carry the value or the name of the data.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[repr(u8)]
pub enum Tag {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// Represents as array of Byte (i8).
    ByteArray = 7,
    /// Represents a Unicode string.
    String = 8,
    /// Represents a list of other objects, all of the same type.
    List = 9,
    /// Represents a struct-like structure.
    Compound = 10,
    /// Represents as array of Int (i32).
    IntArray = 11,
    /// Represents as array of Long (i64).
    LongArray = 12,
}

impl Tag {
    /// The encoded size of a value of this tag, if every value of the tag has
    /// the same size.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Tag::Byte => Some(1),
            Tag::Short => Some(2),
            Tag::Int | Tag::Float => Some(4),
            Tag::Long | Tag::Double => Some(8),
            _ => None,
        }
    }
}

// Written out by hand rather than derived. The tags very rarely change and it
// keeps the dependency list short.
impl TryFrom<u8> for Tag {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        use Tag::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13..=u8::MAX => return Err(()),
        })
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::End => 0,
            Tag::Byte => 1,
            Tag::Short => 2,
            Tag::Int => 3,
            Tag::Long => 4,
            Tag::Float => 5,
            Tag::Double => 6,
            Tag::ByteArray => 7,
            Tag::String => 8,
            Tag::List => 9,
            Tag::Compound => 10,
            Tag::IntArray => 11,
            Tag::LongArray => 12,
        }
    }
}
