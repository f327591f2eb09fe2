//! The tag-dispatch decoder.
//!
//! Every field of a compound is either parsed into a [`Value`] or skipped,
//! decided by its name alone using a [`SkipList`]. Skipping walks the value to
//! find where it ends but never allocates anything for it, and ends at exactly
//! the same position parsing the same value would have.
//!
//! Only the names of fields directly inside a compound being parsed are
//! checked. Once a field is skipped, everything nested inside it is skipped
//! too, whatever it is called.
//!
//! ```
//! use skimnbt::{Cursor, Decoder, SkipList, Value};
//!
//! # fn main() -> skimnbt::error::Result<()> {
//! // { "xPos": 3i, "Heightmaps": 1b }, without the root header.
//! let data = [
//!     3, 0, 4, b'x', b'P', b'o', b's', 0, 0, 0, 3, //
//!     1, 0, 10, b'H', b'e', b'i', b'g', b'h', b't', b'm', b'a', b'p', b's', 1, //
//!     0,
//! ];
//!
//! let mut input = Cursor::new(&data[..]);
//! let fields = Decoder::new(SkipList::chunk_summary()).parse_compound(&mut input)?;
//!
//! assert_eq!(fields.get("xPos"), Some(&Value::Int(3)));
//! assert!(fields.get("Heightmaps").is_none());
//! assert!(input.is_empty());
//! # Ok(())
//! # }
//! ```

use byteorder::{BigEndian, ByteOrder};
use log::{debug, trace};
use once_cell::sync::Lazy;

use crate::{
    error::{Error, Result},
    inflate, Compound, Cursor, Tag, Value,
};

/// Prefixes of the chunk fields a map renderer never looks at: heightmaps,
/// block and sky light, block states, upgrade data, sections, lighting and
/// tick lists, tile entities and ticks, entities, carving masks and
/// post-processing lists.
pub const CHUNK_SUMMARY_PREFIXES: [&str; 12] = [
    "He", "Bl", "Sk", "Up", "Se", "Li", "Til", "Ent", "Chi", "ToB", "Car", "Pos",
];

/// Deepest nesting of compounds and lists the decoder accepts, counting the
/// root compound as depth 0. Minecraft refuses anything deeper too.
pub const MAX_DEPTH: usize = 512;

static CHUNK_SUMMARY: Lazy<SkipList> = Lazy::new(|| {
    SkipList::new(CHUNK_SUMMARY_PREFIXES).expect("built-in skip list should be valid")
});

/// A set of field name prefixes. A field whose name starts with any of them is
/// skipped.
///
/// No prefix in the list may be a prefix of another, so the outcome never
/// depends on the order the prefixes are checked in. [`SkipList::new`] checks
/// this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipList {
    prefixes: Vec<String>,
}

impl SkipList {
    /// Create a skip list, rejecting empty prefixes, duplicates, and prefixes
    /// that overlap with each other.
    pub fn new<I, S>(prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();

        for (i, p) in prefixes.iter().enumerate() {
            if p.is_empty() {
                return Err(Error::invalid_skip_list("empty prefix would skip every field"));
            }

            for (j, other) in prefixes.iter().enumerate() {
                if i != j && other.starts_with(p.as_str()) {
                    return Err(Error::invalid_skip_list(format!(
                        "{:?} overlaps with {:?}",
                        p, other
                    )));
                }
            }
        }

        Ok(Self { prefixes })
    }

    /// A skip list that skips nothing.
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    /// The skip list used for summarising chunks, made of
    /// [`CHUNK_SUMMARY_PREFIXES`].
    pub fn chunk_summary() -> &'static SkipList {
        &CHUNK_SUMMARY
    }

    /// A new list with these prefixes added to the ones already here.
    pub fn with_prefixes<I, S>(&self, extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let all = self
            .prefixes
            .iter()
            .cloned()
            .chain(extra.into_iter().map(Into::into));

        Self::new(all)
    }

    pub fn skips(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }
}

/// Parses compounds, skipping the fields its [`SkipList`] names.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'s> {
    skip: &'s SkipList,
}

impl<'s> Decoder<'s> {
    pub fn new(skip: &'s SkipList) -> Self {
        Self { skip }
    }

    pub fn skip_list(&self) -> &'s SkipList {
        self.skip
    }

    /// Parse the fields of a compound up to and including its end tag. The
    /// compound's own tag and name must have been read already.
    ///
    /// If the input runs out where the next field's tag should be, the fields
    /// read so far are returned.
    pub fn parse_compound<B: AsRef<[u8]>>(&self, input: &mut Cursor<B>) -> Result<Compound> {
        self.compound_at(input, 0)
    }

    /// Parse a single value of the given tag. Compounds inside it, including
    /// those inside lists, apply the skip list to their own fields.
    pub fn parse_value<B: AsRef<[u8]>>(&self, input: &mut Cursor<B>, tag: Tag) -> Result<Value> {
        self.value_at(input, tag, 0)
    }

    /// See [`skip_value`].
    pub fn skip_value<B: AsRef<[u8]>>(&self, input: &mut Cursor<B>, tag: Tag) -> Result<()> {
        skip_value(input, tag)
    }

    fn compound_at<B: AsRef<[u8]>>(&self, input: &mut Cursor<B>, depth: usize) -> Result<Compound> {
        let mut fields = Compound::new();

        loop {
            if input.is_empty() {
                debug!("compound cut short after {} fields", fields.len());
                break;
            }

            let tag = input.read_tag()?;
            if tag == Tag::End {
                break;
            }

            let name = input.read_str()?;

            if self.skip.skips(&name) {
                debug!("skipping {:?} {}", tag, name);
                skip_at(input, tag, depth + 1)?;
            } else {
                trace!("parsing {:?} {}", tag, name);
                let value = self.value_at(input, tag, depth + 1)?;
                fields.insert(name, value);
            }
        }

        Ok(fields)
    }

    fn value_at<B: AsRef<[u8]>>(
        &self,
        input: &mut Cursor<B>,
        tag: Tag,
        depth: usize,
    ) -> Result<Value> {
        Ok(match tag {
            Tag::End => return Err(Error::unexpected_end()),
            Tag::Byte => Value::Byte(input.read_i8()?),
            Tag::Short => Value::Short(input.read_i16()?),
            Tag::Int => Value::Int(input.read_i32()?),
            Tag::Long => Value::Long(input.read_i64()?),
            Tag::Float => Value::Float(input.read_f32()?),
            Tag::Double => Value::Double(input.read_f64()?),
            Tag::String => Value::String(input.read_str()?),
            Tag::ByteArray => {
                let len = read_len(input)?;
                let bs = input.read_bytes(len)?;
                Value::ByteArray(bs.iter().map(|&b| b as i8).collect())
            }
            Tag::IntArray => {
                let len = read_len(input)?;
                let bs = input.read_bytes(array_size(len, 4)?)?;
                let mut ints = vec![0; len];
                BigEndian::read_i32_into(bs, &mut ints);
                Value::IntArray(ints)
            }
            Tag::LongArray => {
                let len = read_len(input)?;
                let bs = input.read_bytes(array_size(len, 8)?)?;
                let mut longs = vec![0; len];
                BigEndian::read_i64_into(bs, &mut longs);
                Value::LongArray(longs)
            }
            Tag::List => {
                check_depth(depth)?;
                let element = input.read_tag()?;
                let len = read_len(input)?;
                if element == Tag::End && len > 0 {
                    return Err(Error::unexpected_end());
                }

                // The length is untrusted, don't let it size the allocation.
                let mut items = Vec::with_capacity(len.min(input.remaining()));
                for _ in 0..len {
                    items.push(self.value_at(input, element, depth + 1)?);
                }
                Value::List(element, items)
            }
            Tag::Compound => {
                check_depth(depth)?;
                Value::Compound(self.compound_at(input, depth)?)
            }
        })
    }
}

/// Move past a value of the given tag without decoding it, ending where
/// [`Decoder::parse_value`] would have ended. Compounds are skipped whole, and
/// like parsing, a compound cut short before a field's tag ends quietly.
pub fn skip_value<B: AsRef<[u8]>>(input: &mut Cursor<B>, tag: Tag) -> Result<()> {
    skip_at(input, tag, 0)
}

fn skip_at<B: AsRef<[u8]>>(input: &mut Cursor<B>, tag: Tag, depth: usize) -> Result<()> {
    match tag {
        Tag::End => return Err(Error::unexpected_end()),
        Tag::Byte | Tag::Short | Tag::Int | Tag::Long | Tag::Float | Tag::Double => {
            // fixed width tags always have a width.
            input.skip_exact(tag.fixed_width().unwrap_or_default())?;
        }
        Tag::String => {
            let len = input.read_u16()? as usize;
            input.skip_exact(len)?;
        }
        Tag::ByteArray => {
            let len = read_len(input)?;
            input.skip_exact(len)?;
        }
        Tag::IntArray => {
            let len = read_len(input)?;
            input.skip_exact(array_size(len, 4)?)?;
        }
        Tag::LongArray => {
            let len = read_len(input)?;
            input.skip_exact(array_size(len, 8)?)?;
        }
        Tag::List => {
            check_depth(depth)?;
            let element = input.read_tag()?;
            let len = read_len(input)?;
            if element == Tag::End && len > 0 {
                return Err(Error::unexpected_end());
            }

            match element.fixed_width() {
                Some(width) => input.skip_exact(array_size(len, width)?)?,
                None => {
                    for _ in 0..len {
                        skip_at(input, element, depth + 1)?;
                    }
                }
            }
        }
        Tag::Compound => {
            check_depth(depth)?;
            loop {
                if input.is_empty() {
                    break;
                }

                let tag = input.read_tag()?;
                if tag == Tag::End {
                    break;
                }

                skip_at(input, Tag::String, depth + 1)?;
                skip_at(input, tag, depth + 1)?;
            }
        }
    }

    Ok(())
}

/// Decode a whole uncompressed NBT document. The data must start with a
/// compound tag and its name, which is discarded; the compound's fields are
/// returned as a [`Value::Compound`]. Empty data gives an empty compound.
pub fn from_bytes(data: &[u8], skip: &SkipList) -> Result<Value> {
    let mut input = Cursor::new(data);
    if input.is_empty() {
        return Ok(Value::Compound(Compound::new()));
    }

    let tag = input.read_tag()?;
    if tag != Tag::Compound {
        return Err(Error::no_root_compound(tag));
    }
    input.read_str()?;

    let root = Decoder::new(skip).parse_compound(&mut input)?;
    Ok(Value::Compound(root))
}

/// Inflate a zlib compressed chunk payload and decode it with
/// [`from_bytes`].
pub fn decode_chunk_payload(compressed: &[u8], skip: &SkipList) -> Result<Value> {
    let data = inflate(compressed)?;
    from_bytes(&data, skip)
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::depth_limit(MAX_DEPTH));
    }
    Ok(())
}

fn read_len<B: AsRef<[u8]>>(input: &mut Cursor<B>) -> Result<usize> {
    let len = input.read_i32()?;
    usize::try_from(len).map_err(|_| Error::invalid_length(len as i64))
}

fn array_size(len: usize, width: usize) -> Result<usize> {
    len.checked_mul(width)
        .ok_or_else(|| Error::invalid_length(len as i64))
}
