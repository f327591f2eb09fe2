use indexmap::IndexMap;
use serde::{ser::SerializeMap, ser::SerializeSeq, Serialize};

use crate::Tag;

/// The fields of a compound, in the order they were read. Reading a name a
/// second time replaces the earlier value.
pub type Compound = IndexMap<String, Value>;

/// The part of an NBT tree that the decoder did not skip.
///
/// Lists keep the element tag they were declared with, so an empty list still
/// says what it would have held. Every element of a `List(tag, ..)` has that
/// tag.
///
/// ```
/// # use skimnbt::{Compound, Value};
/// let mut level = Compound::new();
/// level.insert("xPos".to_owned(), Value::Int(3));
/// level.insert("InhabitedTime".to_owned(), Value::Long(120));
/// let level = Value::Compound(level);
///
/// assert_eq!(level.get("xPos").and_then(Value::as_i32), Some(3));
/// assert_eq!(level.get("InhabitedTime").and_then(Value::as_i64), Some(120));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Tag, Vec<Value>),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Byte(_) => Tag::Byte,
            Value::Short(_) => Tag::Short,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::ByteArray(_) => Tag::ByteArray,
            Value::String(_) => Tag::String,
            Value::List(..) => Tag::List,
            Value::Compound(_) => Tag::Compound,
            Value::IntArray(_) => Tag::IntArray,
            Value::LongArray(_) => Tag::LongArray,
        }
    }

    /// Get a field of a compound. `None` for anything that isn't a compound.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_compound()?.get(name)
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Value::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(_, items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Integer value of any of the integer tags. NBT distinguishes between
    /// them, callers usually just want a number.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(v as i64),
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }

    /// Like [`Value::as_i64`], but `None` if the value does not fit an i32.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    /// The integers held by an array, or by a list of integers.
    pub fn to_i64_vec(&self) -> Option<Vec<i64>> {
        match self {
            Value::ByteArray(v) => Some(v.iter().map(|&b| b as i64).collect()),
            Value::IntArray(v) => Some(v.iter().map(|&i| i as i64).collect()),
            Value::LongArray(v) => Some(v.clone()),
            Value::List(_, items) => items.iter().map(Value::as_i64).collect(),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Byte(v) => serializer.serialize_i8(*v),
            Value::Short(v) => serializer.serialize_i16(*v),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::Long(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::ByteArray(v) => v.serialize(serializer),
            Value::String(v) => serializer.serialize_str(v),
            Value::List(_, items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Compound(c) => {
                let mut map = serializer.serialize_map(Some(c.len()))?;
                for (k, v) in c {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::IntArray(v) => v.serialize(serializer),
            Value::LongArray(v) => v.serialize(serializer),
        }
    }
}
