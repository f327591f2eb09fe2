use std::io::{Cursor, Write};

use flate2::{write::ZlibEncoder, Compression};
use skimnbt::{Compound, Tag, Value};

use crate::{CompressionScheme, CHUNK_HEADER_SIZE, REGION_HEADER_SIZE, SECTOR_SIZE};

/// Shorthand for building compounds in tests.
macro_rules! compound {
    {$($name:literal: $value:expr),* $(,)?} => {{
        #[allow(unused_mut)]
        let mut c = skimnbt::Compound::new();
        $(
            c.insert($name.to_owned(), $value);
        )*
        skimnbt::Value::Compound(c)
    }};
}

mod structure;

/// Builds region files. Chunks are laid out one after another from the end
/// of the header, each padded to whole sectors.
pub struct RegionBuilder {
    header: Vec<u8>,
    sectors: Vec<u8>,
}

impl RegionBuilder {
    pub fn new() -> Self {
        Self {
            header: vec![0; REGION_HEADER_SIZE],
            sectors: Vec::new(),
        }
    }

    /// Point the header entry for x, z at any offset and sector count.
    pub fn location(mut self, x: usize, z: usize, offset: u32, sectors: u8) -> Self {
        let pos = 4 * (x + z * 32);
        self.header[pos..pos + 3].copy_from_slice(&offset.to_be_bytes()[1..4]);
        self.header[pos + 3] = sectors;
        self
    }

    /// Add a chunk with a correct header entry.
    pub fn chunk(self, x: usize, z: usize, scheme: CompressionScheme, data: &[u8]) -> Self {
        let len = (data.len() + 1) as u32;
        self.raw_chunk(x, z, len, scheme as u8, data)
    }

    /// Add a chunk with whatever length and scheme bytes are given.
    pub fn raw_chunk(mut self, x: usize, z: usize, len: u32, scheme: u8, data: &[u8]) -> Self {
        let offset = (REGION_HEADER_SIZE + self.sectors.len()) / SECTOR_SIZE;

        self.sectors.extend_from_slice(&len.to_be_bytes());
        self.sectors.push(scheme);
        self.sectors.extend_from_slice(data);

        let used = CHUNK_HEADER_SIZE + data.len();
        let sectors = (used + SECTOR_SIZE - 1) / SECTOR_SIZE;
        let padded = self.sectors.len() + sectors * SECTOR_SIZE - used;
        self.sectors.resize(padded, 0);

        self.location(x, z, offset as u32, sectors as u8)
    }

    pub fn build(self) -> Cursor<Vec<u8>> {
        self.build_truncated(0)
    }

    /// Build, leaving off the last `cut` bytes.
    pub fn build_truncated(mut self, cut: usize) -> Cursor<Vec<u8>> {
        self.header.extend_from_slice(&self.sectors);
        let len = self.header.len() - cut;
        self.header.truncate(len);
        Cursor::new(self.header)
    }
}

/// Encode a compound as a chunk's root NBT.
pub fn to_nbt(root: &Compound) -> Vec<u8> {
    let mut out = vec![Tag::Compound.into()];
    write_str(&mut out, "");
    write_compound(&mut out, root);
    out
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn write_compound(out: &mut Vec<u8>, c: &Compound) {
    for (name, value) in c {
        out.push(value.tag().into());
        write_str(out, name);
        write_value(out, value);
    }
    out.push(Tag::End.into());
}

fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Byte(v) => out.push(*v as u8),
        Value::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::ByteArray(vs) => {
            out.extend_from_slice(&(vs.len() as i32).to_be_bytes());
            out.extend(vs.iter().map(|v| *v as u8));
        }
        Value::String(s) => write_str(out, s),
        Value::List(tag, items) => {
            out.push((*tag).into());
            out.extend_from_slice(&(items.len() as i32).to_be_bytes());
            for item in items {
                write_value(out, item);
            }
        }
        Value::Compound(c) => write_compound(out, c),
        Value::IntArray(vs) => {
            out.extend_from_slice(&(vs.len() as i32).to_be_bytes());
            for v in vs {
                out.extend_from_slice(&v.to_be_bytes());
            }
        }
        Value::LongArray(vs) => {
            out.extend_from_slice(&(vs.len() as i32).to_be_bytes());
            for v in vs {
                out.extend_from_slice(&v.to_be_bytes());
            }
        }
    }
}

/// A typical pre-1.18 chunk at x, z, all plains.
pub fn plains_chunk(x: i32, z: i32) -> Value {
    compound! {
        "DataVersion": Value::Int(2586),
        "Level": compound! {
            "xPos": Value::Int(x),
            "zPos": Value::Int(z),
            "InhabitedTime": Value::Long(120),
            "LastUpdate": Value::Long(999),
            "Heightmaps": compound! {
                "MOTION_BLOCKING": Value::LongArray(vec![0; 37]),
            },
            "Biomes": Value::ByteArray(vec![1; 256]),
        },
    }
}

pub fn root_compound(value: Value) -> Compound {
    match value {
        Value::Compound(c) => c,
        _ => panic!("not a compound"),
    }
}
