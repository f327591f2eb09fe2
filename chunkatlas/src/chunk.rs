use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use serde::Serialize;
use skimnbt::{decode_chunk_payload, error::ErrorKind as NbtErrorKind, SkipList, Value};

use crate::{biome::Registry, Structure};

/// Structures spanning more chunks than this along either axis are assumed to
/// be corrupt and are not expanded into references.
pub const MAX_STRUCTURE_SPAN: i64 = 64;

/// Position of a chunk in chunk units, ie block coordinates divided by 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// A chunk touched by a structure that started in some chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StructureRef {
    pub pos: ChunkPos,
    pub kind: Structure,
}

/// What a map needs to know about a single chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkRecord {
    pub pos: ChunkPos,
    /// Total ticks players have spent near the chunk.
    pub inhabited_time: u64,
    /// Game tick the chunk was last saved at.
    pub last_update: i64,
    /// Occurrences of each biome code in the chunk.
    pub biomes: BTreeMap<i32, u32>,
    /// Structures that start in this chunk or are referenced from it.
    pub structures: BTreeSet<Structure>,
    pub structure_refs: BTreeSet<StructureRef>,
}

impl ChunkRecord {
    pub fn biome_total(&self) -> u32 {
        self.biomes.values().sum()
    }

    /// The most common biome code. Ties go to the lowest code.
    pub fn dominant_biome(&self) -> Option<i32> {
        self.biomes
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(code, _)| *code)
    }
}

/// Coarse error categories for maps, which only care whether a chunk is
/// missing, misplaced or unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFlag {
    Missing,
    BadOffset,
    InvalidNbt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkErrorKind {
    /// The payload was not valid compressed data.
    Decompression,
    /// The chunk data ended part way through a value, or the chunk extends
    /// past the end of its region file.
    Truncated,
    UnknownTag(u8),
    /// The NBT could not be read, or lacked a field every chunk has. Holds the
    /// reason.
    InvalidNbt(&'static str),
    /// The region header lists the chunk but no data is there.
    Missing,
    /// The region header points somewhere the chunk cannot be.
    BadOffset,
}

/// Why a single chunk could not be summarised. Never fatal for anything but
/// that chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkError {
    kind: ChunkErrorKind,
    msg: String,
}

impl ChunkError {
    pub fn kind(&self) -> &ChunkErrorKind {
        &self.kind
    }

    pub fn flag(&self) -> ErrorFlag {
        match self.kind {
            ChunkErrorKind::Decompression | ChunkErrorKind::Missing => ErrorFlag::Missing,
            ChunkErrorKind::BadOffset => ErrorFlag::BadOffset,
            ChunkErrorKind::Truncated
            | ChunkErrorKind::UnknownTag(_)
            | ChunkErrorKind::InvalidNbt(_) => ErrorFlag::InvalidNbt,
        }
    }

    pub(crate) fn new(kind: ChunkErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }

    pub(crate) fn invalid_nbt(reason: &'static str) -> Self {
        Self::new(ChunkErrorKind::InvalidNbt(reason), reason)
    }
}

impl From<skimnbt::error::Error> for ChunkError {
    fn from(err: skimnbt::error::Error) -> Self {
        let kind = match err.kind() {
            NbtErrorKind::Decompression => ChunkErrorKind::Decompression,
            NbtErrorKind::Truncated => ChunkErrorKind::Truncated,
            NbtErrorKind::UnknownTag(tag) => ChunkErrorKind::UnknownTag(*tag),
            NbtErrorKind::DepthLimit => ChunkErrorKind::InvalidNbt("nbt nested too deeply"),
            _ => ChunkErrorKind::InvalidNbt("malformed nbt"),
        };
        Self::new(kind, err.to_string())
    }
}

impl std::fmt::Display for ChunkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

impl std::error::Error for ChunkError {}

/// Inflate and decode a zlib compressed chunk, then [`extract`] its record.
pub fn decode_chunk(
    compressed: &[u8],
    registry: &Registry,
    skip: &SkipList,
) -> Result<ChunkRecord, ChunkError> {
    let root = decode_chunk_payload(compressed, skip)?;
    extract(&root, registry)
}

/// Pull a [`ChunkRecord`] out of decoded chunk NBT.
///
/// Chunk fields are read from the `Level` compound, or from the root itself
/// for chunks saved by 1.18 and later. Names are also looked up in lower case,
/// which newer versions use for some fields.
pub fn extract(root: &Value, registry: &Registry) -> Result<ChunkRecord, ChunkError> {
    let level = match field(root, "Level") {
        Some(level) => level,
        None if field(root, "xPos").is_some() => root,
        None => return Err(ChunkError::invalid_nbt("missing level data")),
    };

    let x = required_int(level, "xPos")?;
    let z = required_int(level, "zPos")?;
    let pos = ChunkPos::new(
        i32::try_from(x).map_err(|_| ChunkError::invalid_nbt("xPos out of range"))?,
        i32::try_from(z).map_err(|_| ChunkError::invalid_nbt("zPos out of range"))?,
    );

    let inhabited_time = required_int(level, "InhabitedTime")?.max(0) as u64;
    let last_update = required_int(level, "LastUpdate")?;

    let biomes = biome_counts(level, pos, registry)?;

    let mut record = ChunkRecord {
        pos,
        inhabited_time,
        last_update,
        biomes,
        structures: BTreeSet::new(),
        structure_refs: BTreeSet::new(),
    };

    if let Some(structures) = field(level, "Structures") {
        add_starts(&mut record, structures);
        add_references(&mut record, structures);
    }

    Ok(record)
}

fn field<'v>(value: &'v Value, name: &str) -> Option<&'v Value> {
    value
        .get(name)
        .or_else(|| value.get(&name.to_lowercase()))
}

fn required_int(level: &Value, name: &'static str) -> Result<i64, ChunkError> {
    match field(level, name) {
        Some(v) => v
            .as_i64()
            .ok_or_else(|| ChunkError::invalid_nbt("chunk field has the wrong type")),
        None => Err(ChunkError::new(
            ChunkErrorKind::InvalidNbt("missing chunk field"),
            format!("missing chunk field {}", name),
        )),
    }
}

fn biome_counts(
    level: &Value,
    pos: ChunkPos,
    registry: &Registry,
) -> Result<BTreeMap<i32, u32>, ChunkError> {
    let codes: Vec<i32> = match field(level, "Biomes") {
        // Stored as signed bytes, but the codes are 0..=255.
        Some(Value::ByteArray(bs)) => bs.iter().map(|&b| b as u8 as i32).collect(),
        Some(Value::IntArray(is)) => is.clone(),
        Some(_) => return Err(ChunkError::invalid_nbt("biomes have the wrong type")),
        None => return section_biome_counts(level, pos, registry),
    };

    let mut counts = BTreeMap::new();
    let mut unknown = BTreeSet::new();

    for code in codes {
        if registry.from_code(code).is_some() {
            *counts.entry(code).or_insert(0) += 1;
        } else {
            unknown.insert(code);
        }
    }

    if !unknown.is_empty() {
        warn!(
            "chunk {},{}: dropped unrecognised biome codes {:?}",
            pos.x, pos.z, unknown
        );
    }

    Ok(counts)
}

/// Chunks from 1.18 on keep a palette of biome names per section instead of
/// a biome array. Each palette entry counts once.
fn section_biome_counts(
    level: &Value,
    pos: ChunkPos,
    registry: &Registry,
) -> Result<BTreeMap<i32, u32>, ChunkError> {
    let sections = field(level, "sections")
        .and_then(Value::as_list)
        .ok_or_else(|| ChunkError::invalid_nbt("missing biomes"))?;

    let mut counts = BTreeMap::new();

    let names = sections
        .iter()
        .filter_map(|s| s.get("biomes"))
        .filter_map(|b| b.get("palette"))
        .filter_map(Value::as_list)
        .flatten()
        .filter_map(Value::as_str);

    for name in names {
        match registry.closest_match(name) {
            Some(biome) => *counts.entry(biome.code).or_insert(0) += 1,
            None => warn!(
                "chunk {},{}: dropped unrecognised biome {}",
                pos.x, pos.z, name
            ),
        }
    }

    Ok(counts)
}

/// Structures starting in this chunk. The start's bounding box is in blocks;
/// every other chunk it covers gets a reference back to this one.
fn add_starts(record: &mut ChunkRecord, structures: &Value) {
    let starts = match field(structures, "Starts").and_then(Value::as_compound) {
        Some(starts) => starts,
        None => return,
    };

    for (name, start) in starts {
        let bb = match field(start, "BB").and_then(Value::to_i64_vec) {
            Some(bb) if bb.len() >= 6 => bb,
            _ => continue,
        };

        let kind = Structure::parse(name);
        record.structures.insert(kind);

        let (x0, z0) = (bb[0].div_euclid(16), bb[2].div_euclid(16));
        let (x1, z1) = (bb[3].div_euclid(16), bb[5].div_euclid(16));

        if x1 - x0 > MAX_STRUCTURE_SPAN || z1 - z0 > MAX_STRUCTURE_SPAN {
            warn!(
                "chunk {},{}: {} bounding box {:?} is too large, ignoring it",
                record.pos.x, record.pos.z, kind, bb
            );
            continue;
        }

        for x in x0..=x1 {
            for z in z0..=z1 {
                let pos = match (i32::try_from(x), i32::try_from(z)) {
                    (Ok(x), Ok(z)) => ChunkPos::new(x, z),
                    _ => continue,
                };

                if pos != record.pos {
                    record.structure_refs.insert(StructureRef { pos, kind });
                }
            }
        }
    }
}

/// Structures that started elsewhere and reach into this chunk. Each
/// reference is a long packing the start chunk's x in its high 32 bits and z
/// in its low 32 bits.
fn add_references(record: &mut ChunkRecord, structures: &Value) {
    let references = match field(structures, "References").and_then(Value::as_compound) {
        Some(references) => references,
        None => return,
    };

    for (name, refs) in references {
        let packed = match refs.to_i64_vec() {
            Some(packed) if !packed.is_empty() => packed,
            _ => continue,
        };

        let kind = Structure::parse(name);
        record.structures.insert(kind);

        for p in packed {
            let pos = unpack_chunk_pos(p);
            debug!(
                "chunk {},{}: {} reference to {},{}",
                record.pos.x, record.pos.z, kind, pos.x, pos.z
            );
            record.structure_refs.insert(StructureRef { pos, kind });
        }
    }
}

pub fn unpack_chunk_pos(packed: i64) -> ChunkPos {
    let bytes = packed.to_be_bytes();
    let x = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let z = i32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    ChunkPos::new(x, z)
}
