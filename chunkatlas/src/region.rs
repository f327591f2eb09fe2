use std::convert::TryFrom;
use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::GzDecoder;
use log::{debug, warn};
use num_enum::TryFromPrimitive;
use skimnbt::{from_bytes, inflate, SkipList};

use crate::{
    biome::Registry, extract, ChunkError, ChunkErrorKind, ChunkPos, ChunkRecord, Error, Result,
};

/// the size in bytes of a 'sector' in a region file. Sectors are Minecraft's size unit
/// for chunks. For example, a chunk might be `3 * SECTOR_SIZE` bytes. The
/// actual compressed bytes of a chunk may be smaller and the exact value is
/// tracked in the chunk header.
pub const SECTOR_SIZE: usize = 4096;

/// the size of the region file header: chunk locations, then timestamps.
pub const REGION_HEADER_SIZE: usize = 2 * SECTOR_SIZE;

/// size of header for each chunk in the region file. This header precedes the
/// compressed chunk data.
pub const CHUNK_HEADER_SIZE: usize = 5;

/// Regions are this many chunks wide and deep.
pub const REGION_WIDTH: usize = 32;

/// A Minecraft region file, opened for reading. Chunks are read from the
/// underlying stream as they are asked for.
pub struct Region<S> {
    stream: S,
    len: u64,
}

impl<S> Region<S>
where
    S: Read + Seek,
{
    /// Load a region from a stream. Will assume a seek of zero is the start
    /// of the region.
    pub fn from_stream(mut stream: S) -> Result<Self> {
        let len = stream.seek(SeekFrom::End(0))?;
        if len < REGION_HEADER_SIZE as u64 {
            return Err(Error::InsufficientData);
        }

        Ok(Self { stream, len })
    }

    /// Return the inner stream. The stream is rewound to the beginning.
    pub fn into_inner(mut self) -> io::Result<S> {
        self.stream.rewind()?;
        Ok(self.stream)
    }

    /// Where the chunk at x, z (both 0..32) is stored, or `None` if the region
    /// has no such chunk.
    pub fn location(&mut self, x: usize, z: usize) -> Result<Option<ChunkLocation>> {
        if x >= REGION_WIDTH || z >= REGION_WIDTH {
            return Err(Error::InvalidOffset(x as isize, z as isize));
        }

        self.stream.seek(SeekFrom::Start(header_pos(x, z)))?;

        let mut buf = [0u8; 4];
        self.stream.read_exact(&mut buf[..])?;

        let offset = (buf[0] as u64) << 16 | (buf[1] as u64) << 8 | buf[2] as u64;
        let sectors = buf[3] as u64;

        if offset == 0 && sectors == 0 {
            Ok(None)
        } else {
            Ok(Some(ChunkLocation { offset, sectors }))
        }
    }

    /// Read the still compressed data of the chunk at x, z.
    ///
    /// A chunk whose data would start inside the region header or past the
    /// end of the file is an [`Error::InvalidOffset`]; one whose declared
    /// length runs past the end of the file is [`Error::InsufficientData`].
    pub fn read_compressed_chunk(&mut self, x: usize, z: usize) -> Result<Option<CompressedChunk>> {
        let loc = match self.location(x, z)? {
            Some(loc) => loc,
            None => return Ok(None),
        };

        let start = loc.offset * SECTOR_SIZE as u64;
        if start < REGION_HEADER_SIZE as u64 || start + CHUNK_HEADER_SIZE as u64 > self.len {
            return Err(Error::InvalidOffset(x as isize, z as isize));
        }

        self.stream.seek(SeekFrom::Start(start))?;

        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        self.stream.read_exact(&mut buf)?;
        let meta = ChunkMeta::new(&buf)?;

        let end = start + CHUNK_HEADER_SIZE as u64 + meta.compressed_len as u64;
        if end > self.len {
            return Err(Error::InsufficientData);
        }

        let mut data = Vec::with_capacity(meta.compressed_len as usize);
        (&mut self.stream)
            .take(meta.compressed_len as u64)
            .read_to_end(&mut data)?;

        Ok(Some(CompressedChunk {
            scheme: meta.compression_scheme,
            data,
        }))
    }

    /// Read the chunk at x, z and decompress it into NBT.
    pub fn read_chunk(&mut self, x: usize, z: usize) -> Result<Option<Vec<u8>>> {
        match self.read_compressed_chunk(x, z)? {
            Some(chunk) => {
                let data = chunk
                    .decompress()
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }
}

/// Various compression schemes that NBT data is typically compressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum CompressionScheme {
    Gzip = 1,
    Zlib = 2,
    Uncompressed = 3,
}

/// A chunk's data as stored in the region file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedChunk {
    pub scheme: CompressionScheme,
    pub data: Vec<u8>,
}

impl CompressedChunk {
    /// Decompress into NBT. Zlib data goes through the lenient inflater, so a
    /// cut off stream gives whatever data came before the cut.
    pub fn decompress(&self) -> std::result::Result<Vec<u8>, ChunkError> {
        match self.scheme {
            CompressionScheme::Zlib => Ok(inflate(&self.data)?),
            CompressionScheme::Gzip => {
                let mut out = Vec::new();
                GzDecoder::new(&self.data[..])
                    .read_to_end(&mut out)
                    .map_err(|e| {
                        ChunkError::new(ChunkErrorKind::Decompression, format!("invalid gzip data: {}", e))
                    })?;
                Ok(out)
            }
            CompressionScheme::Uncompressed => Ok(self.data.clone()),
        }
    }

    /// Decompress, decode and [`extract`] the chunk.
    pub fn decode(
        &self,
        registry: &Registry,
        skip: &SkipList,
    ) -> std::result::Result<ChunkRecord, ChunkError> {
        let data = self.decompress()?;
        let root = from_bytes(&data, skip)?;
        extract(&root, registry)
    }
}

fn header_pos(x: usize, z: usize) -> u64 {
    (4 * ((x % REGION_WIDTH) + (z % REGION_WIDTH) * REGION_WIDTH)) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLocation {
    /// The offset, in units of 4kiB sectors, into the region file this chunk is
    /// located at. Offset 0 is the start of the file.
    pub offset: u64,

    /// The number of 4 kiB sectors that this chunk occupies in the region file.
    pub sectors: u64,
}

/// Encodes how the NBT-Data is compressed
#[derive(Debug)]
struct ChunkMeta {
    pub compressed_len: u32,
    pub compression_scheme: CompressionScheme,
}

impl ChunkMeta {
    fn new(data: &[u8]) -> Result<Self> {
        if data.len() < CHUNK_HEADER_SIZE {
            return Err(Error::InsufficientData);
        }

        let mut buf = &data[..CHUNK_HEADER_SIZE];
        let len = buf.read_u32::<BigEndian>()?;
        let scheme = buf.read_u8()?;
        let scheme = CompressionScheme::try_from(scheme).map_err(|_| Error::InvalidChunkMeta)?;

        Ok(Self {
            // the length includes the compression byte.
            compressed_len: len.saturating_sub(1),
            compression_scheme: scheme,
        })
    }
}

/// Every chunk of one region, decoded or with the reason it couldn't be.
#[derive(Debug, Clone)]
pub struct RegionSummary {
    pub x: i32,
    pub z: i32,
    /// Chunks present in the region, in header order. Positions are absolute
    /// chunk positions.
    pub chunks: Vec<(ChunkPos, std::result::Result<ChunkRecord, ChunkError>)>,
}

impl RegionSummary {
    /// Decode every chunk of the region at region coordinates rx, rz.
    ///
    /// Problems with a chunk are recorded against that chunk and the rest of
    /// the region carries on. Only failing to read the region header is an
    /// error for the whole region.
    pub fn decode<S: Read + Seek>(
        region: &mut Region<S>,
        rx: i32,
        rz: i32,
        registry: &Registry,
        skip: &SkipList,
    ) -> Result<Self> {
        let origin = region_origin(rx, rz).ok_or(Error::RegionOutOfRange(rx, rz))?;
        let mut chunks = Vec::new();

        for z in 0..REGION_WIDTH {
            for x in 0..REGION_WIDTH {
                let pos = ChunkPos::new(origin.x + x as i32, origin.z + z as i32);

                let decoded = match region.read_compressed_chunk(x, z) {
                    Ok(None) => continue,
                    Ok(Some(chunk)) if chunk.data.is_empty() => Err(ChunkError::new(
                        ChunkErrorKind::Missing,
                        "chunk has no data",
                    )),
                    Ok(Some(chunk)) => chunk.decode(registry, skip),
                    Err(e) => Err(chunk_read_error(e)?),
                };

                if let Err(e) = &decoded {
                    debug!("chunk {},{}: {}", pos.x, pos.z, e);
                }
                chunks.push((pos, decoded));
            }
        }

        let summary = Self {
            x: rx,
            z: rz,
            chunks,
        };

        let invalid: Vec<_> = summary.errors().map(|(pos, _)| (pos.x, pos.z)).collect();
        if !invalid.is_empty() {
            warn!(
                "region r.{}.{}.mca: {} of {} chunks could not be read: {:?}",
                rx,
                rz,
                invalid.len(),
                summary.chunks.len(),
                invalid
            );
        }

        Ok(summary)
    }

    pub fn records(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.chunks.iter().filter_map(|(_, c)| c.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = (ChunkPos, &ChunkError)> {
        self.chunks
            .iter()
            .filter_map(|(pos, c)| c.as_ref().err().map(|e| (*pos, e)))
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }
}

/// Position of the first chunk of the region at region coordinates rx, rz.
/// `None` if any chunk of the region would be outside the range of `i32`.
pub fn region_origin(rx: i32, rz: i32) -> Option<ChunkPos> {
    let width = REGION_WIDTH as i32;
    let first = |r: i32| {
        r.checked_mul(width)
            .filter(|first| first.checked_add(width - 1).is_some())
    };
    Some(ChunkPos::new(first(rx)?, first(rz)?))
}

/// Turn an error reading one chunk into that chunk's error. IO failures other
/// than running out of data are a problem with the whole region.
fn chunk_read_error(err: Error) -> Result<ChunkError> {
    Ok(match err {
        Error::InvalidOffset(..) => ChunkError::new(ChunkErrorKind::BadOffset, err.to_string()),
        Error::InsufficientData => ChunkError::new(ChunkErrorKind::Truncated, err.to_string()),
        Error::IO(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            ChunkError::new(ChunkErrorKind::Truncated, err.to_string())
        }
        Error::InvalidChunkMeta => ChunkError::new(
            ChunkErrorKind::InvalidNbt("unknown compression scheme"),
            err.to_string(),
        ),
        Error::IO(_) | Error::RegionOutOfRange(..) => return Err(err),
    })
}
