//! For summarising Minecraft worlds one chunk at a time.
//!
//! A [`Region`] hands out the compressed chunks of an Anvil region file.
//! [`decode_chunk`] turns one into a [`ChunkRecord`] using the skimming decoder
//! from `skimnbt`, and a [`RegionSummary`] does this for a whole region,
//! keeping a per-chunk error rather than giving up on the region. The
//! [`Mapper`]s turn records into one colour per chunk.

pub mod biome;

mod chunk;
mod files;
mod region;
mod render;
mod structure;

pub use biome::{Biome, Registry};
pub use chunk::*;
pub use files::*;
pub use region::*;
pub use render::*;
pub use structure::*;

#[cfg(test)]
mod test;

/// Problems with a region file as a whole, or with locating a chunk in one.
#[derive(Debug)]
pub enum Error {
    /// The file ends before the header or before a chunk it lists.
    InsufficientData,
    IO(std::io::Error),
    /// A chunk position outside of 0..32, or a chunk whose data would start
    /// inside the header or past the end of the file.
    InvalidOffset(isize, isize),
    /// Region coordinates whose chunks do not all have an `i32` position.
    RegionOutOfRange(i32, i32),
    /// The chunk header names an unknown compression scheme.
    InvalidChunkMeta,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IO(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InsufficientData => f.write_str("region file is cut short"),
            Error::IO(e) => write!(f, "io error: {}", e),
            Error::InvalidOffset(x, z) => write!(f, "chunk {}, {} has an invalid location", x, z),
            Error::RegionOutOfRange(x, z) => {
                write!(f, "region {}, {} is out of range of chunk positions", x, z)
            }
            Error::InvalidChunkMeta => f.write_str("unknown chunk compression scheme"),
        }
    }
}

impl std::error::Error for Error {}
