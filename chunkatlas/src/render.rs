use crate::{
    biome::Registry, region_origin, ChunkError, ChunkPos, ChunkRecord, ErrorFlag, RegionSummary,
    REGION_WIDTH,
};

pub type Rgba = [u8; 4];

/// Lowest red intensity [`ActivityMapper`] uses for an inhabited chunk, as a
/// fraction of full.
pub const MIN_ACTIVITY_INTENSITY: f64 = 0.25;

/// Decides the colour of a chunk on a map. The colour depends on that chunk
/// alone, so chunks can be mapped in whatever order they are decoded in.
pub trait Mapper {
    /// The colour of the chunk, or `None` to leave it blank.
    fn colour(&self, chunk: &Result<ChunkRecord, ChunkError>) -> Option<Rgba>;
}

/// Green for readable chunks, otherwise the colour of the error.
pub struct ErrorMapper;

impl Mapper for ErrorMapper {
    fn colour(&self, chunk: &Result<ChunkRecord, ChunkError>) -> Option<Rgba> {
        Some(match chunk {
            Ok(_) => [0, 255, 0, 255],
            Err(e) => match e.flag() {
                ErrorFlag::Missing => [0, 0, 0, 255],
                ErrorFlag::BadOffset => [255, 255, 0, 255],
                ErrorFlag::InvalidNbt => [255, 0, 0, 255],
            },
        })
    }
}

/// The colour of the chunk's most common biome.
pub struct BiomeMapper<'r> {
    registry: &'r Registry,
}

impl<'r> BiomeMapper<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }
}

impl<'r> Mapper for BiomeMapper<'r> {
    fn colour(&self, chunk: &Result<ChunkRecord, ChunkError>) -> Option<Rgba> {
        let code = chunk.as_ref().ok()?.dominant_biome()?;
        self.registry.from_code(code).map(|b| b.colour)
    }
}

/// The colour of the highest priority structure in or referenced from the
/// chunk.
pub struct StructureMapper;

impl Mapper for StructureMapper {
    fn colour(&self, chunk: &Result<ChunkRecord, ChunkError>) -> Option<Rgba> {
        let record = chunk.as_ref().ok()?;
        record
            .structures
            .iter()
            .max_by_key(|s| s.priority())
            .map(|s| s.colour())
    }
}

/// Shades of red by inhabited time. Any inhabited chunk is at least
/// [`MIN_ACTIVITY_INTENSITY`] red, reaching full red at `max_inhabited_time`.
pub struct ActivityMapper {
    max_inhabited_time: u64,
}

impl ActivityMapper {
    pub fn new(max_inhabited_time: u64) -> Self {
        Self { max_inhabited_time }
    }

    /// Scale against the most inhabited chunk of these summaries.
    pub fn for_summaries<'a>(summaries: impl IntoIterator<Item = &'a RegionSummary>) -> Self {
        let max = summaries
            .into_iter()
            .flat_map(|s| s.records())
            .map(|r| r.inhabited_time)
            .max()
            .unwrap_or(0);
        Self::new(max)
    }
}

impl Mapper for ActivityMapper {
    fn colour(&self, chunk: &Result<ChunkRecord, ChunkError>) -> Option<Rgba> {
        let record = chunk.as_ref().ok()?;
        if record.inhabited_time == 0 || self.max_inhabited_time == 0 {
            return None;
        }

        let fraction = (record.inhabited_time as f64 / self.max_inhabited_time as f64).min(1.0);
        let intensity = MIN_ACTIVITY_INTENSITY + (1.0 - MIN_ACTIVITY_INTENSITY) * fraction;
        Some([(intensity * 255.0).round() as u8, 0, 0, 255])
    }
}

/// Colours [`RecentMapper`] fades through, most recently updated first.
pub const RECENT_COLOURS: [Rgba; 6] = [
    [255, 255, 0, 255],
    [255, 0, 0, 255],
    [255, 0, 255, 255],
    [0, 255, 0, 255],
    [0, 255, 255, 255],
    [0, 0, 255, 255],
];

/// Colours chunks by when they were last saved. The latest update is yellow,
/// fading through [`RECENT_COLOURS`] to blue at the earliest. Chunks that were
/// never updated are left blank.
pub struct RecentMapper {
    earliest_update: i64,
    latest_update: i64,
}

impl RecentMapper {
    pub fn new(earliest_update: i64, latest_update: i64) -> Self {
        Self {
            earliest_update,
            latest_update,
        }
    }

    /// Scale between the earliest and latest updated chunks of these
    /// summaries.
    pub fn for_summaries<'a>(summaries: impl IntoIterator<Item = &'a RegionSummary>) -> Self {
        let (earliest, latest) = summaries
            .into_iter()
            .flat_map(|s| s.records())
            .map(|r| r.last_update)
            .filter(|&t| t != 0)
            .fold((i64::MAX, i64::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));

        if earliest > latest {
            Self::new(0, 0)
        } else {
            Self::new(earliest, latest)
        }
    }
}

impl Mapper for RecentMapper {
    fn colour(&self, chunk: &Result<ChunkRecord, ChunkError>) -> Option<Rgba> {
        let record = chunk.as_ref().ok()?;
        if record.last_update == 0 {
            return None;
        }

        let span = self.latest_update as f64 - self.earliest_update as f64;
        let age = if span > 0.0 {
            ((self.latest_update as f64 - record.last_update as f64) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let steps = (RECENT_COLOURS.len() - 1) as f64;
        let scaled = age * steps;
        let i = (scaled.floor() as usize).min(RECENT_COLOURS.len() - 2);
        let (from, to) = (RECENT_COLOURS[i], RECENT_COLOURS[i + 1]);
        let t = scaled - i as f64;

        let mut colour = [0u8, 0, 0, 255];
        for ((out, a), b) in colour.iter_mut().zip(from).zip(to).take(3) {
            *out = (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        }
        Some(colour)
    }
}

/// One value per chunk of a region.
pub struct RegionMap<T> {
    pub data: Vec<T>,
    pub x: i32,
    pub z: i32,
}

impl<T: Clone> RegionMap<T> {
    pub fn new(x: i32, z: i32, default: T) -> Self {
        Self {
            data: vec![default; REGION_WIDTH * REGION_WIDTH],
            x,
            z,
        }
    }

    /// The value for a chunk, by its position within the region.
    pub fn chunk(&self, x: usize, z: usize) -> &T {
        debug_assert!(x < REGION_WIDTH && z < REGION_WIDTH);
        &self.data[z * REGION_WIDTH + x]
    }

    pub fn chunk_mut(&mut self, x: usize, z: usize) -> &mut T {
        debug_assert!(x < REGION_WIDTH && z < REGION_WIDTH);
        &mut self.data[z * REGION_WIDTH + x]
    }

    /// Position within this region of an absolute chunk position, if it lies
    /// in the region.
    pub fn local(&self, pos: ChunkPos) -> Option<(usize, usize)> {
        let width = REGION_WIDTH as i32;
        let origin = region_origin(self.x, self.z)?;
        let (x, z) = (pos.x.checked_sub(origin.x)?, pos.z.checked_sub(origin.z)?);
        if (0..width).contains(&x) && (0..width).contains(&z) {
            Some((x as usize, z as usize))
        } else {
            None
        }
    }
}

/// Colour every chunk of a region. Chunks the mapper leaves blank, and chunks
/// the region doesn't have, are transparent.
pub fn render_region(summary: &RegionSummary, mapper: &impl Mapper) -> RegionMap<Rgba> {
    let mut map = RegionMap::new(summary.x, summary.z, [0u8; 4]);

    for (pos, chunk) in &summary.chunks {
        let colour = match mapper.colour(chunk) {
            Some(colour) => colour,
            None => continue,
        };

        if let Some((x, z)) = map.local(*pos) {
            *map.chunk_mut(x, z) = colour;
        }
    }

    map
}
