//! Shared pieces of the command line tools: finding region files and
//! gathering region summaries into a report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chunkatlas::{coords_from_region, ErrorFlag, RegionFileLoader, RegionSummary, Registry, Structure};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Debug)]
pub struct ErrorMessage(pub String);

impl std::error::Error for ErrorMessage {}

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Region files named by the given paths. Directories contribute every
/// region file in them.
pub fn region_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<(i32, i32, PathBuf)>> {
    let mut files = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            files.extend(RegionFileLoader::new(path.to_path_buf()).list()?);
        } else {
            let (x, z) = coords_from_region(path).ok_or_else(|| {
                ErrorMessage(format!("{} is not named like a region file", path.display()))
            })?;
            files.push((x, z, path.to_path_buf()));
        }
    }

    Ok(files)
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RegionReport {
    pub x: i32,
    pub z: i32,
    pub chunks: usize,
    pub errors: usize,
    pub errors_by_flag: BTreeMap<ErrorFlag, usize>,
    pub max_inhabited_time: u64,
    /// Earliest and latest `LastUpdate` of the region's chunks, ignoring
    /// chunks never updated.
    pub earliest_update: Option<i64>,
    pub latest_update: Option<i64>,
}

impl RegionReport {
    pub fn from_summary(summary: &RegionSummary) -> Self {
        let mut errors_by_flag = BTreeMap::new();
        for (_, e) in summary.errors() {
            *errors_by_flag.entry(e.flag()).or_insert(0) += 1;
        }

        Self {
            x: summary.x,
            z: summary.z,
            chunks: summary.chunks.len(),
            errors: summary.error_count(),
            errors_by_flag,
            max_inhabited_time: summary
                .records()
                .map(|r| r.inhabited_time)
                .max()
                .unwrap_or(0),
            earliest_update: updates(summary).min(),
            latest_update: updates(summary).max(),
        }
    }
}

fn updates(summary: &RegionSummary) -> impl Iterator<Item = i64> + '_ {
    summary.records().map(|r| r.last_update).filter(|&t| t != 0)
}

/// Totals over every region summarised.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub regions: Vec<RegionReport>,
    pub failed_regions: Vec<String>,
    pub chunks: usize,
    pub errors: usize,
    pub errors_by_flag: BTreeMap<ErrorFlag, usize>,
    /// Biome occurrences by biome name.
    pub biomes: BTreeMap<String, u64>,
    /// Number of chunks each structure appears in.
    pub structures: BTreeMap<Structure, usize>,
    pub max_inhabited_time: u64,
    pub earliest_update: Option<i64>,
    pub latest_update: Option<i64>,
}

impl Report {
    pub fn add(&mut self, summary: &RegionSummary, registry: &Registry) {
        let region = RegionReport::from_summary(summary);

        self.chunks += region.chunks;
        self.errors += region.errors;
        for (flag, n) in &region.errors_by_flag {
            *self.errors_by_flag.entry(*flag).or_insert(0) += n;
        }
        self.max_inhabited_time = self.max_inhabited_time.max(region.max_inhabited_time);
        self.earliest_update = match (self.earliest_update, region.earliest_update) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.latest_update = self.latest_update.max(region.latest_update);

        for record in summary.records() {
            for (code, n) in &record.biomes {
                let name = match registry.from_code(*code) {
                    Some(biome) => biome.name.clone(),
                    None => code.to_string(),
                };
                *self.biomes.entry(name).or_insert(0) += *n as u64;
            }

            for s in &record.structures {
                *self.structures.entry(*s).or_insert(0) += 1;
            }
        }

        self.regions.push(region);
    }

    pub fn add_failure(&mut self, path: &Path) {
        self.failed_regions.push(path.display().to_string());
    }

    /// Regions arrive in whatever order they finish in. Sort them for output.
    pub fn finish(mut self) -> Self {
        self.regions.sort_by_key(|r| (r.x, r.z));
        self.failed_regions.sort();
        self
    }
}
