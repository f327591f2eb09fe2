use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Region, Result};

/// Finds and opens the region files of a world's region directory, named
/// `r.<x>.<z>.mca`.
pub struct RegionFileLoader {
    region_dir: PathBuf,
}

impl RegionFileLoader {
    pub fn new(region_dir: PathBuf) -> Self {
        Self { region_dir }
    }

    pub fn path(&self, x: i32, z: i32) -> PathBuf {
        self.region_dir.join(format!("r.{}.{}.mca", x, z))
    }

    pub fn has_region(&self, x: i32, z: i32) -> bool {
        self.path(x, z).exists()
    }

    /// Open the region at region coordinates x, z, if it exists.
    pub fn region(&self, x: i32, z: i32) -> Result<Option<Region<File>>> {
        let file = match File::open(self.path(x, z)) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::IO(e)),
        };

        Ok(Some(Region::from_stream(file)?))
    }

    /// Every non-empty region file in the directory, with its coordinates.
    pub fn list(&self) -> Result<Vec<(i32, i32, PathBuf)>> {
        let mut regions: Vec<_> = fs::read_dir(&self.region_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().map_or(false, |ext| ext == "mca"))
            .filter(|path| fs::metadata(path).map_or(false, |m| m.len() > 0))
            .filter_map(|path| coords_from_region(&path).map(|(x, z)| (x, z, path)))
            .collect();

        regions.sort();
        Ok(regions)
    }
}

/// Region coordinates from a region file name like `r.-1.3.mca`.
pub fn coords_from_region(region: &Path) -> Option<(i32, i32)> {
    let filename = region.file_name()?.to_str()?;
    let mut parts = filename.split('.');
    if parts.next()? != "r" {
        return None;
    }

    let x = parts.next()?.parse::<i32>().ok()?;
    let z = parts.next()?.parse::<i32>().ok()?;
    match (parts.next(), parts.next()) {
        (Some("mca"), None) => Some((x, z)),
        _ => None,
    }
}
