use log::warn;
use serde::Serialize;

use crate::Rgba;

/// Kinds of generated structure recorded in chunk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    Mineshaft,
    Village,
    #[serde(rename = "endcity")]
    EndCity,
    Fortress,
    Monument,
    Mansion,
    Stronghold,
    DesertPyramid,
    JunglePyramid,
    PillagerOutpost,
    SwampHut,
    Igloo,
    OceanRuin,
    Shipwreck,
    BuriedTreasure,
    Unknown,
}

impl Structure {
    pub const ALL: [Structure; 16] = [
        Structure::Mineshaft,
        Structure::Village,
        Structure::EndCity,
        Structure::Fortress,
        Structure::Monument,
        Structure::Mansion,
        Structure::Stronghold,
        Structure::DesertPyramid,
        Structure::JunglePyramid,
        Structure::PillagerOutpost,
        Structure::SwampHut,
        Structure::Igloo,
        Structure::OceanRuin,
        Structure::Shipwreck,
        Structure::BuriedTreasure,
        Structure::Unknown,
    ];

    /// The name the structure goes by in chunk NBT, lowercased.
    pub fn nbt_name(self) -> &'static str {
        match self {
            Structure::Mineshaft => "mineshaft",
            Structure::Village => "village",
            Structure::EndCity => "endcity",
            Structure::Fortress => "fortress",
            Structure::Monument => "monument",
            Structure::Mansion => "mansion",
            Structure::Stronghold => "stronghold",
            Structure::DesertPyramid => "desert_pyramid",
            Structure::JunglePyramid => "jungle_pyramid",
            Structure::PillagerOutpost => "pillager_outpost",
            Structure::SwampHut => "swamp_hut",
            Structure::Igloo => "igloo",
            Structure::OceanRuin => "ocean_ruin",
            Structure::Shipwreck => "shipwreck",
            Structure::BuriedTreasure => "buried_treasure",
            Structure::Unknown => "unknown",
        }
    }

    /// Which structure to show when several share a chunk. Higher wins, and
    /// small structures are ranked above the large ones they tend to sit
    /// inside of.
    pub fn priority(self) -> i32 {
        match self {
            Structure::Mineshaft => 0,
            Structure::Village => 1,
            Structure::EndCity => 2,
            Structure::Fortress => 3,
            Structure::Monument => 4,
            Structure::Mansion => 5,
            Structure::Stronghold => 6,
            Structure::DesertPyramid => 7,
            Structure::JunglePyramid => 8,
            Structure::PillagerOutpost => 9,
            Structure::SwampHut => 10,
            Structure::Igloo => 11,
            Structure::OceanRuin => 12,
            Structure::Shipwreck => 13,
            Structure::BuriedTreasure => 14,
            Structure::Unknown => -1,
        }
    }

    pub fn colour(self) -> Rgba {
        match self {
            Structure::Mineshaft => [0x85, 0x06, 0x03, 255],
            Structure::Village => [0xb1, 0xae, 0xae, 255],
            Structure::EndCity => [0xe5, 0xd7, 0xd7, 255],
            Structure::Fortress => [0xa0, 0x4e, 0x44, 255],
            Structure::Monument => [0x00, 0xe2, 0xaa, 255],
            Structure::Mansion => [0xae, 0x5c, 0x28, 255],
            Structure::Stronghold => [0xa3, 0x0c, 0xcc, 255],
            Structure::DesertPyramid => [0xd0, 0xff, 0x00, 255],
            Structure::JunglePyramid => [0x51, 0x5f, 0x49, 255],
            Structure::PillagerOutpost => [0x9d, 0x97, 0x09, 255],
            Structure::SwampHut => [0x05, 0x4c, 0x3e, 255],
            Structure::Igloo => [0x0d, 0xe0, 0xec, 255],
            Structure::OceanRuin => [0x00, 0x0d, 0x55, 255],
            Structure::Shipwreck => [0x5c, 0x25, 0x3e, 255],
            Structure::BuriedTreasure => [0xff, 0xb6, 0x00, 255],
            Structure::Unknown => [0, 0, 0, 255],
        }
    }

    /// Find the structure a chunk's `Starts` or `References` key refers to.
    ///
    /// Matching ignores case and any `namespace:` prefix. Names that are not
    /// an exact match take the longest known name they contain, so
    /// `village_plains` is a [`Structure::Village`]. Anything else is
    /// [`Structure::Unknown`].
    pub fn parse(name: &str) -> Structure {
        let bare = name.rsplit(':').next().unwrap_or(name).to_lowercase();
        let known = Self::ALL.iter().filter(|s| **s != Structure::Unknown);

        if let Some(s) = known.clone().find(|s| s.nbt_name() == bare) {
            return *s;
        }

        match known
            .filter(|s| bare.contains(s.nbt_name()))
            .max_by_key(|s| s.nbt_name().len())
        {
            Some(s) => *s,
            None => {
                warn!("unrecognised structure type {:?}", name);
                Structure::Unknown
            }
        }
    }
}

impl std::fmt::Display for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.nbt_name())
    }
}
