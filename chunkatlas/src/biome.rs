//! Biomes, and the registry that maps the codes and names found in chunk data
//! to them.
//!
//! A [`Registry`] never changes once built. Adding biome definitions on top of
//! an existing registry with [`Registry::merge`] produces a new registry,
//! along with the [`Collision`]s that had to be resolved to do it.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Rgba;

/// Biome codes and map colours for worlds from 1.13 up to 1.17, which store
/// biomes as numeric codes.
const VANILLA: [(i32, &str, &str, Rgba); 75] = [
    (0, "OCEAN", "Ocean", [0x1f, 0x27, 0x99, 255]),
    (24, "DEEP_OCEAN", "Deep Ocean", [0x14, 0x1a, 0x66, 255]),
    (10, "FROZEN_OCEAN", "Frozen Ocean", [0x52, 0x5f, 0x66, 255]),
    (50, "DEEP_FROZEN_OCEAN", "Deep Frozen Ocean", [0x29, 0x2f, 0x33, 255]),
    (46, "COLD_OCEAN", "Cold Ocean", [0x5c, 0x60, 0x99, 255]),
    (49, "DEEP_COLD_OCEAN", "Deep Cold Ocean", [0x3d, 0x40, 0x66, 255]),
    (45, "LUKEWARM_OCEAN", "Lukewarm Ocean", [0x1f, 0x6c, 0x99, 255]),
    (48, "DEEP_LUKEWARM_OCEAN", "Deep Lukewarm Ocean", [0x14, 0x48, 0x66, 255]),
    (44, "WARM_OCEAN", "Warm Ocean", [0x52, 0xcc, 0xc8, 255]),
    (47, "DEEP_WARM_OCEAN", "Deep Warm Ocean", [0x3d, 0x99, 0x96, 255]),
    (7, "RIVER", "River", [0x7a, 0xae, 0xcc, 255]),
    (11, "FROZEN_RIVER", "Frozen River", [0x99, 0xda, 0xff, 255]),
    (16, "BEACH", "Beach", [0xa3, 0xa6, 0xcc, 255]),
    (25, "STONE_SHORE", "Stone Shore", [0x33, 0x31, 0x29, 255]),
    (26, "SNOWY_BEACH", "Snowy Beach", [0xcc, 0xcf, 0xff, 255]),
    (4, "FOREST", "Forest", [0x29, 0x33, 0x29, 255]),
    (18, "WOODED_HILLS", "Wooded Hills", [0x52, 0x66, 0x52, 255]),
    (132, "FLOWER_FOREST", "Flower Forest", [0x8c, 0x00, 0xff, 255]),
    (27, "BIRCH_FOREST", "Birch Forest", [0x66, 0x5a, 0x52, 255]),
    (28, "BIRCH_FOREST_HILLS", "Birch Forest Hills", [0x99, 0x87, 0x7a, 255]),
    (155, "TALL_BIRCH_FOREST", "Tall Birch Forest", [0xcc, 0xb4, 0xa3, 255]),
    (156, "TALL_BIRCH_HILLS", "Tall Birch Hills", [0xff, 0xe0, 0xcc, 255]),
    (29, "DARK_FOREST", "Dark Forest", [0x1f, 0x33, 0x1f, 255]),
    (157, "DARK_FOREST_HILLS", "Dark Forest Hills", [0x3d, 0x66, 0x3d, 255]),
    (21, "JUNGLE", "Jungle", [0x5a, 0x66, 0x29, 255]),
    (22, "JUNGLE_HILLS", "Jungle Hills", [0x87, 0x99, 0x3d, 255]),
    (149, "MODIFIED_JUNGLE", "Modified Jungle", [0xb4, 0xcc, 0x52, 255]),
    (23, "JUNGLE_EDGE", "Jungle Edge", [0x93, 0x99, 0x7a, 255]),
    (151, "MODIFIED_JUNGLE_EDGE", "Modified Jungle Edge", [0xc4, 0xcc, 0xa3, 255]),
    (168, "BAMBOO_JUNGLE", "Bamboo Jungle", [0x52, 0x66, 0x00, 255]),
    (169, "BAMBOO_JUNGLE_HILLS", "Bamboo Jungle Hills", [0x7a, 0x99, 0x00, 255]),
    (5, "TAIGA", "Taiga", [0x5e, 0x3d, 0x66, 255]),
    (19, "TAIGA_HILLS", "Taiga Hills", [0x8d, 0x5c, 0x99, 255]),
    (133, "TAIGA_MOUNTAINS", "Taiga Mountains", [0xcc, 0xa3, 0xb4, 255]),
    (30, "SNOWY_TAIGA", "Snowy Taiga", [0xba, 0xa3, 0xcc, 255]),
    (31, "SNOWY_TAIGA_HILLS", "Snowy Taiga Hills", [0xe8, 0xcc, 0xff, 255]),
    (158, "SNOWY_TAIGA_MOUNTAINS", "Snowy Taiga Mountains", [0xff, 0xcc, 0xe0, 255]),
    (32, "GIANT_TREE_TAIGA", "Giant Tree Taiga", [0x31, 0x29, 0x33, 255]),
    (33, "GIANT_TREE_TAIGA_HILLS", "Giant Tree Taiga Hills", [0x62, 0x52, 0x66, 255]),
    (160, "GIANT_SPRUCE_TAIGA", "Giant Spruce Taiga", [0x66, 0x3d, 0x4e, 255]),
    (161, "GIANT_SPRUCE_TAIGA_HILLS", "Giant Spruce Taiga Hills", [0x99, 0x5c, 0x74, 255]),
    (14, "MUSHROOM_FIELDS", "Mushroom Fields", [0x66, 0x00, 0x52, 255]),
    (15, "MUSHROOM_FIELDS_SHORE", "Mushroom Fields Shore", [0x99, 0x00, 0x7a, 255]),
    (6, "SWAMP", "Swamp", [0x00, 0x33, 0x31, 255]),
    (134, "SWAMP_HILLS", "Swamp Hills", [0x00, 0x66, 0x63, 255]),
    (35, "SAVANNA", "Savanna", [0xcc, 0x52, 0x00, 255]),
    (36, "SAVANNA_PLATEAU", "Savanna Plateau", [0xcc, 0x9b, 0x7a, 255]),
    (163, "SHATTERED_SAVANNA", "Shattered Savanna", [0xff, 0x66, 0x00, 255]),
    (164, "SHATTERED_SAVANNA_PLATEAU", "Shattered Savanna Plateau", [0xff, 0xc2, 0x99, 255]),
    (1, "PLAINS", "Plains", [0xcc, 0xff, 0x00, 255]),
    (129, "SUNFLOWER_PLAINS", "Sunflower Plains", [0xe0, 0xff, 0x66, 255]),
    (2, "DESERT", "Desert", [0x99, 0x7a, 0x00, 255]),
    (17, "DESERT_HILLS", "Desert Hills", [0xff, 0xcc, 0x00, 255]),
    (130, "DESERT_LAKES", "Desert Lakes", [0xf5, 0xff, 0xcc, 255]),
    (12, "SNOWY_TUNDRA", "Snowy Tundra", [0x7a, 0x99, 0x98, 255]),
    (13, "SNOWY_MOUNTAINS", "Snowy Mountains", [0xa3, 0xbd, 0xcc, 255]),
    (140, "ICE_SPIKES", "Ice Spikes", [0xcc, 0xff, 0xfd, 255]),
    (3, "MOUNTAINS", "Mountains", [0x66, 0x5e, 0x3d, 255]),
    (34, "WOODED_MOUNTAINS", "Wooded Mountains", [0x99, 0x8d, 0x5c, 255]),
    (131, "GRAVELLY_MOUNTAINS", "Gravelly Mountains", [0x99, 0x93, 0x7a, 255]),
    (162, "MODIFIED_GRAVELLY_MOUNTAINS", "Modified Gravelly Mountains", [0xcc, 0xc4, 0xa3, 255]),
    (20, "MOUNTAIN_EDGE", "Mountain Edge", [0xff, 0xf5, 0xcc, 255]),
    (37, "BADLANDS", "Badlands", [0x66, 0x29, 0x29, 255]),
    (39, "BADLANDS_PLATEAU", "Badlands Plateau", [0xcc, 0x7a, 0x7a, 255]),
    (167, "MODIFIED_BADLANDS_PLATEAU", "Modified Badlands Plateau", [0xff, 0x99, 0x99, 255]),
    (38, "WOODED_BADLANDS_PLATEAU", "Wooded Badlands Plateau", [0x99, 0x3d, 0x3d, 255]),
    (166, "MODIFIED_WOODED_BADLANDS_PLATEAU", "Modified Wooded Badlands Plateau", [0xff, 0x66, 0x66, 255]),
    (165, "ERODED_BADLANDS", "Eroded Badlands", [0xcc, 0x00, 0x00, 255]),
    (8, "NETHER", "Nether", [0xff, 0x00, 0x00, 255]),
    (9, "THE_END", "The End", [0xcc, 0x00, 0x52, 255]),
    (40, "SMALL_END_ISLANDS", "Small End Islands", [0x66, 0x00, 0x29, 255]),
    (41, "END_MIDLANDS", "End Midlands", [0x99, 0x00, 0x3d, 255]),
    (42, "END_HIGHLANDS", "End Highlands", [0xff, 0x00, 0x66, 255]),
    (43, "END_BARRENS", "End Barrens", [0x33, 0x00, 0x14, 255]),
    (127, "THE_VOID", "The Void", [0x33, 0x0a, 0x1b, 255]),
];

static VANILLA_REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();
    for (code, name, display_name, colour) in VANILLA {
        registry.insert(Biome {
            code,
            name: name.to_owned(),
            display_name: display_name.to_owned(),
            colour,
            texture: None,
        });
    }
    registry
});

static NUMBERED_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*_)(\d+)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Biome {
    pub code: i32,
    pub name: String,
    pub display_name: String,
    pub colour: Rgba,
    pub texture: Option<String>,
}

/// A biome definition as found in a biome definitions file, which is a JSON
/// object keyed by biome name:
///
/// ```json
/// {
///     "CHERRY_GROVE": { "id": "185", "color": "#ffb7c5", "formattedName": "Cherry Grove" },
///     "PALE_GARDEN": { "color": "696d6a", "formattedName": "Pale Garden", "texture": "pale.png" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BiomeDef {
    #[serde(default)]
    pub id: Option<BiomeId>,
    pub color: String,
    #[serde(rename = "formattedName")]
    pub formatted_name: String,
    #[serde(default)]
    pub texture: Option<String>,
}

/// Definitions files have written ids both as strings and as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BiomeId {
    Code(i32),
    Text(String),
}

#[derive(Debug)]
pub enum RegistryError {
    Json(serde_json::Error),
    InvalidColour { biome: String, colour: String },
    InvalidId { biome: String, id: String },
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Json(err)
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Json(e) => write!(f, "invalid biome definitions: {}", e),
            RegistryError::InvalidColour { biome, colour } => {
                write!(f, "invalid colour {:?} for biome {}", colour, biome)
            }
            RegistryError::InvalidId { biome, id } => {
                write!(f, "invalid id {:?} for biome {}", id, biome)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// A conflict resolved while merging definitions into a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    /// A new biome took a code that was already in use. The old biome is gone.
    CodeReplaced {
        code: i32,
        old: String,
        new: String,
    },
    /// A new biome had the name of an existing one, and was renamed.
    Renamed { code: i32, from: String, to: String },
}

/// The result of [`Registry::merge`].
#[derive(Debug, Clone)]
pub struct Merge {
    pub registry: Registry,
    pub collisions: Vec<Collision>,
}

/// The biomes known by code and by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    by_code: BTreeMap<i32, Biome>,
    names: HashMap<String, i32>,
}

impl Registry {
    /// The built-in numeric biomes.
    pub fn vanilla() -> &'static Registry {
        &VANILLA_REGISTRY
    }

    /// Build a registry out of a definitions file alone.
    pub fn from_json(json: &str) -> Result<Registry, RegistryError> {
        Self::from_defs(parse_defs(json)?)
    }

    pub fn from_defs<I>(defs: I) -> Result<Registry, RegistryError>
    where
        I: IntoIterator<Item = (String, BiomeDef)>,
    {
        Ok(Registry::default().merge(defs)?.registry)
    }

    /// Add definitions on top of this registry, in order, giving a new
    /// registry.
    ///
    /// A definition without an id gets the next unused negative code. One
    /// whose id is already taken replaces the biome that had it. One whose
    /// name is already taken is renamed, `NAME` to `NAME_2` and `NAME_n` to
    /// `NAME_{n+1}`, until the name is free.
    pub fn merge<I>(&self, defs: I) -> Result<Merge, RegistryError>
    where
        I: IntoIterator<Item = (String, BiomeDef)>,
    {
        let mut registry = self.clone();
        let mut collisions = Vec::new();

        for (name, def) in defs {
            let colour = parse_colour(&name, &def.color)?;
            let code = match def.id {
                Some(id) => parse_id(&name, id)?,
                None => registry.next_free_code(),
            };

            if let Some(old) = registry.remove(code) {
                warn!(
                    "biome {} already has id {}, replacing it with {}",
                    old.name, code, name
                );
                collisions.push(Collision::CodeReplaced {
                    code,
                    old: old.name,
                    new: name.clone(),
                });
            }

            let mut name = name;
            while let Some(existing) = registry.names.get(&name) {
                let renamed = next_name(&name);
                warn!(
                    "a biome named {} already exists with id {}, biome with id {} will be renamed to {}",
                    name, existing, code, renamed
                );
                collisions.push(Collision::Renamed {
                    code,
                    from: name,
                    to: renamed.clone(),
                });
                name = renamed;
            }

            registry.insert(Biome {
                code,
                name,
                display_name: def.formatted_name,
                colour,
                texture: def.texture,
            });
        }

        Ok(Merge {
            registry,
            collisions,
        })
    }

    pub fn from_code(&self, code: i32) -> Option<&Biome> {
        self.by_code.get(&code)
    }

    pub fn by_name(&self, name: &str) -> Option<&Biome> {
        self.names.get(name).and_then(|code| self.by_code.get(code))
    }

    /// Find the biome best matching a biome name as newer chunks store them,
    /// eg `minecraft:old_growth_birch_forest`.
    ///
    /// The namespace is dropped and the rest uppercased. If that is not the
    /// name of a biome, the biome with the longest name contained in it is
    /// picked.
    pub fn closest_match(&self, name: &str) -> Option<&Biome> {
        let bare = name.rsplit(':').next().unwrap_or(name).to_uppercase();

        self.by_name(&bare).or_else(|| {
            self.by_code
                .values()
                .filter(|b| bare.contains(b.name.as_str()))
                .max_by_key(|b| b.name.len())
        })
    }

    /// Biomes in order of code.
    pub fn iter(&self) -> impl Iterator<Item = &Biome> {
        self.by_code.values()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    fn insert(&mut self, biome: Biome) {
        self.names.insert(biome.name.clone(), biome.code);
        self.by_code.insert(biome.code, biome);
    }

    fn remove(&mut self, code: i32) -> Option<Biome> {
        let old = self.by_code.remove(&code)?;
        self.names.remove(&old.name);
        Some(old)
    }

    fn next_free_code(&self) -> i32 {
        let mut code = -1;
        while self.by_code.contains_key(&code) {
            code -= 1;
        }
        code
    }
}

/// Parse a definitions file, keeping the order of its definitions.
pub fn parse_defs(json: &str) -> Result<IndexMap<String, BiomeDef>, RegistryError> {
    Ok(serde_json::from_str(json)?)
}

fn parse_id(biome: &str, id: BiomeId) -> Result<i32, RegistryError> {
    match id {
        BiomeId::Code(code) => Ok(code),
        BiomeId::Text(text) => text.trim().parse().map_err(|_| RegistryError::InvalidId {
            biome: biome.to_owned(),
            id: text,
        }),
    }
}

/// Parse `#rrggbb` or `rrggbb` into an opaque colour.
pub fn parse_colour(biome: &str, colour: &str) -> Result<Rgba, RegistryError> {
    let invalid = || RegistryError::InvalidColour {
        biome: biome.to_owned(),
        colour: colour.to_owned(),
    };

    let hex = colour.strip_prefix('#').unwrap_or(colour);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?, 255])
}

fn next_name(name: &str) -> String {
    let numbered = NUMBERED_NAME.captures(name).and_then(|caps| {
        let n: u32 = caps[2].parse().ok()?;
        Some(format!("{}{}", &caps[1], n.checked_add(1)?))
    });

    numbered.unwrap_or_else(|| format!("{}_2", name))
}
