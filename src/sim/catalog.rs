//! Spawnable item catalog
//!
//! Built once at startup from a manifest and injected into the controller.

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::TuningError;

/// Item category. Decides the score awarded and whether expiry costs the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnCategory {
    MetalWaste,
    PlasticWaste,
    OrganicWaste,
    ElectronicWaste,
    HazardousWaste,
    InertWaste,
    Animal,
}

impl SpawnCategory {
    pub const ALL: [SpawnCategory; 7] = [
        SpawnCategory::MetalWaste,
        SpawnCategory::PlasticWaste,
        SpawnCategory::OrganicWaste,
        SpawnCategory::ElectronicWaste,
        SpawnCategory::HazardousWaste,
        SpawnCategory::InertWaste,
        SpawnCategory::Animal,
    ];

    /// Points awarded for clearing an item of this category
    pub fn points(self) -> u64 {
        match self {
            SpawnCategory::MetalWaste
            | SpawnCategory::PlasticWaste
            | SpawnCategory::OrganicWaste
            | SpawnCategory::ElectronicWaste => 1,
            SpawnCategory::HazardousWaste => 2,
            SpawnCategory::Animal => 3,
            SpawnCategory::InertWaste => 0,
        }
    }

    /// Inert items may expire without ending the match
    pub fn is_inert(self) -> bool {
        self == SpawnCategory::InertWaste
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnCategory::MetalWaste => "Metal Waste",
            SpawnCategory::PlasticWaste => "Plastic Waste",
            SpawnCategory::OrganicWaste => "Organic Waste",
            SpawnCategory::ElectronicWaste => "Electronic Waste",
            SpawnCategory::HazardousWaste => "Hazardous Waste",
            SpawnCategory::InertWaste => "Inert Waste",
            SpawnCategory::Animal => "Animal",
        }
    }
}

fn default_min_level() -> u32 {
    1
}

/// One kind of spawnable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    pub id: String,
    pub category: SpawnCategory,
    /// First level this archetype may spawn at
    #[serde(default = "default_min_level")]
    pub min_level: u32,
}

impl Archetype {
    pub fn new(id: &str, category: SpawnCategory, min_level: u32) -> Self {
        Self {
            id: id.to_string(),
            category,
            min_level,
        }
    }
}

/// Serialized catalog description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogManifest {
    pub archetypes: Vec<Archetype>,
    /// Category -> model asset ids
    pub models: BTreeMap<SpawnCategory, Vec<String>>,
}

impl CatalogManifest {
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Built-in catalog shipped with the game
    pub fn builtin() -> Self {
        use SpawnCategory::*;

        let archetypes = vec![
            Archetype::new("soda_can", MetalWaste, 1),
            Archetype::new("water_bottle", PlasticWaste, 1),
            Archetype::new("apple_core", OrganicWaste, 1),
            Archetype::new("old_phone", ElectronicWaste, 2),
            Archetype::new("brick", InertWaste, 2),
            Archetype::new("battery", HazardousWaste, 3),
            Archetype::new("sea_turtle", Animal, 4),
        ];

        let table: [(SpawnCategory, &[&str]); 7] = [
            (MetalWaste, &["metal/can_a", "metal/can_b", "metal/tin"]),
            (PlasticWaste, &["plastic/bottle", "plastic/bag", "plastic/cup"]),
            (OrganicWaste, &["organic/apple_core", "organic/banana_peel"]),
            (ElectronicWaste, &["electronic/phone", "electronic/keyboard"]),
            (HazardousWaste, &["hazardous/battery", "hazardous/paint_can"]),
            (InertWaste, &["inert/brick", "inert/tile"]),
            (Animal, &["animal/turtle", "animal/gull"]),
        ];
        let models = table
            .into_iter()
            .map(|(cat, ids)| (cat, ids.iter().map(|s| s.to_string()).collect()))
            .collect();

        Self { archetypes, models }
    }
}

/// Archetypes eligible to spawn at one level, in catalog order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpawnPool {
    pub level: u32,
    pub members: Vec<Archetype>,
}

impl SpawnPool {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, archetype_id: &str) -> bool {
        self.members.iter().any(|a| a.id == archetype_id)
    }

    /// Uniform pick, `None` on an empty pool
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<&Archetype> {
        if self.members.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.members.len());
        self.members.get(index)
    }
}

/// Item catalog used at runtime
#[derive(Debug, Clone)]
pub struct Catalog {
    archetypes: Vec<Archetype>,
    models: BTreeMap<SpawnCategory, Vec<String>>,
}

impl Catalog {
    /// Build the runtime catalog. Categories without models are reported but
    /// kept; their items spawn without a model.
    pub fn from_manifest(manifest: CatalogManifest) -> Self {
        let CatalogManifest {
            mut archetypes,
            models,
        } = manifest;

        for archetype in &mut archetypes {
            if archetype.min_level == 0 {
                log::warn!("Archetype {} has min_level 0; treating as 1", archetype.id);
                archetype.min_level = 1;
            }
        }

        for category in SpawnCategory::ALL {
            if models.get(&category).is_none_or(|m| m.is_empty()) {
                log::error!("{} has no models", category.as_str());
            }
        }

        Self { archetypes, models }
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Archetypes whose `min_level <= level`
    pub fn spawn_pool(&self, level: u32) -> SpawnPool {
        let members: Vec<Archetype> = self
            .archetypes
            .iter()
            .filter(|a| a.min_level <= level)
            .cloned()
            .collect();
        log::debug!("Current spawn pool size: {}", members.len());
        SpawnPool { level, members }
    }

    /// Uniform model pick for a category
    pub fn pick_model<R: Rng>(&self, category: SpawnCategory, rng: &mut R) -> Option<&str> {
        let models = self.models.get(&category)?;
        if models.is_empty() {
            return None;
        }
        let index = rng.random_range(0..models.len());
        models.get(index).map(String::as_str)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_manifest(CatalogManifest::builtin())
    }
}
