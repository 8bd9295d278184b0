//! HDRI skybox lighting presets.
//!
//! The full preset list is embedded; [`LightingCatalog::eligible`] narrows it
//! once to the bright presets the planner may use.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub const LIGHTING_YAML: &str = include_str!("../../data/lighting.yaml");

static BUILTIN_PRESETS: OnceLock<Option<Vec<LightingPreset>>> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingPreset {
    pub name: String,
    /// Sun intensity reported for the skybox.
    pub intensity: f32,
}

#[derive(Debug, Deserialize)]
struct LightingFile {
    presets: Vec<LightingPreset>,
}

#[derive(Debug, Clone)]
pub struct LightingCatalog {
    presets: Vec<LightingPreset>,
}

impl LightingCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        match BUILTIN_PRESETS.get_or_init(|| parse_presets(LIGHTING_YAML).ok()) {
            Some(presets) => Self::from_presets(presets.clone()),
            None => Self::from_yaml_str(LIGHTING_YAML),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::from_presets(parse_presets(yaml)?)
    }

    /// Catalog exported from the backend's skybox library, in the same
    /// `presets: [{name, intensity}]` shape as the embedded file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            catalog: "lighting",
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_presets(presets: Vec<LightingPreset>) -> Result<Self, CatalogError> {
        if presets.is_empty() {
            return Err(CatalogError::Empty { catalog: "lighting" });
        }
        Ok(Self { presets })
    }

    /// Presets with `intensity >= min_intensity`.
    pub fn eligible(&self, min_intensity: f32) -> Result<Self, CatalogError> {
        let presets: Vec<LightingPreset> =
            self.presets.iter().filter(|p| p.intensity >= min_intensity).cloned().collect();
        if presets.is_empty() {
            return Err(CatalogError::NoEligibleLighting {
                threshold: min_intensity,
                total: self.presets.len(),
            });
        }
        Ok(Self { presets })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &LightingPreset {
        &self.presets[rng.gen_range(0..self.presets.len())]
    }

    pub fn get(&self, name: &str) -> Option<&LightingPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn presets(&self) -> &[LightingPreset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn parse_presets(yaml: &str) -> Result<Vec<LightingPreset>, CatalogError> {
    serde_yaml::from_str::<LightingFile>(yaml)
        .map(|f| f.presets)
        .map_err(|source| CatalogError::Parse { catalog: "lighting", source })
}
