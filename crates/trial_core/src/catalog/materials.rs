//! Visual materials for the ball.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use rand::Rng;
use serde::Deserialize;

use crate::error::CatalogError;

/// Built-in material list (embedded at compile time).
pub const MATERIALS_YAML: &str = include_str!("../../data/materials.yaml");

static BUILTIN_MATERIALS: OnceLock<Option<Vec<String>>> = OnceLock::new();

#[derive(Debug, Deserialize)]
struct MaterialsFile {
    materials: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    names: Vec<String>,
}

impl MaterialCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        match BUILTIN_MATERIALS.get_or_init(|| parse_materials(MATERIALS_YAML).ok()) {
            Some(names) => Self::from_names(names.clone()),
            // Only reached when the embedded file is broken; reparse for the error.
            None => Self::from_yaml_str(MATERIALS_YAML),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::from_names(parse_materials(yaml)?)
    }

    /// Catalog from a YAML file shaped like the embedded one (`materials: [..]`).
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            catalog: "material",
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Duplicate names are dropped, first occurrence wins.
    pub fn from_names(names: Vec<String>) -> Result<Self, CatalogError> {
        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim().to_string();
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        if unique.is_empty() {
            return Err(CatalogError::Empty { catalog: "material" });
        }
        Ok(Self { names: unique })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.names[rng.gen_range(0..self.names.len())]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn parse_materials(yaml: &str) -> Result<Vec<String>, CatalogError> {
    serde_yaml::from_str::<MaterialsFile>(yaml)
        .map(|f| f.materials)
        .map_err(|source| CatalogError::Parse { catalog: "material", source })
}
