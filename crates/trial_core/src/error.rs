use std::path::PathBuf;

use thiserror::Error;

/// Problems with one of the static catalogs. Always fatal: they are raised
/// while building a planner, before any trial runs.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{catalog} catalog is empty")]
    Empty { catalog: &'static str },

    #[error("no lighting preset has intensity >= {threshold} ({total} presets checked)")]
    NoEligibleLighting { threshold: f32, total: usize },

    #[error("sector '{name}' has identical sub-region centers")]
    DegenerateSector { name: String },

    #[error("failed to read {catalog} catalog {}: {source}", path.display())]
    Io {
        catalog: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {catalog} catalog: {source}")]
    Parse {
        catalog: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid range for {field}: min {min} > max {max}")]
    InvalidRange { field: &'static str, min: f32, max: f32 },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum TrialError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TrialError {
    /// Name of the catalog at fault, if any.
    pub fn catalog(&self) -> Option<&'static str> {
        match self {
            TrialError::Catalog(CatalogError::Empty { catalog })
            | TrialError::Catalog(CatalogError::Io { catalog, .. })
            | TrialError::Catalog(CatalogError::Parse { catalog, .. }) => Some(*catalog),
            TrialError::Catalog(CatalogError::NoEligibleLighting { .. }) => Some("lighting"),
            TrialError::Catalog(CatalogError::DegenerateSector { .. }) => Some("sector"),
            TrialError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrialError>;
