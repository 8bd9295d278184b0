//! Static catalogs the planner draws from: sectors, ball materials and
//! lighting presets. All are validated once at construction and read-only
//! afterwards.

mod lighting;
mod materials;
mod sectors;

pub use lighting::{LightingCatalog, LightingPreset, LIGHTING_YAML};
pub use materials::{MaterialCatalog, MATERIALS_YAML};
pub use sectors::{Sector, SectorCatalog, SubRegion, SUB_REGION_RADIUS};
