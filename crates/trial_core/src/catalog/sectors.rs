//! Sectors: pairs of floor spots with different light exposure.
//!
//! A sector has two sub-region centers. A sub-region is the disk of
//! [`SUB_REGION_RADIUS`] around one of them; start and target points are
//! drawn from the two disks of the same sector.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::geometry::{random_point_in_disk, Vec3};

/// Radius of every sub-region disk.
pub const SUB_REGION_RADIUS: f32 = 0.5;

/// Which of a sector's two sub-regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubRegion {
    First,
    Second,
}

impl SubRegion {
    pub fn other(self) -> Self {
        match self {
            SubRegion::First => SubRegion::Second,
            SubRegion::Second => SubRegion::First,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    name: String,
    c0: Vec3,
    c1: Vec3,
}

impl Sector {
    pub fn new(name: impl Into<String>, c0: Vec3, c1: Vec3) -> Self {
        Self { name: name.into(), c0, c1 }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self, which: SubRegion) -> Vec3 {
        match which {
            SubRegion::First => self.c0,
            SubRegion::Second => self.c1,
        }
    }

    /// Uniform point over the area of the requested sub-region.
    pub fn sample_sub_region<R: Rng + ?Sized>(&self, which: SubRegion, rng: &mut R) -> Vec3 {
        random_point_in_disk(&self.center(which), SUB_REGION_RADIUS, rng)
    }

    /// Which sub-region `point` lies in, if any.
    pub fn locate(&self, point: &Vec3) -> Option<SubRegion> {
        let within = |c: &Vec3| {
            let dx = point.x - c.x;
            let dz = point.z - c.z;
            (dx * dx + dz * dz).sqrt() <= SUB_REGION_RADIUS + 1e-5
        };
        if within(&self.c0) {
            Some(SubRegion::First)
        } else if within(&self.c1) {
            Some(SubRegion::Second)
        } else {
            None
        }
    }
}

/// Hand-placed sectors of the capture room; in each pair one center sits
/// in more shadow than the other.
const BUILTIN_SECTORS: [(&str, [f32; 3], [f32; 3]); 7] = [
    ("center", [0.5, 0.0, 0.0], [-0.5, 0.0, 0.0]),
    ("north", [0.0, 0.0, 3.0], [-1.2, 0.0, 3.7]),
    ("south", [0.0, 0.0, -3.0], [-1.2, 0.0, -3.7]),
    ("east_south", [2.15, 0.0, -2.6], [4.0, 0.0, -3.0]),
    ("east_north", [2.15, 0.0, 2.6], [4.0, 0.0, 3.0]),
    ("west_north", [-2.15, 0.0, 2.6], [-4.0, 0.0, 3.0]),
    ("west_south", [-2.15, 0.0, -2.6], [-4.0, 0.0, -3.0]),
];

/// Fixed, validated list of sectors.
#[derive(Debug, Clone)]
pub struct SectorCatalog {
    sectors: Vec<Sector>,
}

impl SectorCatalog {
    /// The seven built-in sectors.
    pub fn builtin() -> Result<Self, CatalogError> {
        let sectors = BUILTIN_SECTORS
            .iter()
            .map(|(name, c0, c1)| Sector::new(*name, Vec3::from(*c0), Vec3::from(*c1)))
            .collect();
        Self::from_sectors(sectors)
    }

    pub fn from_sectors(sectors: Vec<Sector>) -> Result<Self, CatalogError> {
        if sectors.is_empty() {
            return Err(CatalogError::Empty { catalog: "sector" });
        }
        if let Some(bad) = sectors.iter().find(|s| s.c0 == s.c1) {
            return Err(CatalogError::DegenerateSector { name: bad.name.clone() });
        }
        Ok(Self { sectors })
    }

    /// Uniform pick over all sectors.
    pub fn pick_sector<R: Rng + ?Sized>(&self, rng: &mut R) -> &Sector {
        // Non-empty by construction.
        &self.sectors[rng.gen_range(0..self.sectors.len())]
    }

    pub fn get(&self, name: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.name == name)
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_builtin_catalog_has_seven_sectors() {
        let catalog = SectorCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 7);
        let center = catalog.get("center").unwrap();
        assert_eq!(center.center(SubRegion::First), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(center.center(SubRegion::Second), Vec3::new(-0.5, 0.0, 0.0));
    }

    #[test]
    fn test_empty_catalog_is_fatal() {
        let err = SectorCatalog::from_sectors(Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Empty { catalog: "sector" }));
        assert_eq!(err.to_string(), "sector catalog is empty");
    }

    #[test]
    fn test_degenerate_sector_rejected() {
        let p = Vec3::new(1.0, 0.0, 1.0);
        let err = SectorCatalog::from_sectors(vec![Sector::new("flat", p, p)]).unwrap_err();
        assert!(matches!(err, CatalogError::DegenerateSector { ref name } if name == "flat"));
    }

    #[test]
    fn test_pick_sector_covers_every_sector() {
        let catalog = SectorCatalog::builtin().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut counts = [0usize; 7];
        for _ in 0..7000 {
            let picked = catalog.pick_sector(&mut rng);
            let idx = catalog.sectors().iter().position(|s| s == picked).unwrap();
            counts[idx] += 1;
        }
        for (i, c) in counts.iter().enumerate() {
            assert!((800..1200).contains(c), "sector {i} picked {c} times");
        }
    }

    #[test]
    fn test_sub_region_points_within_radius() {
        let catalog = SectorCatalog::builtin().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for sector in catalog.sectors() {
            for which in [SubRegion::First, SubRegion::Second] {
                let c = sector.center(which);
                for _ in 0..200 {
                    let p = sector.sample_sub_region(which, &mut rng);
                    assert!(distance(&p, &c) <= SUB_REGION_RADIUS + 1e-5);
                    assert_eq!(sector.locate(&p), Some(which));
                }
            }
        }
    }

    #[test]
    fn test_sub_region_sampling_is_area_uniform() {
        // Equal-width annuli of a disk hold 1/16, 3/16, 5/16, 7/16 of its area.
        // Radius-uniform sampling would put 1/4 in each instead.
        let sector = SectorCatalog::builtin().unwrap().get("north").unwrap().clone();
        let center = sector.center(SubRegion::Second);
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let n = 20_000;
        let mut bins = [0usize; 4];
        for _ in 0..n {
            let r = distance(&sector.sample_sub_region(SubRegion::Second, &mut rng), &center)
                / SUB_REGION_RADIUS;
            bins[((r * 4.0) as usize).min(3)] += 1;
        }
        let expected = [1.0 / 16.0, 3.0 / 16.0, 5.0 / 16.0, 7.0 / 16.0];
        for (bin, want) in bins.iter().zip(expected) {
            let got = *bin as f64 / n as f64;
            assert!((got - want).abs() < 0.02, "bins={bins:?}");
        }
    }
}
