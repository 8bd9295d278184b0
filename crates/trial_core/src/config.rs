//! # Trial Configuration
//!
//! Every tunable range and constant used while planning a trial.
//! The defaults reproduce the reference dataset; a YAML file can override
//! any subset of fields.
//!
//! ```rust
//! use trial_core::config::TrialConfig;
//!
//! let cfg = TrialConfig::default();
//! assert!(cfg.validate().is_ok());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Vertical field of view of the capture camera (degrees).
pub const FIELD_OF_VIEW: f32 = 68.0;

/// Closed/half-open scalar range sampled uniformly.
///
/// Sampling is `[min, max)`; a zero-width range always yields `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: f32,
    pub max: f32,
}

impl SampleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }

    /// Range with both bounds multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self { min: self.min * factor, max: self.max * factor }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite()
            || !self.max.is_finite()
            || self.min > self.max
            || !(self.max - self.min).is_finite()
        {
            return Err(ConfigError::InvalidRange { field, min: self.min, max: self.max });
        }
        Ok(())
    }

    /// `validate`, plus no negative values.
    fn validate_non_negative(&self, field: &'static str) -> Result<(), ConfigError> {
        self.validate(field)?;
        if self.min < 0.0 {
            return Err(ConfigError::InvalidValue { field, value: self.min });
        }
        Ok(())
    }
}

/// The launched ball.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Backend object id.
    pub object_id: u32,
    /// Model record name in the backend's model library.
    pub model_name: String,
    /// Sub-meshes that receive the visual material.
    pub sub_meshes: Vec<SubMesh>,
    /// Uniform scale applied after spawning.
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMesh {
    pub name: String,
    pub material_slots: u32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            object_id: 0,
            model_name: "sphere".to_string(),
            sub_meshes: vec![SubMesh { name: "sphere".to_string(), material_slots: 1 }],
            scale: 0.5,
        }
    }
}

/// Rigid-body material properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub mass: SampleRange,
    pub dynamic_friction: SampleRange,
    pub static_friction: SampleRange,
    pub bounciness: SampleRange,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mass: SampleRange::new(1.0, 4.0),
            dynamic_friction: SampleRange::new(0.0, 0.1),
            static_friction: SampleRange::new(0.0, 0.1),
            bounciness: SampleRange::new(0.0, 0.1),
        }
    }
}

/// Spin, settle nudge and launch impulse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Pitch rotation about the world axis (degrees).
    pub spin_angle: SampleRange,
    /// Small impulse applied before aiming.
    pub settle_force: SampleRange,
    /// Launch impulse per unit mass; the sampled range is this times mass.
    pub force_per_mass: SampleRange,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            spin_angle: SampleRange::new(30.0, 45.0),
            settle_force: SampleRange::new(0.01, 0.03),
            force_per_mass: SampleRange::new(5.2, 8.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Presets below this sun intensity are never picked.
    pub min_intensity: f32,
    /// Skybox rotation (degrees).
    pub rotation: SampleRange,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self { min_intensity: 0.8, rotation: SampleRange::new(0.0, 360.0) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Extra distance beyond the start/target separation.
    pub margin: SampleRange,
    /// Camera height above the floor.
    pub height: SampleRange,
    pub field_of_view: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            margin: SampleRange::new(0.3, 0.4),
            height: SampleRange::new(0.3, 0.6),
            field_of_view: FIELD_OF_VIEW,
        }
    }
}

/// One-off scene and post-processing settings sent before the first trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub scene_name: String,
    pub aperture: f32,
    pub focus_distance: f32,
    pub post_exposure: f32,
    pub ambient_occlusion_intensity: f32,
    pub ambient_occlusion_thickness: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scene_name: "box_room_2018".to_string(),
            aperture: 4.8,
            focus_distance: 1.25,
            post_exposure: 0.4,
            ambient_occlusion_intensity: 0.175,
            ambient_occlusion_thickness: 3.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationConfig {
    /// Distance to the target that counts as arrival.
    pub arrival_tolerance: f32,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self { arrival_tolerance: 0.01 }
    }
}

/// Optional catalog files replacing the embedded ones.
///
/// Relative paths in a config file resolve against that file's directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogPaths {
    /// `materials: [..]` list.
    pub materials: Option<PathBuf>,
    /// `presets: [{name, intensity}]` list, e.g. exported from the backend.
    pub lighting: Option<PathBuf>,
}

impl CatalogPaths {
    fn resolve_against(&mut self, base: &Path) {
        for path in [&mut self.materials, &mut self.lighting].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Complete planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrialConfig {
    pub ball: BallConfig,
    pub physics: PhysicsConfig,
    pub launch: LaunchConfig,
    pub lighting: LightingConfig,
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    pub termination: TerminationConfig,
    pub catalogs: CatalogPaths,
}

impl TrialConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: TrialConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml_str(&text)?;
        if let Some(base) = path.parent() {
            cfg.catalogs.resolve_against(base);
        }
        Ok(cfg)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.mass.validate("physics.mass")?;
        if self.physics.mass.min <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "physics.mass.min",
                value: self.physics.mass.min,
            });
        }
        self.physics.dynamic_friction.validate_non_negative("physics.dynamic_friction")?;
        self.physics.static_friction.validate_non_negative("physics.static_friction")?;
        self.physics.bounciness.validate_non_negative("physics.bounciness")?;

        self.launch.spin_angle.validate_non_negative("launch.spin_angle")?;
        self.launch.settle_force.validate_non_negative("launch.settle_force")?;
        self.launch.force_per_mass.validate_non_negative("launch.force_per_mass")?;
        // The heaviest ball at the top of the range must still get a finite impulse.
        let max_launch = self.launch.force_per_mass.max * self.physics.mass.max;
        if !max_launch.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "launch.force_per_mass",
                value: max_launch,
            });
        }

        self.lighting.rotation.validate("lighting.rotation")?;
        self.camera.margin.validate_non_negative("camera.margin")?;
        self.camera.height.validate_non_negative("camera.height")?;

        positive("ball.scale", self.ball.scale)?;
        positive("camera.field_of_view", self.camera.field_of_view)?;
        positive("termination.arrival_tolerance", self.termination.arrival_tolerance)?;
        if !self.lighting.min_intensity.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "lighting.min_intensity",
                value: self.lighting.min_intensity,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

// ========== Tests ==========
