//! # Trial planner
//!
//! One sampling pass produces a [`TrialPlan`]; the plan then renders the
//! ordered backend commands that realize it.
//!
//! RNG draw order (stable across versions, seeded runs replay exactly):
//! sector, direction coin, start, target, mass, dynamic friction, static
//! friction, bounciness, spin, settle force, launch force, material,
//! lighting preset, lighting rotation, camera margin, camera height.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::camera::{place_camera, CameraPlacement};
use crate::catalog::{LightingCatalog, MaterialCatalog, SectorCatalog, SubRegion};
use crate::command::{Axis, Command};
use crate::config::TrialConfig;
use crate::error::Result;
use crate::geometry::{Position, Vec3};
use crate::termination::{TerminationMonitor, TrialEndpoints};

/// Everything sampled for one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialPlan {
    pub sector: String,
    /// Sub-region the ball starts in; the target is in the other one.
    pub start_region: SubRegion,
    pub start: Vec3,
    pub target: Vec3,
    pub mass: f32,
    pub dynamic_friction: f32,
    pub static_friction: f32,
    pub bounciness: f32,
    /// Pitch spin before aiming (degrees).
    pub spin_angle: f32,
    pub settle_force: f32,
    pub launch_force: f32,
    pub visual_material: String,
    pub lighting_preset: String,
    /// Skybox rotation (degrees).
    pub lighting_rotation: f32,
    pub camera: CameraPlacement,
}

impl TrialPlan {
    pub fn endpoints(&self) -> TrialEndpoints {
        TrialEndpoints::new(self.start, self.target)
    }

    /// Backend commands for this plan, in execution order.
    ///
    /// Aim comes before launch: `object_look_at_position` turns the ball
    /// toward the target and the launch impulse pushes along that facing.
    pub fn commands(&self, config: &TrialConfig) -> Vec<Command> {
        let ball = &config.ball;
        let id = ball.object_id;
        let mut commands = vec![
            Command::AddObject {
                name: ball.model_name.clone(),
                id,
                position: self.start.into(),
                rotation: Position::ZERO,
            },
            Command::SetMass { id, mass: self.mass },
            Command::SetPhysicMaterial {
                id,
                dynamic_friction: self.dynamic_friction,
                static_friction: self.static_friction,
                bounciness: self.bounciness,
            },
            Command::ScaleObject { id, scale_factor: Position::splat(ball.scale) },
            Command::RotateObjectBy { id, angle: self.spin_angle, axis: Axis::Pitch, is_world: true },
            Command::ApplyForceMagnitudeToObject { id, magnitude: self.settle_force },
            Command::ObjectLookAtPosition { id, position: self.target.into() },
            Command::ApplyForceMagnitudeToObject { id, magnitude: self.launch_force },
            Command::AddMaterial { name: self.visual_material.clone() },
        ];

        for sub_mesh in &ball.sub_meshes {
            for material_index in 0..sub_mesh.material_slots {
                commands.push(Command::SetVisualMaterial {
                    id,
                    material_name: self.visual_material.clone(),
                    object_name: sub_mesh.name.clone(),
                    material_index,
                });
            }
        }

        commands.extend([
            Command::AddHdriSkybox { skybox_name: self.lighting_preset.clone() },
            Command::RotateHdriSkyboxBy { angle: self.lighting_rotation },
            Command::TeleportAvatarTo { position: self.camera.position },
            Command::LookAtPosition { position: self.camera.look_at },
        ]);
        commands
    }
}

/// A plan together with its rendered commands.
#[derive(Debug, Clone)]
pub struct PlannedTrial {
    pub plan: TrialPlan,
    pub commands: Vec<Command>,
}

impl PlannedTrial {
    /// Fresh monitor for this trial's endpoints.
    pub fn monitor(&self, config: &TrialConfig) -> TerminationMonitor {
        TerminationMonitor::new(self.plan.endpoints(), config.termination.arrival_tolerance)
    }
}

/// Samples trials from validated catalogs and configuration.
#[derive(Debug, Clone)]
pub struct TrialPlanner {
    config: TrialConfig,
    sectors: SectorCatalog,
    materials: MaterialCatalog,
    /// Already narrowed to presets above the intensity threshold.
    lighting: LightingCatalog,
}

impl TrialPlanner {
    /// Planner over the built-in sectors and the material and lighting
    /// catalogs named in `config.catalogs` (embedded ones otherwise).
    pub fn new(config: TrialConfig) -> Result<Self> {
        let materials = match &config.catalogs.materials {
            Some(path) => {
                log::info!("loading material catalog from {}", path.display());
                MaterialCatalog::from_path(path)?
            }
            None => MaterialCatalog::builtin()?,
        };
        let lighting = match &config.catalogs.lighting {
            Some(path) => {
                log::info!("loading lighting catalog from {}", path.display());
                LightingCatalog::from_path(path)?
            }
            None => LightingCatalog::builtin()?,
        };
        Self::with_catalogs(config, SectorCatalog::builtin()?, materials, lighting)
    }

    /// Validates `config` and filters `lighting` by the configured intensity
    /// threshold. Any failure here is fatal for the run.
    pub fn with_catalogs(
        config: TrialConfig,
        sectors: SectorCatalog,
        materials: MaterialCatalog,
        lighting: LightingCatalog,
    ) -> Result<Self> {
        config.validate()?;
        let lighting = lighting.eligible(config.lighting.min_intensity)?;
        log::info!(
            "trial planner ready: {} sectors, {} materials, {} lighting presets (intensity >= {})",
            sectors.len(),
            materials.len(),
            lighting.len(),
            config.lighting.min_intensity
        );
        Ok(Self { config, sectors, materials, lighting })
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn sectors(&self) -> &SectorCatalog {
        &self.sectors
    }

    pub fn materials(&self) -> &MaterialCatalog {
        &self.materials
    }

    pub fn lighting(&self) -> &LightingCatalog {
        &self.lighting
    }

    /// Sample one trial. Pure in `rng`: the same RNG state gives the same plan.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TrialPlan {
        let cfg = &self.config;

        let sector = self.sectors.pick_sector(rng);
        let start_region = if rng.gen_bool(0.5) { SubRegion::First } else { SubRegion::Second };
        let start = sector.sample_sub_region(start_region, rng);
        let target = sector.sample_sub_region(start_region.other(), rng);

        let mass = cfg.physics.mass.sample(rng);
        let dynamic_friction = cfg.physics.dynamic_friction.sample(rng);
        let static_friction = cfg.physics.static_friction.sample(rng);
        let bounciness = cfg.physics.bounciness.sample(rng);

        let spin_angle = cfg.launch.spin_angle.sample(rng);
        let settle_force = cfg.launch.settle_force.sample(rng);
        let launch_force = sample_launch_force(cfg, mass, rng);

        let visual_material = self.materials.pick(rng).to_string();
        let lighting_preset = self.lighting.pick(rng).name.clone();
        let lighting_rotation = cfg.lighting.rotation.sample(rng);

        let margin = cfg.camera.margin.sample(rng);
        let height = cfg.camera.height.sample(rng);
        let camera = place_camera(&start, &target, margin, height);
        if camera.used_fallback {
            log::warn!(
                "sector '{}': start/target midpoint at origin, using fallback camera direction",
                sector.name()
            );
        }

        TrialPlan {
            sector: sector.name().to_string(),
            start_region,
            start,
            target,
            mass,
            dynamic_friction,
            static_friction,
            bounciness,
            spin_angle,
            settle_force,
            launch_force,
            visual_material,
            lighting_preset,
            lighting_rotation,
            camera,
        }
    }

    /// Sample a trial and render its commands.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> PlannedTrial {
        let plan = self.sample(rng);
        let commands = plan.commands(&self.config);
        log::debug!(
            "planned trial in sector '{}': mass={:.2} launch={:.2} material={} skybox={} ({} commands)",
            plan.sector,
            plan.mass,
            plan.launch_force,
            plan.visual_material,
            plan.lighting_preset,
            commands.len()
        );
        PlannedTrial { plan, commands }
    }

    /// Commands sent once before the first trial.
    pub fn scene_initialization_commands(&self) -> Vec<Command> {
        let scene = &self.config.scene;
        vec![
            Command::AddScene { name: scene.scene_name.clone() },
            Command::SetAperture { aperture: scene.aperture },
            Command::SetFocusDistance { focus_distance: scene.focus_distance },
            Command::SetPostExposure { post_exposure: scene.post_exposure },
            Command::SetAmbientOcclusionIntensity { intensity: scene.ambient_occlusion_intensity },
            Command::SetAmbientOcclusionThicknessModifier {
                thickness: scene.ambient_occlusion_thickness,
            },
            Command::SetFieldOfView { field_of_view: self.config.camera.field_of_view },
        ]
    }

    /// Commands sent every frame while a trial runs.
    pub fn per_frame_commands(&self) -> Vec<Command> {
        vec![Command::FocusOnObject { object_id: self.config.ball.object_id, use_centroid: true }]
    }

    /// Commands that clear the trial's objects before the next one.
    pub fn trial_teardown_commands(&self) -> Vec<Command> {
        vec![Command::DestroyObject { id: self.config.ball.object_id }]
    }
}

/// Launch impulse, scaled by mass.
pub fn sample_launch_force<R: Rng + ?Sized>(config: &TrialConfig, mass: f32, rng: &mut R) -> f32 {
    config.launch.force_per_mass.scaled(mass).sample(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LightingPreset, Sector};
    use crate::error::{CatalogError, TrialError};
    use crate::geometry::distance;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn planner() -> TrialPlanner {
        TrialPlanner::new(TrialConfig::default()).unwrap()
    }

    #[test]
    fn test_start_and_target_share_a_sector() {
        let planner = planner();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..500 {
            let plan = planner.sample(&mut rng);
            let sector = planner.sectors().get(&plan.sector).unwrap();
            assert_eq!(sector.locate(&plan.start), Some(plan.start_region));
            assert_eq!(sector.locate(&plan.target), Some(plan.start_region.other()));
        }
    }

    #[test]
    fn test_direction_is_a_fair_coin() {
        let planner = planner();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 4000;
        let first = (0..n)
            .filter(|_| planner.sample(&mut rng).start_region == SubRegion::First)
            .count();
        let ratio = first as f64 / n as f64;
        assert!((0.45..0.55).contains(&ratio), "ratio={ratio}");
    }

    #[test]
    fn test_sampled_values_in_range() {
        let planner = planner();
        let cfg = planner.config().clone();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..500 {
            let plan = planner.sample(&mut rng);
            assert!(cfg.physics.mass.contains(plan.mass));
            assert!(cfg.physics.dynamic_friction.contains(plan.dynamic_friction));
            assert!(cfg.physics.static_friction.contains(plan.static_friction));
            assert!(cfg.physics.bounciness.contains(plan.bounciness));
            assert!(cfg.launch.spin_angle.contains(plan.spin_angle));
            assert!(cfg.launch.settle_force.contains(plan.settle_force));
            assert!(plan.launch_force >= 5.2 * plan.mass - 1e-3);
            assert!(plan.launch_force <= 8.0 * plan.mass + 1e-3);
            assert!(plan.lighting_rotation >= 0.0 && plan.lighting_rotation < 360.0);
            assert!(planner.materials().contains(&plan.visual_material));
            let preset = planner.lighting().get(&plan.lighting_preset).unwrap();
            assert!(preset.intensity >= 0.8);
            assert!((0.3..=0.6).contains(&plan.camera.position.y));
        }
    }

    #[test]
    fn test_launch_force_scales_with_mass() {
        let cfg = TrialConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1000 {
            let f2 = sample_launch_force(&cfg, 2.0, &mut rng);
            assert!((10.4 - 1e-4..=16.0 + 1e-4).contains(&f2), "f2={f2}");
            let f4 = sample_launch_force(&cfg, 4.0, &mut rng);
            assert!((20.8 - 1e-4..=32.0 + 1e-4).contains(&f4), "f4={f4}");
        }
    }

    #[test]
    fn test_camera_frames_both_endpoints() {
        let planner = planner();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            let plan = planner.sample(&mut rng);
            let look = Vec3::from(plan.camera.look_at);
            let mid = crate::geometry::ground_midpoint(&plan.start, &plan.target);
            assert!(distance(&look, &mid) < 1e-5);
            let cam = Vec3::from(plan.camera.position);
            let ground = Vec3::new(cam.x, 0.0, cam.z);
            let d = distance(&plan.start, &plan.target);
            let offset = distance(&ground, &mid);
            assert!(offset >= d + 0.3 - 1e-4 && offset <= d + 0.4 + 1e-4);
        }
    }

    #[test]
    fn test_command_order_aims_before_launch() {
        let planner = planner();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let trial = planner.plan(&mut rng);
        let names: Vec<&str> = trial.commands.iter().map(|c| c.type_name()).collect();
        assert_eq!(
            names,
            vec![
                "add_object",
                "set_mass",
                "set_physic_material",
                "scale_object",
                "rotate_object_by",
                "apply_force_magnitude_to_object",
                "object_look_at_position",
                "apply_force_magnitude_to_object",
                "add_material",
                "set_visual_material",
                "add_hdri_skybox",
                "rotate_hdri_skybox_by",
                "teleport_avatar_to",
                "look_at_position",
            ]
        );
        match (&trial.commands[6], &trial.commands[7]) {
            (
                Command::ObjectLookAtPosition { position, .. },
                Command::ApplyForceMagnitudeToObject { magnitude, .. },
            ) => {
                assert_eq!(*position, Position::from(trial.plan.target));
                assert_eq!(*magnitude, trial.plan.launch_force);
            }
            other => panic!("unexpected commands {other:?}"),
        }
        match &trial.commands[0] {
            Command::AddObject { position, rotation, .. } => {
                assert_eq!(*position, Position::from(trial.plan.start));
                assert_eq!(*rotation, Position::ZERO);
            }
            other => panic!("unexpected first command {other:?}"),
        }
        assert!(trial.commands.contains(&Command::ScaleObject {
            id: 0,
            scale_factor: Position::splat(0.5)
        }));
    }

    #[test]
    fn test_same_seed_same_trial() {
        let planner = planner();
        let a = planner.sample(&mut ChaCha8Rng::seed_from_u64(1234));
        let b = planner.sample(&mut ChaCha8Rng::seed_from_u64(1234));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_lighting_after_filter_is_fatal() {
        let dim = LightingCatalog::from_presets(vec![LightingPreset {
            name: "dusk".into(),
            intensity: 0.3,
        }])
        .unwrap();
        let err = TrialPlanner::with_catalogs(
            TrialConfig::default(),
            SectorCatalog::builtin().unwrap(),
            MaterialCatalog::builtin().unwrap(),
            dim,
        )
        .unwrap_err();
        assert_eq!(err.catalog(), Some("lighting"));
    }

    #[test]
    fn test_origin_midpoint_sector_never_panics() {
        // Sub-regions mirrored through the origin: the midpoint can land on it.
        let sectors = SectorCatalog::from_sectors(vec![Sector::new(
            "mirror",
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        )])
        .unwrap();
        let planner = TrialPlanner::with_catalogs(
            TrialConfig::default(),
            sectors,
            MaterialCatalog::builtin().unwrap(),
            LightingCatalog::builtin().unwrap(),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..200 {
            let plan = planner.sample(&mut rng);
            assert!(plan.camera.position.x.is_finite());
            assert!(plan.camera.position.z.is_finite());
        }
    }

    #[test]
    fn test_scene_commands_follow_config() {
        let planner = planner();
        let cmds = planner.scene_initialization_commands();
        assert_eq!(cmds[0], Command::AddScene { name: "box_room_2018".into() });
        assert_eq!(cmds.last(), Some(&Command::SetFieldOfView { field_of_view: 68.0 }));
        assert_eq!(
            planner.per_frame_commands(),
            vec![Command::FocusOnObject { object_id: 0, use_centroid: true }]
        );
        assert_eq!(planner.trial_teardown_commands(), vec![Command::DestroyObject { id: 0 }]);
    }

    #[test]
    fn test_catalogs_loaded_from_config_paths() {
        let dir = tempfile::tempdir().unwrap();
        let lighting = dir.path().join("skyboxes.yaml");
        let materials = dir.path().join("materials.yaml");
        std::fs::write(
            &lighting,
            "presets:\n  - { name: noon_courtyard, intensity: 1.4 }\n  - { name: night_alley, intensity: 0.05 }\n",
        )
        .unwrap();
        std::fs::write(&materials, "materials:\n  - rubber_black\n").unwrap();

        let mut config = TrialConfig::default();
        config.catalogs.lighting = Some(lighting);
        config.catalogs.materials = Some(materials);
        let planner = TrialPlanner::new(config).unwrap();
        assert_eq!(planner.lighting().len(), 1);
        assert_eq!(planner.materials().names(), ["rubber_black"]);

        let plan = planner.sample(&mut ChaCha8Rng::seed_from_u64(6));
        assert_eq!(plan.lighting_preset, "noon_courtyard");
        assert_eq!(plan.visual_material, "rubber_black");
    }

    #[test]
    fn test_missing_catalog_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TrialConfig::default();
        config.catalogs.lighting = Some(dir.path().join("absent.yaml"));
        let err = TrialPlanner::new(config).unwrap_err();
        assert!(matches!(err, TrialError::Catalog(CatalogError::Io { catalog: "lighting", .. })));
        assert_eq!(err.catalog(), Some("lighting"));
    }
}
