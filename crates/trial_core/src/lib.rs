//! # trial_core - Shadow Trial Generation Engine
//!
//! Plans physics trials for a light/shadow dataset: a ball is launched
//! between two spots of a sector with different light exposure, under
//! randomized dynamics, material and skybox lighting. The trial ends when
//! the ball reaches or overshoots its target.
//!
//! ## Features
//! - Seeded, replayable sampling (same seed = same command stream)
//! - Area-uniform sub-region sampling
//! - Typed backend commands serialized as `"$type"`-tagged JSON
//! - Per-frame termination monitor with a terminal `Done` state
//!
//! ```rust
//! use trial_core::{TrialConfig, TrialSession};
//!
//! let mut session = TrialSession::new(TrialConfig::default(), 42).unwrap();
//! let _scene = session.scene_initialization_commands();
//! let _trial = session.plan_trial();
//! assert!(!session.is_done(None));
//! ```

pub mod camera;
pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod planner;
pub mod session;
pub mod termination;

pub use camera::{place_camera, CameraPlacement};
pub use catalog::{
    LightingCatalog, LightingPreset, MaterialCatalog, Sector, SectorCatalog, SubRegion,
    SUB_REGION_RADIUS,
};
pub use command::{Axis, Command};
pub use config::{CatalogPaths, SampleRange, TrialConfig, FIELD_OF_VIEW};
pub use error::{CatalogError, ConfigError, Result, TrialError};
pub use geometry::{Position, Vec3};
pub use planner::{PlannedTrial, TrialPlan, TrialPlanner};
pub use session::TrialSession;
pub use termination::{
    TerminationMonitor, TerminationReason, TerminationState, TrialEndpoints,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
