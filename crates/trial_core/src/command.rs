//! Backend instructions.
//!
//! Each [`Command`] serializes to the JSON object the simulation backend
//! expects, tagged with `"$type"`:
//!
//! ```json
//! {"$type": "apply_force_magnitude_to_object", "magnitude": 12.5, "id": 0}
//! ```
//!
//! The engine never interprets backend replies other than position feedback.

use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Rotation axis for `rotate_object_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Pitch,
    Yaw,
    Roll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type", rename_all = "snake_case")]
pub enum Command {
    // ---- scene ----
    AddScene {
        name: String,
    },
    SetAperture {
        aperture: f32,
    },
    SetFocusDistance {
        focus_distance: f32,
    },
    SetPostExposure {
        post_exposure: f32,
    },
    SetAmbientOcclusionIntensity {
        intensity: f32,
    },
    SetAmbientOcclusionThicknessModifier {
        thickness: f32,
    },
    SetFieldOfView {
        field_of_view: f32,
    },

    // ---- ball ----
    AddObject {
        name: String,
        id: u32,
        position: Position,
        rotation: Position,
    },
    SetMass {
        id: u32,
        mass: f32,
    },
    SetPhysicMaterial {
        id: u32,
        dynamic_friction: f32,
        static_friction: f32,
        bounciness: f32,
    },
    ScaleObject {
        id: u32,
        scale_factor: Position,
    },
    RotateObjectBy {
        id: u32,
        angle: f32,
        axis: Axis,
        is_world: bool,
    },
    ApplyForceMagnitudeToObject {
        id: u32,
        magnitude: f32,
    },
    ObjectLookAtPosition {
        id: u32,
        position: Position,
    },
    AddMaterial {
        name: String,
    },
    SetVisualMaterial {
        id: u32,
        material_name: String,
        object_name: String,
        material_index: u32,
    },
    FocusOnObject {
        object_id: u32,
        use_centroid: bool,
    },
    DestroyObject {
        id: u32,
    },

    // ---- lighting ----
    AddHdriSkybox {
        skybox_name: String,
    },
    RotateHdriSkyboxBy {
        angle: f32,
    },

    // ---- camera ----
    TeleportAvatarTo {
        position: Position,
    },
    LookAtPosition {
        position: Position,
    },
}

impl Command {
    /// The `"$type"` tag this command serializes with.
    pub fn type_name(&self) -> &'static str {
        match self {
            Command::AddScene { .. } => "add_scene",
            Command::SetAperture { .. } => "set_aperture",
            Command::SetFocusDistance { .. } => "set_focus_distance",
            Command::SetPostExposure { .. } => "set_post_exposure",
            Command::SetAmbientOcclusionIntensity { .. } => "set_ambient_occlusion_intensity",
            Command::SetAmbientOcclusionThicknessModifier { .. } => {
                "set_ambient_occlusion_thickness_modifier"
            }
            Command::SetFieldOfView { .. } => "set_field_of_view",
            Command::AddObject { .. } => "add_object",
            Command::SetMass { .. } => "set_mass",
            Command::SetPhysicMaterial { .. } => "set_physic_material",
            Command::ScaleObject { .. } => "scale_object",
            Command::RotateObjectBy { .. } => "rotate_object_by",
            Command::ApplyForceMagnitudeToObject { .. } => "apply_force_magnitude_to_object",
            Command::ObjectLookAtPosition { .. } => "object_look_at_position",
            Command::AddMaterial { .. } => "add_material",
            Command::SetVisualMaterial { .. } => "set_visual_material",
            Command::FocusOnObject { .. } => "focus_on_object",
            Command::DestroyObject { .. } => "destroy_object",
            Command::AddHdriSkybox { .. } => "add_hdri_skybox",
            Command::RotateHdriSkyboxBy { .. } => "rotate_hdri_skybox_by",
            Command::TeleportAvatarTo { .. } => "teleport_avatar_to",
            Command::LookAtPosition { .. } => "look_at_position",
        }
    }
}

/// Serialize a command list into the JSON array sent to the backend.
pub fn to_json(commands: &[Command]) -> serde_json::Result<String> {
    serde_json::to_string(commands)
}
