//! Render-facing snapshots of decorations and effects.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Decoration archetypes placed at world creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationKind {
    Rock,
    Tree,
    Monolith,
}

/// What a view describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Decoration(DecorationKind),
    ShootingStar,
    Lightning,
    LightPillar,
}

/// One entity as the renderer should draw it this frame.
///
/// `position` is observer-relative: X/Z are folded into the wrap window and
/// Y is absolute elevation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub kind: EntityKind,
    pub position: Vec3,
    pub orientation: Quat,
    /// Opacity in `[0, 1]`.
    pub visibility: f32,
    /// Emissive strength, `>= 0`.
    pub intensity: f32,
}
