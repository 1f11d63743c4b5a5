//! Model placement normalization
//!
//! Computes a scale, recentering translation and suggested camera
//! distance so any resolved model presents sensibly in frame, no
//! matter how degenerate the source geometry is. NaN and infinity are
//! stopped here; nothing non-finite leaves this module.

use glam::Vec3;
use tracing::debug;

use crate::config::CameraSettings;

/// Extent substituted when the bounding box is degenerate.
const DEGENERATE_EXTENT: f32 = 2.0;
/// Center substituted when the bounding box is degenerate.
const DEGENERATE_CENTER: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// Models smaller than this get normalized up; larger models keep
/// native scale.
const MIN_EXTENT: f32 = 0.5;

/// Axis-aligned bounding box over a vertex position set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_positions(positions: &[[f32; 3]]) -> Option<Self> {
        let mut iter = positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest edge of the box.
    pub fn max_extent(&self) -> f32 {
        let size = self.max - self.min;
        size.x.max(size.y).max(size.z)
    }
}

/// Normalized placement for a resolved model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Uniform scale factor applied to the model.
    pub scale: f32,
    /// Translation applied after scaling, recentering the model at the
    /// origin.
    pub translation: Vec3,
    /// Suggested camera distance that fits the whole model in frame.
    pub camera_distance: f32,
}

/// Derive a placement from raw vertex positions.
pub fn normalize_placement(positions: &[[f32; 3]], camera: &CameraSettings) -> Placement {
    let aabb = Aabb::from_positions(positions);

    let (mut extent, mut center) = match aabb {
        Some(aabb) => (aabb.max_extent(), aabb.center()),
        None => (f32::NAN, Vec3::ZERO),
    };

    if !extent.is_finite() || extent <= 0.0 || !center.is_finite() {
        debug!("degenerate bounding box (extent {}), substituting defaults", extent);
        extent = DEGENERATE_EXTENT;
        center = DEGENERATE_CENTER;
    }

    // Undersized models are normalized up; anything at or above the
    // threshold keeps its native scale.
    let scale = if extent < MIN_EXTENT { 1.0 / extent } else { 1.0 };
    let translation = -(center * scale);

    let half_size = extent * scale * 0.5;
    let half_fov = (camera.fov_degrees.to_radians() * 0.5).tan();
    let camera_distance = (half_size * camera.fit_margin) / half_fov;

    Placement { scale, translation, camera_distance }
}
