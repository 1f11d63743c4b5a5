//! Render model assembly
//!
//! Converts fetched geometry, bone data and resolved dyes into the
//! mesh description the presentation layer consumes: a validated
//! skeleton hierarchy, fixed-layout skin weights and per-material dye
//! bindings. The assembler never trusts the skeleton data it is
//! handed; malformed hierarchies fail the item instead of silently
//! miscomposing.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use tracing::{debug, warn};

use crate::assets::dye::ResolvedDyeSet;
use crate::config::CameraSettings;
use crate::networking::geometry::GeometryBundle;
use crate::networking::{LoadError, LoadResult};
use crate::utils::diagnostics::{DiagnosticEvent, DiagnosticSink};

use super::placement::{normalize_placement, Placement};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Index range of one material within the shared index buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRange {
    pub start_index: u32,
    pub index_count: u32,
    pub texture_refs: Vec<String>,
}

/// Raw mesh data as delivered by the geometry collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub materials: Vec<MaterialRange>,
}

// ---------------------------------------------------------------------------
// Skeleton
// ---------------------------------------------------------------------------

/// One bone as delivered by the geometry collaborator. Sequence index
/// is the bone's stable identifier; `parent_index == -1` marks a root.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneDescriptor {
    pub name: String,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    pub parent_index: i32,
}

/// Assembled skeleton node. Parent/children are indices into the same
/// node sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    pub name: String,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub nodes: Vec<SkeletonNode>,
    /// Index of the root node. When several descriptors claim to be
    /// roots, the first in sequence order wins.
    pub root: usize,
}

impl Skeleton {
    /// Build and validate a hierarchy from bone descriptors.
    ///
    /// Every parent index must be -1 or strictly smaller than the
    /// bone's own index; forward and self references mean the source
    /// data is broken and the whole skeleton is rejected.
    pub fn from_bones(bones: &[BoneDescriptor]) -> LoadResult<Self> {
        if bones.is_empty() {
            return Err(LoadError::MalformedSkeleton { reason: "empty bone sequence".to_string() });
        }

        let mut nodes: Vec<SkeletonNode> = Vec::with_capacity(bones.len());
        let mut root = None;

        for (index, bone) in bones.iter().enumerate() {
            let parent = match bone.parent_index {
                -1 => {
                    if root.is_none() {
                        root = Some(index);
                    }
                    None
                }
                p if p >= 0 && (p as usize) < index => Some(p as usize),
                p => {
                    return Err(LoadError::MalformedSkeleton {
                        reason: format!("bone {index} references parent {p}"),
                    });
                }
            };

            if let Some(parent_index) = parent {
                nodes[parent_index].children.push(index);
            }

            nodes.push(SkeletonNode {
                name: bone.name.clone(),
                local_position: bone.local_position,
                local_rotation: bone.local_rotation,
                local_scale: bone.local_scale,
                parent,
                children: Vec::new(),
            });
        }

        // Bone 0 can only be a root (any parent would be a forward
        // reference), so a validated non-empty skeleton always has one.
        let root = root.ok_or_else(|| LoadError::MalformedSkeleton {
            reason: "no root bone in sequence".to_string(),
        })?;

        Ok(Self { nodes, root })
    }
}

// ---------------------------------------------------------------------------
// Skinning
// ---------------------------------------------------------------------------

/// Per-vertex skin influences as delivered by the geometry
/// collaborator: up to four bone bindings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinInfluence {
    pub bone_indices: [u16; 4],
    pub weights: [f32; 4],
}

/// Fixed 4-slot-per-vertex layout expected by the renderer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuSkinVertex {
    pub joints: [u16; 4],
    pub weights: [f32; 4],
}

/// Convert influences to the renderer layout. Source weights are
/// advisory: a positive sum is renormalized to 1.0, a zero or
/// non-finite sum collapses to a full binding on the first slot.
fn convert_skin(influences: &[SkinInfluence], bone_count: usize) -> Vec<GpuSkinVertex> {
    let mut out_of_range = 0usize;

    let vertices = influences
        .iter()
        .map(|influence| {
            let mut joints = influence.bone_indices;
            let mut weights = influence.weights;

            for slot in 0..4 {
                if (joints[slot] as usize) >= bone_count {
                    out_of_range += 1;
                    joints[slot] = 0;
                    weights[slot] = 0.0;
                }
            }

            let sum: f32 = weights.iter().sum();
            if sum.is_finite() && sum > 0.0 {
                for w in &mut weights {
                    *w /= sum;
                }
            } else {
                weights = [1.0, 0.0, 0.0, 0.0];
            }

            GpuSkinVertex { joints, weights }
        })
        .collect();

    if out_of_range > 0 {
        warn!("{} skin influence slot(s) referenced bones out of range, dropped", out_of_range);
    }

    vertices
}

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

/// Material binding: the textures a geometry range references plus
/// the dye set resolved for the piece.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSlot {
    pub texture_refs: Vec<String>,
    pub dyes: ResolvedDyeSet,
}

/// Terminal artifact of the pipeline, handed to the presentation
/// layer. Owned by the caller; the pipeline never touches it again
/// after return.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub geometry: RawGeometry,
    pub skeleton: Option<Skeleton>,
    pub skinning: Option<Vec<GpuSkinVertex>>,
    pub material_slots: Vec<MaterialSlot>,
    pub placement: Placement,
}

pub struct ModelAssembler {
    camera: CameraSettings,
    sink: Arc<dyn DiagnosticSink>,
}

impl ModelAssembler {
    pub fn new(camera: CameraSettings, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { camera, sink }
    }

    /// Assemble a render-ready model for one armor piece.
    ///
    /// Bone data is validated and skinned when skin weights accompany
    /// it; bones without weights produce an unskinned mesh and a
    /// diagnostic rather than a failure. A malformed hierarchy fails
    /// this item only.
    pub fn assemble(
        &self,
        item_hash: u32,
        bundle: GeometryBundle,
        dyes: ResolvedDyeSet,
    ) -> LoadResult<RenderModel> {
        let geometry = bundle.geometry;

        let (skeleton, skinning) = match bundle.bones.as_deref() {
            Some(bones) if !bones.is_empty() => {
                let skeleton = Skeleton::from_bones(bones)?;
                let skinning = match bundle.skin.as_deref() {
                    Some(influences) if !influences.is_empty() => {
                        Some(convert_skin(influences, skeleton.nodes.len()))
                    }
                    _ => {
                        self.sink.emit(DiagnosticEvent::MissingSkinData { item_hash });
                        None
                    }
                };
                (Some(skeleton), skinning)
            }
            _ => (None, None),
        };

        let material_slots = geometry
            .materials
            .iter()
            .map(|range| MaterialSlot {
                texture_refs: range.texture_refs.clone(),
                dyes: dyes.clone(),
            })
            .collect();

        let placement = normalize_placement(&geometry.positions, &self.camera);

        debug!(
            "assembled item {}: {} vert(s), {} material(s), skeleton: {}, animations carried: {}",
            item_hash,
            geometry.positions.len(),
            geometry.materials.len(),
            skeleton.is_some(),
            bundle.animations.len()
        );

        Ok(RenderModel { geometry, skeleton, skinning, material_slots, placement })
    }
}
