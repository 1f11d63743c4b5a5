//! Render-ready model assembly
//!
//! Turns fetched geometry and resolved dyes into the artifact the
//! presentation layer consumes. No GPU calls happen here; the
//! renderer owns those.

pub mod model;
pub mod placement;

pub use model::{
    BoneDescriptor, GpuSkinVertex, MaterialRange, MaterialSlot, ModelAssembler, RawGeometry,
    RenderModel, Skeleton, SkeletonNode, SkinInfluence,
};
pub use placement::{normalize_placement, Aabb, Placement};
