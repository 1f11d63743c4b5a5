//! Hash-indexed asset resolution
//!
//! The manifest side of the pipeline: backing stores with their
//! per-source schemas, the caching/coalescing lookup that unifies
//! them, and dye resolution on top.

pub mod dye;
pub mod gear;
pub mod manifest;
pub mod stores;

pub use dye::{DyeOrigin, DyeResolver, ResolvedDyeSet};
pub use gear::{GearAsset, MaterialDye, Rgb};
pub use manifest::{Lookup, LookupStats, ManifestLookup};
pub use stores::{ContentStore, GearAssetStore, GearAssetTable, RemoteDefinitionStore, StoreError};
