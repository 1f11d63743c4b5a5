// GCV-Rust: Guardian Character Viewer pipeline
// Resolves equipped items from opaque profile hashes into render-ready models

#![allow(warnings)]

pub mod utils;
pub mod networking;
pub mod config;
pub mod assets;
pub mod world;
pub mod rendering;

// Re-export commonly used types for convenience
pub use networking::{LoadError, LoadResult};
pub use assets::{DyeOrigin, DyeResolver, GearAsset, Lookup, ManifestLookup, ResolvedDyeSet};
pub use world::{
    ArmorPieceDescriptor, ArmorSlot, Character, CharacterLoader, EquipmentResolver,
    LoadedCharacter,
};
pub use rendering::{ModelAssembler, RenderModel};
pub use config::ViewerSettings;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
