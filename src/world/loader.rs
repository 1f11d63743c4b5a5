//! Character load orchestration
//!
//! Drives the whole pipeline for one character: profile fetch,
//! equipment resolution, then a fold over the armor pieces that
//! resolves dyes, fetches geometry and assembles render models.
//! Per-item failures skip that item and keep going; pipeline-level
//! failures abort the load with no partial result.

use std::sync::Arc;

use tracing::{info, warn};

use crate::assets::dye::DyeResolver;
use crate::assets::manifest::ManifestLookup;
use crate::config::ViewerSettings;
use crate::networking::geometry::{GeometryFetcher, GeometryOptions};
use crate::networking::profile::{ComponentType, ProfileFetcher};
use crate::networking::{LoadError, LoadResult};
use crate::rendering::model::{ModelAssembler, RenderModel};
use crate::utils::diagnostics::{DiagnosticEvent, DiagnosticSink};

use super::character::{
    ArmorSlot, Character, ClassType, EquipmentResolver, GenderType, RaceType,
};

/// One successfully assembled armor piece.
#[derive(Debug, Clone)]
pub struct LoadedPiece {
    pub slot: ArmorSlot,
    pub item_hash: u32,
    pub model: RenderModel,
}

/// One piece that failed at the item boundary and was skipped.
#[derive(Debug, Clone)]
pub struct SkippedPiece {
    pub slot: ArmorSlot,
    pub item_hash: u32,
    pub reason: String,
}

/// Result of a character load: the character summary, every piece that
/// assembled, and a record of every piece that did not.
#[derive(Debug, Clone)]
pub struct LoadedCharacter {
    pub character: Character,
    pub pieces: Vec<LoadedPiece>,
    pub skipped: Vec<SkippedPiece>,
}

pub struct CharacterLoader {
    profile: Arc<dyn ProfileFetcher>,
    geometry: Arc<dyn GeometryFetcher>,
    equipment: EquipmentResolver,
    dyes: DyeResolver,
    assembler: ModelAssembler,
    sink: Arc<dyn DiagnosticSink>,
}

impl CharacterLoader {
    pub fn new(
        profile: Arc<dyn ProfileFetcher>,
        geometry: Arc<dyn GeometryFetcher>,
        manifest: Arc<ManifestLookup>,
        settings: &ViewerSettings,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            profile,
            geometry,
            equipment: EquipmentResolver::new(settings.sockets),
            dyes: DyeResolver::new(manifest, sink.clone()),
            assembler: ModelAssembler::new(settings.camera, sink.clone()),
            sink,
        }
    }

    /// Load one character's equipped armor into render-ready models.
    ///
    /// Once initiated the load runs to completion or per-item failure;
    /// there is no mid-pipeline cancellation. Stale results are the
    /// presentation layer's problem (last writer wins at the
    /// consumption boundary).
    pub async fn load_character(
        &self,
        membership_type: i32,
        membership_id: &str,
        character_id: &str,
    ) -> LoadResult<LoadedCharacter> {
        let snapshot = self
            .profile
            .fetch_profile(membership_type, membership_id, &ComponentType::CHARACTER_LOAD)
            .await?;

        let component = snapshot.characters.get(character_id).ok_or_else(|| {
            LoadError::MissingCharacter { character_id: character_id.to_string() }
        })?;
        let character = Character {
            character_id: character_id.to_string(),
            class_type: ClassType::from_code(component.class_type),
            gender_type: GenderType::from_code(component.gender_type),
            race_type: RaceType::from_code(component.race_type),
            light: component.light,
            emblem_path: component.emblem_path.clone(),
        };

        let descriptors = self.equipment.resolve(&snapshot, character_id)?;
        info!(
            "🛡️ Loading {:?} {:?}: {} equipped armor piece(s)",
            character.class_type,
            character.race_type,
            descriptors.len()
        );

        // Pieces are processed one at a time; each slot's resolution is
        // independent, so this could fan out, but the manifest cache
        // makes the sequential walk cheap enough.
        let mut pieces = Vec::with_capacity(descriptors.len());
        let mut skipped = Vec::new();

        for descriptor in descriptors {
            let dye_set = match self.dyes.resolve(&descriptor).await {
                Ok(dye_set) => dye_set,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    self.skip(&mut skipped, descriptor.slot, descriptor.item_hash, &err);
                    continue;
                }
            };

            let bundle = match self
                .geometry
                .fetch_geometry(descriptor.item_hash, GeometryOptions::default())
                .await
            {
                Ok(bundle) => bundle,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    self.skip(&mut skipped, descriptor.slot, descriptor.item_hash, &err);
                    continue;
                }
            };

            match self.assembler.assemble(descriptor.item_hash, bundle, dye_set) {
                Ok(model) => {
                    pieces.push(LoadedPiece {
                        slot: descriptor.slot,
                        item_hash: descriptor.item_hash,
                        model,
                    });
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    self.skip(&mut skipped, descriptor.slot, descriptor.item_hash, &err);
                }
            }
        }

        if pieces.is_empty() {
            // An empty model is indistinguishable from success to the
            // presentation layer; report the condition instead.
            return Err(LoadError::NothingLoaded);
        }

        info!("✅ Character load complete: {} piece(s), {} skipped", pieces.len(), skipped.len());
        Ok(LoadedCharacter { character, pieces, skipped })
    }

    fn skip(
        &self,
        skipped: &mut Vec<SkippedPiece>,
        slot: ArmorSlot,
        item_hash: u32,
        err: &LoadError,
    ) {
        warn!("skipping {:?} piece {}: {}", slot, item_hash, err);
        self.sink.emit(DiagnosticEvent::PieceSkipped {
            slot,
            item_hash,
            reason: err.to_string(),
        });
        skipped.push(SkippedPiece { slot, item_hash, reason: err.to_string() });
    }
}
