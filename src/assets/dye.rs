//! Dye resolution
//!
//! Derives the effective tint set for one armor piece by merging what
//! the equipped shader, the item's own gear asset and the peer-view
//! overrides have to say. Missing data degrades to a neutral fallback
//! instead of failing the piece; only a manifest-wide outage
//! propagates.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::networking::LoadResult;
use crate::utils::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::world::character::{ArmorPieceDescriptor, ChannelOverride};

use super::gear::{MaterialDye, Rgb};
use super::manifest::{Lookup, ManifestLookup};

/// Which data source supplied the tints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DyeOrigin {
    Custom,
    Default,
    Locked,
    Fallback,
}

/// Effective color set for one armor piece.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDyeSet {
    pub primary_tint: Rgb,
    pub secondary_tint: Rgb,
    pub worn_tint: Rgb,
    pub origin: DyeOrigin,
    /// Carried through for future per-channel tinting; no current data
    /// source maps these hashes to colors.
    pub channel_overrides: Vec<ChannelOverride>,
}

impl ResolvedDyeSet {
    fn from_dye(dye: &MaterialDye, origin: DyeOrigin, overrides: Vec<ChannelOverride>) -> Self {
        Self {
            primary_tint: dye.primary_tint,
            secondary_tint: dye.secondary_tint,
            worn_tint: dye.worn_tint.unwrap_or(dye.primary_tint),
            origin,
            channel_overrides: overrides,
        }
    }

    fn fallback(overrides: Vec<ChannelOverride>) -> Self {
        Self {
            primary_tint: Rgb::MID_GRAY,
            secondary_tint: Rgb::MID_GRAY,
            worn_tint: Rgb::MID_GRAY,
            origin: DyeOrigin::Fallback,
            channel_overrides: overrides,
        }
    }
}

pub struct DyeResolver {
    manifest: Arc<ManifestLookup>,
    sink: Arc<dyn DiagnosticSink>,
    /// Hashes already reported as unresolved this session, so repeated
    /// pieces with the same missing shader produce one event, not one
    /// per call.
    reported: Mutex<HashSet<u32>>,
}

impl DyeResolver {
    pub fn new(manifest: Arc<ManifestLookup>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { manifest, sink, reported: Mutex::new(HashSet::new()) }
    }

    /// Resolve the effective dye set for one armor piece.
    ///
    /// Priority: shader custom dyes, then shader default dyes, then
    /// the item's locked dyes, then the neutral fallback. A piece with
    /// no shader equipped (`shader_hash == 0`) never triggers a shader
    /// lookup.
    pub async fn resolve(&self, piece: &ArmorPieceDescriptor) -> LoadResult<ResolvedDyeSet> {
        let overrides = piece.channel_overrides.clone();

        if piece.shader_hash != 0 {
            if let Lookup::Found(shader) = self.manifest.resolve(piece.shader_hash).await? {
                if let Some(dye) = shader.custom_dyes.first() {
                    return Ok(ResolvedDyeSet::from_dye(dye, DyeOrigin::Custom, overrides));
                }
                if let Some(dye) = shader.default_dyes.first() {
                    return Ok(ResolvedDyeSet::from_dye(dye, DyeOrigin::Default, overrides));
                }
            }
        }

        if let Lookup::Found(item) = self.manifest.resolve(piece.item_hash).await? {
            if let Some(dye) = item.locked_dyes.first() {
                return Ok(ResolvedDyeSet::from_dye(dye, DyeOrigin::Locked, overrides));
            }
        }

        let missing = if piece.shader_hash != 0 { piece.shader_hash } else { piece.item_hash };
        self.report_unresolved(missing).await;

        debug!("no dye source for item {}, using fallback tints", piece.item_hash);
        Ok(ResolvedDyeSet::fallback(overrides))
    }

    async fn report_unresolved(&self, hash: u32) {
        let mut reported = self.reported.lock().await;
        if reported.insert(hash) {
            self.sink.emit(DiagnosticEvent::UnresolvedDye { hash });
        }
    }
}
