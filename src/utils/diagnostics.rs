//! Injectable diagnostic event sink
//!
//! Soft failures in the pipeline (unresolvable dyes, skipped pieces)
//! are reported as events rather than errors so the embedding
//! application can surface them however it likes. The default sink
//! just forwards to tracing.

use std::sync::Mutex;

use tracing::warn;

use crate::world::ArmorSlot;

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// No data source could supply dyes for this hash. Emitted at most
    /// once per distinct hash per session.
    UnresolvedDye { hash: u32 },
    /// Bone data arrived without skin weights; the piece renders
    /// unskinned.
    MissingSkinData { item_hash: u32 },
    /// A piece failed to load and the rest of the equipment continued
    /// without it.
    PieceSkipped { slot: ArmorSlot, item_hash: u32, reason: String },
}

pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: DiagnosticEvent);
}

/// Default sink: log and move on.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::UnresolvedDye { hash } => {
                warn!("⚠️ no dye data resolvable for hash {}", hash);
            }
            DiagnosticEvent::MissingSkinData { item_hash } => {
                warn!("⚠️ item {} has bones but no skin weights, rendering unskinned", item_hash);
            }
            DiagnosticEvent::PieceSkipped { slot, item_hash, reason } => {
                warn!("⚠️ skipped {:?} piece {}: {}", slot, item_hash, reason);
            }
        }
    }
}

/// Test sink that records every event.
#[derive(Debug, Default)]
pub struct CapturingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().expect("sink poisoned").clone()
    }
}

impl DiagnosticSink for CapturingSink {
    fn emit(&self, event: DiagnosticEvent) {
        self.events.lock().expect("sink poisoned").push(event);
    }
}
