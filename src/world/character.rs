//! Character snapshot domain model and equipment resolution
//!
//! Turns a fetched profile snapshot into an ordered list of armor
//! piece descriptors: which item sits in which slot, which shader is
//! socketed onto it, and which per-channel dye overrides the peer
//! view carries for it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::networking::profile::ProfileSnapshot;
use crate::networking::{LoadError, LoadResult};

// ---------------------------------------------------------------------------
// Character snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassType {
    Titan,
    Hunter,
    Warlock,
    Unknown,
}

impl ClassType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Titan,
            1 => Self::Hunter,
            2 => Self::Warlock,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenderType {
    Masculine,
    Feminine,
    Unknown,
}

impl GenderType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Masculine,
            1 => Self::Feminine,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceType {
    Human,
    Awoken,
    Exo,
    Unknown,
}

impl RaceType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Human,
            1 => Self::Awoken,
            2 => Self::Exo,
            _ => Self::Unknown,
        }
    }
}

/// Immutable character summary taken from the profile fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub character_id: String,
    pub class_type: ClassType,
    pub gender_type: GenderType,
    pub race_type: RaceType,
    pub light: i32,
    pub emblem_path: String,
}

// ---------------------------------------------------------------------------
// Armor slots
// ---------------------------------------------------------------------------

/// The five armor slots, in their fixed presentation order. Each slot
/// is bound to one bucket-hash constant from the remote schema; the
/// values must match exactly for slot detection to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorSlot {
    Helmet,
    Gauntlets,
    Chest,
    Legs,
    ClassItem,
}

impl ArmorSlot {
    /// Fixed resolution order, regardless of input ordering.
    pub const ALL: [ArmorSlot; 5] = [
        ArmorSlot::Helmet,
        ArmorSlot::Gauntlets,
        ArmorSlot::Chest,
        ArmorSlot::Legs,
        ArmorSlot::ClassItem,
    ];

    pub const fn bucket_hash(&self) -> u32 {
        match self {
            ArmorSlot::Helmet => 3448274439,
            ArmorSlot::Gauntlets => 3551918588,
            ArmorSlot::Chest => 14239492,
            ArmorSlot::Legs => 20886954,
            ArmorSlot::ClassItem => 1585787867,
        }
    }

    pub fn from_bucket_hash(hash: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.bucket_hash() == hash)
    }
}

// ---------------------------------------------------------------------------
// Equipment state
// ---------------------------------------------------------------------------

/// One equipped item as reported by the equipment component.
#[derive(Debug, Clone, PartialEq)]
pub struct EquippedItem {
    pub slot: ArmorSlot,
    pub item_hash: u32,
    pub instance_id: String,
}

/// One socket on an item instance. Index is the socket's position in
/// the instance's socket array.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketEntry {
    pub index: usize,
    pub plug_hash: u32,
    pub is_enabled: bool,
    pub is_visible: bool,
}

/// Per-channel dye override from the peer view. Carried through the
/// pipeline verbatim; no data source currently maps these hashes to
/// concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOverride {
    pub dye_hash: u32,
    pub channel_hash: u32,
}

/// Fully described armor piece, ready for dye resolution and geometry
/// loading. `shader_hash == 0` means no shader is equipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmorPieceDescriptor {
    pub slot: ArmorSlot,
    pub item_hash: u32,
    pub shader_hash: u32,
    pub channel_overrides: Vec<ChannelOverride>,
}

// ---------------------------------------------------------------------------
// Socket layout conventions
// ---------------------------------------------------------------------------

/// Which socket indices carry shaders and ornaments.
///
/// These ranges are observed conventions against live data, not a
/// documented schema, so they stay configurable rather than being
/// baked in as invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketLayout {
    pub shader_first: usize,
    pub shader_last: usize,
    pub ornament_first: usize,
    pub ornament_last: usize,
}

impl Default for SocketLayout {
    fn default() -> Self {
        Self { shader_first: 3, shader_last: 5, ornament_first: 0, ornament_last: 1 }
    }
}

impl SocketLayout {
    pub fn is_shader_socket(&self, index: usize) -> bool {
        index >= self.shader_first && index <= self.shader_last
    }

    pub fn is_ornament_socket(&self, index: usize) -> bool {
        index >= self.ornament_first && index <= self.ornament_last
    }
}

// ---------------------------------------------------------------------------
// Equipment resolver
// ---------------------------------------------------------------------------

pub struct EquipmentResolver {
    layout: SocketLayout,
}

impl EquipmentResolver {
    pub fn new(layout: SocketLayout) -> Self {
        Self { layout }
    }

    /// Resolve one character's equipped armor into descriptors.
    ///
    /// Output order is always Helmet, Gauntlets, Chest, Legs, ClassItem;
    /// slots without an equipped item are omitted. An unknown character
    /// id is an error, missing equipment never is.
    pub fn resolve(
        &self,
        snapshot: &ProfileSnapshot,
        character_id: &str,
    ) -> LoadResult<Vec<ArmorPieceDescriptor>> {
        if !snapshot.characters.contains_key(character_id) {
            return Err(LoadError::MissingCharacter { character_id: character_id.to_string() });
        }

        let equipped = snapshot.equipment.get(character_id).map(Vec::as_slice).unwrap_or(&[]);
        let peer_view = snapshot.peer_view.get(character_id).map(Vec::as_slice).unwrap_or(&[]);

        let mut pieces = Vec::with_capacity(ArmorSlot::ALL.len());
        for slot in ArmorSlot::ALL {
            let Some(item) = equipped.iter().find(|item| item.slot == slot) else {
                continue;
            };

            let sockets = snapshot.sockets.get(&item.instance_id).map(Vec::as_slice).unwrap_or(&[]);
            let shader_hash = self.detect_shader(sockets);
            self.note_ornaments(item, sockets);

            let channel_overrides = peer_view
                .iter()
                .find(|entry| entry.item_hash == item.item_hash)
                .map(|entry| entry.dyes.clone())
                .unwrap_or_default();

            pieces.push(ArmorPieceDescriptor {
                slot,
                item_hash: item.item_hash,
                shader_hash,
                channel_overrides,
            });
        }

        Ok(pieces)
    }

    /// First visible, non-zero plug in the shader socket range wins.
    fn detect_shader(&self, sockets: &[SocketEntry]) -> u32 {
        sockets
            .iter()
            .filter(|s| self.layout.is_shader_socket(s.index))
            .find(|s| s.is_visible && s.plug_hash != 0)
            .map(|s| s.plug_hash)
            .unwrap_or(0)
    }

    /// Ornament sockets are read but intentionally not applied to item
    /// selection; swapping geometry for ornaments is a known gap.
    fn note_ornaments(&self, item: &EquippedItem, sockets: &[SocketEntry]) {
        for socket in sockets {
            if self.layout.is_ornament_socket(socket.index) && socket.plug_hash != 0 {
                debug!(
                    "item {} carries ornament plug {} in socket {}, not applied",
                    item.item_hash, socket.plug_hash, socket.index
                );
            }
        }
    }
}

impl Default for EquipmentResolver {
    fn default() -> Self {
        Self::new(SocketLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_hashes_round_trip() {
        for slot in ArmorSlot::ALL {
            assert_eq!(ArmorSlot::from_bucket_hash(slot.bucket_hash()), Some(slot));
        }
        assert_eq!(ArmorSlot::from_bucket_hash(12345), None);
    }

    #[test]
    fn default_layout_matches_observed_convention() {
        let layout = SocketLayout::default();
        assert!(layout.is_shader_socket(3));
        assert!(layout.is_shader_socket(5));
        assert!(!layout.is_shader_socket(2));
        assert!(!layout.is_shader_socket(6));
        assert!(layout.is_ornament_socket(0));
        assert!(layout.is_ornament_socket(1));
        assert!(!layout.is_ornament_socket(2));
    }

    #[test]
    fn class_decode_tolerates_unknown_codes() {
        assert_eq!(ClassType::from_code(1), ClassType::Hunter);
        assert_eq!(ClassType::from_code(77), ClassType::Unknown);
        assert_eq!(RaceType::from_code(2), RaceType::Exo);
        assert_eq!(GenderType::from_code(-1), GenderType::Unknown);
    }
}
