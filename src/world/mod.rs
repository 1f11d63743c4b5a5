//! Character domain model and load orchestration

pub mod character;
pub mod loader;

pub use character::{
    ArmorPieceDescriptor, ArmorSlot, ChannelOverride, Character, ClassType, EquipmentResolver,
    EquippedItem, GenderType, RaceType, SocketEntry, SocketLayout,
};
pub use loader::{CharacterLoader, LoadedCharacter, LoadedPiece, SkippedPiece};
