//! Normalized gear asset model
//!
//! The backing stores disagree on schema: the gear-asset table ships
//! snake_case arrays, the content store nests everything under a
//! `gear` object with component color channels, and the remote
//! definition endpoint wraps a camelCase body in a platform envelope.
//! Each source deserializes into its own record type here and is
//! normalized into [`GearAsset`] at the store boundary; nothing past
//! the manifest chain ever sees a per-source shape.

use serde::{Deserialize, Serialize};

/// Linear RGB triplet in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Neutral mid-gray used for fallback tinting.
    pub const MID_GRAY: Rgb = Rgb::new(0.5, 0.5, 0.5);

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(v: [f32; 3]) -> Self {
        Rgb::new(v[0], v[1], v[2])
    }
}

/// One dye assignment: the tints applied to a material's primary,
/// secondary and worn regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialDye {
    pub primary_tint: Rgb,
    pub secondary_tint: Rgb,
    pub worn_tint: Option<Rgb>,
}

/// Normalized union of what any backing store knows about a hash.
///
/// Identity is the source hash; instances are immutable once fetched
/// and cached for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GearAsset {
    pub hash: u32,
    pub custom_dyes: Vec<MaterialDye>,
    pub default_dyes: Vec<MaterialDye>,
    pub locked_dyes: Vec<MaterialDye>,
}

impl GearAsset {
    pub fn is_empty(&self) -> bool {
        self.custom_dyes.is_empty() && self.default_dyes.is_empty() && self.locked_dyes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Per-source wire records
// ---------------------------------------------------------------------------

/// Record shape served by the local gear-asset table export.
#[derive(Debug, Clone, Deserialize)]
pub struct GearTableRecord {
    #[serde(default)]
    pub custom_dyes: Vec<TableDye>,
    #[serde(default)]
    pub default_dyes: Vec<TableDye>,
    #[serde(default)]
    pub locked_dyes: Vec<TableDye>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableDye {
    pub primary_color: [f32; 3],
    pub secondary_color: [f32; 3],
    pub worn_color: Option<[f32; 3]>,
}

/// Record shape served by the content-addressed store.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRecord {
    pub gear: ContentGearBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentGearBody {
    #[serde(default)]
    pub custom: Vec<ContentDye>,
    #[serde(default)]
    pub default: Vec<ContentDye>,
    #[serde(default)]
    pub locked: Vec<ContentDye>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentDye {
    pub primary: ContentColor,
    pub secondary: ContentColor,
    pub worn: Option<ContentColor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// Record shape served by the remote per-hash definition endpoint,
/// inside the usual platform envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDefinitionRecord {
    #[serde(default)]
    pub custom_dyes: Vec<RemoteDye>,
    #[serde(default)]
    pub default_dyes: Vec<RemoteDye>,
    #[serde(default)]
    pub locked_dyes: Vec<RemoteDye>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDye {
    pub primary_color: [f32; 3],
    pub secondary_color: [f32; 3],
    pub worn_color: Option<[f32; 3]>,
}

/// Tagged per-source record, normalized exactly once at the store
/// boundary.
#[derive(Debug, Clone)]
pub enum SourceRecord {
    GearTable(GearTableRecord),
    Content(ContentRecord),
    Remote(RemoteDefinitionRecord),
}

impl SourceRecord {
    pub fn normalize(self, hash: u32) -> GearAsset {
        match self {
            SourceRecord::GearTable(rec) => GearAsset {
                hash,
                custom_dyes: rec.custom_dyes.into_iter().map(table_dye).collect(),
                default_dyes: rec.default_dyes.into_iter().map(table_dye).collect(),
                locked_dyes: rec.locked_dyes.into_iter().map(table_dye).collect(),
            },
            SourceRecord::Content(rec) => GearAsset {
                hash,
                custom_dyes: rec.gear.custom.into_iter().map(content_dye).collect(),
                default_dyes: rec.gear.default.into_iter().map(content_dye).collect(),
                locked_dyes: rec.gear.locked.into_iter().map(content_dye).collect(),
            },
            SourceRecord::Remote(rec) => GearAsset {
                hash,
                custom_dyes: rec.custom_dyes.into_iter().map(remote_dye).collect(),
                default_dyes: rec.default_dyes.into_iter().map(remote_dye).collect(),
                locked_dyes: rec.locked_dyes.into_iter().map(remote_dye).collect(),
            },
        }
    }
}

fn table_dye(d: TableDye) -> MaterialDye {
    MaterialDye {
        primary_tint: d.primary_color.into(),
        secondary_tint: d.secondary_color.into(),
        worn_tint: d.worn_color.map(Rgb::from),
    }
}

fn content_dye(d: ContentDye) -> MaterialDye {
    MaterialDye {
        primary_tint: content_color(d.primary),
        secondary_tint: content_color(d.secondary),
        worn_tint: d.worn.map(content_color),
    }
}

fn content_color(c: ContentColor) -> Rgb {
    Rgb::new(c.red, c.green, c.blue)
}

fn remote_dye(d: RemoteDye) -> MaterialDye {
    MaterialDye {
        primary_tint: d.primary_color.into(),
        secondary_tint: d.secondary_color.into(),
        worn_tint: d.worn_color.map(Rgb::from),
    }
}
