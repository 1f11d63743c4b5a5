//! Geometry content client
//!
//! Fetches the renderable payload for an item hash: vertex data,
//! optional bones and skin weights, material texture references and
//! the names of any animation clips shipped with the geometry.
//! Texture decoding and animation playback are someone else's
//! concern; this client only delivers the structured data.

use async_trait::async_trait;
use glam::{Quat, Vec3};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::rendering::model::{BoneDescriptor, MaterialRange, RawGeometry, SkinInfluence};

use super::{LoadError, LoadResult};

/// What the caller wants loaded alongside the base mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryOptions {
    pub load_skeleton: bool,
    pub load_textures: bool,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self { load_skeleton: true, load_textures: true }
    }
}

/// Everything the geometry endpoint knows about one item.
#[derive(Debug, Clone, Default)]
pub struct GeometryBundle {
    pub geometry: RawGeometry,
    pub bones: Option<Vec<BoneDescriptor>>,
    pub skin: Option<Vec<SkinInfluence>>,
    pub animations: Vec<String>,
}

#[async_trait]
pub trait GeometryFetcher: Send + Sync {
    async fn fetch_geometry(
        &self,
        item_hash: u32,
        options: GeometryOptions,
    ) -> LoadResult<GeometryBundle>;
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeometryDto {
    #[serde(default)]
    positions: Vec<[f32; 3]>,
    #[serde(default)]
    normals: Vec<[f32; 3]>,
    #[serde(default)]
    uvs: Vec<[f32; 2]>,
    #[serde(default)]
    indices: Vec<u32>,
    #[serde(default)]
    materials: Vec<MaterialDto>,
    #[serde(default)]
    bones: Vec<BoneDto>,
    #[serde(default)]
    skin: Vec<SkinDto>,
    #[serde(default)]
    animations: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialDto {
    start_index: u32,
    index_count: u32,
    #[serde(default)]
    texture_refs: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoneDto {
    name: String,
    position: [f32; 3],
    rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    scale: [f32; 3],
    parent_index: i32,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkinDto {
    bone_indices: [u16; 4],
    weights: [f32; 4],
}

impl GeometryDto {
    fn into_bundle(self, options: GeometryOptions) -> GeometryBundle {
        let materials = self
            .materials
            .into_iter()
            .map(|m| MaterialRange {
                start_index: m.start_index,
                index_count: m.index_count,
                texture_refs: if options.load_textures { m.texture_refs } else { Vec::new() },
            })
            .collect();

        let geometry = RawGeometry {
            positions: self.positions,
            normals: self.normals,
            uvs: self.uvs,
            indices: self.indices,
            materials,
        };

        let (bones, skin) = if options.load_skeleton {
            let bones = (!self.bones.is_empty()).then(|| {
                self.bones
                    .into_iter()
                    .map(|b| BoneDescriptor {
                        name: b.name,
                        local_position: Vec3::from_array(b.position),
                        local_rotation: Quat::from_array(b.rotation),
                        local_scale: Vec3::from_array(b.scale),
                        parent_index: b.parent_index,
                    })
                    .collect()
            });
            let skin = (!self.skin.is_empty()).then(|| {
                self.skin
                    .into_iter()
                    .map(|s| SkinInfluence { bone_indices: s.bone_indices, weights: s.weights })
                    .collect()
            });
            (bones, skin)
        } else {
            (None, None)
        };

        GeometryBundle { geometry, bones, skin, animations: self.animations }
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Geometry client over the content platform.
pub struct ContentGeometryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ContentGeometryClient {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl GeometryFetcher for ContentGeometryClient {
    async fn fetch_geometry(
        &self,
        item_hash: u32,
        options: GeometryOptions,
    ) -> LoadResult<GeometryBundle> {
        let url = self
            .base_url
            .join(&format!("geometry/{item_hash}.json"))
            .map_err(|e| LoadError::Decode { reason: e.to_string() })?;

        debug!("fetching geometry for item {}", item_hash);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Transport { reason: e.to_string() })?;

        let status = response.status().as_u16();
        if status == 401 {
            return Err(LoadError::AuthExpired);
        }
        if !(200..300).contains(&status) {
            return Err(LoadError::Transport { reason: format!("HTTP {status}") });
        }

        let dto: GeometryDto = response
            .json()
            .await
            .map_err(|e| LoadError::Decode { reason: e.to_string() })?;
        let bundle = dto.into_bundle(options);

        info!(
            "🔺 Geometry for item {}: {} vert(s), {} bone(s)",
            item_hash,
            bundle.geometry.positions.len(),
            bundle.bones.as_ref().map(Vec::len).unwrap_or(0)
        );

        Ok(bundle)
    }
}
