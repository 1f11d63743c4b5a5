//! Profile endpoint client
//!
//! Fetches a character profile snapshot from the platform API and
//! flattens the component envelope into the typed collections the
//! resolvers consume. The wire shapes stay private to this module;
//! everything downstream works on [`ProfileSnapshot`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::world::character::{ArmorSlot, ChannelOverride, EquippedItem, SocketEntry};

use super::credentials::CredentialProvider;
use super::{LoadError, LoadResult};

/// Profile component codes understood by this pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Characters,
    RenderData,
    Equipment,
    ItemSockets,
}

impl ComponentType {
    pub const fn code(&self) -> u32 {
        match self {
            ComponentType::Characters => 200,
            ComponentType::RenderData => 203,
            ComponentType::Equipment => 205,
            ComponentType::ItemSockets => 305,
        }
    }

    /// The component set a full character load needs.
    pub const CHARACTER_LOAD: [ComponentType; 4] = [
        ComponentType::Characters,
        ComponentType::RenderData,
        ComponentType::Equipment,
        ComponentType::ItemSockets,
    ];
}

/// Raw character summary as carried by the characters component.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterComponent {
    pub class_type: i32,
    pub gender_type: i32,
    pub race_type: i32,
    pub light: i32,
    pub emblem_path: String,
}

/// One peer-view equipment entry: an item and its cosmetic dye
/// overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerViewEntry {
    pub item_hash: u32,
    pub dyes: Vec<ChannelOverride>,
}

/// Flattened, typed view of one profile fetch. All maps are keyed the
/// way the resolvers look things up: characters, equipment and peer
/// view by character id, sockets by item instance id.
#[derive(Debug, Clone, Default)]
pub struct ProfileSnapshot {
    pub characters: HashMap<String, CharacterComponent>,
    pub equipment: HashMap<String, Vec<EquippedItem>>,
    pub sockets: HashMap<String, Vec<SocketEntry>>,
    pub peer_view: HashMap<String, Vec<PeerViewEntry>>,
}

#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch_profile(
        &self,
        membership_type: i32,
        membership_id: &str,
        components: &[ComponentType],
    ) -> LoadResult<ProfileSnapshot>;
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    #[serde(rename = "Response")]
    response: ProfileBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileBody {
    #[serde(default)]
    characters: ComponentData<HashMap<String, CharacterDto>>,
    #[serde(default)]
    character_equipment: ComponentData<HashMap<String, ItemListDto>>,
    #[serde(default)]
    character_render_data: ComponentData<HashMap<String, RenderDataDto>>,
    #[serde(default)]
    item_components: ItemComponentsDto,
}

#[derive(Debug, Default, Deserialize)]
struct ComponentData<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterDto {
    class_type: i32,
    gender_type: i32,
    race_type: i32,
    light: i32,
    #[serde(default)]
    emblem_path: String,
}

#[derive(Debug, Deserialize)]
struct ItemListDto {
    #[serde(default)]
    items: Vec<ItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDto {
    item_hash: u32,
    #[serde(default)]
    item_instance_id: Option<String>,
    bucket_hash: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemComponentsDto {
    #[serde(default)]
    sockets: ComponentData<HashMap<String, SocketListDto>>,
}

#[derive(Debug, Deserialize)]
struct SocketListDto {
    #[serde(default)]
    sockets: Vec<SocketDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocketDto {
    #[serde(default)]
    plug_hash: Option<u32>,
    #[serde(default)]
    is_enabled: bool,
    #[serde(default)]
    is_visible: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderDataDto {
    #[serde(default)]
    peer_view: Option<PeerViewDto>,
}

#[derive(Debug, Deserialize)]
struct PeerViewDto {
    #[serde(default)]
    equipment: Vec<PeerViewItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeerViewItemDto {
    item_hash: u32,
    #[serde(default)]
    dyes: Vec<DyeOverrideDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DyeOverrideDto {
    dye_hash: u32,
    channel_hash: u32,
}

impl ProfileEnvelope {
    fn into_snapshot(self) -> ProfileSnapshot {
        let body = self.response;
        let mut snapshot = ProfileSnapshot::default();

        for (character_id, dto) in body.characters.data.unwrap_or_default() {
            snapshot.characters.insert(
                character_id,
                CharacterComponent {
                    class_type: dto.class_type,
                    gender_type: dto.gender_type,
                    race_type: dto.race_type,
                    light: dto.light,
                    emblem_path: dto.emblem_path,
                },
            );
        }

        for (character_id, list) in body.character_equipment.data.unwrap_or_default() {
            let items = list
                .items
                .into_iter()
                .filter_map(|item| {
                    // Only armor buckets matter here; instanced items only.
                    let slot = ArmorSlot::from_bucket_hash(item.bucket_hash)?;
                    let instance_id = item.item_instance_id?;
                    Some(EquippedItem { slot, item_hash: item.item_hash, instance_id })
                })
                .collect();
            snapshot.equipment.insert(character_id, items);
        }

        for (instance_id, list) in body.item_components.sockets.data.unwrap_or_default() {
            let sockets = list
                .sockets
                .into_iter()
                .enumerate()
                .map(|(index, dto)| SocketEntry {
                    index,
                    plug_hash: dto.plug_hash.unwrap_or(0),
                    is_enabled: dto.is_enabled,
                    is_visible: dto.is_visible,
                })
                .collect();
            snapshot.sockets.insert(instance_id, sockets);
        }

        for (character_id, dto) in body.character_render_data.data.unwrap_or_default() {
            let entries = dto
                .peer_view
                .map(|pv| {
                    pv.equipment
                        .into_iter()
                        .map(|entry| PeerViewEntry {
                            item_hash: entry.item_hash,
                            dyes: entry
                                .dyes
                                .into_iter()
                                .map(|d| ChannelOverride {
                                    dye_hash: d.dye_hash,
                                    channel_hash: d.channel_hash,
                                })
                                .collect(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            snapshot.peer_view.insert(character_id, entries);
        }

        snapshot
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Profile client over the platform HTTP API.
pub struct BungieProfileClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl BungieProfileClient {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        api_key: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self { http, base_url, api_key: api_key.into(), credentials }
    }
}

#[async_trait]
impl ProfileFetcher for BungieProfileClient {
    async fn fetch_profile(
        &self,
        membership_type: i32,
        membership_id: &str,
        components: &[ComponentType],
    ) -> LoadResult<ProfileSnapshot> {
        let url = self
            .base_url
            .join(&format!("{membership_type}/Profile/{membership_id}/"))
            .map_err(|e| LoadError::Decode { reason: e.to_string() })?;

        let component_list = components
            .iter()
            .map(|c| c.code().to_string())
            .collect::<Vec<_>>()
            .join(",");

        debug!("fetching profile {} with components {}", membership_id, component_list);

        let token = self.credentials.bearer_token().await?;
        let response = self
            .http
            .get(url)
            .query(&[("components", component_list.as_str())])
            .header("X-API-Key", &self.api_key)
            .bearer_auth(token)
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

        let envelope: ProfileEnvelope = response
            .json()
            .await
            .map_err(|e| LoadError::Decode { reason: e.to_string() })?;

        let snapshot = envelope.into_snapshot();
        info!(
            "📦 Profile fetched: {} character(s), {} socketed instance(s)",
            snapshot.characters.len(),
            snapshot.sockets.len()
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_codes_match_remote_schema() {
        assert_eq!(ComponentType::Characters.code(), 200);
        assert_eq!(ComponentType::RenderData.code(), 203);
        assert_eq!(ComponentType::Equipment.code(), 205);
        assert_eq!(ComponentType::ItemSockets.code(), 305);
    }

    #[test]
    fn envelope_flattens_into_snapshot() {
        let raw = r#"{
            "Response": {
                "characters": {
                    "data": {
                        "2305843009300000000": {
                            "classType": 1, "genderType": 0, "raceType": 2,
                            "light": 1810, "emblemPath": "/common/emblem.jpg"
                        }
                    }
                },
                "characterEquipment": {
                    "data": {
                        "2305843009300000000": {
                            "items": [
                                {"itemHash": 4112577340, "itemInstanceId": "6917529000000000001", "bucketHash": 14239492},
                                {"itemHash": 999999, "itemInstanceId": "6917529000000000002", "bucketHash": 1498876634}
                            ]
                        }
                    }
                },
                "itemComponents": {
                    "sockets": {
                        "data": {
                            "6917529000000000001": {
                                "sockets": [
                                    {"plugHash": 11, "isEnabled": true, "isVisible": false},
                                    {},
                                    {"plugHash": 0, "isEnabled": true, "isVisible": true},
                                    {"plugHash": 0, "isEnabled": true, "isVisible": true},
                                    {"plugHash": 500, "isEnabled": true, "isVisible": true}
                                ]
                            }
                        }
                    }
                },
                "characterRenderData": {
                    "data": {
                        "2305843009300000000": {
                            "peerView": {
                                "equipment": [
                                    {"itemHash": 4112577340, "dyes": [{"channelHash": 662199250, "dyeHash": 871}]}
                                ]
                            }
                        }
                    }
                }
            }
        }"#;

        let envelope: ProfileEnvelope = serde_json::from_str(raw).unwrap();
        let snapshot = envelope.into_snapshot();

        let character = &snapshot.characters["2305843009300000000"];
        assert_eq!(character.class_type, 1);
        assert_eq!(character.light, 1810);

        // The weapon bucket entry is dropped; only armor buckets survive.
        let items = &snapshot.equipment["2305843009300000000"];
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slot, ArmorSlot::Chest);

        let sockets = &snapshot.sockets["6917529000000000001"];
        assert_eq!(sockets.len(), 5);
        assert_eq!(sockets[4].index, 4);
        assert_eq!(sockets[4].plug_hash, 500);
        assert_eq!(sockets[1].plug_hash, 0);

        let peer = &snapshot.peer_view["2305843009300000000"];
        assert_eq!(peer[0].dyes[0].channel_hash, 662199250);
    }
}
