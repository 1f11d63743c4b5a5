use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use gcv_rust::assets::{
    DyeOrigin, DyeResolver, GearAsset, GearAssetStore, ManifestLookup, MaterialDye, Rgb,
    StoreError,
};
use gcv_rust::utils::{CapturingSink, DiagnosticEvent};
use gcv_rust::world::{ArmorPieceDescriptor, ArmorSlot, ChannelOverride};

fn dye(r: f32) -> MaterialDye {
    MaterialDye {
        primary_tint: Rgb::new(r, 0.0, 0.0),
        secondary_tint: Rgb::new(0.0, r, 0.0),
        worn_tint: Some(Rgb::new(0.0, 0.0, r)),
    }
}

fn piece(slot: ArmorSlot, item_hash: u32, shader_hash: u32) -> ArmorPieceDescriptor {
    ArmorPieceDescriptor { slot, item_hash, shader_hash, channel_overrides: Vec::new() }
}

/// Map-backed store recording which hashes were asked for.
struct RecordingStore {
    records: HashMap<u32, GearAsset>,
    asked: Mutex<Vec<u32>>,
}

impl RecordingStore {
    fn new(records: HashMap<u32, GearAsset>) -> Self {
        Self { records, asked: Mutex::new(Vec::new()) }
    }

    fn asked(&self) -> Vec<u32> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl GearAssetStore for RecordingStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn fetch(&self, hash: u32) -> Result<Option<GearAsset>, StoreError> {
        self.asked.lock().unwrap().push(hash);
        Ok(self.records.get(&hash).cloned())
    }
}

struct Fixture {
    store: Arc<RecordingStore>,
    sink: Arc<CapturingSink>,
    resolver: DyeResolver,
}

fn fixture(records: HashMap<u32, GearAsset>) -> Fixture {
    let store = Arc::new(RecordingStore::new(records));
    let sink = Arc::new(CapturingSink::new());
    let manifest = Arc::new(ManifestLookup::new(vec![Box::new(SharedStore(store.clone()))]));
    let resolver = DyeResolver::new(manifest, sink.clone());
    Fixture { store, sink, resolver }
}

/// Adapter so the fixture can keep a handle to the store it hands the
/// manifest chain.
struct SharedStore(Arc<RecordingStore>);

#[async_trait]
impl GearAssetStore for SharedStore {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn fetch(&self, hash: u32) -> Result<Option<GearAsset>, StoreError> {
        self.0.fetch(hash).await
    }
}

#[tokio::test]
async fn custom_dyes_win_regardless_of_other_sources() {
    let shader = GearAsset {
        hash: 500,
        custom_dyes: vec![dye(0.9)],
        default_dyes: vec![dye(0.1)],
        ..Default::default()
    };
    let item = GearAsset { hash: 100, locked_dyes: vec![dye(0.2)], ..Default::default() };
    let fx = fixture(HashMap::from([(500, shader), (100, item)]));

    let resolved = fx.resolver.resolve(&piece(ArmorSlot::Helmet, 100, 500)).await.unwrap();
    assert_eq!(resolved.origin, DyeOrigin::Custom);
    assert_eq!(resolved.primary_tint, Rgb::new(0.9, 0.0, 0.0));
    assert_eq!(resolved.worn_tint, Rgb::new(0.0, 0.0, 0.9));
}

#[tokio::test]
async fn default_dyes_apply_when_custom_is_empty() {
    let shader = GearAsset { hash: 500, default_dyes: vec![dye(0.4)], ..Default::default() };
    let fx = fixture(HashMap::from([(500, shader)]));

    let resolved = fx.resolver.resolve(&piece(ArmorSlot::Chest, 100, 500)).await.unwrap();
    assert_eq!(resolved.origin, DyeOrigin::Default);
    assert_eq!(resolved.primary_tint, Rgb::new(0.4, 0.0, 0.0));
}

#[tokio::test]
async fn locked_dyes_apply_when_no_shader_is_equipped() {
    let item = GearAsset { hash: 100, locked_dyes: vec![dye(0.7)], ..Default::default() };
    let fx = fixture(HashMap::from([(100, item)]));

    let resolved = fx.resolver.resolve(&piece(ArmorSlot::Legs, 100, 0)).await.unwrap();
    assert_eq!(resolved.origin, DyeOrigin::Locked);
    assert_eq!(resolved.secondary_tint, Rgb::new(0.0, 0.7, 0.0));
}

#[tokio::test]
async fn locked_dyes_apply_when_shader_is_absent_everywhere() {
    let item = GearAsset { hash: 100, locked_dyes: vec![dye(0.7)], ..Default::default() };
    let fx = fixture(HashMap::from([(100, item)]));

    let resolved = fx.resolver.resolve(&piece(ArmorSlot::Legs, 100, 999)).await.unwrap();
    assert_eq!(resolved.origin, DyeOrigin::Locked);
}

#[tokio::test]
async fn no_shader_and_no_locked_dyes_falls_back_without_shader_lookup() {
    let fx = fixture(HashMap::new());

    let resolved = fx.resolver.resolve(&piece(ArmorSlot::Chest, 4112577340, 0)).await.unwrap();
    assert_eq!(resolved.origin, DyeOrigin::Fallback);
    assert_eq!(resolved.primary_tint, Rgb::MID_GRAY);
    assert_eq!(resolved.secondary_tint, Rgb::MID_GRAY);
    assert_eq!(resolved.worn_tint, Rgb::MID_GRAY);

    // Only the item hash was ever asked for; shader hash 0 must never
    // reach the manifest.
    assert_eq!(fx.store.asked(), vec![4112577340]);
}

#[tokio::test]
async fn unresolved_hash_is_reported_once_per_session() {
    let fx = fixture(HashMap::new());

    let first = fx.resolver.resolve(&piece(ArmorSlot::Helmet, 100, 999)).await.unwrap();
    let second = fx.resolver.resolve(&piece(ArmorSlot::Chest, 101, 999)).await.unwrap();
    assert_eq!(first.origin, DyeOrigin::Fallback);
    assert_eq!(second.origin, DyeOrigin::Fallback);

    let unresolved: Vec<_> = fx
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, DiagnosticEvent::UnresolvedDye { .. }))
        .collect();
    assert_eq!(unresolved, vec![DiagnosticEvent::UnresolvedDye { hash: 999 }]);
}

#[tokio::test]
async fn channel_overrides_ride_along_untouched() {
    let overrides = vec![
        ChannelOverride { dye_hash: 871, channel_hash: 662199250 },
        ChannelOverride { dye_hash: 872, channel_hash: 1367384683 },
    ];
    let fx = fixture(HashMap::new());

    let descriptor = ArmorPieceDescriptor {
        slot: ArmorSlot::ClassItem,
        item_hash: 100,
        shader_hash: 0,
        channel_overrides: overrides.clone(),
    };
    let resolved = fx.resolver.resolve(&descriptor).await.unwrap();
    assert_eq!(resolved.channel_overrides, overrides);
}
