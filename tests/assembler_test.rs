use std::sync::Arc;

use glam::{Quat, Vec3};

use gcv_rust::assets::{DyeOrigin, Rgb};
use gcv_rust::assets::dye::ResolvedDyeSet;
use gcv_rust::config::CameraSettings;
use gcv_rust::networking::geometry::GeometryBundle;
use gcv_rust::rendering::{
    BoneDescriptor, MaterialRange, ModelAssembler, RawGeometry, SkinInfluence,
};
use gcv_rust::utils::{CapturingSink, DiagnosticEvent};
use gcv_rust::LoadError;

fn bone(name: &str, parent_index: i32) -> BoneDescriptor {
    BoneDescriptor {
        name: name.to_string(),
        local_position: Vec3::ZERO,
        local_rotation: Quat::IDENTITY,
        local_scale: Vec3::ONE,
        parent_index,
    }
}

fn dyes() -> ResolvedDyeSet {
    ResolvedDyeSet {
        primary_tint: Rgb::new(0.8, 0.1, 0.1),
        secondary_tint: Rgb::new(0.1, 0.8, 0.1),
        worn_tint: Rgb::new(0.1, 0.1, 0.8),
        origin: DyeOrigin::Custom,
        channel_overrides: Vec::new(),
    }
}

fn geometry() -> RawGeometry {
    RawGeometry {
        positions: vec![[0.0, 0.0, 0.0], [0.0, 1.8, 0.0], [1.0, 0.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        uvs: vec![[0.0, 0.0]; 3],
        indices: vec![0, 1, 2],
        materials: vec![
            MaterialRange {
                start_index: 0,
                index_count: 3,
                texture_refs: vec!["gearstack/chest.png".to_string()],
            },
        ],
    }
}

fn assembler() -> (ModelAssembler, Arc<CapturingSink>) {
    let sink = Arc::new(CapturingSink::new());
    (ModelAssembler::new(CameraSettings::default(), sink.clone()), sink)
}

#[test]
fn bone_hierarchy_attaches_children_in_sequence_order() {
    let (assembler, _sink) = assembler();
    let bundle = GeometryBundle {
        geometry: geometry(),
        bones: Some(vec![bone("root", -1), bone("spine", 0), bone("hip", 0), bone("neck", 1)]),
        skin: Some(vec![
            SkinInfluence { bone_indices: [0, 1, 0, 0], weights: [0.5, 0.5, 0.0, 0.0] };
            3
        ]),
        animations: Vec::new(),
    };

    let model = assembler.assemble(1, bundle, dyes()).unwrap();
    let skeleton = model.skeleton.unwrap();

    assert_eq!(skeleton.root, 0);
    assert_eq!(skeleton.nodes[0].children, vec![1, 2]);
    assert_eq!(skeleton.nodes[1].children, vec![3]);
    assert_eq!(skeleton.nodes[3].parent, Some(1));
    assert!(model.skinning.is_some());
}

#[test]
fn forward_parent_reference_is_rejected() {
    let (assembler, _sink) = assembler();
    let bundle = GeometryBundle {
        geometry: geometry(),
        bones: Some(vec![bone("root", -1), bone("orphan", 5)]),
        skin: None,
        animations: Vec::new(),
    };

    let err = assembler.assemble(1, bundle, dyes()).unwrap_err();
    assert!(matches!(err, LoadError::MalformedSkeleton { .. }));
}

#[test]
fn self_parent_reference_is_rejected() {
    let (assembler, _sink) = assembler();
    let bundle = GeometryBundle {
        geometry: geometry(),
        bones: Some(vec![bone("root", -1), bone("loop", 1)]),
        skin: None,
        animations: Vec::new(),
    };

    let err = assembler.assemble(1, bundle, dyes()).unwrap_err();
    assert!(matches!(err, LoadError::MalformedSkeleton { .. }));
}

#[test]
fn first_root_wins_when_several_claim_root() {
    let (assembler, _sink) = assembler();
    let bundle = GeometryBundle {
        geometry: geometry(),
        bones: Some(vec![bone("a", -1), bone("b", -1), bone("c", 1)]),
        skin: None,
        animations: Vec::new(),
    };

    let model = assembler.assemble(1, bundle, dyes()).unwrap();
    assert_eq!(model.skeleton.unwrap().root, 0);
}

#[test]
fn bones_without_skin_produce_unskinned_mesh_and_diagnostic() {
    let (assembler, sink) = assembler();
    let bundle = GeometryBundle {
        geometry: geometry(),
        bones: Some(vec![bone("root", -1)]),
        skin: None,
        animations: Vec::new(),
    };

    let model = assembler.assemble(42, bundle, dyes()).unwrap();
    assert!(model.skeleton.is_some());
    assert!(model.skinning.is_none());
    assert_eq!(sink.events(), vec![DiagnosticEvent::MissingSkinData { item_hash: 42 }]);
}

#[test]
fn absent_bones_produce_plain_mesh() {
    let (assembler, sink) = assembler();
    let bundle = GeometryBundle { geometry: geometry(), bones: None, skin: None, animations: Vec::new() };

    let model = assembler.assemble(1, bundle, dyes()).unwrap();
    assert!(model.skeleton.is_none());
    assert!(model.skinning.is_none());
    assert!(sink.events().is_empty());
}

#[test]
fn skin_weights_are_renormalized() {
    let (assembler, _sink) = assembler();
    let bundle = GeometryBundle {
        geometry: geometry(),
        bones: Some(vec![bone("root", -1), bone("spine", 0)]),
        skin: Some(vec![
            SkinInfluence { bone_indices: [0, 1, 0, 0], weights: [2.0, 2.0, 0.0, 0.0] },
            SkinInfluence { bone_indices: [0, 0, 0, 0], weights: [0.0, 0.0, 0.0, 0.0] },
            SkinInfluence { bone_indices: [0, 9, 0, 0], weights: [0.5, 0.5, 0.0, 0.0] },
        ]),
        animations: Vec::new(),
    };

    let model = assembler.assemble(1, bundle, dyes()).unwrap();
    let skinning = model.skinning.unwrap();

    assert_eq!(skinning[0].weights, [0.5, 0.5, 0.0, 0.0]);
    // Zero-sum weights collapse to a full binding on slot 0.
    assert_eq!(skinning[1].weights, [1.0, 0.0, 0.0, 0.0]);
    // Out-of-range bone index is dropped and the rest renormalized.
    assert_eq!(skinning[2].joints[1], 0);
    assert_eq!(skinning[2].weights, [1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn material_slots_carry_the_resolved_dyes() {
    let (assembler, _sink) = assembler();
    let bundle = GeometryBundle { geometry: geometry(), bones: None, skin: None, animations: Vec::new() };

    let model = assembler.assemble(1, bundle, dyes()).unwrap();
    assert_eq!(model.material_slots.len(), 1);
    assert_eq!(model.material_slots[0].texture_refs, vec!["gearstack/chest.png".to_string()]);
    assert_eq!(model.material_slots[0].dyes.origin, DyeOrigin::Custom);
    assert_eq!(model.material_slots[0].dyes.primary_tint, Rgb::new(0.8, 0.1, 0.1));
}

#[test]
fn degenerate_geometry_yields_safe_placement() {
    let (assembler, _sink) = assembler();
    let bundle = GeometryBundle {
        geometry: RawGeometry::default(),
        bones: None,
        skin: None,
        animations: Vec::new(),
    };

    let model = assembler.assemble(1, bundle, dyes()).unwrap();
    let placement = model.placement;
    assert_eq!(placement.scale, 1.0);
    assert_eq!(placement.translation, Vec3::new(0.0, -1.0, 0.0));
    assert!(placement.camera_distance.is_finite());
}

#[test]
fn native_scale_is_kept_above_threshold() {
    let (assembler, _sink) = assembler();
    let bundle = GeometryBundle { geometry: geometry(), bones: None, skin: None, animations: Vec::new() };

    let model = assembler.assemble(1, bundle, dyes()).unwrap();
    assert_eq!(model.placement.scale, 1.0, "models above threshold keep native scale");
}
