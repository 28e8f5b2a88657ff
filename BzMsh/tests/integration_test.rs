//! End-to-end tests: write an MSH file, load it back, import it through a
//! sink and check the DDS files produced for its textures.

use std::path::{Path, PathBuf};

use bzmsh::batch::{find_files, load_models_batch};
use bzmsh::formats::dxtbz2::{Dxtbz2Header, TranscodeOptions, convert_dxtbz2_to_dds};
use bzmsh::formats::msh::{
    Anim, AnimationList, Block, BlockHeader, IDENTITY, Keyframe, Material, Mesh, Vertex,
    VertexGroup, inspect_msh, read_msh, write_msh,
};
use bzmsh::scene::{
    AnimationTarget, Armature, DirectoryLocator, ImportOptions, KeyframeTarget, MaterialDef,
    MeshGeometry, ResolvedKeyframe, SceneSink, import_scene, load_scene,
};
use bzmsh::{Result, Warning};
use ddsfile::{Dds, DxgiFormat};
use glam::Mat4;
use pretty_assertions::assert_eq;

fn triangle(name: &str, state: u32) -> Mesh {
    let vertex = |x: f32, y: f32| Vertex {
        pos: [x, y, 0.0],
        norm: [0.0, 0.0, 1.0],
        uv: [x, y],
    };
    Mesh {
        name: name.to_string(),
        matrix: IDENTITY,
        state_index: Some(state),
        vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)],
        vert_groups: vec![VertexGroup {
            vert_count: 3,
            index_count: 3,
            ..VertexGroup::default()
        }],
        indices: vec![0, 1, 2],
        ..Mesh::default()
    }
}

/// `body` with a textured child `arm`, and a two-key animation on the arm.
fn robot() -> Block {
    let mut arm = triangle("arm", 1);
    arm.matrix[13] = 1.5;
    arm.materials.push(Material {
        name: "Paint".to_string(),
        diffuse: [255, 0, 0, 255],
        emissive: [0, 0, 0, 255],
    });
    arm.textures.push("paint.tga".to_string());
    arm.vert_groups[0].material = Some(0);
    arm.vert_groups[0].texture = Some(0);

    let mut body = triangle("body", 0);
    body.children.push(arm);

    let key = |frame: u32| Keyframe {
        frame,
        vect: [0.0, frame as f32, 0.0],
        quat: [1.0, 0.0, 0.0, 0.0],
    };

    Block {
        name: "robot".to_string(),
        header: BlockHeader {
            scale: 1.0,
            move_anim: true,
            ..BlockHeader::default()
        },
        root: Some(body),
        animations: vec![AnimationList {
            name: "wave".to_string(),
            animations: vec![Anim {
                index: 1,
                states: vec![key(0), key(10)],
            }],
        }],
        ..Block::default()
    }
}

/// An 8x8 DXTBZ2 with two mips; `first` decides the pixel format guess.
fn write_dxtbz2(path: &Path, first: u32) {
    let header = Dxtbz2Header {
        signature: 0,
        dxt_level: 5,
        fallback_color: [0; 4],
        mip_count: 2,
        base_height: 8,
        base_width: 8,
    };
    let mut data = header.to_bytes().to_vec();
    for size in [first, 16] {
        data.extend_from_slice(&size.to_le_bytes());
        data.extend(std::iter::repeat_n(0xAB, size as usize));
    }
    std::fs::write(path, data).unwrap();
}

/// Sink that names handles after the objects they stand for.
#[derive(Default)]
struct NameSink {
    parents: Vec<(String, Option<String>)>,
    materials: Vec<(String, Option<PathBuf>)>,
    keys: Vec<(String, String, u32)>,
}

impl SceneSink for NameSink {
    type Handle = String;

    fn create_mesh_object(&mut self, name: &str, _: Option<&MeshGeometry>) -> Result<String> {
        Ok(name.to_string())
    }

    fn create_material(&mut self, material: &MaterialDef, texture: Option<&Path>) -> Result<String> {
        self.materials
            .push((material.name.clone(), texture.map(Path::to_path_buf)));
        Ok(material.name.clone())
    }

    fn assign_material(&mut self, _: &String, _: &String, _: usize, _: usize) -> Result<()> {
        Ok(())
    }

    fn set_parent_transform(&mut self, child: &String, parent: Option<&String>, _: &Mat4) -> Result<()> {
        self.parents.push((child.clone(), parent.cloned()));
        Ok(())
    }

    fn create_armature(&mut self, armature: &Armature, _: Option<&String>) -> Result<String> {
        Ok(armature.name.clone())
    }

    fn create_keyframe(
        &mut self,
        target: KeyframeTarget<'_, String>,
        action: &str,
        key: &ResolvedKeyframe,
    ) -> Result<()> {
        let target = match target {
            KeyframeTarget::Object(name) => name.clone(),
            KeyframeTarget::Bone { bone, .. } => bone.to_string(),
        };
        self.keys.push((target, action.to_string(), key.frame));
        Ok(())
    }
}

#[test]
fn test_written_model_loads_and_imports() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("robot.msh");
    let bitmaps = dir.path().join("bitmaps");
    std::fs::create_dir(&bitmaps).unwrap();
    write_dxtbz2(&bitmaps.join("paint.dxtbz2"), 64);
    write_msh(&[robot()], &model).unwrap();

    let msh = read_msh(&model).unwrap();
    assert_eq!(msh.blocks.len(), 1);
    assert!(msh.failed_blocks.is_empty());

    let options = ImportOptions::default();
    let scene = load_scene(&model, &options).unwrap();
    assert_eq!(scene.nodes.len(), 2);
    let arm = scene.find_node("arm").unwrap();
    assert_eq!(scene.nodes[arm].parent, scene.find_node("body"));
    assert_eq!(scene.nodes[arm].transform.w_axis.y, 1.5);
    assert_eq!(scene.animations[0].tracks[0].target, AnimationTarget::Node(arm));

    let mut sink = NameSink::default();
    let locator = DirectoryLocator::for_model(&model);
    let report = import_scene(&scene, &mut sink, &locator, &options).unwrap();

    assert_eq!(
        sink.parents,
        vec![
            ("body".to_string(), None),
            ("arm".to_string(), Some("body".to_string())),
        ]
    );
    let dds_path = bitmaps.join("paint.dds");
    assert!(sink.materials.contains(&("Paint".to_string(), Some(dds_path.clone()))));
    assert_eq!(report.converted_textures, vec![dds_path.clone()]);
    assert_eq!(
        sink.keys,
        vec![
            ("arm".to_string(), "arm_wave".to_string(), 0),
            ("arm".to_string(), "arm_wave".to_string(), 10),
        ]
    );
    assert!(report.warnings.is_empty());

    let dds = Dds::read(std::fs::File::open(&dds_path).unwrap()).unwrap();
    assert_eq!(dds.get_dxgi_format(), Some(DxgiFormat::BC3_UNorm));
    assert_eq!(dds.get_width(), 8);
    assert_eq!(dds.get_height(), 8);
    assert_eq!(dds.get_num_mipmap_levels(), 2);
}

#[test]
fn test_missing_texture_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("robot.msh");
    write_msh(&[robot()], &model).unwrap();

    let options = ImportOptions::default();
    let scene = load_scene(&model, &options).unwrap();
    let mut sink = NameSink::default();
    let report = import_scene(&scene, &mut sink, &DirectoryLocator::for_model(&model), &options)
        .unwrap();

    assert_eq!(report.objects, 2);
    assert_eq!(
        report.warnings,
        vec![Warning::ResourceNotFound {
            name: "paint.tga".to_string()
        }]
    );
    assert!(sink.materials.contains(&("Paint".to_string(), None)));
}

#[test]
fn test_opaque_texture_reads_as_bc1() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ground.dxtbz2");
    write_dxtbz2(&input, 32);

    let outcome = convert_dxtbz2_to_dds(&input, None, &TranscodeOptions::default()).unwrap();
    let dds = Dds::read(std::fs::File::open(outcome.path()).unwrap()).unwrap();
    assert_eq!(dds.get_dxgi_format(), Some(DxgiFormat::BC1_UNorm));
    assert_eq!(dds.get_num_mipmap_levels(), 2);
}

#[test]
fn test_batch_load_isolates_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    write_msh(&[robot()], dir.path().join("a.msh")).unwrap();
    write_msh(&[robot(), robot()], dir.path().join("b.msh")).unwrap();
    std::fs::write(dir.path().join("broken.msh"), b"NOPE").unwrap();

    let files = find_files(dir.path(), "msh").unwrap();
    assert_eq!(files.len(), 3);

    let result = load_models_batch(&files, &ImportOptions::default(), |_, _, _| {});
    assert_eq!(result.success_count, 2);
    assert_eq!(result.error_count, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].0, dir.path().join("broken.msh"));

    let info = inspect_msh(dir.path().join("b.msh")).unwrap();
    assert_eq!(info.blocks.len(), 2);
    assert_eq!(info.blocks[0].meshes.len(), 2);
}
