//! Synthetic MSH records shared by unit tests.

use super::types::{
    Anim, AnimationList, Block, BlockHeader, BoneWeight, BuckyDesc, GlobalGeometry, IDENTITY,
    Keyframe, Material, Mesh, SkinData, SkinState, Vertex, VertexGroup,
};

pub fn material(name: &str) -> Material {
    Material {
        name: name.to_string(),
        diffuse: [200, 180, 160, 255],
        emissive: [0, 0, 0, 255],
    }
}

pub fn vertex(x: f32, y: f32) -> Vertex {
    Vertex {
        pos: [x, y, 0.0],
        norm: [0.0, 0.0, 1.0],
        uv: [x * 0.5, y * 0.25],
    }
}

pub fn key(frame: u32, x: f32) -> Keyframe {
    Keyframe {
        frame,
        vect: [x, 0.0, 0.0],
        quat: [1.0, 0.0, 0.0, 0.0],
    }
}

/// One triangle in one vertex group, optionally with a material and texture.
pub fn triangle_mesh(name: &str, material_name: Option<&str>, texture: Option<&str>) -> Mesh {
    let mut mesh = Mesh {
        name: name.to_string(),
        matrix: IDENTITY,
        vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)],
        vert_groups: vec![VertexGroup {
            vert_count: 3,
            index_count: 3,
            ..VertexGroup::default()
        }],
        indices: vec![0, 1, 2],
        ..Mesh::default()
    };
    if let Some(m) = material_name {
        mesh.materials.push(material(m));
        mesh.vert_groups[0].material = Some(0);
    }
    if let Some(t) = texture {
        mesh.textures.push(t.to_string());
        mesh.vert_groups[0].texture = Some(0);
    }
    mesh
}

/// Two groups: a triangle over 3 vertices, then a quad over 4 vertices.
/// Indices are local to each group's vertex slice.
pub fn two_group_mesh(name: &str) -> Mesh {
    Mesh {
        name: name.to_string(),
        matrix: IDENTITY,
        vertices: vec![
            vertex(0.0, 0.0),
            vertex(1.0, 0.0),
            vertex(0.0, 1.0),
            vertex(2.0, 0.0),
            vertex(3.0, 0.0),
            vertex(3.0, 1.0),
            vertex(2.0, 1.0),
        ],
        vert_groups: vec![
            VertexGroup {
                vert_count: 3,
                index_count: 3,
                flags: 0,
                material: Some(0),
                texture: Some(0),
            },
            VertexGroup {
                vert_count: 4,
                index_count: 6,
                flags: 0,
                material: Some(1),
                texture: Some(1),
            },
        ],
        indices: vec![0, 1, 2, 0, 1, 2, 0, 2, 3],
        colors: (0..7).map(|i| [i * 10, 0, 0, 255]).collect(),
        materials: vec![material("Steel"), material("Glass")],
        textures: vec!["steel.tga".to_string(), "glass.tga".to_string()],
        ..Mesh::default()
    }
}

/// `hull { turret { barrel }, tracks }`, move-animated, with state
/// indices following pre-order and one animation list.
pub fn hierarchy_block(name: &str) -> Block {
    let mut hull = two_group_mesh("hull");
    hull.state_index = Some(0);
    hull.matrix[12] = 5.0;

    let mut turret = triangle_mesh("turret", Some("Steel"), Some("turret_steel.tga"));
    turret.state_index = Some(1);
    turret.matrix[13] = 2.0;

    let mut barrel = triangle_mesh("barrel", None, None);
    barrel.state_index = Some(2);

    let mut tracks = triangle_mesh("tracks", Some("Rubber"), None);
    tracks.state_index = Some(3);

    turret.children.push(barrel);
    hull.children.push(turret);
    hull.children.push(tracks);

    Block {
        name: name.to_string(),
        header: BlockHeader {
            scale: 1.0,
            move_anim: true,
            ..BlockHeader::default()
        },
        root: Some(hull),
        animations: vec![AnimationList {
            name: "fire".to_string(),
            animations: vec![
                Anim {
                    index: 2,
                    states: vec![key(10, 0.0), key(5, -0.5), key(20, 0.0)],
                },
                Anim {
                    index: 99,
                    states: vec![key(0, 1.0)],
                },
                Anim {
                    index: 1,
                    states: vec![key(0, 0.0), key(30, 0.0)],
                },
            ],
        }],
        ..Block::default()
    }
}

fn flat_geometry() -> GlobalGeometry {
    GlobalGeometry {
        positions: (0..6).map(|i| [i as f32, 0.0, 0.0]).collect(),
        vert_groups: vec![
            VertexGroup {
                vert_count: 3,
                index_count: 3,
                flags: 0,
                ..VertexGroup::default()
            },
            VertexGroup {
                vert_count: 3,
                index_count: 3,
                flags: 1,
                ..VertexGroup::default()
            },
        ],
        indices: vec![0, 1, 2, 2, 1, 0],
        uvs: (0..6).map(|i| [0.0, i as f32 * 0.1]).collect(),
        normals: vec![[0.0, 1.0, 0.0]; 6],
        colors: Vec::new(),
    }
}

fn bucky() -> Vec<BuckyDesc> {
    vec![
        BuckyDesc {
            material: material("Steel"),
            texture: "steel.tga".to_string(),
        },
        BuckyDesc {
            material: material("Paint"),
            texture: "paint.tga".to_string(),
        },
    ]
}

/// Block carrying flat geometry and bucky descriptors next to a root mesh.
pub fn global_block(name: &str) -> Block {
    Block {
        name: name.to_string(),
        header: BlockHeader {
            scale: 1.0,
            single_geometry: true,
            ..BlockHeader::default()
        },
        root: Some(triangle_mesh("root", Some("Steel"), None)),
        global: Some(flat_geometry()),
        bucky: bucky(),
        ..Block::default()
    }
}

/// Skinned Block: flat geometry, two skin states and no root mesh.
pub fn skinned_block(name: &str) -> Block {
    let mut child = IDENTITY;
    child[13] = 1.0;
    Block {
        name: name.to_string(),
        header: BlockHeader {
            scale: 1.0,
            skinned: true,
            ..BlockHeader::default()
        },
        global: Some(flat_geometry()),
        bucky: bucky(),
        animations: vec![AnimationList {
            name: "walk".to_string(),
            animations: vec![
                Anim {
                    index: 1,
                    states: vec![key(0, 0.0), key(12, 1.0)],
                },
                Anim {
                    index: 5,
                    states: vec![key(0, 0.0)],
                },
            ],
        }],
        skin: Some(SkinData {
            states: vec![
                SkinState {
                    parent: None,
                    matrix: IDENTITY,
                },
                SkinState {
                    parent: Some(0),
                    matrix: child,
                },
            ],
            weights: (0..6)
                .map(|v| BoneWeight {
                    vertex: v,
                    state: v % 2,
                    weight: 1.0,
                })
                .collect(),
        }),
        ..Block::default()
    }
}
