//! 描画用モデルに関係するモジュール。

use crate::rendering::{LineVertex, ModelVertex};
use anyhow::Result;

use glium::{backend::Facade, index::PrimitiveType, IndexBuffer, VertexBuffer};
use itertools::Itertools;
use log::info;
use ultraviolet::{Vec2, Vec3};
use weavy_crab::{Face, Material, Model};

/// 法線を持たない頂点に使う法線。
const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// 同じマテリアルで描画される VBO/IBO の組を表す。
#[derive(Debug)]
pub struct ModelGroup {
    material_name: String,
    vertex_buffer: VertexBuffer<ModelVertex>,
    index_buffer: IndexBuffer<u32>,
}

impl ModelGroup {
    /// マテリアル名を返す。マテリアル未指定なら空文字列。
    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    /// VBO を返す。
    pub fn vertex_buffer(&self) -> &VertexBuffer<ModelVertex> {
        &self.vertex_buffer
    }

    /// IBO を返す。
    pub fn index_buffer(&self) -> &IndexBuffer<u32> {
        &self.index_buffer
    }

    fn from_buffers(
        facade: &impl Facade,
        material_name: &str,
        vertices: &[ModelVertex],
        indices: &[u32],
    ) -> Result<ModelGroup> {
        let vertex_buffer = VertexBuffer::new(facade, vertices)?;
        let index_buffer = IndexBuffer::new(facade, PrimitiveType::TrianglesList, indices)?;

        Ok(ModelGroup {
            material_name: material_name.to_owned(),
            vertex_buffer,
            index_buffer,
        })
    }
}

/// マテリアルが連続する面ごとに `ModelGroup` を作る。
pub fn upload_groups<H>(facade: &impl Facade, model: &Model<H>) -> Result<Vec<ModelGroup>> {
    let mut groups = vec![];
    for run in model.material_runs() {
        let (vertices, indices) = triangulate(model, run.faces);
        if indices.is_empty() {
            continue;
        }
        groups.push(ModelGroup::from_buffers(
            facade,
            run.material_name,
            &vertices,
            &indices,
        )?);
    }

    info!(
        "Uploaded {} draw groups for {} faces",
        groups.len(),
        model.face_count()
    );
    Ok(groups)
}

/// グループの描画に使うマテリアルを引く。名前が空か、どのライブラリにも
/// 定義されていなければ `None` で、既定色で描画される。
pub fn group_material<'m, H>(
    model: &'m Model<H>,
    group_name: &str,
) -> Option<&'m Material<H>> {
    if group_name.is_empty() {
        None
    } else {
        model.material(group_name)
    }
}

/// 読み込みに失敗したときに表示する立方体を作る。
pub fn upload_fallback_cube(facade: &impl Facade) -> Result<ModelGroup> {
    let (vertices, indices) = cube_mesh();
    ModelGroup::from_buffers(facade, "", &vertices, &indices)
}

/// 原点から伸びる X/Y/Z 軸 (赤/緑/青) の VBO を作る。
pub fn upload_axes(facade: &impl Facade, length: f32) -> Result<VertexBuffer<LineVertex>> {
    Ok(VertexBuffer::new(facade, &axis_lines(length))?)
}

/// 面を扇形に三角形分割し、頂点と三角形リストのインデックスに変換する。
/// 有効な頂点が 3 つ未満の面は何も生成しない。
pub fn triangulate<H>(model: &Model<H>, faces: &[Face]) -> (Vec<ModelVertex>, Vec<u32>) {
    let mut vertices = vec![];
    let mut indices = vec![];

    for face in faces {
        let vertex_base = vertices.len() as u32;
        let face_vertices: Vec<_> = model.face_vertices(face).collect();
        if face_vertices.len() < 3 {
            continue;
        }

        vertices.extend(face_vertices.iter().map(|v| ModelVertex {
            position: v.position.into(),
            normal: v.normal.map_or(DEFAULT_NORMAL, |n| n.into()),
            uv: v.uv.unwrap_or_else(Vec2::zero).into(),
        }));
        for (i, j) in (1..face_vertices.len() as u32).tuple_windows() {
            indices.push(vertex_base);
            indices.push(vertex_base + i);
            indices.push(vertex_base + j);
        }
    }

    (vertices, indices)
}

/// 一辺 1 の立方体。
pub fn cube_mesh() -> (Vec<ModelVertex>, Vec<u32>) {
    let sides = [
        (Vec3::unit_x(), Vec3::unit_y()),
        (-Vec3::unit_x(), Vec3::unit_y()),
        (Vec3::unit_y(), Vec3::unit_z()),
        (-Vec3::unit_y(), Vec3::unit_z()),
        (Vec3::unit_z(), Vec3::unit_x()),
        (-Vec3::unit_z(), Vec3::unit_x()),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for &(normal, up) in &sides {
        let right = up.cross(normal);
        let base = vertices.len() as u32;
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        for &(r, u) in &corners {
            let position = (normal + right * r + up * u) * 0.5;
            vertices.push(ModelVertex {
                position: position.into(),
                normal: normal.into(),
                uv: [(r + 1.0) * 0.5, (u + 1.0) * 0.5],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

fn axis_lines(length: f32) -> Vec<LineVertex> {
    let axes = [
        (Vec3::unit_x(), [1.0, 0.0, 0.0]),
        (Vec3::unit_y(), [0.0, 1.0, 0.0]),
        (Vec3::unit_z(), [0.0, 0.0, 1.0]),
    ];
    axes.iter()
        .flat_map(|&(direction, color)| {
            vec![
                LineVertex {
                    position: [0.0, 0.0, 0.0],
                    color,
                },
                LineVertex {
                    position: (direction * length).into(),
                    color,
                },
            ]
        })
        .collect()
}
