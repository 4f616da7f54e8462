//! 読み込まれた Wavefront OBJ のモデルと、その巡回に関係するモジュール。

use crate::{bounds::Bounds, mtl::Material};
use std::{collections::HashMap, convert::TryFrom};

use ultraviolet::{Mat4, Vec2, Vec3};

/// Wavefront OBJ の面を表す。
/// インデックスは 0 始まりに解決済みだが、範囲外の値も検証せずそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub(crate) vertex_indices: Box<[isize]>,
    pub(crate) uv_indices: Box<[isize]>,
    pub(crate) normal_indices: Box<[isize]>,
    pub(crate) material_name: String,
}

impl Face {
    /// 頂点座標のインデックスリストを返す。
    pub fn vertex_indices(&self) -> &[isize] {
        &self.vertex_indices
    }

    /// テクスチャ座標のインデックスリストを返す。頂点数より短いこともある。
    pub fn uv_indices(&self) -> &[isize] {
        &self.uv_indices
    }

    /// 法線のインデックスリストを返す。頂点数より短いこともある。
    pub fn normal_indices(&self) -> &[isize] {
        &self.normal_indices
    }

    /// この面が定義された時点の `usemtl` の名前を返す。未指定なら空文字列。
    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    /// 面の頂点数を返す。
    pub fn arity(&self) -> usize {
        self.vertex_indices.len()
    }
}

/// 巡回時に取り出される面の 1 頂点を表す。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceVertex {
    pub position: Vec3,
    pub uv: Option<Vec2>,
    pub normal: Option<Vec3>,
}

/// 読み込まれた Wavefront OBJ の内容と、表示用の正規化情報を表す。
#[derive(Debug)]
pub struct Model<H> {
    pub(crate) vertices: Box<[Vec3]>,
    pub(crate) normals: Box<[Vec3]>,
    pub(crate) texture_uvs: Box<[Vec2]>,
    pub(crate) faces: Box<[Face]>,
    pub(crate) materials: HashMap<String, Material<H>>,
    pub(crate) bounds: Bounds,
    pub(crate) center: Vec3,
    pub(crate) scale: f32,
}

impl<H> Model<H> {
    /// 頂点座標リストを返す。
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// 法線リストを返す。
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// テクスチャ座標リストを返す。
    pub fn texture_uvs(&self) -> &[Vec2] {
        &self.texture_uvs
    }

    /// 面のリストを定義順に返す。
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// マテリアル名とマテリアルの対応を返す。
    pub fn materials(&self) -> &HashMap<String, Material<H>> {
        &self.materials
    }

    /// 名前からマテリアルを引く。
    pub fn material(&self, name: &str) -> Option<&Material<H>> {
        self.materials.get(name)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    pub fn uv_count(&self) -> usize {
        self.texture_uvs.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn has_materials(&self) -> bool {
        !self.materials.is_empty()
    }

    /// 全頂点のバウンディングボックスを返す。
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// 正規化の中心を返す。
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// 正規化のスケールを返す。
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// `scale * (p - center)` を表す行列を返す。
    pub fn normalization_matrix(&self) -> Mat4 {
        Mat4::from_scale(self.scale) * Mat4::from_translation(-self.center)
    }

    /// 面の頂点を巡回する。範囲外の法線・テクスチャ座標は `None` になり、
    /// 範囲外の頂点座標はその頂点ごと読み飛ばす。
    pub fn face_vertices<'a>(&'a self, face: &'a Face) -> FaceVertices<'a, H> {
        FaceVertices(self, face, 0)
    }

    /// 同じマテリアル名が連続する面をまとめて巡回する。
    pub fn material_runs(&self) -> MaterialRuns<H> {
        MaterialRuns(self, 0)
    }
}

/// `index` が `[0, items.len())` に収まっていれば要素を返す。
fn lookup<T: Copy>(items: &[T], index: isize) -> Option<T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .copied()
}

/// `Model::face_vertices` のイテレーター。
#[derive(Debug)]
pub struct FaceVertices<'a, H>(&'a Model<H>, &'a Face, usize);

impl<'a, H> Iterator for FaceVertices<'a, H> {
    type Item = FaceVertex;

    fn next(&mut self) -> Option<Self::Item> {
        let (model, face) = (self.0, self.1);
        while self.2 < face.vertex_indices.len() {
            let i = self.2;
            self.2 += 1;

            let position = match lookup(&model.vertices, face.vertex_indices[i]) {
                Some(p) => p,
                None => continue,
            };
            let uv = face
                .uv_indices
                .get(i)
                .and_then(|&ti| lookup(&model.texture_uvs, ti));
            let normal = face
                .normal_indices
                .get(i)
                .and_then(|&ni| lookup(&model.normals, ni));

            return Some(FaceVertex {
                position,
                uv,
                normal,
            });
        }

        None
    }
}

/// 同じマテリアル名を持つ連続した面の列を表す。
#[derive(Debug)]
pub struct MaterialRun<'a, H> {
    pub material_name: &'a str,
    pub material: Option<&'a Material<H>>,
    pub faces: &'a [Face],
}

/// `Model::material_runs` のイテレーター。
#[derive(Debug)]
pub struct MaterialRuns<'a, H>(&'a Model<H>, usize);

impl<'a, H> Iterator for MaterialRuns<'a, H> {
    type Item = MaterialRun<'a, H>;

    fn next(&mut self) -> Option<Self::Item> {
        let model = self.0;
        let faces = &model.faces[..];
        let start = self.1;
        if start >= faces.len() {
            return None;
        }

        let material_name = faces[start].material_name.as_str();
        let end = faces[start..]
            .iter()
            .position(|f| f.material_name != material_name)
            .map_or(faces.len(), |offset| start + offset);
        self.1 = end;

        let material = if material_name.is_empty() {
            None
        } else {
            model.materials.get(material_name)
        };

        Some(MaterialRun {
            material_name,
            material,
            faces: &faces[start..end],
        })
    }
}
