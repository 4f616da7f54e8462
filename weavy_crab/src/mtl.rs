//! .mtl ファイルで定義されるマテリアル関係のモジュール。

use std::path::{Path, PathBuf};

use ultraviolet::Vec3;

/// .mtl ファイルで定義されるマテリアル情報を表す。
/// `H` はテクスチャローダーが返すハンドルの型で、マテリアルと一緒に破棄される。
#[derive(Debug)]
pub struct Material<H> {
    pub(crate) name: String,
    pub(crate) ambient: Vec3,
    pub(crate) diffuse: Vec3,
    pub(crate) specular: Vec3,
    pub(crate) shininess: f32,
    pub(crate) transparency: f32,
    pub(crate) illumination: i32,
    pub(crate) ambient_map: Option<PathBuf>,
    pub(crate) diffuse_map: Option<PathBuf>,
    pub(crate) specular_map: Option<PathBuf>,
    pub(crate) bump_map: Option<PathBuf>,
    pub(crate) texture: Option<H>,
}

impl<H> Material<H> {
    /// デフォルト値のマテリアルを生成する。
    pub fn new(name: impl Into<String>) -> Material<H> {
        Material {
            name: name.into(),
            ambient: Vec3::new(0.2, 0.2, 0.2),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::new(1.0, 1.0, 1.0),
            shininess: 32.0,
            transparency: 1.0,
            illumination: 2,
            ambient_map: None,
            diffuse_map: None,
            specular_map: None,
            bump_map: None,
            texture: None,
        }
    }

    /// マテリアル名を返す。
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Ka` の値を返す。
    pub fn ambient_color(&self) -> Vec3 {
        self.ambient
    }

    /// `Kd` の値を返す。
    pub fn diffuse_color(&self) -> Vec3 {
        self.diffuse
    }

    /// `Ks` の値を返す。
    pub fn specular_color(&self) -> Vec3 {
        self.specular
    }

    /// `Ns` の値を返す。
    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    /// `d` または `Tr` の値を返す。
    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    /// `illum` の値を返す。
    pub fn illumination(&self) -> i32 {
        self.illumination
    }

    /// `map_Ka` の値を返す。
    pub fn ambient_map(&self) -> Option<&Path> {
        self.ambient_map.as_deref()
    }

    /// `map_Kd` の値を返す。
    pub fn diffuse_map(&self) -> Option<&Path> {
        self.diffuse_map.as_deref()
    }

    /// `map_Ks` の値を返す。
    pub fn specular_map(&self) -> Option<&Path> {
        self.specular_map.as_deref()
    }

    /// `map_Bump` または `bump` の値を返す。
    pub fn bump_map(&self) -> Option<&Path> {
        self.bump_map.as_deref()
    }

    /// 読み込まれたディフューズテクスチャを返す。
    pub fn texture(&self) -> Option<&H> {
        self.texture.as_ref()
    }

    /// 半透明かどうかを返す。
    pub fn is_translucent(&self) -> bool {
        self.transparency < 1.0
    }
}
