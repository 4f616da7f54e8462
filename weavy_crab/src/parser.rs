//! .obj ファイル、 .mtl ファイルのパーサー。

use crate::{
    bounds::Bounds,
    mtl::Material,
    obj::{Face, Model},
    texture::TextureLoader,
    Error, Result,
};
use std::{
    collections::HashMap,
    fs::File,
    io::{prelude::*, BufReader},
    path::{Path, PathBuf},
    str::FromStr,
};

use log::{debug, info, warn};
use ultraviolet::{Vec2, Vec3};

/// Represents the abstract data of a line in OBJ file.
#[derive(Debug, Clone, PartialEq)]
enum ObjCommand {
    /// `mtllib`
    MaterialLibrary(PathBuf),

    /// `usemtl`
    UseMaterial(String),

    /// `v`
    Vertex(Vec3),

    /// `vt`
    VertexUv(Vec2),

    /// `vn`
    VertexNormal(Vec3),

    /// `f`, with indices already resolved
    Face(Face),

    /// Any other unknown keyword
    Unknown(String),
}

/// Represents the abstract data of a line in MTL file.
#[derive(Debug, Clone, PartialEq)]
enum MtlCommand {
    /// `newmtl`
    NewMaterial(String),

    /// `Ka`
    Ambient(Vec3),

    /// `Kd`
    Diffuse(Vec3),

    /// `Ks`
    Specular(Vec3),

    /// `Ns`
    Shininess(f32),

    /// `d` or `Tr`
    Transparency(f32),

    /// `illum`
    Illumination(i32),

    /// `map_Ka`
    AmbientMap(PathBuf),

    /// `map_Kd`
    DiffuseMap(PathBuf),

    /// `map_Ks`
    SpecularMap(PathBuf),

    /// `map_Bump` or `bump`
    BumpMap(PathBuf),

    /// Any other unknown keyword
    Unknown(String),
}

/// In-progress state of a single OBJ load.
struct ObjBuffer<H> {
    base_directory: PathBuf,
    current_material: String,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    texture_uvs: Vec<Vec2>,
    faces: Vec<Face>,
    materials: HashMap<String, Material<H>>,
    bounds: Bounds,
}

impl<H> ObjBuffer<H> {
    fn new(base_directory: &Path) -> ObjBuffer<H> {
        ObjBuffer {
            base_directory: base_directory.to_owned(),
            current_material: String::new(),
            vertices: vec![],
            normals: vec![],
            texture_uvs: vec![],
            faces: vec![],
            materials: HashMap::new(),
            bounds: Bounds::new(),
        }
    }

    /// Current lengths of (vertices, texture UVs, normals), in face component order.
    fn index_counts(&self) -> (usize, usize, usize) {
        (
            self.vertices.len(),
            self.texture_uvs.len(),
            self.normals.len(),
        )
    }

    fn into_model(self) -> Model<H> {
        let (center, scale) = self.bounds.normalization();
        Model {
            vertices: self.vertices.into_boxed_slice(),
            normals: self.normals.into_boxed_slice(),
            texture_uvs: self.texture_uvs.into_boxed_slice(),
            faces: self.faces.into_boxed_slice(),
            materials: self.materials,
            bounds: self.bounds,
            center,
            scale,
        }
    }
}

/// In-progress state of a single MTL load.
struct MtlBuffer<H> {
    current: Option<Material<H>>,
    complete_materials: HashMap<String, Material<H>>,
}

impl<H> MtlBuffer<H> {
    fn new() -> MtlBuffer<H> {
        MtlBuffer {
            current: None,
            complete_materials: HashMap::new(),
        }
    }

    fn commit_material(&mut self) {
        if let Some(material) = self.current.take() {
            self.complete_materials
                .insert(material.name.clone(), material);
        }
    }
}

/// Represents the parser of OBJ/MTL.
pub struct Parser<L> {
    texture_loader: L,
}

impl<L: TextureLoader> Parser<L> {
    /// Creates an instance of `Parser`.
    /// # Parameters
    /// * `texture_loader`
    ///     - Called for every `map_Kd` as soon as it is parsed, with the path
    ///       resolved against the directory of the OBJ file.
    pub fn new(texture_loader: L) -> Parser<L> {
        Parser { texture_loader }
    }

    /// Returns the texture loader.
    pub fn texture_loader(&self) -> &L {
        &self.texture_loader
    }

    /// Loads an OBJ file and the MTL files it references.
    ///
    /// Fails only when the OBJ file itself cannot be read. Malformed lines,
    /// missing material libraries and missing textures are logged and skipped.
    pub fn load_obj(&mut self, filename: impl AsRef<Path>) -> Result<Model<L::Handle>> {
        let filename = filename.as_ref();
        let obj_file = File::open(filename)?;
        let base_directory = filename
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let model = self.parse_obj(obj_file, base_directory)?;
        info!(
            "Wavefront OBJ {:?} loaded; {} vertices, {} normals, {} texture coords, {} faces, {} materials",
            filename,
            model.vertex_count(),
            model.normal_count(),
            model.uv_count(),
            model.face_count(),
            model.material_count(),
        );
        info!(
            "Normalization center: {:?}, scale: {}",
            model.center(),
            model.scale()
        );

        Ok(model)
    }

    /// Parses the OBJ file.
    /// `mtllib` and `map_Kd` paths are resolved against `base_directory`.
    pub fn parse_obj(
        &mut self,
        reader: impl Read,
        base_directory: impl AsRef<Path>,
    ) -> Result<Model<L::Handle>> {
        let mut buffer = ObjBuffer::new(base_directory.as_ref());
        read_lines(reader, "OBJ", |keyword, data| {
            self.process_obj_line(&mut buffer, keyword, data)
        })?;

        Ok(buffer.into_model())
    }

    /// Parses the MTL file.
    /// `map_Kd` paths are resolved against `base_directory`.
    pub fn parse_mtl(
        &mut self,
        reader: impl Read,
        base_directory: impl AsRef<Path>,
    ) -> Result<HashMap<String, Material<L::Handle>>> {
        let base_directory = base_directory.as_ref();
        let mut buffer = MtlBuffer::new();
        read_lines(reader, "MTL", |keyword, data| {
            self.process_mtl_line(&mut buffer, base_directory, keyword, data)
        })?;
        buffer.commit_material();

        Ok(buffer.complete_materials)
    }

    fn process_obj_line(
        &mut self,
        buffer: &mut ObjBuffer<L::Handle>,
        keyword: &str,
        data: &[&str],
    ) -> Result<()> {
        match parse_obj_line(keyword, data, buffer.index_counts())? {
            ObjCommand::Vertex(vertex) => {
                buffer.bounds.extend(vertex);
                buffer.vertices.push(vertex);
            }
            ObjCommand::VertexUv(uv) => buffer.texture_uvs.push(uv),
            ObjCommand::VertexNormal(normal) => buffer.normals.push(normal),
            ObjCommand::Face(mut face) => {
                face.material_name = buffer.current_material.clone();
                buffer.faces.push(face);
            }
            ObjCommand::MaterialLibrary(filename) => self.load_mtl(buffer, &filename),
            ObjCommand::UseMaterial(name) => buffer.current_material = name,
            ObjCommand::Unknown(keyword) => debug!("Unsupported OBJ keyword: {}", keyword),
        }

        Ok(())
    }

    /// Loads a `mtllib` into the buffer. Failures never abort the OBJ load.
    fn load_mtl(&mut self, buffer: &mut ObjBuffer<L::Handle>, filename: &Path) {
        let path = buffer.base_directory.join(filename);
        let mtl_file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Cannot open material library {:?}: {}", path, e);
                return;
            }
        };

        match self.parse_mtl(mtl_file, &buffer.base_directory) {
            Ok(materials) => {
                info!("Loaded {} materials from {:?}", materials.len(), path);
                buffer.materials.extend(materials);
            }
            Err(e) => warn!("Failed to read material library {:?}: {}", path, e),
        }
    }

    fn process_mtl_line(
        &mut self,
        buffer: &mut MtlBuffer<L::Handle>,
        base_directory: &Path,
        keyword: &str,
        data: &[&str],
    ) -> Result<()> {
        match parse_mtl_line(keyword, data)? {
            MtlCommand::NewMaterial(name) => {
                buffer.commit_material();
                buffer.current = Some(Material::new(name));
            }
            MtlCommand::Unknown(keyword) => debug!("Unsupported MTL keyword: {}", keyword),
            property => match buffer.current.as_mut() {
                Some(material) => self.apply_property(material, base_directory, property),
                None => debug!("MTL keyword {} appeared before any newmtl", keyword),
            },
        }

        Ok(())
    }

    fn apply_property(
        &mut self,
        material: &mut Material<L::Handle>,
        base_directory: &Path,
        property: MtlCommand,
    ) {
        match property {
            MtlCommand::Ambient(v) => material.ambient = v,
            MtlCommand::Diffuse(v) => material.diffuse = v,
            MtlCommand::Specular(v) => material.specular = v,
            MtlCommand::Shininess(v) => material.shininess = v,
            MtlCommand::Transparency(v) => material.transparency = v,
            MtlCommand::Illumination(v) => material.illumination = v,
            MtlCommand::AmbientMap(path) => material.ambient_map = Some(path),
            MtlCommand::SpecularMap(path) => material.specular_map = Some(path),
            MtlCommand::BumpMap(path) => material.bump_map = Some(path),
            MtlCommand::DiffuseMap(path) => {
                let texture_path = base_directory.join(&path);
                material.texture = match self.texture_loader.load_texture(&texture_path) {
                    Ok(handle) => {
                        info!("Loaded texture {:?} for {}", texture_path, material.name);
                        Some(handle)
                    }
                    Err(e) => {
                        warn!("Failed to load texture {:?}: {}", texture_path, e);
                        None
                    }
                };
                material.diffuse_map = Some(path);
            }
            MtlCommand::NewMaterial(_) | MtlCommand::Unknown(_) => (),
        }
    }
}

/// Reads the text line by line, skipping blank and `#` lines, and hands each
/// keyword and its arguments to `process`.
/// Bytes that are not UTF-8 are replaced rather than failing the read.
/// An error from `process` is reported with its line number and the loop goes on.
fn read_lines(
    reader: impl Read,
    label: &str,
    mut process: impl FnMut(&str, &[&str]) -> Result<()>,
) -> Result<()> {
    let mut reader = BufReader::new(reader);

    let mut line_buffer = Vec::with_capacity(1024);
    let mut line_number = 0usize;
    loop {
        line_buffer.clear();
        let read_size = reader.read_until(b'\n', &mut line_buffer)?;
        if read_size == 0 {
            break;
        }
        line_number += 1;

        // 非 UTF-8 のバイト (Latin-1 のコメントなど) は置換文字にする
        let line = String::from_utf8_lossy(&line_buffer);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut elements = trimmed.split_whitespace();
        let keyword = match elements.next() {
            Some(k) => k,
            None => continue,
        };
        let data: Vec<&str> = elements.collect();

        if let Err(e) = process(keyword, &data) {
            warn!("Error parsing {} line {}: {} ({:?})", label, line_number, e, trimmed);
        }
    }

    Ok(())
}

/// Parses a line of OBJ file.
fn parse_obj_line(
    keyword: &str,
    data: &[&str],
    index_counts: (usize, usize, usize),
) -> Result<ObjCommand> {
    let value = match keyword {
        "v" => ObjCommand::Vertex(take_vec3(data)?),
        "vt" => ObjCommand::VertexUv(take_vec2(data)?),
        "vn" => ObjCommand::VertexNormal(take_vec3(data)?),
        "f" => ObjCommand::Face(parse_face(data, index_counts)?),
        "mtllib" => ObjCommand::MaterialLibrary(PathBuf::from(take_first(data)?)),
        "usemtl" => ObjCommand::UseMaterial(take_first(data)?.to_owned()),
        _ => ObjCommand::Unknown(keyword.to_owned()),
    };

    Ok(value)
}

/// Parses a line of MTL file.
fn parse_mtl_line(keyword: &str, data: &[&str]) -> Result<MtlCommand> {
    let value = match keyword {
        "newmtl" => MtlCommand::NewMaterial(data.get(0).unwrap_or(&"").to_string()),
        "Ka" => MtlCommand::Ambient(take_vec3(data)?),
        "Kd" => MtlCommand::Diffuse(take_vec3(data)?),
        "Ks" => MtlCommand::Specular(take_vec3(data)?),
        "Ns" => MtlCommand::Shininess(take_float(data)?),
        "d" | "Tr" => MtlCommand::Transparency(take_float(data)?),
        "illum" => MtlCommand::Illumination(take_single(data)?),
        "map_Ka" => MtlCommand::AmbientMap(take_map_path(data)?),
        "map_Kd" => MtlCommand::DiffuseMap(take_map_path(data)?),
        "map_Ks" => MtlCommand::SpecularMap(take_map_path(data)?),
        "map_Bump" | "bump" => MtlCommand::BumpMap(take_map_path(data)?),
        _ => MtlCommand::Unknown(keyword.to_owned()),
    };

    Ok(value)
}

/// Parses a `f` command.
/// Each vertex is `v`, `v/vt`, `v/vt/vn` or `v//vn`; empty components are
/// skipped, so the UV and normal lists can be shorter than the vertex list.
fn parse_face(
    vertices: impl IntoIterator<Item = impl AsRef<str>>,
    index_counts: (usize, usize, usize),
) -> Result<Face> {
    let mut vertex_indices = vec![];
    let mut uv_indices = vec![];
    let mut normal_indices = vec![];

    for vertex in vertices {
        for (slot, component) in vertex.as_ref().split('/').enumerate().take(3) {
            if component.is_empty() {
                continue;
            }

            let index: isize = component.parse()?;
            match slot {
                0 => vertex_indices.push(resolve_index(index, index_counts.0)),
                1 => uv_indices.push(resolve_index(index, index_counts.1)),
                _ => normal_indices.push(resolve_index(index, index_counts.2)),
            }
        }
    }

    Ok(Face {
        vertex_indices: vertex_indices.into_boxed_slice(),
        uv_indices: uv_indices.into_boxed_slice(),
        normal_indices: normal_indices.into_boxed_slice(),
        material_name: String::new(),
    })
}

/// Converts a 1-based (positive) or end-relative (negative) index into a
/// 0-based one. Zero is passed through unchanged.
fn resolve_index(index: isize, count: usize) -> isize {
    if index > 0 {
        index - 1
    } else if index < 0 {
        count as isize + index
    } else {
        index
    }
}

/// Takes the first argument as-is.
fn take_first<'a>(data: &[&'a str]) -> Result<&'a str> {
    data.get(0).copied().ok_or(Error::NotEnoughData {
        found: 0,
        expected: 1,
    })
}

/// Takes the path of a `map_*` command. Options such as `-bm 1.0` come
/// before the filename, so the last argument is used.
fn take_map_path(data: &[&str]) -> Result<PathBuf> {
    data.last()
        .map(PathBuf::from)
        .ok_or(Error::NotEnoughData {
            found: 0,
            expected: 1,
        })
}

/// Parses the first element.
fn take_single<T>(data: &[&str]) -> Result<T>
where
    T: FromStr,
    Error: From<T::Err>,
{
    let value = take_first(data)?.parse()?;
    Ok(value)
}

/// Parses the first element as a finite float.
fn take_float(data: &[&str]) -> Result<f32> {
    finite(take_single(data)?)
}

fn finite(value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonFiniteValue(value))
    }
}

/// Parses the first `expected` elements as finite floats.
fn take_floats(data: &[&str], expected: usize) -> Result<Vec<f32>> {
    if data.len() < expected {
        return Err(Error::NotEnoughData {
            found: data.len(),
            expected,
        });
    }

    data[..expected]
        .iter()
        .map(|s| -> Result<f32> { finite(s.parse()?) })
        .collect()
}

/// Parses into `Vec2`. Extra elements (such as the `w` of `vt`) are ignored.
fn take_vec2(data: &[&str]) -> Result<Vec2> {
    let values = take_floats(data, 2)?;
    Ok(Vec2::new(values[0], values[1]))
}

/// Parses into `Vec3`. Extra elements (such as vertex colors) are ignored.
fn take_vec3(data: &[&str]) -> Result<Vec3> {
    let values = take_floats(data, 3)?;
    Ok(Vec3::new(values[0], values[1], values[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::NullTextureLoader;
    use std::{cell::Cell, fs, io::Cursor, rc::Rc};

    fn parse(source: &str) -> Model<()> {
        Parser::new(NullTextureLoader)
            .parse_obj(Cursor::new(source), "")
            .expect("in-memory OBJ should parse")
    }

    /// Records requested texture paths and hands the path back as the handle.
    #[derive(Debug, Default)]
    struct RecordingLoader {
        requested: Vec<PathBuf>,
        fail: bool,
    }

    impl TextureLoader for RecordingLoader {
        type Handle = PathBuf;

        fn load_texture(&mut self, path: &Path) -> Result<PathBuf> {
            self.requested.push(path.to_owned());
            if self.fail {
                Err(Error::Texture("not found".into()))
            } else {
                Ok(path.to_owned())
            }
        }
    }

    /// Counts how many handles have been dropped.
    struct CountingLoader(Rc<Cell<usize>>);

    struct CountedHandle(Rc<Cell<usize>>);

    impl Drop for CountedHandle {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl TextureLoader for CountingLoader {
        type Handle = CountedHandle;

        fn load_texture(&mut self, _path: &Path) -> Result<CountedHandle> {
            Ok(CountedHandle(self.0.clone()))
        }
    }

    const CUBE: &str = r#"
# cube
v -1.0 -1.0 -1.0
v  1.0 -1.0 -1.0
v  1.0  1.0 -1.0
v -1.0  1.0 -1.0
v -1.0 -1.0  1.0
v  1.0 -1.0  1.0
v  1.0  1.0  1.0
v -1.0  1.0  1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 -1.0
vn 0.0 0.0 1.0
o Cube
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
f 5/1/2 6/2/2 7/3/2 8/4/2
f 1/1 2/2 6/3
"#;

    #[test]
    fn counts_match_parsed_directives() {
        let model = parse(CUBE);
        assert_eq!(model.vertex_count(), 8);
        assert_eq!(model.uv_count(), 4);
        assert_eq!(model.normal_count(), 2);
        assert_eq!(model.face_count(), 3);
        assert!(!model.has_materials());

        let quad = &model.faces()[0];
        assert_eq!(quad.arity(), 4);
        assert_eq!(quad.vertex_indices(), &[0, 1, 2, 3]);
        assert_eq!(quad.uv_indices(), &[0, 1, 2, 3]);
        assert_eq!(quad.normal_indices(), &[0, 0, 0, 0]);

        let partial = &model.faces()[2];
        assert_eq!(partial.vertex_indices(), &[0, 1, 5]);
        assert_eq!(partial.uv_indices(), &[0, 1, 2]);
        assert!(partial.normal_indices().is_empty());
    }

    #[test]
    fn bounds_are_normalized_after_load() {
        let model = parse(
            "v -2 -1 -3\n\
             v 4 5 7\n\
             v 0 0 0\n",
        );
        assert_eq!(model.center(), Vec3::new(1.0, 2.0, 2.0));
        assert!((model.scale() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn negative_indices_resolve_against_current_lengths() {
        let model = parse(
            "v 0 0 0\nv 1 0 0\nv 2 0 0\nv 3 0 0\nv 4 0 0\n\
             vt 0 0\nvt 0.25 0\nvt 0.5 0\nvt 0.75 0\nvt 1 0\n\
             f -1/-1 -2/-2 -3/-3\n\
             v 5 0 0\n\
             f -1 -2 -3\n",
        );

        let first = &model.faces()[0];
        assert_eq!(first.vertex_indices(), &[4, 3, 2]);
        assert_eq!(first.uv_indices(), &[4, 3, 2]);
        assert!(first.normal_indices().is_empty());

        let second = &model.faces()[1];
        assert_eq!(second.vertex_indices(), &[5, 4, 3]);
    }

    #[test]
    fn empty_texcoord_component_is_skipped() {
        let model = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vn 0 0 1\nvn 0 1 0\nvn 1 0 0\n\
             f 1//1 2//2 3//3\n",
        );

        let face = &model.faces()[0];
        assert_eq!(face.vertex_indices(), &[0, 1, 2]);
        assert!(face.uv_indices().is_empty());
        assert_eq!(face.normal_indices(), &[0, 1, 2]);
    }

    #[test]
    fn zero_and_out_of_range_indices_are_kept() {
        let model = parse("v 0 0 0\nf 0 1 9 -4\n");
        assert_eq!(model.faces()[0].vertex_indices(), &[0, 0, 8, -3]);
    }

    #[test]
    fn malformed_line_does_not_abort_load() {
        let model = parse(
            "v 1 2 abc\n\
             v 1 1 1\n\
             v 1 2\n\
             vn 0 nope 1\n\
             f 1 x 1\n\
             vt inf 0\n",
        );

        assert_eq!(model.vertices(), &[Vec3::new(1.0, 1.0, 1.0)]);
        assert_eq!(model.normal_count(), 0);
        assert_eq!(model.uv_count(), 0);
        assert_eq!(model.face_count(), 0);
    }

    #[test]
    fn zero_vertices_keep_default_scale() {
        let model = parse("# nothing here\n\nusemtl lonely\n");
        assert_eq!(model.vertex_count(), 0);
        assert_eq!(model.scale(), 1.0);
        let center = model.center();
        assert!(center.x.is_finite() && center.y.is_finite() && center.z.is_finite());
    }

    #[test]
    fn faces_capture_active_material() {
        let model = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             f 1 2 3\n\
             usemtl red\n\
             f 1 2 3\n\
             f 3 2 1\n\
             usemtl blue\n\
             f 1 3 2\n",
        );

        let names: Vec<_> = model.faces().iter().map(Face::material_name).collect();
        assert_eq!(names, vec!["", "red", "red", "blue"]);
    }

    #[test]
    fn extra_components_are_ignored() {
        let model = parse("v 1 2 3 0.5 0.5 0.5\nvt 0.5 0.25 0.0\n");
        assert_eq!(model.vertices(), &[Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(model.texture_uvs(), &[Vec2::new(0.5, 0.25)]);
    }

    #[test]
    fn materials_keep_their_own_overrides() {
        let mut parser = Parser::new(NullTextureLoader);
        let materials = parser
            .parse_mtl(
                Cursor::new(
                    "# two materials\n\
                     newmtl red\n\
                     Kd 1.0 0.0 0.0\n\
                     Ns 10\n\
                     \n\
                     newmtl glass\n\
                     Kd 0.0 0.0 1.0\n\
                     Ns 96.5\n\
                     Tr 0.25\n",
                ),
                "",
            )
            .expect("in-memory MTL should parse");

        assert_eq!(materials.len(), 2);

        let red = &materials["red"];
        assert_eq!(red.diffuse_color(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(red.shininess(), 10.0);
        assert_eq!(red.illumination(), 2);
        assert_eq!(red.transparency(), 1.0);

        let glass = &materials["glass"];
        assert_eq!(glass.diffuse_color(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(glass.shininess(), 96.5);
        assert_eq!(glass.illumination(), 2);
        assert_eq!(glass.transparency(), 0.25);
        assert!(glass.is_translucent());
    }

    #[test]
    fn repeated_material_name_overwrites() {
        let mut parser = Parser::new(NullTextureLoader);
        let materials = parser
            .parse_mtl(
                Cursor::new(
                    "Kd 0.5 0.5 0.5\n\
                     newmtl a\nKa 1 1 1\nd 0.5\nillum 1\n\
                     newmtl a\nKs 0 0 0\nillum x\n",
                ),
                "",
            )
            .expect("in-memory MTL should parse");

        assert_eq!(materials.len(), 1);
        let a = &materials["a"];
        assert_eq!(a.ambient_color(), Vec3::new(0.2, 0.2, 0.2));
        assert_eq!(a.specular_color(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(a.transparency(), 1.0);
        assert_eq!(a.illumination(), 2);
    }

    #[test]
    fn dissolve_and_transparency_share_field() {
        let mut parser = Parser::new(NullTextureLoader);
        let materials = parser
            .parse_mtl(
                Cursor::new("newmtl smoke\nd 0.4\nnewmtl tinted\nd 0.9\nTr 0.3\n"),
                "",
            )
            .expect("in-memory MTL should parse");

        assert_eq!(materials["smoke"].transparency(), 0.4);
        assert!(materials["smoke"].is_translucent());
        assert_eq!(materials["tinted"].transparency(), 0.3);
    }

    #[test]
    fn non_utf8_bytes_do_not_abort_obj_load() {
        let model = Parser::new(NullTextureLoader)
            .parse_obj(
                Cursor::new(&b"v 0 0 0\nv 1 0 0\n# caf\xE9\nv 0 1 0\nf 1 2 3\n"[..]),
                "",
            )
            .expect("Latin-1 comment should not fail the load");

        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.face_count(), 1);
    }

    #[test]
    fn non_utf8_bytes_do_not_drop_materials() {
        let mut parser = Parser::new(NullTextureLoader);
        let materials = parser
            .parse_mtl(
                Cursor::new(
                    &b"newmtl first\nKd 1 0 0\n# r\xE9sum\xE9\nnewmtl second\nNs 8\n"[..],
                ),
                "",
            )
            .expect("Latin-1 comment should not fail the load");

        assert_eq!(materials.len(), 2);
        assert_eq!(materials["first"].diffuse_color(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(materials["second"].shininess(), 8.0);
    }

    #[test]
    fn only_diffuse_map_is_resolved() {
        let mut parser = Parser::new(RecordingLoader::default());
        let materials = parser
            .parse_mtl(
                Cursor::new(
                    "newmtl painted\n\
                     map_Ka ambient.png\n\
                     map_Kd -bm 1.0 textures/diffuse.png\n\
                     map_Ks specular.png\n\
                     map_Bump normal.png\n\
                     newmtl bumpy\n\
                     bump height.png\n",
                ),
                "assets",
            )
            .expect("in-memory MTL should parse");

        assert_eq!(
            parser.texture_loader().requested,
            vec![Path::new("assets").join("textures/diffuse.png")]
        );

        let painted = &materials["painted"];
        assert_eq!(painted.diffuse_map(), Some(Path::new("textures/diffuse.png")));
        assert_eq!(painted.ambient_map(), Some(Path::new("ambient.png")));
        assert_eq!(painted.specular_map(), Some(Path::new("specular.png")));
        assert_eq!(painted.bump_map(), Some(Path::new("normal.png")));
        assert_eq!(
            painted.texture(),
            Some(&Path::new("assets").join("textures/diffuse.png"))
        );
        assert_eq!(materials["bumpy"].bump_map(), Some(Path::new("height.png")));
        assert!(materials["bumpy"].texture().is_none());
    }

    #[test]
    fn failed_texture_leaves_handle_unset() {
        let mut parser = Parser::new(RecordingLoader {
            fail: true,
            ..Default::default()
        });
        let materials = parser
            .parse_mtl(Cursor::new("newmtl m\nmap_Kd missing.png\n"), "")
            .expect("in-memory MTL should parse");

        let m = &materials["m"];
        assert_eq!(m.diffuse_map(), Some(Path::new("missing.png")));
        assert!(m.texture().is_none());
    }

    #[test]
    fn load_obj_resolves_mtllib_next_to_obj() {
        let dir = tempfile::tempdir().expect("temporary directory");
        fs::write(
            dir.path().join("scene.mtl"),
            "newmtl red\nKd 1 0 0\nmap_Kd red.png\n",
        )
        .expect("write MTL");
        fs::write(
            dir.path().join("scene.obj"),
            "mtllib scene.mtl\n\
             v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             usemtl red\n\
             f 1 2 3\n",
        )
        .expect("write OBJ");

        let mut parser = Parser::new(RecordingLoader::default());
        let model = parser
            .load_obj(dir.path().join("scene.obj"))
            .expect("OBJ should load");

        assert!(model.has_materials());
        assert_eq!(model.material_count(), 1);
        assert_eq!(
            model.material("red").map(|m| m.diffuse_color()),
            Some(Vec3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(
            parser.texture_loader().requested,
            vec![dir.path().join("red.png")]
        );

        let run = model.material_runs().next().expect("one run");
        assert_eq!(run.material_name, "red");
        assert!(run.material.is_some());
    }

    #[test]
    fn missing_mtllib_is_not_fatal() {
        let dir = tempfile::tempdir().expect("temporary directory");
        fs::write(
            dir.path().join("lonely.obj"),
            "mtllib nowhere.mtl\nv 0 0 0\nv 1 1 1\nv 1 0 0\nf 1 2 3\n",
        )
        .expect("write OBJ");

        let model = Parser::new(NullTextureLoader)
            .load_obj(dir.path().join("lonely.obj"))
            .expect("OBJ should load without its MTL");
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.face_count(), 1);
        assert!(!model.has_materials());
    }

    #[test]
    fn missing_obj_is_fatal() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let result = Parser::new(NullTextureLoader).load_obj(dir.path().join("absent.obj"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn texture_handles_are_released_with_model() {
        let dir = tempfile::tempdir().expect("temporary directory");
        fs::write(
            dir.path().join("a.mtl"),
            "newmtl one\nmap_Kd one.png\nnewmtl two\nmap_Kd two.png\n",
        )
        .expect("write MTL");
        fs::write(dir.path().join("a.obj"), "mtllib a.mtl\n").expect("write OBJ");

        let released = Rc::new(Cell::new(0));
        let model = Parser::new(CountingLoader(released.clone()))
            .load_obj(dir.path().join("a.obj"))
            .expect("OBJ should load");
        assert_eq!(model.material_count(), 2);
        assert_eq!(released.get(), 0);

        drop(model);
        assert_eq!(released.get(), 2);
    }
}
