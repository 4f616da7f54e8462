//! レンダリング全般に利用される構造体などのモジュール。

use crate::config::WindowConfig;
use anyhow::{format_err, Context, Result};
use std::{
    fs::File,
    io::{prelude::*, BufReader},
    path::Path,
};

use glium::{
    backend::Facade,
    glutin::{dpi::LogicalSize, event_loop::EventLoop, window::WindowBuilder, ContextBuilder},
    implement_vertex,
    uniforms::{EmptyUniforms, UniformValue, Uniforms},
    Display, Program,
};
use log::{error, info};

/// モデル描画用シェーダーに渡る頂点情報を表す。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}
implement_vertex!(ModelVertex, position, normal, uv);

/// 線描画用シェーダーに渡る頂点情報を表す。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}
implement_vertex!(LineVertex, position, color);

/// UniformsStorage を結合するやつ。
pub struct UniformsSet<H, T>(H, T);

impl<H: Uniforms> UniformsSet<H, EmptyUniforms> {
    /// UniformsStorage を食って UniformsSet にする。
    pub fn new(head: H) -> Self {
        UniformsSet(head, EmptyUniforms)
    }
}

impl<H: Uniforms, T: Uniforms> UniformsSet<H, T> {
    /// Uniforms を結合する。
    pub fn add<NH: Uniforms>(self, new_head: NH) -> UniformsSet<NH, UniformsSet<H, T>> {
        UniformsSet(new_head, self)
    }
}

impl<H: Uniforms, T: Uniforms> Uniforms for UniformsSet<H, T> {
    fn visit_values<'a, F: FnMut(&str, UniformValue<'a>)>(&'a self, mut callback: F) {
        self.0.visit_values(&mut callback);
        self.1.visit_values(&mut callback);
    }
}

/// ウィンドウと OpenGL コンテキストを作成する。
pub fn initialize_window(config: &WindowConfig) -> Result<(EventLoop<()>, Display)> {
    let event_loop = EventLoop::new();
    let wb = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(config.width, config.height));
    let cb = ContextBuilder::new().with_depth_buffer(24);
    let display = Display::new(wb, cb, &event_loop)
        .map_err(|e| format_err!("Failed to create display: {}", e))?;
    info!(
        "Supported OpenGL version: {}",
        display.get_opengl_version_string()
    );

    Ok((event_loop, display))
}

/// `directory` からシェーダーを読み込む。
pub fn load_program(display: &impl Facade, directory: &Path, basename: &str) -> Result<Program> {
    let vertex_shader = read_source(&directory.join(format!("{}.vert", basename)))?;
    let fragment_shader = read_source(&directory.join(format!("{}.frag", basename)))?;

    let program =
        Program::from_source(display, &vertex_shader, &fragment_shader, None).map_err(|e| {
            error!("Failed to compile the shader \"{}\": {}", basename, e);
            e
        })?;
    Ok(program)
}

fn read_source(path: &Path) -> Result<String> {
    let mut file = BufReader::new(
        File::open(path).with_context(|| format!("Failed to open the shader {:?}", path))?,
    );
    let mut source = String::with_capacity(1024);
    file.read_to_string(&mut source)?;
    Ok(source)
}
