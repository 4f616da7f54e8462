//! 実際のアプリケーション挙動を記述する。

mod model;
mod state;

pub use state::{Command, Flow};

use crate::{
    config::ViewerConfig,
    rendering::{load_program, LineVertex, UniformsSet},
    texture::white_texture,
};
use anyhow::Result;
use model::{group_material, upload_axes, upload_fallback_cube, upload_groups, ModelGroup};
use state::ViewerState;

use glium::{
    glutin::event::{ElementState, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent},
    index::{NoIndices, PrimitiveType},
    uniform,
    uniforms::{MagnifySamplerFilter, MinifySamplerFilter, SamplerWrapFunction, Uniforms},
    Blend, Depth, DepthTest, Display, DrawParameters, Frame, PolygonMode, Program, Surface,
    Texture2d, VertexBuffer,
};
use log::info;
use ultraviolet::Mat4;
use weavy_crab::{Material, Model};

const LIGHT_AMBIENT: [f32; 3] = [0.5, 0.5, 0.5];
const LIGHT_DIFFUSE: [f32; 3] = [0.8, 0.8, 0.8];
const LIGHT_SPECULAR: [f32; 3] = [0.5, 0.5, 0.5];
const PLAIN_SPECULAR: [f32; 3] = [0.5, 0.5, 0.5];
const PLAIN_SHININESS: f32 = 50.0;

/// 表示対象。読み込みに失敗した場合は立方体を表示する。
enum Scene {
    Model {
        model: Model<Texture2d>,
        groups: Vec<ModelGroup>,
    },
    Fallback(ModelGroup),
}

/// 1 回の描画で使う表面の材質。
struct SurfaceParams<'a> {
    ambient: [f32; 3],
    diffuse: [f32; 3],
    specular: [f32; 3],
    shininess: f32,
    alpha: f32,
    texture: &'a Texture2d,
}

impl<'a> SurfaceParams<'a> {
    fn from_material(
        material: &'a Material<Texture2d>,
        white: &'a Texture2d,
    ) -> SurfaceParams<'a> {
        SurfaceParams {
            ambient: material.ambient_color().into(),
            diffuse: material.diffuse_color().into(),
            specular: material.specular_color().into(),
            shininess: material.shininess(),
            alpha: material.transparency(),
            texture: material.texture().unwrap_or(white),
        }
    }

    fn plain(color: [f32; 3], white: &'a Texture2d) -> SurfaceParams<'a> {
        SurfaceParams {
            ambient: color,
            diffuse: color,
            specular: PLAIN_SPECULAR,
            shininess: PLAIN_SHININESS,
            alpha: 1.0,
            texture: white,
        }
    }
}

pub struct Application {
    config: ViewerConfig,
    state: ViewerState,
    scene: Scene,
    program_model: Program,
    program_line: Program,
    vertices_axis: VertexBuffer<LineVertex>,
    white_texture: Texture2d,
}

impl Application {
    /// `model` が `None` なら代わりに立方体を表示する。
    pub fn new(
        display: &Display,
        config: ViewerConfig,
        model: Option<Model<Texture2d>>,
    ) -> Result<Application> {
        let program_model = load_program(display, &config.shader_directory, "model")?;
        let program_line = load_program(display, &config.shader_directory, "line")?;
        let vertices_axis = upload_axes(display, 1.0)?;
        let white_texture = white_texture(display)?;

        let scene = match model {
            Some(model) => {
                let groups = upload_groups(display, &model)?;
                Scene::Model { model, groups }
            }
            None => Scene::Fallback(upload_fallback_cube(display)?),
        };

        let viewport = display.get_framebuffer_dimensions();
        let state = ViewerState::new(&config.camera, viewport);

        Ok(Application {
            config,
            state,
            scene,
            program_model,
            program_line,
            vertices_axis,
            white_texture,
        })
    }

    /// ウィンドウイベントを処理する。
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Flow {
        match event {
            WindowEvent::CloseRequested => Flow::Exit,
            WindowEvent::Resized(size) => {
                self.state.resize(size.width, size.height);
                Flow::Continue
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => match command_for_key(*key) {
                Some(command) => self.state.apply(command),
                None => Flow::Continue,
            },
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.state.set_dragging(*state == ElementState::Pressed);
                Flow::Continue
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.move_cursor(position.x, position.y);
                Flow::Continue
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.leave_cursor();
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    /// 画面全体を描画する。
    pub fn draw(&self, frame: &mut Frame) -> Result<()> {
        let [r, g, b] = self.config.appearance.background;
        frame.clear_color_and_depth((r, g, b, 1.0), 1.0);

        let view = self.state.view_matrix();
        let appearance = &self.config.appearance;
        match &self.scene {
            Scene::Model { model, groups } => {
                let model_view = view * model.normalization_matrix();
                for group in groups {
                    let surface = match group_material(model, group.material_name()) {
                        Some(m) => SurfaceParams::from_material(m, &self.white_texture),
                        None => SurfaceParams::plain(appearance.model_color, &self.white_texture),
                    };
                    self.draw_group(frame, group, model_view, &surface)?;
                }
            }
            Scene::Fallback(cube) => {
                let surface =
                    SurfaceParams::plain(appearance.fallback_color, &self.white_texture);
                self.draw_group(frame, cube, view, &surface)?;
            }
        }

        if self.state.show_axis() {
            self.draw_axes(frame, view)?;
        }

        Ok(())
    }

    fn draw_group(
        &self,
        frame: &mut Frame,
        group: &ModelGroup,
        model_view: Mat4,
        surface: &SurfaceParams,
    ) -> Result<()> {
        let mat_model_view: [[f32; 4]; 4] = model_view.into();
        let sampler = surface
            .texture
            .sampled()
            .wrap_function(SamplerWrapFunction::Repeat)
            .minify_filter(MinifySamplerFilter::LinearMipmapLinear)
            .magnify_filter(MagnifySamplerFilter::Linear);

        let uniforms = UniformsSet::new(self.scene_uniforms())
            .add(uniform! {
                mat_model_view: mat_model_view,
            })
            .add(uniform! {
                material_ambient: surface.ambient,
                material_diffuse: surface.diffuse,
                material_specular: surface.specular,
                material_shininess: surface.shininess,
                material_alpha: surface.alpha,
                material_texture: sampler,
            });

        let params = DrawParameters {
            depth: Depth {
                test: DepthTest::IfLess,
                write: true,
                ..Default::default()
            },
            blend: if surface.alpha < 1.0 {
                Blend::alpha_blending()
            } else {
                Default::default()
            },
            polygon_mode: if self.state.wireframe() {
                PolygonMode::Line
            } else {
                PolygonMode::Fill
            },
            ..Default::default()
        };

        frame.draw(
            group.vertex_buffer(),
            group.index_buffer(),
            &self.program_model,
            &uniforms,
            &params,
        )?;

        Ok(())
    }

    fn draw_axes(&self, frame: &mut Frame, view: Mat4) -> Result<()> {
        let mat_model_view: [[f32; 4]; 4] = view.into();
        let mat_projection: [[f32; 4]; 4] = self.state.projection_matrix().into();

        let params = DrawParameters {
            depth: Depth {
                test: DepthTest::IfLess,
                write: true,
                ..Default::default()
            },
            line_width: Some(2.0),
            ..Default::default()
        };

        frame.draw(
            &self.vertices_axis,
            NoIndices(PrimitiveType::LinesList),
            &self.program_line,
            &uniform! {
                mat_model_view: mat_model_view,
                mat_projection: mat_projection,
            },
            &params,
        )?;

        Ok(())
    }

    /// 全グループで共通の投影行列とライトの情報。
    fn scene_uniforms(&self) -> impl Uniforms {
        let mat_projection: [[f32; 4]; 4] = self.state.projection_matrix().into();
        uniform! {
            mat_projection: mat_projection,
            light_position: self.config.appearance.light_position,
            light_ambient: LIGHT_AMBIENT,
            light_diffuse: LIGHT_DIFFUSE,
            light_specular: LIGHT_SPECULAR,
            lighting_enabled: self.state.lighting(),
        }
    }
}

/// キーを操作に対応づける。
pub fn command_for_key(key: VirtualKeyCode) -> Option<Command> {
    match key {
        VirtualKeyCode::W => Some(Command::ZoomIn),
        VirtualKeyCode::S => Some(Command::ZoomOut),
        VirtualKeyCode::L => Some(Command::ToggleLighting),
        VirtualKeyCode::F => Some(Command::ToggleWireframe),
        VirtualKeyCode::A => Some(Command::ToggleAxis),
        VirtualKeyCode::R => Some(Command::ResetView),
        VirtualKeyCode::Escape => Some(Command::Exit),
        _ => None,
    }
}

/// 操作方法をログに出す。
pub fn print_controls() {
    info!("Controls:");
    info!("  Mouse drag - Rotate model");
    info!("  W/S        - Zoom in/out");
    info!("  L          - Toggle lighting");
    info!("  F          - Toggle wireframe");
    info!("  A          - Toggle axis");
    info!("  R          - Reset view");
    info!("  ESC        - Exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(command_for_key(VirtualKeyCode::W), Some(Command::ZoomIn));
        assert_eq!(command_for_key(VirtualKeyCode::S), Some(Command::ZoomOut));
        assert_eq!(command_for_key(VirtualKeyCode::F), Some(Command::ToggleWireframe));
        assert_eq!(command_for_key(VirtualKeyCode::Escape), Some(Command::Exit));
        assert_eq!(command_for_key(VirtualKeyCode::Q), None);
    }
}
