//! 視点と表示切り替えの状態を扱うモジュール。

use crate::config::CameraConfig;

use log::info;
use ultraviolet::{projection::perspective_gl, Mat4, Vec3};

/// キー入力から解釈される操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    ToggleLighting,
    ToggleWireframe,
    ToggleAxis,
    ResetView,
    Exit,
}

/// 操作を適用した結果、イベントループを続けるかどうか。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// 視点・ズーム・各種トグルを保持する。
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    angle_x: f32,
    angle_y: f32,
    zoom: f32,
    lighting: bool,
    wireframe: bool,
    show_axis: bool,
    dragging: bool,
    cursor: Option<(f64, f64)>,
    viewport: (u32, u32),
    camera: CameraConfig,
}

impl ViewerState {
    pub fn new(camera: &CameraConfig, viewport: (u32, u32)) -> ViewerState {
        ViewerState {
            angle_x: 0.0,
            angle_y: 0.0,
            zoom: camera.initial_zoom,
            lighting: true,
            wireframe: false,
            show_axis: false,
            dragging: false,
            cursor: None,
            viewport,
            camera: camera.clone(),
        }
    }

    /// X 軸周りの回転角 (度) を返す。
    pub fn angle_x(&self) -> f32 {
        self.angle_x
    }

    /// Y 軸周りの回転角 (度) を返す。
    pub fn angle_y(&self) -> f32 {
        self.angle_y
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn lighting(&self) -> bool {
        self.lighting
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn show_axis(&self) -> bool {
        self.show_axis
    }

    /// 操作を適用する。
    pub fn apply(&mut self, command: Command) -> Flow {
        match command {
            Command::ZoomIn => self.zoom += self.camera.zoom_step,
            Command::ZoomOut => self.zoom -= self.camera.zoom_step,
            Command::ToggleLighting => {
                self.lighting = !self.lighting;
                info!("Lighting: {}", on_off(self.lighting));
            }
            Command::ToggleWireframe => {
                self.wireframe = !self.wireframe;
                info!("Wireframe: {}", on_off(self.wireframe));
            }
            Command::ToggleAxis => {
                self.show_axis = !self.show_axis;
                info!("Axis: {}", on_off(self.show_axis));
            }
            Command::ResetView => {
                self.angle_x = 0.0;
                self.angle_y = 0.0;
                self.zoom = self.camera.initial_zoom;
                info!("View reset");
            }
            Command::Exit => return Flow::Exit,
        }
        Flow::Continue
    }

    /// 左ボタンの押下状態を更新する。
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// カーソル位置を更新し、ドラッグ中なら回転させる。回転したら `true` を返す。
    pub fn move_cursor(&mut self, x: f64, y: f64) -> bool {
        let previous = self.cursor.replace((x, y));
        match previous {
            Some((last_x, last_y)) if self.dragging => {
                let sensitivity = self.camera.rotation_sensitivity;
                self.angle_y += (x - last_x) as f32 * sensitivity;
                self.angle_x += (y - last_y) as f32 * sensitivity;
                true
            }
            _ => false,
        }
    }

    /// カーソルがウィンドウ外に出たときに呼ぶ。
    pub fn leave_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    /// アスペクト比を返す。高さが 0 のときは 1 として扱う。
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.viewport;
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// 投影行列を返す。
    pub fn projection_matrix(&self) -> Mat4 {
        perspective_gl(
            self.camera.field_of_view.to_radians(),
            self.aspect_ratio(),
            0.1,
            100.0,
        )
    }

    /// ズーム・回転を含むビュー行列を返す。
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, self.zoom))
            * Mat4::from_rotation_x(self.angle_x.to_radians())
            * Mat4::from_rotation_y(self.angle_y.to_radians())
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}
