//! Contains texture image operations.

use anyhow::Result;
use std::path::Path;

use glium::{backend::Facade, texture::RawImage2d, Texture2d};
use log::{debug, info};
use weavy_crab::{Error as ObjError, TextureLoader};

/// Represents a decoded 8-bit image with 3 (RGB) or 4 (RGBA) channels.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    data: Box<[u8]>,
    width: u32,
    height: u32,
    channels: u8,
}

impl DecodedImage {
    /// Gets the dimension of this image.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Gets the number of channels per pixel.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Gets the reference to the raw data of this image, top row first.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Uploads this image as a texture. Rows are flipped for OpenGL.
    pub fn upload(&self, facade: &impl Facade) -> Result<Texture2d> {
        let dimensions = self.dimensions();
        let raw = match self.channels {
            4 => RawImage2d::from_raw_rgba_reversed(self.data(), dimensions),
            _ => RawImage2d::from_raw_rgb_reversed(self.data(), dimensions),
        };
        Ok(Texture2d::new(facade, raw)?)
    }
}

/// Loads a PNG, JPEG, BMP or any other format `image` understands.
/// Images with an alpha channel keep it; everything else becomes RGB.
pub fn load_image(filename: impl AsRef<Path>) -> Result<DecodedImage> {
    let filename = filename.as_ref();

    debug!("Loading image {:?}", filename);
    let original_image = image::open(filename)?;
    let (width, height, channels, data) = if original_image.color().has_alpha() {
        let converted = original_image.into_rgba8();
        let (w, h) = converted.dimensions();
        (w, h, 4, converted.into_raw())
    } else {
        let converted = original_image.into_rgb8();
        let (w, h) = converted.dimensions();
        (w, h, 3, converted.into_raw())
    };

    info!(
        "Loaded texture {:?}; dimensions are {:?}, {} channels",
        filename,
        (width, height),
        channels
    );
    Ok(DecodedImage {
        data: data.into_boxed_slice(),
        width,
        height,
        channels,
    })
}

/// Creates a 1x1 opaque white texture, sampled by faces without a diffuse map.
pub fn white_texture(facade: &impl Facade) -> Result<Texture2d> {
    let raw = RawImage2d::from_raw_rgba(vec![255u8; 4], (1, 1));
    Ok(Texture2d::new(facade, raw)?)
}

/// Resolves `map_Kd` textures into GPU textures while an OBJ file is parsed.
pub struct GliumTextureLoader<'f, F: Facade> {
    facade: &'f F,
}

impl<'f, F: Facade> GliumTextureLoader<'f, F> {
    pub fn new(facade: &'f F) -> GliumTextureLoader<'f, F> {
        GliumTextureLoader { facade }
    }
}

impl<'f, F: Facade> TextureLoader for GliumTextureLoader<'f, F> {
    type Handle = Texture2d;

    fn load_texture(&mut self, path: &Path) -> weavy_crab::Result<Texture2d> {
        load_image(path)
            .and_then(|image| image.upload(self.facade))
            .map_err(|e| ObjError::Texture(format!("{:#}", e)))
    }
}
