//! The seam between the parser and whatever owns decoded texture resources.

use crate::{Error, Result};
use std::path::Path;

/// Resolves a `map_Kd` texture path into a renderer-owned handle.
///
/// The handle is stored on the `Material` and dropped together with the
/// `Model`, so a handle that wraps a GPU resource should release it in its
/// `Drop` implementation.
pub trait TextureLoader {
    type Handle;

    /// Loads the texture at `path`, which is already resolved against the
    /// directory of the OBJ file.
    fn load_texture(&mut self, path: &Path) -> Result<Self::Handle>;
}

/// A loader that never provides textures. Every material keeps its texture
/// unset, which is what a headless load wants.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTextureLoader;

impl TextureLoader for NullTextureLoader {
    type Handle = ();

    fn load_texture(&mut self, path: &Path) -> Result<()> {
        Err(Error::Texture(format!(
            "texture loading is disabled ({:?})",
            path
        )))
    }
}
