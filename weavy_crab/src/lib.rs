//! Parses the Wavefront OBJ format and its MTL material libraries into a
//! normalized, render-ready model.

mod bounds;
mod mtl;
mod obj;
mod parser;
mod texture;

pub use bounds::Bounds;
pub use mtl::Material;
pub use obj::{Face, FaceVertex, FaceVertices, MaterialRun, MaterialRuns, Model};
pub use parser::Parser;
pub use texture::{NullTextureLoader, TextureLoader};

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IoError,
    num::{ParseFloatError, ParseIntError},
};

/// Represents an error in parsing OBJ/MTL.
#[derive(Debug)]
pub enum Error {
    /// The file could not be opened or read.
    Io(IoError),

    /// Not enough value defined in `v`, `vt`, `vn`, `Kd`, etc.
    NotEnoughData { found: usize, expected: usize },

    /// A float component could not be parsed.
    ParseFloat(ParseFloatError),

    /// An integer component (face index, `illum`) could not be parsed.
    ParseInt(ParseIntError),

    /// A float component parsed to infinity or NaN.
    NonFiniteValue(f32),

    /// The texture loader failed to provide a texture.
    Texture(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::NotEnoughData { found, expected } => write!(
                f,
                "Not enough data (found {}, expected {})",
                found, expected
            ),
            Error::ParseFloat(e) => write!(f, "Invalid float value: {}", e),
            Error::ParseInt(e) => write!(f, "Invalid integer value: {}", e),
            Error::NonFiniteValue(v) => write!(f, "Non-finite value: {}", v),
            Error::Texture(reason) => write!(f, "Texture unavailable: {}", reason),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::ParseFloat(e) => Some(e),
            Error::ParseInt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Error {
        Error::Io(e)
    }
}

impl From<ParseFloatError> for Error {
    fn from(e: ParseFloatError) -> Error {
        Error::ParseFloat(e)
    }
}

impl From<ParseIntError> for Error {
    fn from(e: ParseIntError) -> Error {
        Error::ParseInt(e)
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
