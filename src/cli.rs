use std::path::PathBuf;

use clap::Parser;

/// Represents CLI arguments.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Arguments {
    /// Specifies the OBJ file to view. Asked on the terminal when omitted.
    pub model: Option<PathBuf>,

    /// Specifies the viewer configuration file.
    #[clap(short, long, default_value = "objview.toml")]
    pub config: PathBuf,

    /// Overrides the directory the shaders are read from.
    #[clap(short, long)]
    pub shaders: Option<PathBuf>,
}
