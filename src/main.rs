mod application;
mod cli;
mod config;
mod rendering;
mod texture;

use crate::{
    application::{print_controls, Application, Flow},
    cli::Arguments,
    config::ViewerConfig,
    rendering::initialize_window,
    texture::GliumTextureLoader,
};
use anyhow::{Context, Result};
use std::{
    env,
    io::{self, prelude::*},
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::Parser as _;
use glium::{
    glutin::{event::Event, event_loop::ControlFlow},
    Display, Texture2d,
};
use log::{error, info};
use weavy_crab::{Model, Parser};

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let arguments = Arguments::parse();
    let mut config = ViewerConfig::load(&arguments.config)?;
    if let Some(shaders) = arguments.shaders {
        config.shader_directory = shaders;
    }
    let model_path = match arguments.model {
        Some(path) => path,
        None => ask_model_path()?,
    };

    let (event_loop, display) = initialize_window(&config.window)?;
    let model = load_model(&display, model_path);
    let mut app = Application::new(&display, config, model)?;
    print_controls();

    info!("Starting event loop");
    let frame_time = Duration::from_micros(16_666);
    let mut last_at = Instant::now();
    event_loop.run(move |ev, _, control_flow| {
        if *control_flow == ControlFlow::Exit {
            return;
        }

        match ev {
            Event::WindowEvent { event, .. } => {
                if app.handle_window_event(&event) == Flow::Exit {
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                let now = Instant::now();
                if now - last_at >= frame_time {
                    last_at = now;

                    let mut target = display.draw();
                    let drawn = app.draw(&mut target);
                    let finished = target.finish();
                    if let Err(e) = drawn {
                        error!("Failed to draw the scene: {:#}", e);
                    }
                    if let Err(e) = finished {
                        error!("Failed to finish drawing display: {}", e);
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                }
                *control_flow = ControlFlow::WaitUntil(last_at + frame_time);
            }
            _ => (),
        }
    });
}

/// Asks the OBJ path on the terminal.
fn ask_model_path() -> Result<PathBuf> {
    print!("Enter OBJ file path: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read the OBJ file path")?;
    Ok(PathBuf::from(line.trim()))
}

/// Loads the model with its textures. Failure is logged and yields `None`.
fn load_model(display: &Display, path: PathBuf) -> Option<Model<Texture2d>> {
    info!("Loading OBJ file {:?}", path);
    let mut parser = Parser::new(GliumTextureLoader::new(display));
    match parser.load_obj(&path) {
        Ok(model) => Some(model),
        Err(e) => {
            error!("Failed to load OBJ file {:?}: {}", path, e);
            info!("Showing the default cube instead");
            None
        }
    }
}
