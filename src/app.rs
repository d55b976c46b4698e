use crate::core::color::pack_argb;
use crate::io::config::{Config, ConfigError};
use crate::io::image::save_framebuffer;
use crate::io::loader::{LoadError, LoadedModel, PendingLoad, load, spawn_load};
use crate::pipeline::render_loop::{ModelOrientation, RenderLoop};
use crate::pipeline::software::SoftwareBackend;
use crate::scene::camera::Camera;
use crate::scene::palette::Palette;
use crate::ui::input::{OrientationTracker, PointerInput, RotationDelta};
use log::{info, warn};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use nalgebra::Vector3;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
    #[error("failed to save image: {0}")]
    Image(#[from] image::ImageError),
}

fn build_render_loop(config: &Config, model: LoadedModel) -> RenderLoop {
    let aspect = config.render.width as f32 / config.render.height.max(1) as f32;
    RenderLoop::new(
        model,
        Palette::from(&config.palette),
        Camera::from_config(&config.camera, aspect),
        ModelOrientation::new(config.orientation.model_scale),
    )
}

fn start_load(config: &Config) -> PendingLoad<LoadedModel> {
    spawn_load(config.model.geometry.clone(), config.model.material.clone())
}

/// Opens a window, loads the model in the background and renders it until Escape.
///
/// Drag with the left button to rotate, R reloads the model files.
pub fn run_gui(config: Config) -> Result<(), AppError> {
    let width = config.render.width;
    let height = config.render.height;
    let background = Vector3::from(config.render.background);

    info!("Starting GUI mode ({}x{})...", width, height);
    info!("Controls: LeftDrag=Rotate, R=Reload Model, Esc=Quit");

    let mut window = Window::new("objviewer", width, height, WindowOptions::default())?;
    window.set_target_fps(config.render.target_fps);

    let mut buffer = vec![pack_argb(background); width * height];

    // Keep the window alive while the worker parses.
    let pending = start_load(&config);
    let model = loop {
        if !window.is_open() || window.is_key_down(Key::Escape) {
            return Ok(());
        }
        if let Some(result) = pending.try_take() {
            break result?;
        }
        window.update_with_buffer(&buffer, width, height)?;
    };

    let mut backend = SoftwareBackend::new(width, height, config.render.samples, background);
    let mut render_loop = build_render_loop(&config, model);
    let mut tracker = OrientationTracker::new(config.orientation.sensitivity);
    let mut pointer = PointerInput::default();
    let mut reload: Option<PendingLoad<LoadedModel>> = None;

    let mut frame_count = 0;
    let mut last_fps_update = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        // --- Reloading ---
        if reload.is_none() && window.is_key_pressed(Key::R, KeyRepeat::No) {
            info!("Reloading model...");
            reload = Some(start_load(&config));
        }
        if let Some(result) = reload.as_ref().and_then(PendingLoad::try_take) {
            reload = None;
            match result {
                Ok(model) => {
                    render_loop.replace_model(model);
                    info!("Reload successful!");
                }
                Err(e) => warn!("Reload failed, keeping current model: {}", e),
            }
        }

        // --- Input ---
        pointer.update(&window, &mut tracker);

        // --- Render ---
        let stats = render_loop.frame(&mut backend, &mut tracker);

        // --- Display ---
        backend.framebuffer.resolve_into(&mut buffer);
        window.update_with_buffer(&buffer, width, height)?;

        frame_count += 1;
        let elapsed = last_fps_update.elapsed().as_secs_f32();
        if elapsed >= 2.0 {
            let fps = frame_count as f32 / elapsed;
            info!(
                "Average FPS: {:.1} ({} draws, {} triangles)",
                fps, stats.draw_calls, stats.triangles
            );
            window.set_title(&format!("objviewer - {:.1} FPS", fps));
            frame_count = 0;
            last_fps_update = Instant::now();
        }
    }
    Ok(())
}

/// Loads synchronously, renders a single frame at the configured initial orientation
/// and writes it to `render.output`.
pub fn run_cli(config: Config) -> Result<(), AppError> {
    info!("Starting CLI mode...");
    let model = load(&config.model.geometry, config.model.material.as_deref())?;
    let start_time = Instant::now();

    let mut backend = SoftwareBackend::new(
        config.render.width,
        config.render.height,
        config.render.samples,
        Vector3::from(config.render.background),
    );
    let mut render_loop = build_render_loop(&config, model);

    let [vertical, horizontal] = config.orientation.initial;
    let mut tracker = OrientationTracker::new(config.orientation.sensitivity);
    tracker.accumulate(RotationDelta::new(horizontal, vertical));

    let stats = render_loop.frame(&mut backend, &mut tracker);
    info!(
        "Render completed in {:.2?} ({} draws, {} triangles)",
        start_time.elapsed(),
        stats.draw_calls,
        stats.triangles
    );

    info!("Saving output to '{}'...", config.render.output);
    save_framebuffer(&backend.framebuffer, &config.render.output)?;
    info!("Done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_load_is_returned_with_the_loader_message() {
        let mut config = Config::default();
        config.model.geometry = "no/such/model.obj".into();

        let err = run_cli(config).unwrap_err();
        assert!(matches!(err, AppError::Load(LoadError::Read { .. })));
        assert!(err.to_string().contains("no/such/model.obj"));
    }
}
