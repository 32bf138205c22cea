//! Application entry point: composes the Bevy runtime, core plugins, and window configuration,
//! then defers to the `CodeBreakPlugin` defined in `app.rs`.
//!
//! Bevy keeps long-lived singletons (plugins, resources such as the screen manager) alive for the
//! duration of the app; nothing here needs manual teardown.

mod app;
mod audio;
mod gameplay;
mod leaderboard;
mod screen;
mod settings;
mod transition;
mod ui;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod wasm;

use app::CodeBreakPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

fn main() {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    wasm::set_panic_hook();

    // Screen fades are counted in frames, so the frame rate is pinned by vsync rather than left
    // unbounded.
    let primary_window = Window {
        title: "CodeBreak".to_string(),
        resolution: WindowResolution::new(1280.0, 720.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: 800.0,
            min_height: 600.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        },
        present_mode: bevy::window::PresentMode::AutoVsync,
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    let default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(cfg!(not(target_arch = "wasm32"))),
            ..default()
        });

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.04, 0.04, 0.08)))
        .add_plugins(default_plugins)
        .add_plugins(CodeBreakPlugin)
        .run();
}
