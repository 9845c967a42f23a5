use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{WgpuSettings, WgpuSettingsPriority};
use bevy::window::{WindowMode, WindowResolution};

#[cfg(target_arch = "wasm32")]
use crate::window_resizing::handle_browser_resize;
use crate::palette;

// Handheld shell ratio, close to the 480px wide web layout
pub const WINDOW_WIDTH: f32 = 360.0;
pub const WINDOW_HEIGHT: f32 = 640.0;

/// Creates a Bevy app with the window, asset and render settings shared by
/// every dex screen. Callers add their own plugins and call `run`.
pub fn get_default_app(app_name: &str) -> App {
    let mut app = App::new();

    let asset_plugin = bevy::asset::AssetPlugin {
        mode: bevy::asset::AssetMode::Unprocessed,
        file_path: "assets".to_string(),
        processed_file_path: "imported_assets/Default".to_string(),
        watch_for_changes_override: None,
        meta_check: AssetMetaCheck::Never,
    };

    let window_plugin = WindowPlugin {
        primary_window: Some(Window {
            title: app_name.to_string(),
            present_mode: bevy::window::PresentMode::Fifo,
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            canvas: Some("#dex".into()),
            fit_canvas_to_parent: true,
            mode: WindowMode::Windowed,
            // Keep browser shortcuts such as F5 and Ctrl+R working on wasm
            prevent_default_event_handling: false,
            ..default()
        }),
        ..default()
    };

    let render_plugin = RenderPlugin {
        render_creation: bevy::render::settings::RenderCreation::Automatic(WgpuSettings {
            backends: Some(
                bevy::render::settings::Backends::BROWSER_WEBGPU
                    | bevy::render::settings::Backends::GL
                    | bevy::render::settings::Backends::PRIMARY,
            ),
            power_preference: bevy::render::settings::PowerPreference::LowPower,
            priority: WgpuSettingsPriority::Functionality,
            ..Default::default()
        }),
        ..Default::default()
    };

    app.add_plugins(
        DefaultPlugins
            .set(asset_plugin)
            .set(window_plugin)
            .set(render_plugin)
            // Sprites are pixel art
            .set(ImagePlugin::default_nearest()),
    );

    // A tracker sits idle most of the time, frame pacing keeps it cheap.
    // https://github.com/aevyrie/bevy_framepace
    app.add_plugins(bevy_framepace::FramepacePlugin);

    app.insert_resource(ClearColor(palette::SHELL));

    #[cfg(target_arch = "wasm32")]
    {
        app.add_systems(PreUpdate, handle_browser_resize);
    }

    app
}
