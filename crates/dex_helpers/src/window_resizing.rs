/// Largest surface most mobile WebGL/WebGPU backends accept.
#[cfg(target_arch = "wasm32")]
const MAX_SURFACE_EXTENT: f32 = 2048.0;

/// Keeps the canvas in step with the browser viewport, clamped to what the
/// backend can allocate.
#[cfg(target_arch = "wasm32")]
pub fn handle_browser_resize(
    mut primary_query: bevy::ecs::system::Query<
        &mut bevy::window::Window,
        bevy::ecs::query::With<bevy::window::PrimaryWindow>,
    >,
) {
    let Some(viewport) = browser_viewport() else {
        return;
    };

    let width = viewport.0.min(MAX_SURFACE_EXTENT);
    let height = viewport.1.min(MAX_SURFACE_EXTENT);

    for mut window in &mut primary_query {
        let current = (window.resolution.width(), window.resolution.height());
        if (current.0 - width).abs() > f32::EPSILON || (current.1 - height).abs() > f32::EPSILON {
            window.resolution.set(width, height);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_viewport() -> Option<(f32, f32)> {
    let browser_window = web_sys::window()?;
    let width = browser_window.inner_width().ok()?.as_f64()?;
    let height = browser_window.inner_height().ok()?.as_f64()?;
    Some((width as f32, height as f32))
}
