//! # lumo-view
//!
//! Before/after viewer for the histogram equalization pipeline.
//!
//! Shows the input and output images side by side in one window and
//! stays open until the user closes it or presses Escape, mirroring
//! the dual-display loop of the original tutorial programs.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod app;

pub use app::{ViewerApp, ViewerConfig};

use lumo_core::Image;

/// Runs the before/after viewer.
///
/// Creates an eframe window and enters the event loop; returns when
/// the window closes.
///
/// # Arguments
/// * `before` - Input image
/// * `after` - Processed image
/// * `config` - Viewer configuration
///
/// # Returns
/// Exit code: 0 for success, 1 for error
pub fn run(before: &Image, after: &Image, config: ViewerConfig) -> i32 {
    // Size the window to the pair of images, within reason.
    let width = (before.width + after.width).clamp(640, 1920) as f32;
    let height = (before.height.max(after.height)).clamp(360, 1080) as f32;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&config.title)
            .with_inner_size([width + 48.0, height + 64.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    if config.verbose > 0 {
        eprintln!("[viewer] Creating window...");
    }

    let app = ViewerApp::new(before, after, config.clone());
    let result = eframe::run_native(
        &config.title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(app))),
    );

    match result {
        Ok(()) => {
            if config.verbose > 0 {
                eprintln!("[viewer] Exited normally");
            }
            0
        }
        Err(e) => {
            eprintln!("Viewer error: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_config_default() {
        let config = ViewerConfig::default();
        assert_eq!(config.title, "lumo view");
        assert_eq!(config.verbose, 0);
    }
}
