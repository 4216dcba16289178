//! Viewer application state and frame loop.

use eframe::egui;
use lumo_core::Image;
use tracing::debug;

/// Viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title.
    pub title: String,
    /// Verbosity (0 = quiet).
    pub verbose: u8,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "lumo view".into(),
            verbose: 0,
        }
    }
}

/// The before/after viewer application.
pub struct ViewerApp {
    before: egui::ColorImage,
    after: egui::ColorImage,
    before_tex: Option<egui::TextureHandle>,
    after_tex: Option<egui::TextureHandle>,
}

impl ViewerApp {
    /// Builds the app from the two images to display.
    pub fn new(before: &Image, after: &Image, config: ViewerConfig) -> Self {
        debug!(title = %config.title, "viewer app created");
        Self {
            before: to_color_image(before),
            after: to_color_image(after),
            before_tex: None,
            after_tex: None,
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Escape closes the window, like the original display loop.
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // TextureHandle is a cheap Arc-backed clone.
        let before_tex = self
            .before_tex
            .get_or_insert_with(|| {
                ctx.load_texture("input", self.before.clone(), egui::TextureOptions::NEAREST)
            })
            .clone();
        let after_tex = self
            .after_tex
            .get_or_insert_with(|| {
                ctx.load_texture("output", self.after.clone(), egui::TextureOptions::NEAREST)
            })
            .clone();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                cols[0].vertical_centered(|ui| {
                    ui.heading("input");
                    ui.add(egui::Image::new(&before_tex).shrink_to_fit());
                });
                cols[1].vertical_centered(|ui| {
                    ui.heading("output");
                    ui.add(egui::Image::new(&after_tex).shrink_to_fit());
                });
            });
        });
    }
}

/// Expands grayscale or RGB bytes into an egui color image.
fn to_color_image(image: &Image) -> egui::ColorImage {
    let size = [image.width as usize, image.height as usize];
    match image.channels {
        3 => egui::ColorImage::from_rgb(size, image.data()),
        _ => {
            let rgb: Vec<u8> = image
                .data()
                .iter()
                .flat_map(|&px| [px, px, px])
                .collect();
            egui::ColorImage::from_rgb(size, &rgb)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_expands_to_rgb() {
        let img = Image::from_raw(vec![0, 255], 2, 1, 1).unwrap();
        let color = to_color_image(&img);
        assert_eq!(color.size, [2, 1]);
        assert_eq!(color.pixels[1], egui::Color32::from_rgb(255, 255, 255));
    }
}
