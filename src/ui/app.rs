use crate::detector::core::Msg;
use crate::detector::main::Detector;
use crate::device_display::impl_gui::SurfaceBuffer;
use crate::ui::view::{view, View, DETECTIONS_HEADING, DETECT_LABEL, TITLE};
use eframe::egui;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const FEED_SIZE: egui::Vec2 = egui::vec2(300.0, 300.0);
const IDLE_REPAINT: Duration = Duration::from_millis(100);

pub struct DetectorWindow {
    detector: Detector,
    buffer: Arc<Mutex<SurfaceBuffer>>,
    texture: Option<egui::TextureHandle>,
    seen_generation: u64,
}

impl DetectorWindow {
    pub fn new(detector: Detector, buffer: Arc<Mutex<SurfaceBuffer>>) -> Self {
        Self {
            detector,
            buffer,
            texture: None,
            seen_generation: 0,
        }
    }

    /// Blocks on the window until it is closed.
    pub fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([720.0, 520.0])
                .with_title(TITLE),
            ..Default::default()
        };

        eframe::run_native(TITLE, options, Box::new(|_cc| Box::new(self)))
            .map_err(|e| format!("window failed: {}", e))?;

        Ok(())
    }

    /// Uploads whatever the render loop painted since the last repaint.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer.generation == self.seen_generation {
            return;
        }
        self.seen_generation = buffer.generation;

        let Some(image) = buffer.image.take() else {
            self.texture = None;
            return;
        };

        if let Some(texture) = self.texture.as_mut() {
            texture.set(image, egui::TextureOptions::LINEAR);
        } else {
            self.texture = Some(ctx.load_texture("camera-feed", image, egui::TextureOptions::LINEAR));
        }
    }

    fn feed(&self, ui: &mut egui::Ui, view: &View) {
        match (&self.texture, view.show_feed) {
            (Some(texture), true) => {
                ui.add(egui::Image::new(egui::load::SizedTexture::new(
                    texture.id(),
                    FEED_SIZE,
                )));
            }
            _ => placeholder(ui),
        }
    }
}

fn placeholder(ui: &mut egui::Ui) {
    let (rect, _) = ui.allocate_exact_size(FEED_SIZE, egui::Sense::hover());
    let painter = ui.painter();
    painter.rect_filled(rect, 6.0, egui::Color32::from_rgb(229, 231, 235));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "📷",
        egui::FontId::proportional(72.0),
        egui::Color32::from_rgb(100, 100, 100),
    );
}

impl eframe::App for DetectorWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_texture(ctx);

        let model = self.detector.model();
        let view = view(&self.detector.config, &model);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(egui::Color32::from_rgb(229, 230, 216)))
            .show(ctx, |ui| {
                ui.columns(2, |columns| {
                    columns[0].vertical_centered(|ui| {
                        ui.heading(egui::RichText::new(TITLE).strong());
                        ui.add_space(8.0);

                        if let Some(prompt) = view.prompt {
                            ui.label(
                                egui::RichText::new(prompt)
                                    .strong()
                                    .color(egui::Color32::from_rgb(22, 163, 74)),
                            );
                            ui.add_space(8.0);
                        }

                        self.feed(ui, &view);
                        ui.add_space(8.0);

                        if ui.button(view.toggle_label).clicked() {
                            self.detector.send(Msg::TogglePressed);
                        }

                        if let Some(status) = &view.status {
                            ui.add_space(8.0);
                            ui.label(egui::RichText::new(status).small());
                        }
                    });

                    columns[1].vertical_centered(|ui| {
                        ui.heading(DETECTIONS_HEADING);
                        ui.add_space(24.0);

                        if !view.show_detections {
                            return;
                        }

                        ui.label(&view.result);
                        if let Some(species) = view.species {
                            ui.label(egui::RichText::new(species.icon()).size(96.0));
                        }
                        ui.add_space(24.0);

                        let detect =
                            ui.add_enabled(view.detect_enabled, egui::Button::new(DETECT_LABEL));
                        if detect.clicked() {
                            self.detector.send(Msg::DetectPressed);
                        }
                    });
                });
            });

        if model.is_live() {
            ctx.request_repaint_after(self.detector.config.render_interval);
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }
}
