use crate::device_camera::interface::Frame;
use crate::device_display::interface::DisplaySurface;
use eframe::egui;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

/// Pixels waiting to be uploaded to the window's texture.
#[derive(Default)]
pub struct SurfaceBuffer {
    pub image: Option<egui::ColorImage>,
    pub generation: u64,
}

/// Paints into a buffer shared with the egui window, which picks it up on
/// its next repaint.
#[derive(Clone, Default)]
pub struct DisplaySurfaceGui {
    buffer: Arc<Mutex<SurfaceBuffer>>,
}

impl DisplaySurfaceGui {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> Arc<Mutex<SurfaceBuffer>> {
        Arc::clone(&self.buffer)
    }

    fn replace(&self, image: Option<egui::ColorImage>) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.image = image;
        buffer.generation = buffer.generation.wrapping_add(1);
    }
}

fn to_color_image(frame: &Frame) -> egui::ColorImage {
    let rgba = frame.0.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

impl DisplaySurface for DisplaySurfaceGui {
    fn paint(&mut self, frame: &Frame) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.replace(Some(to_color_image(frame)));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.replace(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    #[test]
    fn test_paint_then_clear() {
        let mut surface = DisplaySurfaceGui::new();
        let buffer = surface.buffer();

        surface
            .paint(&Frame::new(DynamicImage::new_rgb8(300, 300)))
            .unwrap();
        {
            let buffer = buffer.lock().unwrap();
            assert_eq!(buffer.image.as_ref().map(|image| image.size), Some([300, 300]));
            assert_eq!(buffer.generation, 1);
        }

        surface.clear().unwrap();
        let buffer = buffer.lock().unwrap();
        assert!(buffer.image.is_none());
        assert_eq!(buffer.generation, 2);
    }
}
