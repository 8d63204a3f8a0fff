use crate::device_camera::interface::Frame;
use std::error::Error;

/// The fixed-size region the live camera feed is painted onto.
pub trait DisplaySurface: Send + Sync {
    /// Copy `frame` onto the surface, replacing whatever was there.
    fn paint(&mut self, frame: &Frame) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Blank the surface.
    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;
}
