use config::Config;
use detector::main::Detector;
use device_camera::impl_fake::DeviceCameraFake;
use device_camera::interface::DeviceCamera;
use device_display::impl_gui::DisplaySurfaceGui;
use image_classifier::impl_tract_onnx::ImageClassifierTractOnnxLoader;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use std::sync::{Arc, Mutex};
use ui::app::DetectorWindow;

mod config;
mod detector;
mod device_camera;
mod device_display;
mod error;
mod image_classifier;
mod library;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let device_camera = new_device_camera(&config, logger.clone());

    let display_surface = DisplaySurfaceGui::new();
    let surface_buffer = display_surface.buffer();

    let classifier_loader = Arc::new(ImageClassifierTractOnnxLoader::new(logger.clone()));

    let detector = Detector::new(
        config,
        logger.clone(),
        device_camera,
        Arc::new(Mutex::new(display_surface)),
        classifier_loader,
    );

    let runner = detector.clone();
    std::thread::spawn(move || runner.run());

    let window = DetectorWindow::new(detector.clone(), surface_buffer);
    let result = window.run();

    detector.shutdown();

    result
}

#[cfg(target_os = "linux")]
fn new_device_camera(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Arc<dyn DeviceCamera + Send + Sync> {
    use device_camera::impl_v4l::DeviceCameraV4l;

    if config.use_fake_camera {
        let _ = logger.info("Using fake camera");
        return Arc::new(DeviceCameraFake::new(logger));
    }
    Arc::new(DeviceCameraV4l::new(config.camera_devices.clone(), logger))
}

#[cfg(not(target_os = "linux"))]
fn new_device_camera(
    _config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Arc<dyn DeviceCamera + Send + Sync> {
    let _ = logger.info("No native camera backend on this platform, using fake camera");
    Arc::new(DeviceCameraFake::new(logger))
}
