use crate::config::CameraDevices;
use crate::device_camera::interface::{CameraRequest, DeviceCamera, Frame};
use crate::library::logger::interface::Logger;
use image::ImageFormat;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

const BUFFER_COUNT: u32 = 4;

/// Streams MJPEG from a V4L2 device on a worker thread and keeps the newest
/// decoded frame around for `capture_frame`.
pub struct DeviceCameraV4l {
    devices: CameraDevices,
    logger: Arc<dyn Logger + Send + Sync>,
    latest: Arc<Mutex<Option<Frame>>>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceCameraV4l {
    pub fn new(devices: CameraDevices, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            devices,
            logger: logger.with_namespace("camera").with_namespace("v4l"),
            latest: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }
}

impl DeviceCamera for DeviceCameraV4l {
    fn start(&self, request: &CameraRequest) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let path = self.devices.path_for(request.facing).to_string();
        self.logger
            .info(&format!("Opening {} facing {:?}", path, request.facing))?;

        if self.running.swap(true, Ordering::SeqCst) {
            return Err("camera is already streaming".into());
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let capture = CaptureLoop {
            path,
            request: *request,
            latest: Arc::clone(&self.latest),
            running: Arc::clone(&self.running),
            logger: Arc::clone(&self.logger),
        };
        let handle = std::thread::spawn(move || capture.run(ready_tx));

        match ready_rx.recv() {
            Ok(Ok(())) => {
                *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
                self.logger.info("Camera streaming")?;
                Ok(())
            }
            Ok(Err(message)) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(message.into())
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err("capture thread exited before the stream opened".into())
            }
        }
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info("Stopping camera stream")?;
        self.running.store(false, Ordering::SeqCst);

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                self.logger.error("Capture thread panicked")?;
            }
        }

        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.logger.info("Camera released")?;
        Ok(())
    }

    fn capture_frame(&self) -> Result<Frame, Box<dyn std::error::Error + Send + Sync>> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| "no frame received yet".into())
    }
}

impl Drop for DeviceCameraV4l {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

struct CaptureLoop {
    path: String,
    request: CameraRequest,
    latest: Arc<Mutex<Option<Frame>>>,
    running: Arc<AtomicBool>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl CaptureLoop {
    fn run(self, ready: mpsc::Sender<Result<(), String>>) {
        let device = match self.open() {
            Ok(device) => device,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };

        let mut stream = match MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready.send(Err(format!("failed to create buffer stream: {}", e)));
                return;
            }
        };

        let _ = ready.send(Ok(()));

        while self.running.load(Ordering::SeqCst) {
            match stream.next() {
                Ok((buf, _meta)) => match image::load_from_memory_with_format(buf, ImageFormat::Jpeg) {
                    Ok(image) => {
                        let frame = Frame::fit(image, &self.request);
                        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
                    }
                    Err(e) => {
                        let _ = self.logger.error(&format!("Failed to decode frame: {}", e));
                    }
                },
                Err(e) => {
                    let _ = self.logger.error(&format!("Failed to capture frame: {}", e));
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }
    }

    fn open(&self) -> Result<Device, Box<dyn std::error::Error + Send + Sync>> {
        let device = Device::with_path(&self.path)
            .map_err(|e| format!("failed to open {}: {}", self.path, e))?;

        let mjpg = FourCC::new(b"MJPG");
        let mut format = device.format()?;
        format.fourcc = mjpg;
        let format = device.set_format(&format)?;
        if format.fourcc != mjpg {
            return Err(format!("{} does not support MJPG, got {}", self.path, format.fourcc).into());
        }

        let _ = self.logger.info(&format!(
            "Negotiated {}x{} {}",
            format.width, format.height, format.fourcc
        ));

        Ok(device)
    }
}
