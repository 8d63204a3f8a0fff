use crate::device_camera::interface::Frame;
use crate::device_display::interface::DisplaySurface;
use std::error::Error;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    Paint,
    Clear,
}

/// Records every operation so tests can check ordering.
#[derive(Debug, Default)]
pub struct DisplaySurfaceFake {
    ops: Vec<SurfaceOp>,
    paint_delay: Option<Duration>,
    fail_every: Option<usize>,
    paint_calls: usize,
}

impl DisplaySurfaceFake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes each paint take `delay`, to widen race windows.
    pub fn with_paint_delay(mut self, delay: Duration) -> Self {
        self.paint_delay = Some(delay);
        self
    }

    /// Every `n`th paint fails.
    pub fn with_fail_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn paint_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == SurfaceOp::Paint).count()
    }

    pub fn is_blank(&self) -> bool {
        self.ops.is_empty() || self.ops.last() == Some(&SurfaceOp::Clear)
    }
}

impl DisplaySurface for DisplaySurfaceFake {
    fn paint(&mut self, _frame: &Frame) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.paint_calls += 1;
        if let Some(delay) = self.paint_delay {
            std::thread::sleep(delay);
        }
        if let Some(n) = self.fail_every {
            if self.paint_calls % n == 0 {
                return Err(format!("paint {} failed", self.paint_calls).into());
            }
        }
        self.ops.push(SurfaceOp::Paint);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.ops.push(SurfaceOp::Clear);
        Ok(())
    }
}
