use super::raster::FrameBuffer;
use crate::error::{Error, Result};

/// Surface dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, 1.0 for degenerate sizes.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Where the viewer's frames end up.
///
/// The surface does not track layout on its own: the viewer asks for the
/// container size on init and whenever `on_resize` is called.
pub trait RenderSurface {
    /// Current size of the containing area, `None` if the container is gone.
    fn container_size(&self) -> Option<SurfaceSize>;

    /// Creates or reconfigures the drawing context for `size`.
    fn configure(&mut self, size: SurfaceSize) -> Result<()>;

    /// Displays a finished frame.
    fn present(&mut self, frame: &FrameBuffer) -> Result<()>;
}

/// Surface that keeps the last presented frame in memory.
#[derive(Debug, Clone)]
pub struct OffscreenSurface {
    container: Option<SurfaceSize>,
    configured: Option<SurfaceSize>,
    last_frame: Option<Vec<u8>>,
    frames_presented: u64,
}

impl OffscreenSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            container: Some(SurfaceSize::new(width, height)),
            configured: None,
            last_frame: None,
            frames_presented: 0,
        }
    }

    /// A surface whose container has been removed.
    pub fn detached() -> Self {
        Self {
            container: None,
            ..Self::new(0, 0)
        }
    }

    /// Simulates a layout change of the container.
    pub fn set_container_size(&mut self, width: u32, height: u32) {
        self.container = Some(SurfaceSize::new(width, height));
    }

    pub fn configured_size(&self) -> Option<SurfaceSize> {
        self.configured
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.last_frame.as_deref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl RenderSurface for OffscreenSurface {
    fn container_size(&self) -> Option<SurfaceSize> {
        self.container
    }

    fn configure(&mut self, size: SurfaceSize) -> Result<()> {
        self.configured = Some(size);
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        let expected = self
            .configured
            .ok_or_else(|| Error::Surface("surface not configured".to_string()))?;
        let (width, height) = frame.dimensions();
        if (width, height) != (expected.width, expected.height) {
            return Err(Error::Surface(format!(
                "frame {}x{} does not match surface {}x{}",
                width, height, expected.width, expected.height
            )));
        }

        self.last_frame = Some(frame.pixels().to_vec());
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_empty_size_is_one() {
        assert_eq!(SurfaceSize::new(0, 600).aspect(), 1.0);
        assert_eq!(SurfaceSize::new(800, 400).aspect(), 2.0);
    }

    #[test]
    fn present_requires_matching_configuration() {
        let mut surface = OffscreenSurface::new(4, 4);
        let frame = FrameBuffer::new(4, 4);
        assert!(surface.present(&frame).is_err());

        surface.configure(SurfaceSize::new(4, 4)).unwrap();
        surface.present(&frame).unwrap();
        assert_eq!(surface.frames_presented(), 1);

        let wrong = FrameBuffer::new(2, 2);
        assert!(matches!(surface.present(&wrong), Err(Error::Surface(_))));
    }
}
