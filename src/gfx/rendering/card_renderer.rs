//! The seam between the session and whatever draws the cards.

use thiserror::Error;

use crate::{card::Card, gfx::camera::CameraUniform};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}

/// Result of asking for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// Nothing reached the screen; the frame is still owed
    Skipped,
}

/// Something that can show a wall of cards.
///
/// The session mounts every card once, forwards viewport changes and asks
/// for a frame whenever something visible changed.
pub trait CardRenderer {
    /// Makes card `index` known to the renderer
    fn mount(&mut self, index: usize, card: &Card);

    /// The drawable area is now `width` × `height` pixels, both non-zero
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Draws every card as seen through `camera`
    fn render(
        &mut self,
        cards: &[Card],
        camera: &CameraUniform,
    ) -> Result<FrameOutcome, RenderError>;
}
