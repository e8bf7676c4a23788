//! # Graphics Module
//!
//! Everything needed to put the card wall on screen.
//!
//! - **Camera System** ([`camera`]) - Damped orbit camera with zoom and pan
//! - **Rendering** ([`rendering`]) - Instanced, alpha-blended card quads
//! - **Resources** ([`resources`]) - Global uniforms, depth buffer and card image textures
//!
//! [`RenderEngine`] implements [`CardRenderer`], the trait the session draws
//! through, so the session itself never touches wgpu.

pub mod camera;
pub mod rendering;
pub mod resources;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::{CardRenderer, FrameOutcome, RenderEngine, RenderError};
