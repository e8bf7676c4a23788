// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Card pipeline, instanced batch and frame rendering.

pub mod card_batch;
pub mod card_renderer;
pub mod pipeline;
pub mod render_engine;
pub mod vertex;

// Re-export main types
pub use card_batch::{CardBatch, CardInstance};
pub use card_renderer::{CardRenderer, FrameOutcome, RenderError};
pub use pipeline::PipelineConfig;
pub use render_engine::{RenderEngine, CARD_TEXTURE_SIZE};
