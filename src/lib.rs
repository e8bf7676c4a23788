// src/lib.rs
//! Morphdeck
//!
//! A wall of image cards in 3D space that morphs between table, sphere,
//! helix and grid formations, rendered with wgpu and driven by winit.

pub mod app;
pub mod card;
pub mod catalog;
pub mod config;
pub mod formation;
pub mod gfx;
pub mod images;
pub mod performance;
pub mod prelude;
pub mod session;
pub mod tween;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{AppError, ControlHandle, MorphApp};
pub use config::AppConfig;
pub use session::Session;

/// Creates an application with the default configuration
pub fn default() -> Result<MorphApp, AppError> {
    MorphApp::new(AppConfig::default())
}
