//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the cards.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu, input capture
//! - [`panel`] - The formation control panel and the drag blocker
//!
//! While the pointer is over a panel, mouse input does not reach the camera.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{blocker_overlay, control_panel, ImageProgress};
