//! # Morphdeck Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use morphdeck::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let app = MorphApp::new(AppConfig::default().with_card_count(30))?;
//!     let handle = app.control_handle();
//!     handle.transform(Formation::Helix, Duration::from_millis(1500))?;
//!     app.run()
//! }
//! ```

// Application
pub use crate::app::{AppError, AppEvent, ControlHandle, MorphApp};
pub use crate::config::{AppConfig, CameraConfig, TransitionConfig};
pub use crate::default;
pub use crate::session::{ControlAction, Session};

// Wall contents and layouts
pub use crate::card::{Card, CardFactory};
pub use crate::catalog::{Catalog, Item};
pub use crate::formation::{Formation, FormationSet, Target};

// Animation
pub use crate::tween::{AnimationClock, Easing, TransitionDriver, Tween};

// Rendering
pub use crate::gfx::camera::{CameraManager, CameraUniform};
pub use crate::gfx::rendering::{CardRenderer, FrameOutcome, RenderEngine, RenderError};
pub use crate::performance::FrameStats;

// Common external types
pub use cgmath::{Euler, Rad, Vector3};
pub use std::time::Duration;
