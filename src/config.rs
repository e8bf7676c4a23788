//! Application configuration.
//!
//! Plain structs with sensible defaults; override fields before handing the
//! config to [`MorphApp::new`](crate::app::MorphApp::new).

use std::time::Duration;

use crate::{
    catalog::{DEFAULT_CARD_COUNT, DEFAULT_IMAGE_SOURCE},
    formation::Formation,
    tween::Easing,
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub card_count: usize,
    /// Image URL or path template, `{index}` is replaced by the card index
    pub image_source_template: String,
    /// Fetch card images in the background; cards show only their tint otherwise
    pub load_images: bool,
    pub window_title: String,
    pub window_size: (u32, u32),
    pub transition: TransitionConfig,
    pub camera: CameraConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            card_count: DEFAULT_CARD_COUNT,
            image_source_template: DEFAULT_IMAGE_SOURCE.to_string(),
            load_images: true,
            window_title: "morphdeck".to_string(),
            window_size: (1200, 800),
            transition: TransitionConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn with_card_count(mut self, card_count: usize) -> Self {
        self.card_count = card_count;
        self
    }

    pub fn with_image_source(mut self, template: impl Into<String>) -> Self {
        self.image_source_template = template.into();
        self
    }

    pub fn without_images(mut self) -> Self {
        self.load_images = false;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TransitionConfig {
    /// Every tween lasts between one and two times this
    pub base_duration: Duration,
    pub easing: Easing,
    /// Formation the wall morphs into right after start-up
    pub initial_formation: Formation,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            base_duration: Duration::from_millis(2000),
            easing: Easing::ExponentialInOut,
            initial_formation: Formation::Table,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    /// Initial distance from the origin along +Z
    pub distance: f32,
    pub fov_deg: f32,
    pub znear: f32,
    pub zfar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the remaining motion removed per tick after a drag
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 3000.0,
            fov_deg: 40.0,
            znear: 1.0,
            zfar: 10000.0,
            min_distance: 500.0,
            max_distance: 6000.0,
            damping: 0.2,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.005,
        }
    }
}
