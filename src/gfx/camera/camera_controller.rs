use log::debug;
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;
use crate::config::CameraConfig;

/// Motion below this is considered at rest
const REST_THRESHOLD: f32 = 1e-5;

/// Start and end of a camera drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Start,
    End,
}

/// Mouse-driven orbit controls with damped motion.
///
/// Drag rotates (Shift + drag pans) and the wheel zooms. Rotation keeps
/// coasting after the button is released and zoom eases towards its goal;
/// both settle in [`update`](Self::update), which runs once per tick.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping: f32,
    is_shift_held: bool,
    is_dragging: bool,
    /// Yaw/pitch applied since the last tick while dragging
    drag_delta: (f32, f32),
    /// Yaw/pitch applied per tick while coasting
    rotate_velocity: (f32, f32),
    /// Zoom still to be applied, as a fraction of distance
    pending_zoom: f32,
    /// Camera moved since the last tick
    dirty: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.005,
            damping: 0.2,
            is_shift_held: false,
            is_dragging: false,
            drag_delta: (0.0, 0.0),
            rotate_velocity: (0.0, 0.0),
            pending_zoom: 0.0,
            dirty: false,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut controller = Self::new(config.rotate_speed, config.zoom_speed);
        controller.pan_speed = config.pan_speed;
        controller.damping = config.damping.clamp(0.0, 1.0);
        controller
    }

    /// Button presses and wheel scrolls delivered to the window
    pub fn process_window_event(&mut self, event: &WindowEvent) -> Option<DragEvent> {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => self.begin_drag(),
                ElementState::Released => self.end_drag(),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / 100.0
                    }
                };
                self.zoom(scroll_amount);
                None
            }
            _ => None,
        }
    }

    /// Raw mouse motion, used while dragging
    pub fn process_device_event(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.drag(delta.0 as f32, delta.1 as f32, camera);
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.is_shift_held = *state == ElementState::Pressed;
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } => {
                if self.is_shift_held {
                    debug!("Resetting camera to default position");
                    self.stop();
                    camera.reset_to_default();
                    self.dirty = true;
                }
            }
            _ => (),
        }
    }

    /// Returns [`DragEvent::Start`] unless a drag is already in progress
    pub fn begin_drag(&mut self) -> Option<DragEvent> {
        if self.is_dragging {
            return None;
        }
        self.is_dragging = true;
        self.drag_delta = (0.0, 0.0);
        self.rotate_velocity = (0.0, 0.0);
        Some(DragEvent::Start)
    }

    /// Returns [`DragEvent::End`] if a drag was in progress
    pub fn end_drag(&mut self) -> Option<DragEvent> {
        if !self.is_dragging {
            return None;
        }
        self.is_dragging = false;
        self.rotate_velocity = self.drag_delta;
        self.drag_delta = (0.0, 0.0);
        Some(DragEvent::End)
    }

    /// Pointer moved by `(dx, dy)` pixels; ignored unless dragging
    pub fn drag(&mut self, dx: f32, dy: f32, camera: &mut OrbitCamera) {
        if !self.is_dragging {
            return;
        }

        if self.is_shift_held {
            camera.pan((-dx * self.pan_speed, dy * self.pan_speed));
        } else {
            let yaw = -dx * self.rotate_speed;
            let pitch = dy * self.rotate_speed;
            camera.add_yaw(yaw);
            camera.add_pitch(pitch);
            self.drag_delta.0 += yaw;
            self.drag_delta.1 += pitch;
        }
        self.dirty = true;
    }

    /// Queues a zoom of `amount` wheel steps, positive zooms out
    pub fn zoom(&mut self, amount: f32) {
        self.pending_zoom += amount * self.zoom_speed;
        self.dirty = true;
    }

    /// Advances damped motion by one tick. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        let mut changed = std::mem::take(&mut self.dirty);

        if self.is_dragging {
            // Last tick's motion becomes the release velocity
            self.rotate_velocity = self.drag_delta;
            self.drag_delta = (0.0, 0.0);
        } else if self.rotate_velocity.0.abs() > REST_THRESHOLD
            || self.rotate_velocity.1.abs() > REST_THRESHOLD
        {
            camera.add_yaw(self.rotate_velocity.0);
            camera.add_pitch(self.rotate_velocity.1);
            let decay = 1.0 - self.damping;
            self.rotate_velocity.0 *= decay;
            self.rotate_velocity.1 *= decay;
            changed = true;
        } else {
            self.rotate_velocity = (0.0, 0.0);
        }

        if self.pending_zoom.abs() > REST_THRESHOLD {
            let step = if self.damping > 0.0 {
                self.pending_zoom * self.damping
            } else {
                self.pending_zoom
            };
            camera.add_distance(step);
            self.pending_zoom -= step;
            changed = true;
        } else {
            self.pending_zoom = 0.0;
        }

        changed
    }

    /// Cancels any coasting or pending zoom
    pub fn stop(&mut self) {
        self.rotate_velocity = (0.0, 0.0);
        self.drag_delta = (0.0, 0.0);
        self.pending_zoom = 0.0;
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// Returns true while the camera still moves without input
    pub fn is_coasting(&self) -> bool {
        !self.is_dragging
            && (self.rotate_velocity.0.abs() > REST_THRESHOLD
                || self.rotate_velocity.1.abs() > REST_THRESHOLD
                || self.pending_zoom.abs() > REST_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (CameraController, OrbitCamera) {
        let config = CameraConfig::default();
        (
            CameraController::from_config(&config),
            OrbitCamera::from_config(&config, 1.0),
        )
    }

    #[test]
    fn test_drag_events_pair_up() {
        let (mut controller, _) = rig();
        assert_eq!(controller.end_drag(), None);
        assert_eq!(controller.begin_drag(), Some(DragEvent::Start));
        assert_eq!(controller.begin_drag(), None);
        assert_eq!(controller.end_drag(), Some(DragEvent::End));
        assert_eq!(controller.end_drag(), None);
    }

    #[test]
    fn test_motion_without_button_is_ignored() {
        let (mut controller, mut camera) = rig();
        controller.drag(50.0, 10.0, &mut camera);
        assert_eq!(camera.yaw, 0.0);
        assert!(!controller.update(&mut camera));
    }

    #[test]
    fn test_drag_rotates_and_reports_change_once() {
        let (mut controller, mut camera) = rig();
        controller.begin_drag();
        controller.drag(100.0, 0.0, &mut camera);
        assert!((camera.yaw + 0.5).abs() < 1e-6);

        assert!(controller.update(&mut camera));
        // Holding still: nothing moves
        assert!(!controller.update(&mut camera));
    }

    #[test]
    fn test_release_coasts_then_settles() {
        let (mut controller, mut camera) = rig();
        controller.begin_drag();
        controller.drag(20.0, 0.0, &mut camera);
        controller.end_drag();

        let released_yaw = camera.yaw;
        assert!(controller.update(&mut camera));
        assert!(camera.yaw < released_yaw);
        assert!(controller.is_coasting());

        let mut ticks = 0;
        while controller.update(&mut camera) {
            ticks += 1;
            assert!(ticks < 1000, "camera never settled");
        }
        assert!(!controller.is_coasting());
    }

    #[test]
    fn test_zoom_eases_to_the_requested_amount() {
        let (mut controller, mut camera) = rig();
        controller.zoom(-1.0);
        assert_eq!(camera.distance, 3000.0);

        let mut ticks = 0;
        while controller.update(&mut camera) {
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!(camera.distance < 3000.0);
        assert!(camera.distance > 2000.0);
    }

    #[test]
    fn test_zoom_respects_distance_bounds() {
        let (mut controller, mut camera) = rig();
        controller.zoom(100.0);
        while controller.update(&mut camera) {}
        assert_eq!(camera.distance, 6000.0);
    }
}
