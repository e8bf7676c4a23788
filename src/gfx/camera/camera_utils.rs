use cgmath::{Matrix4, SquareMatrix};
use winit::event::{DeviceEvent, KeyEvent, WindowEvent};

use super::{
    camera_controller::{CameraController, DragEvent},
    orbit_camera::OrbitCamera,
};
use crate::config::CameraConfig;

pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self::new(
            OrbitCamera::from_config(config, aspect),
            CameraController::from_config(config),
        )
    }

    pub fn process_window_event(&mut self, event: &WindowEvent) -> Option<DragEvent> {
        self.controller.process_window_event(event)
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        self.controller
            .process_device_event(event, &mut self.camera);
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        self.controller
            .process_keyed_events(event, &mut self.camera);
    }

    /// Advances camera damping by one tick, true if the view changed
    pub fn update(&mut self) -> bool {
        self.controller.update(&mut self.camera)
    }

    /// Recomputes the uniform and returns it
    pub fn refresh_uniform(&mut self) -> CameraUniform {
        self.camera.update_view_proj();
        self.camera.uniform
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn eye(&self) -> cgmath::Vector3<f32> {
        cgmath::Vector3::new(
            self.view_position[0],
            self.view_position[1],
            self.view_position[2],
        )
    }
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
