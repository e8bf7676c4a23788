//! Window, event loop and the glue between winit, the session and the GPU.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info};
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    error::{EventLoopError, OsError},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::AppConfig,
    formation::Formation,
    gfx::rendering::{RenderEngine, RenderError, CARD_TEXTURE_SIZE},
    images::ImageLoader,
    session::{ControlAction, Session},
    tween::AnimationClock,
    ui::{blocker_overlay, control_panel, ImageProgress, UiManager},
};

/// Loop tick interval, roughly display rate
const TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] OsError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("the application has already exited")]
    EventLoopClosed,
}

/// Messages posted to the event loop from outside
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    Transform {
        formation: Formation,
        base_duration: Duration,
    },
}

/// Thread-safe handle for driving a running app
#[derive(Clone)]
pub struct ControlHandle {
    proxy: EventLoopProxy<AppEvent>,
}

impl ControlHandle {
    /// Morphs the wall into `formation`, as if its button had been clicked
    pub fn transform(&self, formation: Formation, base_duration: Duration) -> Result<(), AppError> {
        self.proxy
            .send_event(AppEvent::Transform {
                formation,
                base_duration,
            })
            .map_err(|_| AppError::EventLoopClosed)
    }
}

/// Where a window event goes once ImGui has seen it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UiRouting {
    /// ImGui reacted, so its next frame has to be built
    redraw: bool,
    forward_to_camera: bool,
}

impl UiRouting {
    /// Input ImGui captured stays with it, except a left button release,
    /// which always reaches the camera so a drag can end.
    fn after_ui(captured: bool, left_release: bool) -> Self {
        Self {
            redraw: captured,
            forward_to_camera: !captured || left_release,
        }
    }
}

fn is_left_release(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::MouseInput {
            button: MouseButton::Left,
            state: ElementState::Released,
            ..
        }
    )
}

pub struct MorphApp {
    event_loop: EventLoop<AppEvent>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    images: Option<ImageLoader>,
    session: Session,
    clock: AnimationClock,
    started: bool,
    /// First fatal error, reported once the loop has exited
    error: Option<AppError>,
}

impl MorphApp {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
        let session = Session::new(&config);

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                images: None,
                session,
                clock: AnimationClock::new(),
                started: false,
                error: None,
            },
        })
    }

    pub fn control_handle(&self) -> ControlHandle {
        ControlHandle {
            proxy: self.event_loop.create_proxy(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.app_state.session
    }

    /// Runs until the window closes (consumes self)
    pub fn run(mut self) -> Result<(), AppError> {
        self.event_loop.set_control_flow(ControlFlow::Wait);
        self.event_loop.run_app(&mut self.app_state)?;

        match self.app_state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: AppError) {
        error!("{}", e);
        if self.error.is_none() {
            self.error = Some(e);
        }
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.config.window_size;
        let window = event_loop.create_window(
            WindowAttributes::default()
                .with_title(self.config.window_title.clone())
                .with_inner_size(LogicalSize::new(width, height)),
        )?;
        let window_handle = Arc::new(window);
        self.window = Some(window_handle.clone());

        let (width, height) = window_handle.inner_size().into();
        let card_count = self.session.cards().len();
        let window_clone = window_handle.clone();
        let mut renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, card_count).await
        })?;

        self.session.mount(&mut renderer);
        self.session.resize(width, height, &mut renderer);

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window_handle,
        );

        if self.config.load_images {
            let mut loader = ImageLoader::new(CARD_TEXTURE_SIZE);
            for (index, item) in self.session.catalog().iter().enumerate() {
                loader.request(index, &item.image_source);
            }
            self.images = Some(loader);
        }

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);

        if !self.started {
            self.session.start(self.clock.now());
            self.started = true;
        }
        info!("Window ready at {}x{}", width, height);
        window_handle.request_redraw();
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if let PhysicalKey::Code(key_code) = event.physical_key {
            if event.state == ElementState::Pressed && !event.repeat {
                let formation = match key_code {
                    KeyCode::Escape => {
                        event_loop.exit();
                        return;
                    }
                    KeyCode::Digit1 | KeyCode::Numpad1 => Formation::from_index(0),
                    KeyCode::Digit2 | KeyCode::Numpad2 => Formation::from_index(1),
                    KeyCode::Digit3 | KeyCode::Numpad3 => Formation::from_index(2),
                    KeyCode::Digit4 | KeyCode::Numpad4 => Formation::from_index(3),
                    _ => None,
                };
                if let Some(formation) = formation {
                    self.session
                        .handle_control(ControlAction::Transform(formation), self.clock.now());
                }
            }
        }
        self.session
            .camera_manager_mut()
            .process_keyboard_event(event);
    }

    fn render(&mut self) {
        let (Some(render_engine), Some(ui_manager), Some(window)) = (
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
            self.window.as_ref(),
        ) else {
            return;
        };

        let now = self.clock.now();
        let camera = self.session.camera_uniform();
        let progress = self.images.as_ref().map(|loader| ImageProgress {
            loaded: loader.loaded_count(),
            failed: loader.failed_count(),
            pending: loader.pending_count(),
        });

        let session = &self.session;
        let mut action = None;
        let result = render_engine.render_frame_with_ui(
            session.cards(),
            &camera,
            |device, queue, encoder, color_attachment| {
                ui_manager.draw(device, queue, encoder, window, color_attachment, |ui| {
                    action = control_panel(ui, session, progress);
                    blocker_overlay(ui, session.blocker_visible());
                });
            },
        );

        match result {
            Ok(outcome) => self.session.frame_finished(outcome, now),
            Err(e) => error!("Render failed: {}", e),
        }

        if let Some(action) = action {
            debug!("Control panel: {:?}", action);
            self.session.handle_control(action, now);
            window.request_redraw();
        }
    }
}

impl ApplicationHandler<AppEvent> for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let captured = ui_manager.handle_window_event(&window, window_id, &event);
            let routing = UiRouting::after_ui(captured, is_left_release(&event));
            if routing.redraw {
                window.request_redraw();
            }
            if !routing.forward_to_camera {
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    if self.session.resize(width, height, render_engine) {
                        if let Some(ui_manager) = self.ui_manager.as_mut() {
                            ui_manager.update_display_size(width, height);
                        }
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::MouseInput { .. } | WindowEvent::MouseWheel { .. } => {
                if let Some(drag) = self
                    .session
                    .camera_manager_mut()
                    .process_window_event(&event)
                {
                    self.session.on_drag(drag);
                    window.request_redraw();
                }
            }
            WindowEvent::CloseRequested => {
                info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.wants_mouse() && !self.session.camera_manager().controller.is_dragging() {
                return;
            }
        }

        self.session
            .camera_manager_mut()
            .process_device_event(&event);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Transform {
                formation,
                base_duration,
            } => {
                self.session
                    .transform(formation, base_duration, self.clock.now());
            }
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let (Some(loader), Some(render_engine)) =
            (self.images.as_mut(), self.render_engine.as_mut())
        {
            for (index, image) in loader.poll() {
                if render_engine.upload_card_image(index, &image) {
                    self.session.request_redraw();
                }
            }
        }

        if self.session.tick(self.clock.now()) {
            window.request_redraw();
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + TICK_INTERVAL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_release_redraws_and_reaches_camera() {
        // Button clicks in the panel complete on the frame after the release
        let routing = UiRouting::after_ui(true, true);
        assert!(routing.redraw);
        assert!(routing.forward_to_camera);
    }

    #[test]
    fn test_captured_input_stays_with_ui() {
        assert_eq!(
            UiRouting::after_ui(true, false),
            UiRouting {
                redraw: true,
                forward_to_camera: false,
            }
        );
    }

    #[test]
    fn test_uncaptured_input_goes_to_camera_only() {
        for left_release in [false, true] {
            assert_eq!(
                UiRouting::after_ui(false, left_release),
                UiRouting {
                    redraw: false,
                    forward_to_camera: true,
                }
            );
        }
    }

    #[test]
    fn test_only_left_release_counts() {
        assert!(!is_left_release(&WindowEvent::CloseRequested));
        assert!(!is_left_release(&WindowEvent::Focused(true)));
    }
}
