//! All state of a running card wall.
//!
//! A [`Session`] is owned by the event loop and driven with explicit clock
//! times, so it can run headless against any [`CardRenderer`].

use std::time::Duration;

use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    card::{Card, CardFactory},
    catalog::Catalog,
    config::AppConfig,
    formation::{Formation, FormationSet},
    gfx::camera::{CameraManager, CameraUniform, DragEvent},
    gfx::rendering::{CardRenderer, FrameOutcome, RenderError},
    performance::FrameStats,
    tween::TransitionDriver,
};

/// Something the user asked for through the control panel or keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Transform(Formation),
    ResetCamera,
}

pub struct Session {
    catalog: Catalog,
    cards: Vec<Card>,
    formations: FormationSet,
    driver: TransitionDriver,
    camera: CameraManager,
    stats: FrameStats,
    /// Shown while the camera is being dragged
    blocker_visible: bool,
    /// Formation of the most recent transition
    formation: Option<Formation>,
    initial_formation: Formation,
    base_duration: Duration,
    needs_redraw: bool,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self::assemble(
            config,
            StdRng::from_os_rng(),
            TransitionDriver::new(config.transition.easing),
        )
    }

    /// Session whose scatter positions and tween durations are reproducible
    pub fn with_seed(config: &AppConfig, seed: u64) -> Self {
        Self::assemble(
            config,
            StdRng::seed_from_u64(seed),
            TransitionDriver::with_seed(config.transition.easing, seed.wrapping_add(1)),
        )
    }

    fn assemble(config: &AppConfig, mut rng: StdRng, driver: TransitionDriver) -> Self {
        let catalog = Catalog::generate(config.card_count, &config.image_source_template);
        let cards = CardFactory::build(&catalog, &mut rng);

        let (width, height) = config.window_size;
        let aspect = width.max(1) as f32 / height.max(1) as f32;

        info!("Session created with {} cards", cards.len());

        Self {
            catalog,
            formations: FormationSet::generate(cards.len()),
            cards,
            driver,
            camera: CameraManager::from_config(&config.camera, aspect),
            stats: FrameStats::new(),
            blocker_visible: false,
            formation: None,
            initial_formation: config.transition.initial_formation,
            base_duration: config.transition.base_duration,
            needs_redraw: true,
        }
    }

    /// Hands every card to the renderer, in index order
    pub fn mount<R: CardRenderer + ?Sized>(&mut self, renderer: &mut R) {
        for (index, card) in self.cards.iter().enumerate() {
            renderer.mount(index, card);
        }
        self.needs_redraw = true;
    }

    /// Kicks off the transition into the configured initial formation
    pub fn start(&mut self, now: Duration) {
        self.transform(self.initial_formation, self.base_duration, now);
    }

    /// Morphs every card towards `formation`, replacing any running transition
    pub fn transform(&mut self, formation: Formation, base_duration: Duration, now: Duration) {
        debug!("Transform to {}", formation);
        self.driver.transform(
            &self.cards,
            self.formations.targets(formation),
            base_duration,
            now,
        );
        self.formation = Some(formation);
        self.needs_redraw = true;
    }

    /// Advances tweens and camera damping. Returns true if a redraw is pending.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.stats.record_tick();
        let animating = self.driver.update(now, &mut self.cards);
        let camera_moved = self.camera.update();
        if animating || camera_moved {
            self.needs_redraw = true;
        }
        self.needs_redraw
    }

    /// Applies a new window size. Zero-sized windows are ignored.
    pub fn resize<R: CardRenderer + ?Sized>(
        &mut self,
        width: u32,
        height: u32,
        renderer: &mut R,
    ) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        debug!("Resize to {}x{}", width, height);
        self.camera.camera.resize_projection(width, height);
        renderer.set_viewport(width, height);
        self.needs_redraw = true;
        true
    }

    pub fn handle_control(&mut self, action: ControlAction, now: Duration) {
        match action {
            ControlAction::Transform(formation) => {
                self.transform(formation, self.base_duration, now)
            }
            ControlAction::ResetCamera => {
                self.camera.controller.stop();
                self.camera.camera.reset_to_default();
                self.needs_redraw = true;
            }
        }
    }

    /// Shows the blocker for the duration of a camera drag
    pub fn on_drag(&mut self, event: DragEvent) {
        self.blocker_visible = matches!(event, DragEvent::Start);
        self.needs_redraw = true;
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Camera state for the frame about to be drawn
    pub fn camera_uniform(&mut self) -> CameraUniform {
        self.camera.refresh_uniform()
    }

    /// Marks the pending redraw as done
    fn frame_rendered(&mut self, now: Duration) {
        self.stats.record_render(now);
        self.needs_redraw = false;
    }

    /// Draws one frame through `renderer`. A skipped frame stays pending.
    pub fn render<R: CardRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        now: Duration,
    ) -> Result<FrameOutcome, RenderError> {
        let camera = self.camera_uniform();
        let outcome = renderer.render(&self.cards, &camera)?;
        self.frame_finished(outcome, now);
        Ok(outcome)
    }

    /// Records the outcome of a frame; only a presented frame clears the
    /// pending redraw
    pub fn frame_finished(&mut self, outcome: FrameOutcome, now: Duration) {
        match outcome {
            FrameOutcome::Presented => self.frame_rendered(now),
            FrameOutcome::Skipped => {
                debug!("Frame skipped, redraw stays pending");
                self.needs_redraw = true;
            }
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn formations(&self) -> &FormationSet {
        &self.formations
    }

    pub fn driver(&self) -> &TransitionDriver {
        &self.driver
    }

    pub fn camera_manager(&self) -> &CameraManager {
        &self.camera
    }

    pub fn camera_manager_mut(&mut self) -> &mut CameraManager {
        &mut self.camera
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn blocker_visible(&self) -> bool {
        self.blocker_visible
    }

    pub fn formation(&self) -> Option<Formation> {
        self.formation
    }

    pub fn base_duration(&self) -> Duration {
        self.base_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::table_target;

    /// Renderer that only remembers what it was asked to do
    #[derive(Default)]
    struct RecordingRenderer {
        mounted: Vec<usize>,
        viewports: Vec<(u32, u32)>,
        frames: Vec<Vec<Card>>,
        /// Surface unavailable: frames are dropped
        unavailable: bool,
    }

    impl CardRenderer for RecordingRenderer {
        fn mount(&mut self, index: usize, _card: &Card) {
            self.mounted.push(index);
        }

        fn set_viewport(&mut self, width: u32, height: u32) {
            self.viewports.push((width, height));
        }

        fn render(
            &mut self,
            cards: &[Card],
            _camera: &CameraUniform,
        ) -> Result<FrameOutcome, RenderError> {
            if self.unavailable {
                return Ok(FrameOutcome::Skipped);
            }
            self.frames.push(cards.to_vec());
            Ok(FrameOutcome::Presented)
        }
    }

    fn config(n: usize) -> AppConfig {
        AppConfig::default().with_card_count(n).without_images()
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_mount_registers_every_card_in_order() {
        let mut session = Session::with_seed(&config(12), 1);
        let mut renderer = RecordingRenderer::default();
        session.mount(&mut renderer);
        assert_eq!(renderer.mounted, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_resize_sets_viewport_once_and_requests_redraw() {
        let mut session = Session::with_seed(&config(5), 1);
        let mut renderer = RecordingRenderer::default();
        session.render(&mut renderer, ms(0)).unwrap();
        assert!(!session.needs_redraw());

        assert!(session.resize(640, 480, &mut renderer));
        assert_eq!(renderer.viewports, vec![(640, 480)]);
        assert!(session.needs_redraw());
    }

    #[test]
    fn test_zero_sized_resize_is_ignored() {
        let mut session = Session::with_seed(&config(5), 1);
        let mut renderer = RecordingRenderer::default();
        session.render(&mut renderer, ms(0)).unwrap();

        assert!(!session.resize(0, 480, &mut renderer));
        assert!(!session.resize(640, 0, &mut renderer));
        assert!(renderer.viewports.is_empty());
        assert!(!session.needs_redraw());
    }

    #[test]
    fn test_skipped_frame_keeps_redraw_pending() {
        let mut session = Session::with_seed(&config(5), 1);
        let mut renderer = RecordingRenderer {
            unavailable: true,
            ..Default::default()
        };

        assert_eq!(session.render(&mut renderer, ms(0)).unwrap(), FrameOutcome::Skipped);
        assert!(session.needs_redraw());
        assert_eq!(session.stats().renders(), 0);
        // Idle wall, but the dropped frame is requested again
        assert!(session.tick(ms(16)));

        renderer.unavailable = false;
        assert_eq!(session.render(&mut renderer, ms(32)).unwrap(), FrameOutcome::Presented);
        assert!(!session.needs_redraw());
        assert_eq!(renderer.frames.len(), 1);
    }

    #[test]
    fn test_catalog_and_cards_line_up() {
        let session = Session::with_seed(&config(7).with_image_source("cards/{index}.png"), 2);
        assert_eq!(session.catalog().len(), 7);
        assert_eq!(session.cards().len(), 7);
        for (i, card) in session.cards().iter().enumerate() {
            assert_eq!(card.item, i);
            assert_eq!(
                session.catalog().get(i).map(|item| item.image_source.clone()),
                Some(format!("cards/{}.png", i))
            );
        }
    }

    #[test]
    fn test_blocker_follows_drag() {
        let mut session = Session::with_seed(&config(5), 1);
        assert!(!session.blocker_visible());

        session.on_drag(DragEvent::Start);
        assert!(session.blocker_visible());

        session.on_drag(DragEvent::End);
        assert!(!session.blocker_visible());
    }

    #[test]
    fn test_second_transform_wins() {
        let n = 20;
        let mut session = Session::with_seed(&config(n), 3);
        session.transform(Formation::Sphere, ms(2000), ms(0));
        session.tick(ms(10));
        session.transform(Formation::Helix, ms(2000), ms(20));

        assert_eq!(session.formation(), Some(Formation::Helix));
        assert_eq!(session.driver().active_tweens(), 2 * n);
        let helix = session.formations().targets(Formation::Helix);
        for (i, target) in helix.iter().enumerate() {
            assert_eq!(session.driver().position_destination(i), Some(target.position));
            assert_eq!(session.driver().rotation_destination(i), Some(target.rotation));
        }
    }

    #[test]
    fn test_idle_session_stops_redrawing() {
        let mut session = Session::with_seed(&config(10), 5);
        let mut renderer = RecordingRenderer::default();
        session.mount(&mut renderer);
        session.start(ms(0));

        let mut now = ms(0);
        while now <= ms(4100) {
            if session.tick(now) {
                session.render(&mut renderer, now).unwrap();
            }
            now += ms(16);
        }
        let frames = renderer.frames.len();
        assert!(frames > 200);

        for _ in 0..50 {
            now += ms(16);
            assert!(!session.tick(now));
        }
        assert_eq!(renderer.frames.len(), frames);
        assert!(session.stats().ticks() > session.stats().renders());
    }

    #[test]
    fn test_initial_table_transition_lands_exactly() {
        let n = 50;
        let mut session = Session::with_seed(&config(n), 42);
        let mut renderer = RecordingRenderer::default();
        session.mount(&mut renderer);
        session.start(ms(0));
        assert_eq!(session.formation(), Some(Formation::Table));

        // Tweens last at most twice the base duration
        session.tick(ms(1000));
        session.tick(ms(4001));
        session.render(&mut renderer, ms(4001)).unwrap();

        let last = renderer.frames.last().unwrap();
        assert_eq!(last.len(), n);
        for (i, card) in last.iter().enumerate() {
            let target = table_target(i);
            assert_eq!(card.position, target.position);
            assert_eq!(card.rotation, target.rotation);
        }
        assert!(!session.driver().is_animating());
    }

    #[test]
    fn test_control_actions() {
        let mut session = Session::with_seed(&config(8), 9);
        session.handle_control(ControlAction::Transform(Formation::Grid), ms(0));
        assert_eq!(session.formation(), Some(Formation::Grid));
        assert_eq!(session.driver().active_tweens(), 16);

        session.camera_manager_mut().camera.add_yaw(1.0);
        session.handle_control(ControlAction::ResetCamera, ms(10));
        assert_eq!(session.camera_manager().camera.yaw, 0.0);
    }
}
