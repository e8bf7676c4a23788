// src/ui/panel.rs
//! Control panel and drag blocker
//!
//! Panels only read the session and report what the user clicked; the caller
//! applies the resulting [`ControlAction`].

use crate::{
    formation::Formation,
    session::{ControlAction, Session},
};

/// Counts shown in the panel's image section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageProgress {
    pub loaded: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Floating panel with one button per formation plus frame statistics.
///
/// Buttons are disabled while the blocker is up, so a drag that ends over the
/// panel never triggers a transition.
pub fn control_panel(
    ui: &imgui::Ui,
    session: &Session,
    images: Option<ImageProgress>,
) -> Option<ControlAction> {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return None;
    }

    ui.window("Formations")
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .collapsible(true)
        .build(|| {
            let mut action = None;
            let _disabled = ui.begin_disabled(session.blocker_visible());

            for (i, formation) in Formation::ALL.into_iter().enumerate() {
                if i > 0 {
                    ui.same_line();
                }
                let label = if session.formation() == Some(formation) {
                    format!("[{}]", formation.label())
                } else {
                    formation.label().to_string()
                };
                if ui.button(&label) {
                    action = Some(ControlAction::Transform(formation));
                }
                if ui.is_item_hovered() {
                    ui.tooltip_text(format!("Key {}", i + 1));
                }
            }

            ui.separator();
            render_stats(ui, session);

            if let Some(images) = images {
                ui.text(format!(
                    "Images: {} loaded, {} failed, {} pending",
                    images.loaded, images.failed, images.pending
                ));
            }

            if ui.small_button("Reset camera") {
                action = Some(ControlAction::ResetCamera);
            }

            action
        })
        .flatten()
}

fn render_stats(ui: &imgui::Ui, session: &Session) {
    let stats = session.stats();
    ui.text(format!("Cards: {}", session.cards().len()));
    ui.text(format!(
        "FPS: {:.1} ({:.2} ms)",
        stats.fps(),
        stats.frame_time_ms()
    ));
    ui.text(format!("Ticks: {}  Frames: {}", stats.ticks(), stats.renders()));
    let state = if session.driver().is_animating() {
        "animating"
    } else {
        "idle"
    };
    ui.text(format!(
        "Transition: {} ({} tweens)",
        state,
        session.driver().active_tweens()
    ));
}

/// Translucent layer over the whole window while the camera is dragged
pub fn blocker_overlay(ui: &imgui::Ui, visible: bool) {
    if !visible {
        return;
    }
    let display_size = ui.io().display_size;
    ui.get_foreground_draw_list()
        .add_rect([0.0, 0.0], display_size, [0.0, 0.0, 0.0, 0.15])
        .filled(true)
        .build();
}
