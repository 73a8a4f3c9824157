use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::{ActiveView, GraphState};
use crate::ui::{HUD_EDGE_PADDING, HUD_MIN_CONTENT_W};

fn playhead_state(st: &GraphState) -> &'static str {
    if st.timeline.is_inert() {
        "all time"
    } else if st.timeline.is_playing() {
        "playing"
    } else if st.timeline.progress() >= 1.0 {
        "at end"
    } else {
        "paused"
    }
}

pub fn hud_lines(st: &GraphState) -> Vec<String> {
    let mut lines = vec![
        format!("FPS: {:.0}", st.perf.fps),
        format!("Links: {} / {}", st.perf.visible_links, st.perf.total_links),
        format!(
            "Simulation: {} (alpha {:.3})",
            if st.scene.sim.is_active() { "running" } else { "settled" },
            st.scene.sim.alpha()
        ),
        format!("Timeline: {}", playhead_state(st)),
    ];
    if let Some(focus) = st.selection.pending() {
        lines.push(format!("Focusing: {}", focus.id));
    }
    if st.scene.is_flying() {
        lines.push("Camera: flying".to_string());
    }
    lines
}

pub fn hud_overlay(mut contexts: EguiContexts, st: Res<GraphState>) {
    if !st.ui.show_hud || st.selection.active_view != ActiveView::Graph {
        return;
    }
    let ctx = contexts.ctx_mut();
    let screen = ctx.screen_rect();
    // Sits in the viewport's top-left corner; falls back to the window edge
    // when the panel leaves no room.
    let mut x = screen.min.x + st.ui.sidebar_width + HUD_EDGE_PADDING;
    if screen.width() < st.ui.sidebar_width + HUD_MIN_CONTENT_W {
        x = screen.min.x + HUD_EDGE_PADDING;
    }
    let y = screen.min.y + HUD_EDGE_PADDING;

    egui::Area::new(egui::Id::new("hud"))
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(x, y))
        .show(ctx, |ui| {
            ui.group(|ui| {
                for line in hud_lines(&st) {
                    ui.label(line);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftgraph_core::NodeId;
    use std::time::Duration;

    #[test]
    fn pending_focus_shows_until_resolved() {
        let mut st = GraphState::default();
        st.request_focus(NodeId::from("ACC-7"), Duration::ZERO);
        let lines = hud_lines(&st);
        assert!(lines.iter().any(|l| l == "Focusing: ACC-7"));
        assert!(!lines.iter().any(|l| l.starts_with("Camera")));

        st.selection.reset();
        assert_eq!(hud_lines(&st).len(), 4);
    }
}
