use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::graph::{ActiveView, GraphState};

pub fn handle_shortcuts(time: Res<Time>, mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    let ctx = contexts.ctx_mut();
    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        st.clear_selection();
    }
    if ctx.wants_keyboard_input() {
        return;
    }

    if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
        st.toggle_playback(time.elapsed());
    }
    for (key, view) in [
        (egui::Key::Num1, ActiveView::Graph),
        (egui::Key::Num2, ActiveView::Accounts),
        (egui::Key::Num3, ActiveView::Rings),
    ] {
        if ctx.input(|i| i.key_pressed(key)) {
            st.set_view(view);
        }
    }
    if ctx.input(|i| i.key_pressed(egui::Key::R)) {
        st.reheat();
    }
}
