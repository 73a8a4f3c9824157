use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use chrono::{DateTime, Utc};

use crate::graph::{ActiveView, GraphState};

pub fn format_ts(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "—".to_string(),
    }
}

/// Bottom strip with play/pause and a scrubber. Hidden outside the graph
/// view and when the result carries no usable time range.
pub fn timeline_bar(time: Res<Time>, mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    if st.selection.active_view != ActiveView::Graph || st.result.is_none() || st.timeline.is_inert()
    {
        return;
    }
    let now = time.elapsed();
    let bounds = st.timeline.bounds();

    egui::TopBottomPanel::bottom("timeline").show(contexts.ctx_mut(), |ui| {
        ui.horizontal(|ui| {
            let label = if st.timeline.is_playing() { "Pause" } else { "Play" };
            if ui.button(label).clicked() {
                st.timeline.toggle_play(now);
            }
            ui.label(format_ts(bounds.min));

            let mut playhead = st.timeline.playhead();
            let slider = egui::Slider::new(&mut playhead, bounds.min as f64..=bounds.max as f64)
                .show_value(false);
            if ui.add(slider).changed() {
                st.timeline.set_playhead(playhead);
            }

            ui.label(format_ts(bounds.max));
            ui.separator();
            ui.strong(format_ts(st.timeline.playhead() as i64));
            ui.label(format!("{:.0}%", st.timeline.progress() * 100.0));
        });
    });
}
