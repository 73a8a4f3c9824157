use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;

use crate::graph::GraphState;

/// Fault isolation for the 3D scene only. Panels, lists and the tracer keep
/// running when it trips.
#[derive(Resource, Debug, Default)]
pub struct SceneBoundary {
    fault: Option<String>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown rendering fault".to_string()
    }
}

impl SceneBoundary {
    pub fn is_tripped(&self) -> bool {
        self.fault.is_some()
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Runs `f`; a panic trips the boundary and yields `None`.
    pub fn guard<T>(&mut self, f: impl FnOnce() -> T) -> Option<T> {
        if self.is_tripped() {
            return None;
        }
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(v) => Some(v),
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                tracing::error!(fault = %msg, "graph scene failed");
                self.fault = Some(msg);
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.fault = None;
    }
}

pub fn scene_healthy(boundary: Res<SceneBoundary>) -> bool {
    !boundary.is_tripped()
}

pub fn boundary_fallback(
    mut contexts: EguiContexts,
    mut boundary: ResMut<SceneBoundary>,
    mut st: ResMut<GraphState>,
) {
    let Some(fault) = boundary.fault().map(str::to_string) else {
        return;
    };
    if st.scene.is_mounted() {
        st.scene.unmount();
        st.timeline.pause();
    }
    let ctx = contexts.ctx_mut();
    egui::Area::new(egui::Id::new("scene_fault"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(st.ui.sidebar_width * 0.5, 0.0))
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.heading("Graph failed to load");
                ui.label(fault);
                if ui.button("Retry").clicked() {
                    boundary.reset();
                    st.scene.mount();
                    st.needs_redraw.store(true, Ordering::Relaxed);
                }
            });
        });
}
