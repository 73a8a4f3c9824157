use bevy::prelude::*;

use crate::app::events::Picked;
use crate::app::resources::NetRx;
use crate::graph::GraphState;
use crate::render::{scene_healthy, NodeGesture, SceneBoundary};
use crate::util::config::ViewerConfig;

pub mod events;
pub mod resources;

pub struct RiftGraphViewerPlugin {
    pub cfg: ViewerConfig,
}

impl Plugin for RiftGraphViewerPlugin {
    fn build(&self, app: &mut App) {
        let mut st = GraphState::default();
        st.apply_viewer_config(&self.cfg);
        app.add_event::<Picked>()
            .insert_resource(st)
            .init_resource::<SceneBoundary>()
            .init_resource::<NodeGesture>()
            .add_systems(Startup, crate::render::setup_scene)
            .add_systems(
                Update,
                (
                    pump_network,
                    crate::graph::tick_graph,
                    crate::ui::handle_shortcuts,
                    crate::ui::ui_panel,
                    crate::ui::timeline_bar,
                    crate::ui::hud_overlay,
                    crate::ui::hover_tooltip,
                    crate::render::boundary_fallback,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    (
                        crate::render::hover_detection_spatial,
                        crate::render::drag_nodes,
                        crate::render::picking_focus,
                        crate::render::apply_picked_focus,
                        crate::render::orbit_camera,
                    )
                        .chain()
                        .run_if(scene_healthy),
                    crate::render::animate_camera,
                    crate::render::apply_scene_rig,
                    crate::render::track_viewport,
                    crate::render::apply_background,
                    crate::render::draw_spatial,
                    crate::render::draw_labels,
                )
                    .chain()
                    .after(crate::render::boundary_fallback),
            );
    }
}

fn pump_network(mut st: ResMut<GraphState>, rx: Option<Res<NetRx>>) {
    let Some(rx) = rx else {
        return;
    };
    for msg in rx.0.try_iter().take(64) {
        st.apply(msg);
    }
}
