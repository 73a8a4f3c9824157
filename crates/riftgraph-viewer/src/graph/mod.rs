pub mod adapter;
pub mod encode;
pub mod layout;
pub mod octree;
pub mod scene;
pub mod selection;
pub mod state;
pub mod timeline;
pub mod trace;

use bevy::prelude::*;

pub use selection::ActiveView;
pub use state::GraphState;

/// Advances the clocks that live inside the graph state: the timeline
/// ticker, the pending focus timer and the force simulation.
pub fn tick_graph(time: Res<Time>, mut st: ResMut<GraphState>) {
    st.perf.record_frame(time.delta_seconds());
    st.tick(time.elapsed());
    let visible = st.visible_links().count();
    st.perf.visible_links = visible;
    st.perf.total_links = st.render.links.len();
    if st.scene.is_mounted() {
        st.scene.step_simulation();
    }
}
