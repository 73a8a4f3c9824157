pub mod boundary;
pub mod camera;
pub mod spatial;

pub use boundary::{boundary_fallback, scene_healthy, SceneBoundary};
pub use camera::{
    animate_camera, apply_background, apply_scene_rig, orbit_camera, setup_scene, track_viewport,
};
pub use spatial::{
    apply_picked_focus, drag_nodes, draw_labels, draw_spatial, hover_detection_spatial,
    picking_focus, NodeGesture,
};
