//! The running 3D scene as seen from the rest of the viewer: simulation,
//! camera pose and light rig. The ECS render systems read from here and write
//! nothing back except the mounted flag and viewport size.

use bevy::prelude::{Color, Vec3};
use riftgraph_core::NodeId;
use std::time::Duration;

use crate::graph::adapter::RenderGraph;
use crate::graph::layout::{ForceParams, ForceSim};

/// Wall-clock share of a frame that queued warmup ticks may use.
pub const WARMUP_FRAME_BUDGET: Duration = Duration::from_millis(8);

/// Live node as reported by the simulation. `position` stays `None` until
/// the node has been stepped at least once.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveNode {
    pub id: NodeId,
    pub position: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpec {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

/// Three-light rig. `relight` replaces the lights instead of appending, so
/// applying it twice yields the same scene.
#[derive(Debug, Clone, Default)]
pub struct SceneRig {
    lights: Vec<LightSpec>,
    generation: u64,
}

impl SceneRig {
    pub fn relight(&mut self) {
        self.lights.clear();
        self.lights.push(LightSpec {
            kind: LightKind::Ambient,
            color: Color::WHITE,
            intensity: 0.7,
            position: Vec3::ZERO,
        });
        self.lights.push(LightSpec {
            kind: LightKind::Directional,
            color: Color::WHITE,
            intensity: 0.8,
            position: Vec3::new(100.0, 200.0, 100.0),
        });
        self.lights.push(LightSpec {
            kind: LightKind::Point,
            color: Color::WHITE,
            intensity: 0.5,
            position: Vec3::new(-100.0, -100.0, -100.0),
        });
        self.generation += 1;
    }

    pub fn lights(&self) -> &[LightSpec] {
        &self.lights
    }

    /// Bumped on every `relight`; render systems compare against it.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 300.0),
            look_at: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFlight {
    pub from: CameraPose,
    pub to: CameraPose,
    pub elapsed: Duration,
    pub duration: Duration,
}

impl CameraFlight {
    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn pose(&self) -> CameraPose {
        let t = self.progress();
        let e = 1.0 - (1.0 - t) * (1.0 - t);
        CameraPose {
            position: self.from.position.lerp(self.to.position, e),
            look_at: self.from.look_at.lerp(self.to.look_at, e),
        }
    }
}

/// What the viewer may ask of the mounted scene. Every call is a no-op (or
/// empty) while the scene is not mounted.
pub trait SceneCapabilities {
    fn graph_data(&self) -> Vec<LiveNode>;
    fn camera_to(&mut self, position: Vec3, look_at: Vec3, duration: Duration);
    fn scene(&self) -> Option<&SceneRig>;
    fn reheat_simulation(&mut self);

    fn node_position(&self, id: &str) -> Option<Vec3> {
        self.graph_data()
            .into_iter()
            .find(|n| n.id.as_str() == id)
            .and_then(|n| n.position)
    }
}

/// Camera placement that frames a node from `distance` units further out
/// along the ray from the origin. A node at the origin is approached on +Z.
pub fn fly_to_target(node: Vec3, distance: f32) -> CameraPose {
    let len = node.length();
    let position = if len <= f32::EPSILON {
        Vec3::new(0.0, 0.0, distance)
    } else {
        node * (1.0 + distance / len)
    };
    CameraPose {
        position,
        look_at: node,
    }
}

pub fn fly_to_node(
    scene: &mut dyn SceneCapabilities,
    id: &str,
    distance: f32,
    duration: Duration,
) -> bool {
    let Some(pos) = scene.node_position(id) else {
        return false;
    };
    let pose = fly_to_target(pos, distance);
    scene.camera_to(pose.position, pose.look_at, duration);
    true
}

#[derive(Debug, Clone)]
pub struct ForceScene {
    mounted: bool,
    pub sim: ForceSim,
    rig: SceneRig,
    camera: CameraPose,
    flight: Option<CameraFlight>,
    pub warmup_ticks: u32,
}

impl Default for ForceScene {
    fn default() -> Self {
        Self::new(80, 150)
    }
}

impl ForceScene {
    pub fn new(warmup_ticks: u32, cooldown_ticks: u32) -> Self {
        Self {
            mounted: false,
            sim: ForceSim::new(ForceParams::default(), cooldown_ticks),
            rig: SceneRig::default(),
            camera: CameraPose::default(),
            flight: None,
            warmup_ticks,
        }
    }

    pub fn mount(&mut self) {
        self.mounted = true;
        tracing::debug!("scene mounted");
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.flight = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn relight(&mut self) {
        self.rig.relight();
    }

    pub fn rig(&self) -> &SceneRig {
        &self.rig
    }

    /// Rebinds the simulation to a new render graph. Positions are kept by
    /// id when `keep_positions` is set.
    pub fn bind(&mut self, graph: &RenderGraph, keep_positions: bool) {
        self.sim.load(graph, keep_positions);
        if !keep_positions && !graph.is_empty() {
            self.sim.queue_warmup(self.warmup_ticks);
        }
    }

    pub fn clear(&mut self) {
        self.sim.clear();
        self.flight = None;
    }

    pub fn camera(&self) -> CameraPose {
        self.camera
    }

    /// Direct camera manipulation (orbit/zoom). Cancels any flight.
    pub fn set_camera(&mut self, pose: CameraPose) {
        self.camera = pose;
        self.flight = None;
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Advances the running camera flight and returns the current pose.
    pub fn advance_camera(&mut self, dt: Duration) -> CameraPose {
        if let Some(flight) = self.flight.as_mut() {
            flight.elapsed += dt;
            self.camera = flight.pose();
            if flight.progress() >= 1.0 {
                self.flight = None;
            }
        }
        self.camera
    }

    pub fn step_simulation(&mut self) -> bool {
        self.sim.step_within(WARMUP_FRAME_BUDGET)
    }

    /// Holds a node under the pointer and keeps the layout moving around
    /// it. Ignored while unmounted.
    pub fn drag_node(&mut self, id: &str, pos: Vec3) -> bool {
        if !self.mounted || !self.sim.pin(id, pos) {
            return false;
        }
        self.sim.reheat();
        true
    }

    pub fn release_node(&mut self, id: &str) -> bool {
        if !self.sim.release(id) {
            return false;
        }
        self.sim.reheat();
        true
    }
}

impl SceneCapabilities for ForceScene {
    fn graph_data(&self) -> Vec<LiveNode> {
        if !self.mounted {
            return Vec::new();
        }
        self.sim
            .positions()
            .map(|(id, position)| LiveNode {
                id: id.clone(),
                position,
            })
            .collect()
    }

    fn camera_to(&mut self, position: Vec3, look_at: Vec3, duration: Duration) {
        if !self.mounted {
            return;
        }
        self.flight = Some(CameraFlight {
            from: self.camera,
            to: CameraPose { position, look_at },
            elapsed: Duration::ZERO,
            duration,
        });
    }

    fn scene(&self) -> Option<&SceneRig> {
        self.mounted.then_some(&self.rig)
    }

    fn reheat_simulation(&mut self) {
        if self.mounted {
            self.sim.reheat();
        }
    }

    fn node_position(&self, id: &str) -> Option<Vec3> {
        if !self.mounted {
            return None;
        }
        self.sim.position(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fly_target_backs_off_along_the_ray() {
        let pose = fly_to_target(Vec3::new(30.0, 40.0, 0.0), 120.0);
        // |pos| = 50, ratio = 1 + 120/50
        assert!(pose.position.abs_diff_eq(Vec3::new(102.0, 136.0, 0.0), 1e-3));
        assert_eq!(pose.look_at, Vec3::new(30.0, 40.0, 0.0));
        assert!((pose.position.distance(pose.look_at) - 120.0).abs() < 1e-3);
    }

    #[test]
    fn fly_target_at_origin_uses_positive_z() {
        let pose = fly_to_target(Vec3::ZERO, 120.0);
        assert_eq!(pose.position, Vec3::new(0.0, 0.0, 120.0));
        assert!(pose.position.is_finite());
    }

    #[test]
    fn relight_is_idempotent() {
        let mut rig = SceneRig::default();
        rig.relight();
        rig.relight();
        assert_eq!(rig.lights().len(), 3);
        assert_eq!(rig.generation(), 2);
        let ambient = rig.lights()[0];
        assert_eq!(ambient.kind, LightKind::Ambient);
        assert_eq!(ambient.intensity, 0.7);
    }

    #[test]
    fn unmounted_scene_ignores_commands() {
        let mut scene = ForceScene::default();
        scene.camera_to(Vec3::ONE, Vec3::ZERO, Duration::from_millis(100));
        assert!(!scene.is_flying());
        assert!(scene.scene().is_none());
        assert!(scene.graph_data().is_empty());
    }

    #[test]
    fn flight_eases_to_destination_and_ends() {
        let mut scene = ForceScene::default();
        scene.mount();
        scene.set_camera(CameraPose {
            position: Vec3::new(0.0, 0.0, 100.0),
            look_at: Vec3::ZERO,
        });
        scene.camera_to(Vec3::new(0.0, 0.0, 200.0), Vec3::X, Duration::from_millis(1200));

        let mid = scene.advance_camera(Duration::from_millis(600));
        assert!(mid.position.z > 150.0 && mid.position.z < 200.0);
        assert!(scene.is_flying());

        let end = scene.advance_camera(Duration::from_millis(700));
        assert_eq!(end.position, Vec3::new(0.0, 0.0, 200.0));
        assert_eq!(end.look_at, Vec3::X);
        assert!(!scene.is_flying());
    }

    #[test]
    fn bind_defers_warmup_to_frames() {
        let result = riftgraph_core::AnalysisResult {
            graph: riftgraph_core::GraphPayload {
                nodes: ["A", "B"]
                    .iter()
                    .map(|id| riftgraph_core::GraphNode {
                        id: NodeId::from(*id),
                        suspicious: false,
                        score: 0.0,
                        in_degree: 0,
                        out_degree: 0,
                        centrality_score: 0.0,
                    })
                    .collect(),
                links: vec![],
            },
            ..Default::default()
        };
        let graph = crate::graph::adapter::build_render_graph(&result, None);
        let mut scene = ForceScene::new(80, 150);
        scene.bind(&graph, false);
        assert!(scene.sim.is_warming_up());
        assert!(scene.sim.position("A").is_none());

        scene.mount();
        while scene.sim.is_warming_up() {
            assert!(scene.step_simulation());
        }
        assert!(scene.node_position("A").is_some());
    }

    #[test]
    fn dragging_pins_and_release_lets_go() {
        let result = riftgraph_core::AnalysisResult {
            graph: riftgraph_core::GraphPayload {
                nodes: vec![riftgraph_core::GraphNode {
                    id: NodeId::from("A"),
                    suspicious: false,
                    score: 0.0,
                    in_degree: 0,
                    out_degree: 0,
                    centrality_score: 0.0,
                }],
                links: vec![],
            },
            ..Default::default()
        };
        let graph = crate::graph::adapter::build_render_graph(&result, None);
        let mut scene = ForceScene::new(0, 150);
        scene.bind(&graph, false);
        let spot = Vec3::new(5.0, 6.0, 7.0);

        assert!(!scene.drag_node("A", spot), "unmounted scene ignores drags");
        scene.mount();
        assert!(scene.drag_node("A", spot));
        assert!(scene.sim.is_pinned("A"));
        assert_eq!(scene.node_position("A"), Some(spot));

        assert!(scene.release_node("A"));
        assert!(!scene.sim.is_pinned("A"));
        assert!(scene.sim.is_active());
        assert!(!scene.release_node("A"));
    }

    #[test]
    fn point_light_is_white() {
        let mut rig = SceneRig::default();
        rig.relight();
        let point = rig.lights()[2];
        assert_eq!(point.kind, LightKind::Point);
        assert_eq!(point.color, Color::WHITE);
    }
}
