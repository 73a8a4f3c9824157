use riftgraph_core::NodeId;
use std::time::Duration;

use crate::graph::scene::{fly_to_node, SceneCapabilities};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Graph,
    Accounts,
    Rings,
}

impl ActiveView {
    pub const ALL: [ActiveView; 3] = [Self::Graph, Self::Accounts, Self::Rings];

    pub fn title(self) -> &'static str {
        match self {
            Self::Graph => "Graph",
            Self::Accounts => "Accounts",
            Self::Rings => "Rings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Selected(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFocus {
    pub id: NodeId,
    pub due: Duration,
}

/// Selection plus the deferred "focus this node" request raised from the
/// table views. Resolution waits for the graph view to settle.
#[derive(Debug, Clone)]
pub struct SelectionController {
    state: Selection,
    pending: Option<PendingFocus>,
    pub active_view: ActiveView,
    pub settle: Duration,
    pub camera_distance: f32,
    pub flight: Duration,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), 120.0, Duration::from_millis(1200))
    }
}

impl SelectionController {
    pub fn new(settle: Duration, camera_distance: f32, flight: Duration) -> Self {
        Self {
            state: Selection::Idle,
            pending: None,
            active_view: ActiveView::Graph,
            settle,
            camera_distance,
            flight,
        }
    }

    pub fn selected(&self) -> Option<&NodeId> {
        match &self.state {
            Selection::Idle => None,
            Selection::Selected(id) => Some(id),
        }
    }

    pub fn pending(&self) -> Option<&PendingFocus> {
        self.pending.as_ref()
    }

    /// Node click in the 3D view. Clicking the selected node again clears
    /// the selection without moving the camera.
    pub fn click(&mut self, id: &NodeId, scene: &mut dyn SceneCapabilities) {
        if self.selected() == Some(id) {
            self.state = Selection::Idle;
            return;
        }
        self.state = Selection::Selected(id.clone());
        fly_to_node(scene, id.as_str(), self.camera_distance, self.flight);
    }

    pub fn clear(&mut self) {
        self.state = Selection::Idle;
    }

    /// Focus request from a table view. Switches to the graph view and
    /// supersedes any request still waiting.
    pub fn request_focus(&mut self, id: NodeId, now: Duration) {
        if let Some(prev) = self.pending.as_ref() {
            tracing::debug!(superseded = %prev.id, next = %id, "focus request replaced");
        }
        self.active_view = ActiveView::Graph;
        self.pending = Some(PendingFocus {
            id,
            due: now + self.settle,
        });
    }

    pub fn set_view(&mut self, view: ActiveView) {
        if view != ActiveView::Graph && self.pending.take().is_some() {
            tracing::debug!("focus request cancelled by view change");
        }
        self.active_view = view;
    }

    /// Resolves a due focus request. Returns the id that was focused; an id
    /// the scene does not know is dropped quietly.
    pub fn poll(&mut self, now: Duration, scene: &mut dyn SceneCapabilities) -> Option<NodeId> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.due);
        if !due {
            return None;
        }
        let PendingFocus { id, .. } = self.pending.take()?;
        if self.active_view != ActiveView::Graph {
            return None;
        }
        if scene.node_position(id.as_str()).is_none() {
            tracing::debug!(id = %id, "focus target not in scene");
            return None;
        }
        self.state = Selection::Selected(id.clone());
        fly_to_node(scene, id.as_str(), self.camera_distance, self.flight);
        Some(id)
    }

    /// New analysis result: nothing from the previous graph survives.
    pub fn reset(&mut self) {
        self.state = Selection::Idle;
        self.pending = None;
        self.active_view = ActiveView::Graph;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::scene::{LiveNode, SceneRig};
    use bevy::prelude::Vec3;

    #[derive(Default)]
    struct MockScene {
        nodes: Vec<LiveNode>,
        flights: Vec<(Vec3, Vec3, Duration)>,
    }

    impl MockScene {
        fn with(ids: &[(&str, Vec3)]) -> Self {
            Self {
                nodes: ids
                    .iter()
                    .map(|(id, p)| LiveNode {
                        id: NodeId::from(*id),
                        position: Some(*p),
                    })
                    .collect(),
                flights: Vec::new(),
            }
        }
    }

    impl SceneCapabilities for MockScene {
        fn graph_data(&self) -> Vec<LiveNode> {
            self.nodes.clone()
        }

        fn camera_to(&mut self, position: Vec3, look_at: Vec3, duration: Duration) {
            self.flights.push((position, look_at, duration));
        }

        fn scene(&self) -> Option<&SceneRig> {
            None
        }

        fn reheat_simulation(&mut self) {}
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn click_selects_and_flies() {
        let mut scene = MockScene::with(&[("A", Vec3::new(0.0, 0.0, 10.0))]);
        let mut sel = SelectionController::default();
        sel.click(&NodeId::from("A"), &mut scene);
        assert_eq!(sel.selected(), Some(&NodeId::from("A")));
        assert_eq!(scene.flights.len(), 1);
        let (pos, look, dur) = scene.flights[0];
        assert!(pos.abs_diff_eq(Vec3::new(0.0, 0.0, 130.0), 1e-3));
        assert_eq!(look, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(dur, ms(1200));
    }

    #[test]
    fn second_click_deselects_without_flight() {
        let mut scene = MockScene::with(&[("A", Vec3::X)]);
        let mut sel = SelectionController::default();
        let a = NodeId::from("A");
        sel.click(&a, &mut scene);
        sel.click(&a, &mut scene);
        assert!(sel.selected().is_none());
        assert_eq!(scene.flights.len(), 1);
    }

    #[test]
    fn focus_waits_for_settle_delay() {
        let mut scene = MockScene::with(&[("A", Vec3::X)]);
        let mut sel = SelectionController::default();
        sel.set_view(ActiveView::Accounts);
        sel.request_focus(NodeId::from("A"), ms(1_000));
        assert_eq!(sel.active_view, ActiveView::Graph);

        assert_eq!(sel.poll(ms(1_299), &mut scene), None);
        assert!(scene.flights.is_empty());
        assert_eq!(sel.poll(ms(1_300), &mut scene), Some(NodeId::from("A")));
        assert_eq!(scene.flights.len(), 1);
        assert!(sel.pending().is_none());
    }

    #[test]
    fn newer_request_supersedes_older() {
        let mut scene = MockScene::with(&[("A", Vec3::X), ("B", Vec3::Y)]);
        let mut sel = SelectionController::default();
        sel.request_focus(NodeId::from("A"), ms(0));
        sel.request_focus(NodeId::from("B"), ms(100));
        assert_eq!(sel.poll(ms(300), &mut scene), None);
        assert_eq!(sel.poll(ms(400), &mut scene), Some(NodeId::from("B")));
        assert_eq!(scene.flights.len(), 1);
    }

    #[test]
    fn unknown_or_unpositioned_target_is_dropped() {
        let mut scene = MockScene::with(&[("A", Vec3::X)]);
        scene.nodes.push(LiveNode {
            id: NodeId::from("B"),
            position: None,
        });
        let mut sel = SelectionController::default();

        sel.request_focus(NodeId::from("Z"), ms(0));
        assert_eq!(sel.poll(ms(500), &mut scene), None);
        sel.request_focus(NodeId::from("B"), ms(0));
        assert_eq!(sel.poll(ms(500), &mut scene), None);

        assert!(sel.pending().is_none());
        assert!(sel.selected().is_none());
        assert!(scene.flights.is_empty());
    }

    #[test]
    fn leaving_graph_view_cancels_pending_focus() {
        let mut scene = MockScene::with(&[("A", Vec3::X)]);
        let mut sel = SelectionController::default();
        sel.request_focus(NodeId::from("A"), ms(0));
        sel.set_view(ActiveView::Rings);
        assert_eq!(sel.poll(ms(1_000), &mut scene), None);
        assert!(scene.flights.is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut scene = MockScene::with(&[("A", Vec3::X)]);
        let mut sel = SelectionController::default();
        sel.click(&NodeId::from("A"), &mut scene);
        sel.request_focus(NodeId::from("A"), ms(0));
        sel.reset();
        assert!(sel.selected().is_none());
        assert!(sel.pending().is_none());
        assert_eq!(sel.poll(ms(1_000), &mut scene), None);
    }
}
