use bevy::prelude::Vec3;
use riftgraph_core::NodeId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::graph::adapter::RenderGraph;
use crate::graph::octree::{jiggle, Octree};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    pub charge: f32,
    pub link_distance: f32,
    pub center_strength: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub initial_radius: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            charge: -20.0,
            link_distance: 30.0,
            center_strength: 1.5,
            velocity_decay: 0.3,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            initial_radius: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
struct SimNode {
    id: NodeId,
    pos: Vec3,
    vel: Vec3,
    // Position is only published once the node has been through a tick.
    stepped: bool,
    // Held in place while the user drags it.
    pinned: Option<Vec3>,
}

#[derive(Debug, Clone, Copy)]
struct SimLink {
    source: usize,
    target: usize,
    strength: f32,
    bias: f32,
}

/// Many-body + link + centering simulation in the style of d3-force-3d.
#[derive(Debug, Clone)]
pub struct ForceSim {
    pub params: ForceParams,
    nodes: Vec<SimNode>,
    index: HashMap<NodeId, usize>,
    links: Vec<SimLink>,
    alpha: f32,
    ticks_since_reheat: u32,
    warmup_left: u32,
    pub cooldown_ticks: u32,
}

impl Default for ForceSim {
    fn default() -> Self {
        Self::new(ForceParams::default(), 150)
    }
}

fn phyllotaxis(i: usize, radius: f32) -> Vec3 {
    let roll = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let yaw = std::f32::consts::PI * 20.0 / (9.0 + 221.0_f32.sqrt());
    let fi = i as f32;
    let r = radius * (0.5 + fi).cbrt();
    Vec3::new(
        r * (fi * roll).cos(),
        r * (fi * roll).sin(),
        r * (fi * yaw).sin(),
    )
}

impl ForceSim {
    pub fn new(params: ForceParams, cooldown_ticks: u32) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            index: HashMap::new(),
            links: Vec::new(),
            alpha: 1.0,
            ticks_since_reheat: 0,
            warmup_left: 0,
            cooldown_ticks,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Admits the graph's nodes. Nodes already simulated keep their state
    /// when `keep_positions` is set; newcomers are seeded on a phyllotaxis.
    pub fn load(&mut self, graph: &RenderGraph, keep_positions: bool) {
        let previous: HashMap<NodeId, SimNode> = if keep_positions {
            self.nodes.drain(..).map(|n| (n.id.clone(), n)).collect()
        } else {
            HashMap::new()
        };

        self.nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                previous.get(&n.id).cloned().unwrap_or_else(|| SimNode {
                    id: n.id.clone(),
                    pos: phyllotaxis(i, self.params.initial_radius),
                    vel: Vec3::ZERO,
                    stepped: false,
                    pinned: None,
                })
            })
            .collect();
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut count = vec![0u32; self.nodes.len()];
        let mut pairs = Vec::with_capacity(graph.links.len());
        for l in &graph.links {
            let (Some(&s), Some(&t)) = (self.index.get(&l.source), self.index.get(&l.target))
            else {
                continue;
            };
            if s == t {
                continue;
            }
            count[s] += 1;
            count[t] += 1;
            pairs.push((s, t));
        }
        self.links = pairs
            .into_iter()
            .map(|(s, t)| SimLink {
                source: s,
                target: t,
                strength: 1.0 / count[s].min(count[t]).max(1) as f32,
                bias: count[s] as f32 / (count[s] + count[t]) as f32,
            })
            .collect();

        self.reheat();
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.links.clear();
        self.alpha = 1.0;
        self.ticks_since_reheat = 0;
        self.warmup_left = 0;
    }

    pub fn reheat(&mut self) {
        self.alpha = 1.0;
        self.ticks_since_reheat = 0;
    }

    pub fn is_active(&self) -> bool {
        !self.nodes.is_empty()
            && (self.warmup_left > 0
                || (self.alpha >= self.params.alpha_min
                    && self.ticks_since_reheat < self.cooldown_ticks))
    }

    pub fn is_warming_up(&self) -> bool {
        self.warmup_left > 0 && !self.nodes.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<Vec3> {
        let n = self.nodes.get(*self.index.get(id)?)?;
        n.stepped.then_some(n.pos)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&NodeId, Option<Vec3>)> {
        self.nodes.iter().map(|n| (&n.id, n.stepped.then_some(n.pos)))
    }

    /// Queues ticks that run ahead of the visible cooldown. They are spread
    /// over frames by `step_within` and do not count against the cooldown.
    pub fn queue_warmup(&mut self, ticks: u32) {
        self.warmup_left = ticks;
    }

    /// One frame worth of simulation. While warming up, runs as many queued
    /// ticks as fit in `budget` (at least one); otherwise a single tick.
    /// No-op once cooled down.
    pub fn step_within(&mut self, budget: Duration) -> bool {
        if self.is_warming_up() {
            let start = Instant::now();
            loop {
                self.tick();
                self.warmup_left -= 1;
                if self.warmup_left == 0 || start.elapsed() >= budget {
                    break;
                }
            }
            return true;
        }
        self.step()
    }

    pub fn step(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.tick();
        self.ticks_since_reheat += 1;
        true
    }

    /// Holds a node at `pos` until released. The node counts as stepped
    /// from here on, so it is drawn where the pointer put it.
    pub fn pin(&mut self, id: &str, pos: Vec3) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let node = &mut self.nodes[i];
        node.pinned = Some(pos);
        node.pos = pos;
        node.vel = Vec3::ZERO;
        node.stepped = true;
        true
    }

    pub fn release(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        self.nodes[i].pinned.take().is_some()
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.index
            .get(id)
            .is_some_and(|&i| self.nodes[i].pinned.is_some())
    }

    fn tick(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let p = self.params;
        self.alpha += (0.0 - self.alpha) * p.alpha_decay;
        let alpha = self.alpha;

        // many-body, Barnes-Hut approximated
        let n = self.nodes.len();
        let points: Vec<Vec3> = self.nodes.iter().map(|node| node.pos).collect();
        let tree = Octree::build(&points);
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.vel += tree.force_on(i, &points, p.charge * alpha);
        }

        // links
        for (k, link) in self.links.iter().enumerate() {
            let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
            let mut d = (t.pos + t.vel) - (s.pos + s.vel);
            let mut len = d.length();
            if len == 0.0 {
                d = jiggle(k, link.target);
                len = d.length();
            }
            let scale = (len - p.link_distance) / len * alpha * link.strength;
            let d = d * scale;
            self.nodes[link.target].vel -= d * link.bias;
            self.nodes[link.source].vel += d * (1.0 - link.bias);
        }

        // integrate
        let keep = 1.0 - p.velocity_decay;
        for node in self.nodes.iter_mut() {
            node.vel *= keep;
            node.pos += node.vel;
        }

        // centering is positional, applied after integration
        let mean = self.nodes.iter().map(|n| n.pos).sum::<Vec3>() / n as f32;
        let shift = mean * p.center_strength;
        for node in self.nodes.iter_mut() {
            node.pos -= shift;
            node.stepped = true;
            if let Some(pin) = node.pinned {
                node.pos = pin;
                node.vel = Vec3::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::adapter::build_render_graph;
    use riftgraph_core::{AnalysisResult, GraphLink, GraphNode, GraphPayload};

    fn graph(ids: &[&str], links: &[(&str, &str)]) -> RenderGraph {
        let result = AnalysisResult {
            graph: GraphPayload {
                nodes: ids
                    .iter()
                    .map(|id| GraphNode {
                        id: NodeId::from(*id),
                        suspicious: false,
                        score: 0.0,
                        in_degree: 0,
                        out_degree: 0,
                        centrality_score: 0.0,
                    })
                    .collect(),
                links: links
                    .iter()
                    .map(|(s, t)| GraphLink {
                        source: NodeId::from(*s),
                        target: NodeId::from(*t),
                        amount: 1.0,
                        timestamp: Default::default(),
                        is_ring: false,
                    })
                    .collect(),
            },
            ..AnalysisResult::default()
        };
        build_render_graph(&result, None)
    }

    fn settle(sim: &mut ForceSim, ticks: u32) {
        sim.queue_warmup(ticks);
        while sim.is_warming_up() {
            sim.step_within(Duration::MAX);
        }
    }

    #[test]
    fn positions_appear_only_after_a_tick() {
        let mut sim = ForceSim::default();
        sim.load(&graph(&["A", "B"], &[("A", "B")]), false);
        assert!(sim.position("A").is_none());
        assert!(sim.step());
        assert!(sim.position("A").is_some());
        assert!(sim.position("nope").is_none());
    }

    #[test]
    fn simulation_stays_finite_and_centred() {
        let mut sim = ForceSim::default();
        sim.load(
            &graph(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "A"), ("D", "D")]),
            false,
        );
        settle(&mut sim, 80);
        let pts: Vec<Vec3> = sim.positions().filter_map(|(_, p)| p).collect();
        assert_eq!(pts.len(), 4);
        assert!(pts.iter().all(|p| p.is_finite()));
        let mean = pts.iter().copied().sum::<Vec3>() / 4.0;
        assert!(mean.length() < 1.0, "mean drifted to {mean:?}");
    }

    #[test]
    fn linked_pair_settles_near_link_distance() {
        let mut sim = ForceSim::new(ForceParams::default(), 10_000);
        sim.load(&graph(&["A", "B"], &[("A", "B")]), false);
        settle(&mut sim, 300);
        let a = sim.position("A").expect("a");
        let b = sim.position("B").expect("b");
        let d = a.distance(b);
        assert!(d > 15.0 && d < 45.0, "distance {d}");
    }

    #[test]
    fn cooldown_stops_stepping_and_reheat_restarts() {
        let mut sim = ForceSim::new(ForceParams::default(), 3);
        sim.load(&graph(&["A", "B"], &[("A", "B")]), false);
        assert!(sim.step());
        assert!(sim.step());
        assert!(sim.step());
        assert!(!sim.step());
        sim.reheat();
        assert!(sim.step());
    }

    #[test]
    fn reload_keeps_positions_by_id() {
        let mut sim = ForceSim::default();
        let g = graph(&["A", "B"], &[("A", "B")]);
        sim.load(&g, false);
        settle(&mut sim, 5);
        let before = sim.position("B").expect("b");

        sim.load(&graph(&["B", "A", "C"], &[("A", "B")]), true);
        assert_eq!(sim.position("B"), Some(before));
        assert!(sim.position("C").is_none());

        sim.load(&g, false);
        assert!(sim.position("B").is_none());
    }

    #[test]
    fn warmup_is_spread_over_frames_and_spares_the_cooldown() {
        let mut sim = ForceSim::new(ForceParams::default(), 2);
        sim.load(&graph(&["A", "B"], &[("A", "B")]), false);
        sim.queue_warmup(3);
        // A zero budget still makes progress, one tick per frame.
        for _ in 0..3 {
            assert!(sim.is_warming_up());
            assert!(sim.step_within(Duration::ZERO));
        }
        assert!(!sim.is_warming_up());
        assert!(sim.position("A").is_some());
        // Full cooldown left after warmup.
        assert!(sim.step_within(Duration::ZERO));
        assert!(sim.step_within(Duration::ZERO));
        assert!(!sim.step_within(Duration::ZERO));
    }

    #[test]
    fn large_graph_ticks_stay_finite() {
        let ids: Vec<String> = (0..400).map(|i| format!("N{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let links: Vec<(&str, &str)> = (1..refs.len()).map(|i| (refs[i - 1], refs[i])).collect();
        let mut sim = ForceSim::default();
        sim.load(&graph(&refs, &links), false);
        settle(&mut sim, 20);
        assert!(sim.positions().all(|(_, p)| p.is_some_and(|p| p.is_finite())));
    }

    #[test]
    fn pinned_node_holds_until_released() {
        let mut sim = ForceSim::new(ForceParams::default(), 10_000);
        sim.load(&graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]), false);
        let spot = Vec3::new(80.0, -40.0, 10.0);
        assert!(sim.pin("A", spot));
        assert!(!sim.pin("nope", spot));
        assert_eq!(sim.position("A"), Some(spot));

        for _ in 0..20 {
            sim.step();
        }
        assert_eq!(sim.position("A"), Some(spot));
        assert!(sim.is_pinned("A"));

        assert!(sim.release("A"));
        assert!(!sim.release("A"));
        sim.step();
        assert_ne!(sim.position("A"), Some(spot));
    }
}
