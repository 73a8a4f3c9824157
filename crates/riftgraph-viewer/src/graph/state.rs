use bevy::prelude::Resource;
use riftgraph_core::{AnalysisResult, GraphLink, NodeId, SuspiciousAccount};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::graph::adapter::{GraphDataCache, RenderGraph, RenderLink};
use crate::graph::encode::{self, EncodeContext, NodeVisual};
use crate::graph::scene::{ForceScene, SceneCapabilities};
use crate::graph::selection::{ActiveView, SelectionController};
use crate::graph::timeline::{TemporalFilter, TimelineBounds};
use crate::graph::trace::{self, TracePath};
use crate::net::{Incoming, IncomingKind};
use crate::util::config::{ThemeName, ViewerConfig};
use crate::util::palette::Palette;

pub const NO_PATH_NOTICE: &str = "No path found (directed).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Offline,
    Connected(String),
    Disconnected(String),
}

#[derive(Default)]
pub struct UiState {
    pub trace_source: String,
    pub trace_target: String,
    pub trace_notice: Option<String>,

    pub hovered: Option<NodeId>,
    pub expanded_account: Option<NodeId>,
    pub expanded_ring: Option<String>,

    pub show_labels: bool,
    pub show_particles: bool,
    pub show_arrows: bool,
    pub show_hud: bool,
    pub theme: ThemeName,

    /// Width of the egui side panel, in logical pixels. The 3D viewport
    /// takes the rest of the window.
    pub sidebar_width: f32,
    pub last_error: Option<String>,
}

pub struct PerfState {
    pub fps: f32,
    pub visible_links: usize,
    pub total_links: usize,
    pub frame_times: VecDeque<f32>,
}

impl Default for PerfState {
    fn default() -> Self {
        Self {
            fps: 0.0,
            visible_links: 0,
            total_links: 0,
            frame_times: VecDeque::with_capacity(64),
        }
    }
}

impl PerfState {
    pub fn record_frame(&mut self, dt: f32) {
        if self.frame_times.len() == 60 {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);
        let total: f32 = self.frame_times.iter().sum();
        self.fps = if total > 0.0 {
            self.frame_times.len() as f32 / total
        } else {
            0.0
        };
    }
}

#[derive(Resource)]
pub struct GraphState {
    pub result: Option<Arc<AnalysisResult>>,
    pub trace: Option<Arc<TracePath>>,
    pub cache: GraphDataCache,
    pub render: Arc<RenderGraph>,
    pub path_nodes: HashSet<NodeId>,

    pub scene: ForceScene,
    pub timeline: TemporalFilter,
    pub selection: SelectionController,

    pub ui: UiState,
    pub perf: PerfState,
    pub palette: Palette,
    pub feed: FeedStatus,
    pub cfg: ViewerConfig,

    pub needs_redraw: AtomicBool,
}

impl Default for GraphState {
    fn default() -> Self {
        Self {
            result: None,
            trace: None,
            cache: GraphDataCache::default(),
            render: Arc::new(RenderGraph::default()),
            path_nodes: HashSet::new(),
            scene: ForceScene::default(),
            timeline: TemporalFilter::default(),
            selection: SelectionController::default(),
            ui: UiState {
                show_labels: true,
                show_particles: true,
                show_arrows: true,
                show_hud: true,
                sidebar_width: 340.0,
                ..UiState::default()
            },
            perf: PerfState::default(),
            palette: Palette::dark(),
            feed: FeedStatus::Offline,
            cfg: ViewerConfig::default(),
            needs_redraw: AtomicBool::new(true),
        }
    }
}

impl GraphState {
    pub fn apply_viewer_config(&mut self, cfg: &ViewerConfig) {
        self.ui.show_labels = cfg.show_labels;
        self.ui.show_particles = cfg.show_particles;
        self.ui.show_arrows = cfg.show_arrows;
        self.ui.theme = cfg.theme;
        self.palette = Palette::for_theme(cfg.theme);

        self.selection.settle = cfg.focus_settle();
        self.selection.camera_distance = cfg.camera_distance;
        self.selection.flight = cfg.camera_flight();

        self.scene.warmup_ticks = cfg.warmup_ticks;
        self.scene.sim.cooldown_ticks = cfg.cooldown_ticks;
        self.cfg = cfg.clone();
        self.needs_redraw.store(true, Ordering::Relaxed);
    }

    pub fn apply(&mut self, inc: Incoming) {
        match inc.kind {
            IncomingKind::Connected => {
                tracing::info!(source = %inc.source, "feed connected");
                self.feed = FeedStatus::Connected(inc.source);
            }
            IncomingKind::Disconnected => {
                tracing::info!(source = %inc.source, "feed disconnected");
                self.feed = FeedStatus::Disconnected(inc.source);
            }
            IncomingKind::Hello(version) => {
                tracing::debug!(source = %inc.source, %version, "feed hello");
            }
            IncomingKind::Result(result) => {
                self.ui.last_error = None;
                self.load_result(*result);
            }
            IncomingKind::Error(detail) => {
                tracing::warn!(source = %inc.source, %detail, "feed error");
                self.ui.last_error = Some(detail);
            }
        }
    }

    /// Replaces the current result wholesale. Selection, pending focus,
    /// trace, simulation positions and the playhead all start over.
    pub fn load_result(&mut self, result: AnalysisResult) {
        let result = Arc::new(result);
        self.result = Some(Arc::clone(&result));
        self.trace = None;
        self.ui.trace_notice = None;
        self.ui.hovered = None;
        self.ui.expanded_account = None;
        self.ui.expanded_ring = None;
        self.selection.reset();
        self.refresh_render();

        self.scene.clear();
        self.scene.bind(&self.render, false);
        self.scene.relight();

        self.timeline = TemporalFilter::new(TimelineBounds::from_links(&self.render.links));
        self.perf.total_links = self.render.links.len();

        tracing::info!(
            nodes = self.render.nodes.len(),
            links = self.render.links.len(),
            rings = result.fraud_rings.len(),
            "analysis result loaded"
        );
        self.needs_redraw.store(true, Ordering::Relaxed);
    }

    fn refresh_render(&mut self) {
        let Some(result) = self.result.as_ref() else {
            self.render = Arc::new(RenderGraph::default());
            self.path_nodes.clear();
            return;
        };
        self.render = self.cache.get(result, self.trace.as_ref());
        self.path_nodes = self
            .trace
            .as_ref()
            .map(|t| t.node_set())
            .unwrap_or_default();
    }

    /// Runs a directed trace between the two ids typed into the tracer.
    pub fn run_trace(&mut self, source: &str, target: &str) -> Option<Arc<TracePath>> {
        let (source, target) = (source.trim(), target.trim());
        if source.is_empty() || target.is_empty() {
            return None;
        }
        let links: &[GraphLink] = match self.result.as_ref() {
            Some(r) => &r.graph.links,
            None => return None,
        };

        let found = trace::trace(source, target, links).map(Arc::new);
        match found.as_ref() {
            Some(path) => {
                tracing::info!(%source, %target, hops = path.hops(), "trace found");
                self.ui.trace_notice = None;
            }
            None => {
                tracing::info!(%source, %target, "no directed path");
                self.ui.trace_notice = Some(NO_PATH_NOTICE.to_string());
            }
        }
        self.trace = found.clone();
        self.rebind_after_trace();
        found
    }

    pub fn clear_trace(&mut self) {
        if self.trace.take().is_none() && self.ui.trace_notice.is_none() {
            return;
        }
        self.ui.trace_notice = None;
        self.rebind_after_trace();
    }

    fn rebind_after_trace(&mut self) {
        self.refresh_render();
        self.scene.bind(&self.render, true);
        self.needs_redraw.store(true, Ordering::Relaxed);
    }

    /// Swaps the palette. The render graph is left alone.
    pub fn set_theme(&mut self, theme: ThemeName) {
        self.ui.theme = theme;
        self.palette = Palette::for_theme(theme);
        self.needs_redraw.store(true, Ordering::Relaxed);
    }

    pub fn click_node(&mut self, id: &NodeId) {
        self.selection.click(id, &mut self.scene);
        self.needs_redraw.store(true, Ordering::Relaxed);
    }

    pub fn clear_selection(&mut self) {
        if self.selection.selected().is_some() {
            self.selection.clear();
            self.needs_redraw.store(true, Ordering::Relaxed);
        }
    }

    /// Inbound call from the Accounts and Rings views.
    pub fn request_focus(&mut self, id: NodeId, now: Duration) {
        self.selection.request_focus(id, now);
    }

    pub fn set_view(&mut self, view: ActiveView) {
        self.selection.set_view(view);
    }

    /// Space key. Playback only responds while the graph view is showing.
    pub fn toggle_playback(&mut self, now: Duration) -> bool {
        if self.selection.active_view != ActiveView::Graph {
            return false;
        }
        self.timeline.toggle_play(now);
        true
    }

    pub fn reheat(&mut self) {
        self.scene.reheat_simulation();
    }

    /// Per-frame bookkeeping driven by the monotonic app clock.
    pub fn tick(&mut self, now: Duration) {
        self.timeline.advance(now);
        if self.selection.poll(now, &mut self.scene).is_some() {
            self.needs_redraw.store(true, Ordering::Relaxed);
        }
    }

    pub fn visible_links(&self) -> impl Iterator<Item = &RenderLink> {
        self.render
            .links
            .iter()
            .filter(|l| self.timeline.is_visible(l))
    }

    pub fn encode_node(&self, id: &str) -> Option<NodeVisual> {
        let node = self.render.node(id)?;
        let ctx = EncodeContext {
            selected: self.selection.selected(),
            path_nodes: &self.path_nodes,
            palette: &self.palette,
        };
        Some(encode::encode(node, &ctx))
    }

    pub fn selected_account(&self) -> Option<&SuspiciousAccount> {
        let id = self.selection.selected()?;
        self.result.as_ref()?.account(id.as_str())
    }
}
