use chrono::{DateTime, NaiveDate, NaiveDateTime};
use riftgraph_core::{AnalysisResult, GraphNode, NodeId, Timestamp};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::graph::trace::TracePath;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderLink {
    pub source: NodeId,
    pub target: NodeId,
    pub amount: f64,
    pub timestamp: String,
    pub is_ring: bool,
    /// Epoch millis; `None` when the timestamp could not be parsed.
    pub parsed_ts: Option<i64>,
    pub is_path: bool,
}

/// Renderable node/link collections. Built once per (result, trace) identity
/// and shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct RenderGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<RenderLink>,
    index: HashMap<NodeId, usize>,
}

impl RenderGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn links_touching<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a RenderLink> + 'a {
        self.links
            .iter()
            .filter(move |l| l.source.as_str() == id || l.target.as_str() == id)
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Epoch millis for the timestamp forms analysis exports use. Naive forms are
/// read as UTC. Anything else is `None`, never an error.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().timestamp_millis())
}

/// Epoch millis for a link's timestamp in whatever form it arrived.
pub fn link_millis(ts: &Timestamp) -> Option<i64> {
    match ts {
        Timestamp::Text(s) => parse_timestamp(s),
        Timestamp::Millis(ms) => Some(*ms),
        Timestamp::Missing => None,
    }
}

pub fn build_render_graph(result: &AnalysisResult, trace: Option<&TracePath>) -> RenderGraph {
    let path_edges: HashSet<(&str, &str)> = trace
        .map(|t| t.edges().map(|(a, b)| (a.as_str(), b.as_str())).collect())
        .unwrap_or_default();

    let nodes = result.graph.nodes.clone();
    let index = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), i))
        .collect();

    let links = result
        .graph
        .links
        .iter()
        .map(|l| RenderLink {
            source: l.source.clone(),
            target: l.target.clone(),
            amount: l.amount,
            timestamp: l.timestamp.to_string(),
            is_ring: l.is_ring,
            parsed_ts: link_millis(&l.timestamp),
            is_path: path_edges.contains(&(l.source.as_str(), l.target.as_str())),
        })
        .collect();

    RenderGraph {
        nodes,
        links,
        index,
    }
}

type CacheKey = (Arc<AnalysisResult>, Option<Arc<TracePath>>);

/// Memoizes `build_render_graph` on the identity of its two inputs. Anything
/// else (playhead, theme, selection) must not reach this cache.
#[derive(Default)]
pub struct GraphDataCache {
    key: Option<CacheKey>,
    value: Option<Arc<RenderGraph>>,
    pub rebuilds: u64,
}

impl GraphDataCache {
    pub fn get(
        &mut self,
        result: &Arc<AnalysisResult>,
        trace: Option<&Arc<TracePath>>,
    ) -> Arc<RenderGraph> {
        if let (Some((cached_result, cached_trace)), Some(value)) = (&self.key, &self.value) {
            let same_trace = match (cached_trace, trace) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            };
            if same_trace && Arc::ptr_eq(cached_result, result) {
                return Arc::clone(value);
            }
        }

        let graph = Arc::new(build_render_graph(result, trace.map(Arc::as_ref)));
        self.key = Some((Arc::clone(result), trace.cloned()));
        self.value = Some(Arc::clone(&graph));
        self.rebuilds += 1;
        tracing::debug!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            traced = trace.is_some(),
            "render graph rebuilt"
        );
        graph
    }
}
