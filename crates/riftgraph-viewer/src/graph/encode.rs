//! Deterministic mapping from node analytics and interaction state to render
//! attributes. Nothing here touches the ECS, so the thresholds are unit-testable.

use bevy::prelude::Color;
use riftgraph_core::{GraphNode, NodeId};
use std::collections::HashSet;

use crate::graph::adapter::RenderLink;
use crate::util::ids::short_label;
use crate::util::palette::{self, Palette};

pub const CRITICAL_SCORE: f64 = 80.0;
pub const ELEVATED_SCORE: f64 = 50.0;
pub const BRIDGE_CENTRALITY: f64 = 0.05;
pub const LARGE_DEGREE: u32 = 20;
pub const HUB_DEGREE: u32 = 10;
pub const MEDIUM_DEGREE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Danger,
    Warning,
    LowSuspicion,
    Bridge,
    Hub,
    Default,
}

impl Tone {
    pub fn color(self, palette: &Palette) -> Color {
        match self {
            Self::Danger => palette.danger,
            Self::Warning => palette.warning,
            Self::LowSuspicion => palette::low_suspicion(),
            Self::Bridge => palette::bridge(),
            Self::Hub => palette::hub(),
            Self::Default => palette::default_node(),
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            Self::Danger => "Critical (score ≥ 80)",
            Self::Warning => "Elevated (score ≥ 50)",
            Self::LowSuspicion => "Low suspicion",
            Self::Bridge => "Centrality bridge",
            Self::Hub => "High-volume hub",
            Self::Default => "Normal",
        }
    }

    pub const ALL: [Tone; 6] = [
        Self::Danger,
        Self::Warning,
        Self::LowSuspicion,
        Self::Bridge,
        Self::Hub,
        Self::Default,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub radius: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    Selection,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightRing {
    pub kind: RingKind,
    pub radius: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLabel {
    pub text: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub radius: f32,
    pub tone: Tone,
    pub color: Color,
    pub glow: Option<Glow>,
    pub ring: Option<HighlightRing>,
    pub label: Option<NodeLabel>,
}

/// Interaction state the encoder reads. Borrowed per frame.
pub struct EncodeContext<'a> {
    pub selected: Option<&'a NodeId>,
    pub path_nodes: &'a HashSet<NodeId>,
    pub palette: &'a Palette,
}

pub fn radius_for(node: &GraphNode) -> f32 {
    let degree = node.degree();
    if node.suspicious && node.score >= CRITICAL_SCORE {
        5.5
    } else if node.suspicious {
        4.5
    } else if degree > LARGE_DEGREE {
        4.0
    } else if degree > MEDIUM_DEGREE {
        3.0
    } else {
        2.5
    }
}

pub fn tone_for(node: &GraphNode) -> Tone {
    if node.suspicious {
        if node.score >= CRITICAL_SCORE {
            Tone::Danger
        } else if node.score >= ELEVATED_SCORE {
            Tone::Warning
        } else {
            Tone::LowSuspicion
        }
    } else if node.centrality_score > BRIDGE_CENTRALITY {
        Tone::Bridge
    } else if node.degree() > HUB_DEGREE {
        Tone::Hub
    } else {
        Tone::Default
    }
}

pub fn encode(node: &GraphNode, ctx: &EncodeContext<'_>) -> NodeVisual {
    let radius = radius_for(node);
    let tone = tone_for(node);
    let color = tone.color(ctx.palette);
    let selected = ctx.selected == Some(&node.id);
    let on_path = ctx.path_nodes.contains(&node.id);

    let glow = if selected {
        Some(Glow {
            radius: radius * 1.6,
            color: ctx.palette.accent,
        })
    } else if node.suspicious {
        Some(Glow {
            radius: radius * 1.3,
            color,
        })
    } else {
        None
    };

    let ring = if selected {
        Some(HighlightRing {
            kind: RingKind::Selection,
            radius: radius * 1.8,
            color: ctx.palette.accent,
        })
    } else if on_path {
        Some(HighlightRing {
            kind: RingKind::Path,
            radius: radius * 1.6,
            color: palette::path(),
        })
    } else {
        None
    };

    let label = (node.suspicious || selected || on_path || node.degree() > LARGE_DEGREE).then(|| {
        NodeLabel {
            text: short_label(node.id.as_str()),
            color: if selected {
                ctx.palette.accent
            } else {
                ctx.palette.label
            },
        }
    });

    NodeVisual {
        radius,
        tone,
        color,
        glow,
        ring,
        label,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkVisual {
    pub color: Color,
    pub width: f32,
    pub particles: u32,
    pub particle_speed: f32,
}

pub fn encode_link(link: &RenderLink, palette: &Palette) -> LinkVisual {
    if link.is_path {
        LinkVisual {
            color: palette::path(),
            width: 1.5,
            particles: 4,
            particle_speed: 0.012,
        }
    } else if link.is_ring {
        LinkVisual {
            color: palette::ring_edge(),
            width: 0.8,
            particles: 2,
            particle_speed: 0.006,
        }
    } else {
        LinkVisual {
            color: palette.edge,
            width: 0.2,
            particles: 0,
            particle_speed: 0.006,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, suspicious: bool, score: f64, degree: (u32, u32), centrality: f64) -> GraphNode {
        GraphNode {
            id: NodeId::from(id),
            suspicious,
            score,
            in_degree: degree.0,
            out_degree: degree.1,
            centrality_score: centrality,
        }
    }

    fn ctx<'a>(
        selected: Option<&'a NodeId>,
        path: &'a HashSet<NodeId>,
        palette: &'a Palette,
    ) -> EncodeContext<'a> {
        EncodeContext {
            selected,
            path_nodes: path,
            palette,
        }
    }

    #[test]
    fn critical_suspicious_node_is_large_and_danger() {
        let palette = Palette::dark();
        let path = HashSet::new();
        let v = encode(&node("A", true, 85.0, (1, 1), 0.0), &ctx(None, &path, &palette));
        assert_eq!(v.radius, 5.5);
        assert_eq!(v.tone, Tone::Danger);
        assert_eq!(v.color, palette.danger);
        assert_eq!(v.glow.map(|g| g.radius), Some(5.5 * 1.3));
        assert!(v.label.is_some());
    }

    #[test]
    fn bridge_colour_for_central_quiet_node() {
        let palette = Palette::dark();
        let path = HashSet::new();
        let v = encode(&node("B", false, 0.0, (1, 2), 0.2), &ctx(None, &path, &palette));
        assert_eq!(v.tone, Tone::Bridge);
        assert_eq!(v.color, palette::bridge());
        assert_eq!(v.radius, 2.5);
        assert!(v.glow.is_none());
        assert!(v.label.is_none());
    }

    #[test]
    fn radius_and_tone_tiers_are_ordered() {
        assert_eq!(radius_for(&node("a", true, 10.0, (0, 0), 0.0)), 4.5);
        assert_eq!(radius_for(&node("a", false, 0.0, (11, 10), 0.0)), 4.0);
        assert_eq!(radius_for(&node("a", false, 0.0, (3, 3), 0.0)), 3.0);
        assert_eq!(radius_for(&node("a", false, 0.0, (2, 3), 0.0)), 2.5);

        assert_eq!(tone_for(&node("a", true, 50.0, (0, 0), 0.9)), Tone::Warning);
        assert_eq!(tone_for(&node("a", true, 49.9, (0, 0), 0.9)), Tone::LowSuspicion);
        assert_eq!(tone_for(&node("a", false, 0.0, (6, 5), 0.05)), Tone::Hub);
        assert_eq!(tone_for(&node("a", false, 0.0, (5, 5), 0.0)), Tone::Default);
    }

    #[test]
    fn danger_colour_follows_theme() {
        let light = Palette::light();
        let path = HashSet::new();
        let v = encode(&node("A", true, 99.0, (0, 0), 0.0), &ctx(None, &path, &light));
        assert_eq!(v.color, light.danger);
    }

    #[test]
    fn selection_ring_excludes_path_ring() {
        let palette = Palette::dark();
        let id = NodeId::from("ACCOUNT-0001234");
        let path: HashSet<NodeId> = [id.clone()].into_iter().collect();
        let n = node("ACCOUNT-0001234", false, 0.0, (0, 1), 0.0);

        let selected = encode(&n, &ctx(Some(&id), &path, &palette));
        let ring = selected.ring.expect("ring");
        assert_eq!(ring.kind, RingKind::Selection);
        assert_eq!(selected.glow.map(|g| g.radius), Some(2.5 * 1.6));
        let label = selected.label.expect("label");
        assert_eq!(label.text, "ACCOUNT-00..");
        assert_eq!(label.color, palette.accent);

        let traced = encode(&n, &ctx(None, &path, &palette));
        assert_eq!(traced.ring.map(|r| r.kind), Some(RingKind::Path));
        assert!(traced.glow.is_none());
        assert_eq!(traced.label.map(|l| l.color), Some(palette.label));
    }

    #[test]
    fn busy_nodes_get_unabridged_short_labels() {
        let palette = Palette::dark();
        let path = HashSet::new();
        let v = encode(&node("AC-01", false, 0.0, (15, 6), 0.0), &ctx(None, &path, &palette));
        assert_eq!(v.label.map(|l| l.text), Some("AC-01".to_string()));
    }

    #[test]
    fn link_encoding_prefers_path_over_ring() {
        let palette = Palette::dark();
        let mut l = RenderLink {
            source: NodeId::from("A"),
            target: NodeId::from("B"),
            amount: 1.0,
            timestamp: String::new(),
            is_ring: true,
            parsed_ts: None,
            is_path: true,
        };
        assert_eq!(encode_link(&l, &palette).particles, 4);
        l.is_path = false;
        assert_eq!(encode_link(&l, &palette).color, palette::ring_edge());
        l.is_ring = false;
        assert_eq!(encode_link(&l, &palette).color, palette.edge);
    }
}
