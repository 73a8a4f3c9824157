use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::{ActiveView, GraphState};

pub fn render_tooltip(
    ctx: &egui::Context,
    id: &str,
    pos: egui::Pos2,
    lines: impl IntoIterator<Item = String>,
) {
    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            ui.group(|ui| {
                for line in lines {
                    ui.label(line);
                }
            });
        });
}

pub fn node_tooltip_lines(st: &GraphState, id: &str) -> Vec<String> {
    let Some(node) = st.render.node(id) else {
        return vec![id.to_string()];
    };
    let mut out = vec![node.id.to_string()];
    if node.suspicious {
        out.push(format!("suspicion score: {:.1}", node.score));
    }
    out.push(format!(
        "degree: {} in / {} out",
        node.in_degree, node.out_degree
    ));
    if node.centrality_score > 0.0 {
        out.push(format!("centrality: {:.3}", node.centrality_score));
    }
    if let Some(ring) = st
        .result
        .as_ref()
        .and_then(|r| r.account(id))
        .and_then(|a| a.ring_id.as_deref())
    {
        out.push(format!("ring: {ring}"));
    }
    out
}

pub fn hover_tooltip(mut contexts: EguiContexts, st: Res<GraphState>) {
    if st.selection.active_view != ActiveView::Graph {
        return;
    }
    let Some(id) = st.ui.hovered.as_ref() else {
        return;
    };
    let ctx = contexts.ctx_mut();
    let pos = ctx.input(|i| i.pointer.hover_pos().unwrap_or(egui::pos2(0.0, 0.0)))
        + egui::vec2(14.0, 14.0);
    render_tooltip(ctx, "node_tooltip", pos, node_tooltip_lines(&st, id.as_str()));
}
