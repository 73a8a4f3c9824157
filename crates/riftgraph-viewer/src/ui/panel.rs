use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use std::sync::atomic::Ordering;

use crate::graph::encode::Tone;
use crate::graph::state::FeedStatus;
use crate::graph::{ActiveView, GraphState};
use crate::ui::{accounts, rings, PANEL_W};
use crate::util::config;
use crate::util::ids::hop_summary;
use crate::util::palette::{self, to_egui};

const MAX_DETAIL_LINKS: usize = 12;

pub fn ui_panel(time: Res<Time>, mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    let now = time.elapsed();
    let panel = egui::SidePanel::left("left")
        .default_width(PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("RiftGraph");
            feed_status(ui, &st);
            if let Some(err) = st.ui.last_error.as_deref() {
                ui.colored_label(to_egui(st.palette.danger), err);
            }
            ui.separator();

            ui.horizontal(|ui| {
                let active = st.selection.active_view;
                for view in ActiveView::ALL {
                    if ui.selectable_label(active == view, view.title()).clicked() {
                        st.set_view(view);
                    }
                }
            });
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| match st.selection.active_view {
                ActiveView::Graph => graph_view(ui, &mut st),
                ActiveView::Accounts => accounts::accounts_view(ui, &mut st, now),
                ActiveView::Rings => rings::rings_view(ui, &mut st, now),
            });
        });
    st.ui.sidebar_width = panel.response.rect.width();
}

fn feed_status(ui: &mut egui::Ui, st: &GraphState) {
    match &st.feed {
        FeedStatus::Offline => ui.label("Feed: offline"),
        FeedStatus::Connected(src) => {
            ui.colored_label(to_egui(st.palette.success), format!("Feed: {src}"))
        }
        FeedStatus::Disconnected(src) => ui.colored_label(
            to_egui(st.palette.warning),
            format!("Feed lost: {src}"),
        ),
    };
}

fn graph_view(ui: &mut egui::Ui, st: &mut GraphState) {
    match st.result.as_ref() {
        Some(result) => {
            let s = &result.summary;
            ui.label(format!("Accounts analyzed: {}", s.total_accounts_analyzed));
            ui.label(format!("Flagged: {}", s.suspicious_accounts_flagged));
            ui.label(format!("Rings: {}", s.fraud_rings_detected));
            ui.label(format!("Processing: {:.2}s", s.processing_time_seconds));
            ui.label(format!(
                "Graph: {} nodes / {} links",
                st.render.nodes.len(),
                st.render.links.len()
            ));
        }
        None => {
            ui.label("No result available yet.");
        }
    }

    ui.add_space(8.0);
    ui.separator();
    tracer(ui, st);

    ui.add_space(8.0);
    ui.separator();
    if let Some(id) = st.selection.selected().cloned() {
        selection_details(ui, st, id.as_str());
        if ui.button("Clear selection").clicked() {
            st.clear_selection();
        }
    } else {
        ui.label("Selection: (none) — click a node");
    }

    ui.add_space(8.0);
    ui.separator();
    display_options(ui, st);

    ui.add_space(8.0);
    ui.separator();
    legend(ui, st);
}

fn tracer(ui: &mut egui::Ui, st: &mut GraphState) {
    ui.heading("Trace money flow");
    egui::Grid::new("tracer").num_columns(2).show(ui, |ui| {
        ui.label("From");
        ui.text_edit_singleline(&mut st.ui.trace_source);
        ui.end_row();
        ui.label("To");
        ui.text_edit_singleline(&mut st.ui.trace_target);
        ui.end_row();
    });
    ui.horizontal(|ui| {
        if ui.button("Trace").clicked() {
            let source = st.ui.trace_source.clone();
            let target = st.ui.trace_target.clone();
            st.run_trace(&source, &target);
        }
        if ui.button("Clear").clicked() {
            st.clear_trace();
        }
    });

    if let Some(notice) = st.ui.trace_notice.as_deref() {
        ui.colored_label(to_egui(st.palette.warning), notice);
    } else if let Some(path) = st.trace.as_ref() {
        ui.colored_label(to_egui(palette::path()), hop_summary(path.ids().len()));
        ui.label(egui::RichText::new(path.display_chain()).monospace());
    }
}

fn selection_details(ui: &mut egui::Ui, st: &GraphState, id: &str) {
    ui.heading(id);
    if let Some(node) = st.render.node(id) {
        ui.label(format!(
            "Degree: {} in / {} out",
            node.in_degree, node.out_degree
        ));
        if node.suspicious {
            ui.colored_label(
                to_egui(st.palette.danger),
                format!("Suspicion score: {:.1}", node.score),
            );
        }
    }
    if let Some(account) = st.selected_account() {
        if let Some(ring) = account.ring_id.as_deref() {
            ui.label(format!("Ring: {ring}"));
        }
        if let Some(c) = account.centrality.as_ref() {
            ui.label(format!(
                "Centrality: degree {:.3}, betweenness {:.3}",
                c.degree, c.betweenness
            ));
        }
        for pattern in &account.detected_patterns {
            ui.label(format!("• {pattern}"));
        }
    }

    let links: Vec<_> = st.render.links_touching(id).collect();
    if links.is_empty() {
        return;
    }
    ui.label(format!("Transactions ({})", links.len()));
    for link in links.iter().take(MAX_DETAIL_LINKS) {
        let line = if link.source.as_str() == id {
            format!("→ {}  {:.2}", link.target, link.amount)
        } else {
            format!("← {}  {:.2}", link.source, link.amount)
        };
        if st.timeline.is_visible(link) {
            ui.monospace(line);
        } else {
            ui.weak(line);
        }
    }
    if links.len() > MAX_DETAIL_LINKS {
        ui.weak(format!("… {} more", links.len() - MAX_DETAIL_LINKS));
    }
}

fn display_options(ui: &mut egui::Ui, st: &mut GraphState) {
    ui.heading("Display");
    let before = (st.ui.show_labels, st.ui.show_particles, st.ui.show_arrows);
    ui.horizontal(|ui| {
        ui.checkbox(&mut st.ui.show_labels, "Labels");
        ui.checkbox(&mut st.ui.show_particles, "Particles");
        ui.checkbox(&mut st.ui.show_arrows, "Arrows");
    });
    ui.checkbox(&mut st.ui.show_hud, "HUD");
    if before != (st.ui.show_labels, st.ui.show_particles, st.ui.show_arrows) {
        st.cfg.show_labels = st.ui.show_labels;
        st.cfg.show_particles = st.ui.show_particles;
        st.cfg.show_arrows = st.ui.show_arrows;
        if let Err(err) = config::save(&st.cfg) {
            tracing::warn!(error = %format!("{err:#}"), "failed to save viewer config");
        }
        st.needs_redraw.store(true, Ordering::Relaxed);
    }

    ui.horizontal(|ui| {
        let next = st.ui.theme.toggled();
        if ui.button(format!("Theme: {}", st.ui.theme.as_str())).clicked() {
            st.set_theme(next);
        }
        if ui.button("Reheat layout").clicked() {
            st.reheat();
        }
    });
}

fn legend(ui: &mut egui::Ui, st: &GraphState) {
    ui.heading("Legend");
    for tone in Tone::ALL {
        swatch(ui, to_egui(tone.color(&st.palette)), tone.legend());
    }
    swatch(ui, to_egui(palette::path()), "Traced path");
    swatch(ui, to_egui(palette::ring_edge()), "Ring transaction");
}

fn swatch(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 5.0, color);
        ui.label(text);
    });
}

