use bevy_egui::egui;
use riftgraph_core::{AnalysisResult, SuspiciousAccount};
use std::cmp::Ordering;
use std::time::Duration;

use crate::graph::encode::{CRITICAL_SCORE, ELEVATED_SCORE};
use crate::graph::GraphState;
use crate::util::palette::{self, to_egui, Palette};

const MAX_TRANSACTIONS: usize = 25;

/// Suspicious accounts, highest score first; equal scores keep id order.
pub fn sorted_accounts(result: &AnalysisResult) -> Vec<&SuspiciousAccount> {
    let mut accounts: Vec<&SuspiciousAccount> = result.suspicious_accounts.iter().collect();
    accounts.sort_by(|a, b| {
        b.suspicion_score
            .partial_cmp(&a.suspicion_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });
    accounts
}

fn score_color(score: f64, palette: &Palette) -> egui::Color32 {
    if score >= CRITICAL_SCORE {
        to_egui(palette.danger)
    } else if score >= ELEVATED_SCORE {
        to_egui(palette.warning)
    } else {
        to_egui(palette::low_suspicion())
    }
}

pub fn accounts_view(ui: &mut egui::Ui, st: &mut GraphState, now: Duration) {
    let Some(result) = st.result.clone() else {
        ui.label("No result available yet.");
        return;
    };
    let accounts = sorted_accounts(&result);
    ui.heading(format!("Suspicious accounts ({})", accounts.len()));
    if accounts.is_empty() {
        ui.label("No accounts were flagged.");
        return;
    }

    for account in accounts {
        let id = &account.account_id;
        let expanded = st.ui.expanded_account.as_ref() == Some(id);
        ui.horizontal(|ui| {
            let marker = if expanded { "▾" } else { "▸" };
            if ui.small_button(marker).clicked() {
                st.ui.expanded_account = if expanded { None } else { Some(id.clone()) };
            }
            if ui.link(id.as_str()).clicked() {
                st.request_focus(id.clone(), now);
            }
            ui.colored_label(
                score_color(account.suspicion_score, &st.palette),
                format!("{:.1}", account.suspicion_score),
            );
        });

        if !expanded {
            continue;
        }
        ui.indent(("account", id.as_str()), |ui| {
            if ui.small_button("Focus in graph").clicked() {
                st.request_focus(id.clone(), now);
            }
            if let Some(ring) = account.ring_id.as_deref() {
                ui.label(format!("Ring: {ring}"));
            }
            if !account.detected_patterns.is_empty() {
                ui.label(format!("Patterns: {}", account.detected_patterns.join(", ")));
            }
            if let Some(c) = account.centrality.as_ref() {
                ui.label(format!(
                    "Centrality: degree {:.3}, betweenness {:.3}",
                    c.degree, c.betweenness
                ));
            }
            let render = st.render.clone();
            let mut shown = 0;
            for link in render.links_touching(id.as_str()).take(MAX_TRANSACTIONS) {
                let (dir, other) = if link.source == *id {
                    ("→", &link.target)
                } else {
                    ("←", &link.source)
                };
                ui.monospace(format!(
                    "{dir} {other}  {:.2}  {}",
                    link.amount, link.timestamp
                ));
                shown += 1;
            }
            if shown == 0 {
                ui.label("No transactions in the graph.");
            }
        });
    }
}
