use bevy_egui::egui;
use riftgraph_core::{AnalysisResult, FraudRing};
use std::cmp::Ordering;
use std::time::Duration;

use crate::graph::GraphState;
use crate::util::palette::{self, to_egui, Palette};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    Critical,
    High,
    Medium,
}

impl RiskTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Critical
        } else if score >= 70.0 {
            Self::High
        } else {
            Self::Medium
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
        }
    }

    pub fn color(self, palette: &Palette) -> egui::Color32 {
        match self {
            Self::Critical => to_egui(palette.danger),
            Self::High => to_egui(palette.warning),
            Self::Medium => to_egui(palette::low_suspicion()),
        }
    }
}

pub fn sorted_rings(result: &AnalysisResult) -> Vec<&FraudRing> {
    let mut rings: Vec<&FraudRing> = result.fraud_rings.iter().collect();
    rings.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.ring_id.cmp(&b.ring_id))
    });
    rings
}

pub fn rings_view(ui: &mut egui::Ui, st: &mut GraphState, now: Duration) {
    let Some(result) = st.result.clone() else {
        ui.label("No result available yet.");
        return;
    };
    let rings = sorted_rings(&result);
    ui.heading(format!("Fraud rings ({})", rings.len()));
    if rings.is_empty() {
        ui.label("No rings were detected.");
        return;
    }

    for ring in rings {
        let tier = RiskTier::from_score(ring.risk_score);
        let expanded = st.ui.expanded_ring.as_deref() == Some(ring.ring_id.as_str());
        ui.horizontal(|ui| {
            let marker = if expanded { "▾" } else { "▸" };
            if ui.small_button(marker).clicked() {
                st.ui.expanded_ring = if expanded {
                    None
                } else {
                    Some(ring.ring_id.clone())
                };
            }
            ui.strong(&ring.ring_id);
            ui.colored_label(
                tier.color(&st.palette),
                format!("{:.1} {}", ring.risk_score, tier.name()),
            );
        });
        ui.label(format!(
            "{} · {} members",
            ring.pattern_type,
            ring.member_accounts.len()
        ));

        if expanded {
            ui.indent(("ring", ring.ring_id.as_str()), |ui| {
                ui.horizontal_wrapped(|ui| {
                    for member in &ring.member_accounts {
                        if ui.button(member.as_str()).clicked() {
                            st.request_focus(member.clone(), now);
                        }
                    }
                });
            });
        }
        ui.separator();
    }
}
