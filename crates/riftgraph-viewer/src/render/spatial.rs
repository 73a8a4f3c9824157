use bevy::math::primitives::InfinitePlane3d;
use bevy::math::{Dir3, Ray3d};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use riftgraph_core::NodeId;
use std::collections::HashMap;
use std::sync::atomic::Ordering;

use crate::app::events::Picked;
use crate::graph::encode::{encode_link, LinkVisual, NodeVisual};
use crate::graph::scene::SceneCapabilities;
use crate::graph::{ActiveView, GraphState};
use crate::render::boundary::SceneBoundary;
use crate::util::palette::to_egui;

const PICK_RADIUS_PX: f32 = 14.0;
const HOVER_RADIUS_PX: f32 = 18.0;
const DRAG_THRESHOLD_PX: f32 = 4.0;

/// Left-button gesture that started on a node. Moving past the threshold
/// turns it into a drag; releasing without moving is a click.
#[derive(Resource, Debug, Default)]
pub struct NodeGesture {
    grabbed: Option<NodeId>,
    press: Vec2,
    dragging: bool,
}

#[derive(Component)]
pub struct NodeMarker {
    pub id: NodeId,
}

#[derive(Debug, Clone)]
pub struct PlannedNode {
    pub id: NodeId,
    pub visual: NodeVisual,
    pub position: Option<Vec3>,
}

#[derive(Debug, Clone)]
pub struct PlannedLink {
    pub from: Vec3,
    pub to: Vec3,
    pub visual: LinkVisual,
    /// Radius of the target node, so arrow heads stop at its surface.
    pub target_radius: f32,
}

/// Everything the scene draws this frame. Built from `GraphState` alone.
#[derive(Debug, Clone, Default)]
pub struct FramePlan {
    pub nodes: Vec<PlannedNode>,
    pub links: Vec<PlannedLink>,
}

pub fn plan_frame(st: &GraphState) -> FramePlan {
    let mut nodes = Vec::with_capacity(st.render.nodes.len());
    let mut radius: HashMap<&str, f32> = HashMap::with_capacity(st.render.nodes.len());
    for node in &st.render.nodes {
        let Some(visual) = st.encode_node(node.id.as_str()) else {
            continue;
        };
        radius.insert(node.id.as_str(), visual.radius);
        nodes.push(PlannedNode {
            id: node.id.clone(),
            position: st.scene.sim.position(node.id.as_str()),
            visual,
        });
    }

    let links = st
        .visible_links()
        .filter_map(|l| {
            let from = st.scene.sim.position(l.source.as_str())?;
            let to = st.scene.sim.position(l.target.as_str())?;
            Some(PlannedLink {
                from,
                to,
                visual: encode_link(l, &st.palette),
                target_radius: radius.get(l.target.as_str()).copied().unwrap_or(2.5),
            })
        })
        .collect();

    FramePlan { nodes, links }
}

fn nearest_node(
    st: &GraphState,
    camera: &Camera,
    cam_tf: &GlobalTransform,
    cursor: Vec2,
    max_px: f32,
) -> Option<NodeId> {
    let origin = viewport_origin(camera);
    let mut best: Option<(f32, NodeId)> = None;
    for (id, pos) in st.scene.sim.positions() {
        let Some(pos) = pos else {
            continue;
        };
        let Some(screen) = camera.world_to_viewport(cam_tf, pos) else {
            continue;
        };
        let d = (screen + origin).distance(cursor);
        if d < max_px && best.as_ref().map(|(bd, _)| d < *bd).unwrap_or(true) {
            best = Some((d, id.clone()));
        }
    }
    best.map(|(_, id)| id)
}

pub fn hover_detection_spatial(
    windows: Query<&Window>,
    cam_q: Query<(&Camera, &GlobalTransform)>,
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
) {
    if st.selection.active_view != ActiveView::Graph {
        st.ui.hovered = None;
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        st.ui.hovered = None;
        return;
    };
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    if contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    st.ui.hovered = nearest_node(&st, camera, cam_tf, cursor, HOVER_RADIUS_PX);
}

fn viewport_origin(camera: &Camera) -> Vec2 {
    camera
        .logical_viewport_rect()
        .map(|r| r.min)
        .unwrap_or(Vec2::ZERO)
}

/// Where the pointer ray meets the plane through `anchor` facing the camera.
pub fn drag_point(ray: Ray3d, anchor: Vec3, facing: Dir3) -> Option<Vec3> {
    let t = ray.intersect_plane(anchor, InfinitePlane3d { normal: facing })?;
    Some(ray.get_point(t))
}

pub fn drag_nodes(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cam_q: Query<(&Camera, &GlobalTransform)>,
    mut st: ResMut<GraphState>,
    mut gesture: ResMut<NodeGesture>,
) {
    let Some(id) = gesture.grabbed.clone() else {
        return;
    };
    if !buttons.pressed(MouseButton::Left) || st.selection.active_view != ActiveView::Graph {
        if gesture.dragging && st.scene.release_node(id.as_str()) {
            tracing::debug!(node = %id, "node released");
        }
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    if !gesture.dragging {
        if cursor.distance(gesture.press) < DRAG_THRESHOLD_PX {
            return;
        }
        gesture.dragging = true;
    }
    let Some(anchor) = st.scene.node_position(id.as_str()) else {
        return;
    };
    let Some(ray) = camera.viewport_to_world(cam_tf, cursor - viewport_origin(camera)) else {
        return;
    };
    if let Some(pos) = drag_point(ray, anchor, cam_tf.forward()) {
        st.scene.drag_node(id.as_str(), pos);
    }
}

pub fn picking_focus(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cam_q: Query<(&Camera, &GlobalTransform)>,
    mut contexts: EguiContexts,
    st: Res<GraphState>,
    mut gesture: ResMut<NodeGesture>,
    mut out: EventWriter<Picked>,
) {
    if st.selection.active_view != ActiveView::Graph {
        *gesture = NodeGesture::default();
        return;
    }
    if buttons.just_released(MouseButton::Left) {
        let dragged = std::mem::take(&mut gesture.dragging);
        if let Some(id) = gesture.grabbed.take() {
            if !dragged {
                out.send(Picked(id));
            }
        }
        return;
    }
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    if contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    *gesture = NodeGesture {
        grabbed: nearest_node(&st, camera, cam_tf, cursor, PICK_RADIUS_PX),
        press: cursor,
        dragging: false,
    };
}

pub fn apply_picked_focus(mut st: ResMut<GraphState>, mut ev: EventReader<Picked>) {
    for Picked(id) in ev.read() {
        st.click_node(id);
    }
}

fn material_for(color: Color, emissive: bool) -> StandardMaterial {
    let lin = color.to_linear();
    StandardMaterial {
        base_color: color,
        emissive: if emissive { lin * 0.6 } else { LinearRgba::BLACK },
        perceptual_roughness: 0.6,
        ..default()
    }
}

fn halo_material(color: Color, alpha: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: color.with_alpha(alpha),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    }
}

#[allow(clippy::too_many_arguments)]
pub fn draw_spatial(
    mut commands: Commands,
    st: Res<GraphState>,
    mut boundary: ResMut<SceneBoundary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, With<NodeMarker>>,
    mut node_q: Query<(&NodeMarker, &mut Transform, &mut Visibility)>,
    mut gizmos: Gizmos,
    time: Res<Time>,
) {
    let Some(plan) = boundary.guard(|| plan_frame(&st)) else {
        for e in existing.iter() {
            commands.entity(e).despawn_recursive();
        }
        return;
    };
    let graph_view = st.selection.active_view == ActiveView::Graph;

    if st.needs_redraw.swap(false, Ordering::Relaxed) {
        for e in existing.iter() {
            commands.entity(e).despawn_recursive();
        }

        let unit_sphere = meshes.add(Sphere::new(1.0).mesh().uv(24, 16));
        let unit_ring = meshes.add(Torus::new(0.92, 1.0));
        for node in &plan.nodes {
            let v = &node.visual;
            let transform = node
                .position
                .map(Transform::from_translation)
                .unwrap_or_default()
                .with_scale(Vec3::splat(v.radius));

            commands
                .spawn((
                    PbrBundle {
                        mesh: unit_sphere.clone(),
                        material: mats.add(material_for(v.color, v.glow.is_some())),
                        transform,
                        visibility: if node.position.is_some() {
                            Visibility::Inherited
                        } else {
                            Visibility::Hidden
                        },
                        ..default()
                    },
                    NodeMarker {
                        id: node.id.clone(),
                    },
                ))
                .with_children(|parent| {
                    // Children are sized relative to the node's own scale.
                    if let Some(glow) = v.glow {
                        parent.spawn(PbrBundle {
                            mesh: unit_sphere.clone(),
                            material: mats.add(halo_material(glow.color, 0.18)),
                            transform: Transform::from_scale(Vec3::splat(glow.radius / v.radius)),
                            ..default()
                        });
                    }
                    if let Some(ring) = v.ring {
                        parent.spawn(PbrBundle {
                            mesh: unit_ring.clone(),
                            material: mats.add(halo_material(ring.color, 0.85)),
                            transform: Transform::from_rotation(Quat::from_rotation_x(
                                std::f32::consts::FRAC_PI_2,
                            ))
                            .with_scale(Vec3::splat(ring.radius / v.radius)),
                            ..default()
                        });
                    }
                });
        }
    }

    let positions: HashMap<&NodeId, Option<Vec3>> =
        plan.nodes.iter().map(|n| (&n.id, n.position)).collect();
    for (marker, mut tf, mut vis) in node_q.iter_mut() {
        match positions.get(&marker.id).copied().flatten() {
            Some(pos) if graph_view => {
                tf.translation = pos;
                *vis = Visibility::Inherited;
            }
            _ => *vis = Visibility::Hidden,
        }
    }

    if !graph_view {
        return;
    }

    let t = time.elapsed_seconds();
    for link in &plan.links {
        let dir = (link.to - link.from).normalize_or_zero();
        if st.ui.show_arrows && dir != Vec3::ZERO {
            let tip = link.to - dir * link.target_radius;
            gizmos.arrow(link.from, tip, link.visual.color);
        } else {
            gizmos.line(link.from, link.to, link.visual.color);
        }

        if st.ui.show_particles && link.visual.particles > 0 {
            let n = link.visual.particles;
            for k in 0..n {
                // speed is a fraction of the link per frame at 60 fps
                let phase = (t * link.visual.particle_speed * 60.0 + k as f32 / n as f32).fract();
                let at = link.from.lerp(link.to, phase);
                gizmos.sphere(at, Quat::IDENTITY, 0.4 + link.visual.width * 0.3, link.visual.color);
            }
        }
    }
}

pub fn draw_labels(
    mut contexts: EguiContexts,
    st: Res<GraphState>,
    boundary: Res<SceneBoundary>,
    cam_q: Query<(&Camera, &GlobalTransform)>,
) {
    if boundary.is_tripped() || st.selection.active_view != ActiveView::Graph {
        return;
    }
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    let origin = viewport_origin(camera);
    let ctx = contexts.ctx_mut();
    let painter = ctx.layer_painter(egui::LayerId::background());

    if st.ui.show_labels {
        for node in &st.render.nodes {
            let Some(pos) = st.scene.sim.position(node.id.as_str()) else {
                continue;
            };
            let Some(visual) = st.encode_node(node.id.as_str()) else {
                continue;
            };
            let Some(label) = visual.label else {
                continue;
            };
            let anchor = pos + Vec3::Y * (visual.radius + 2.0);
            let Some(screen) = camera.world_to_viewport(cam_tf, anchor) else {
                continue;
            };
            let at = egui::pos2(screen.x + origin.x, screen.y + origin.y);
            let font = egui::FontId::monospace(11.0);
            let galley = painter.layout_no_wrap(label.text, font, to_egui(label.color));
            let rect = egui::Rect::from_center_size(at, galley.size() + egui::vec2(8.0, 4.0));
            painter.rect_filled(rect, 3.0, to_egui(st.palette.pill_bg));
            painter.galley(rect.min + egui::vec2(4.0, 2.0), galley, egui::Color32::WHITE);
        }
    }

    if st.render.is_empty() {
        egui::Area::new(egui::Id::new("empty_graph"))
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(st.ui.sidebar_width * 0.5, 0.0))
            .show(ctx, |ui| {
                ui.colored_label(
                    to_egui(st.palette.muted),
                    "Empty Graph — load an analysis result to visualize",
                );
            });
    }
}
