use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::render::camera::Viewport;
use bevy::window::WindowResized;
use bevy_egui::EguiContexts;

use crate::graph::scene::{CameraPose, LightKind};
use crate::graph::GraphState;

#[derive(Component)]
pub struct SceneCamera;

#[derive(Component)]
pub struct SceneLight;

pub fn setup_scene(mut commands: Commands, mut st: ResMut<GraphState>) {
    let pose = st.scene.camera();
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_translation(pose.position).looking_at(pose.look_at, Vec3::Y),
            ..default()
        },
        SceneCamera,
    ));
    st.scene.mount();
    st.scene.relight();
}

fn pose_transform(pose: CameraPose) -> Option<Transform> {
    if pose.position.distance_squared(pose.look_at) <= f32::EPSILON {
        return None;
    }
    Some(Transform::from_translation(pose.position).looking_at(pose.look_at, Vec3::Y))
}

pub fn animate_camera(
    time: Res<Time>,
    mut st: ResMut<GraphState>,
    mut cam_q: Query<&mut Transform, With<SceneCamera>>,
) {
    let pose = st.scene.advance_camera(time.delta());
    let Ok(mut cam_tf) = cam_q.get_single_mut() else {
        return;
    };
    if let Some(tf) = pose_transform(pose) {
        *cam_tf = tf;
    }
}

/// Orbit with the right mouse button, dolly with the wheel.
pub fn orbit_camera(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
) {
    let drag: Vec2 = motion.read().map(|m| m.delta).sum();
    let scroll: f32 = wheel.read().map(|w| w.y).sum();
    if contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    let orbiting = buttons.pressed(MouseButton::Right) && drag != Vec2::ZERO;
    if !orbiting && scroll == 0.0 {
        return;
    }

    let pose = st.scene.camera();
    let mut offset = pose.position - pose.look_at;
    if orbiting {
        let yaw = Quat::from_rotation_y(-drag.x * 0.005);
        let right = offset.cross(Vec3::Y).normalize_or_zero();
        let pitch = Quat::from_axis_angle(right, drag.y * 0.005);
        let turned = pitch * (yaw * offset);
        // Stop short of the poles so `looking_at` keeps a usable up vector.
        if turned.normalize_or_zero().dot(Vec3::Y).abs() < 0.98 {
            offset = turned;
        } else {
            offset = yaw * offset;
        }
    }
    if scroll != 0.0 {
        let len = (offset.length() * (1.0 - scroll * 0.1)).clamp(10.0, 5_000.0);
        offset = offset.normalize_or_zero() * len;
    }
    st.scene.set_camera(CameraPose {
        position: pose.look_at + offset,
        look_at: pose.look_at,
    });
}

/// Re-creates the light entities whenever the rig's generation moves on.
/// Earlier lights are removed first, so repeated reloads never stack.
pub fn apply_scene_rig(
    mut commands: Commands,
    st: Res<GraphState>,
    mut ambient: ResMut<AmbientLight>,
    lights: Query<Entity, With<SceneLight>>,
    mut applied: Local<u64>,
) {
    let rig = st.scene.rig();
    if rig.generation() == *applied {
        return;
    }
    *applied = rig.generation();

    for e in lights.iter() {
        commands.entity(e).despawn_recursive();
    }

    for light in rig.lights() {
        match light.kind {
            LightKind::Ambient => {
                ambient.color = light.color;
                ambient.brightness = light.intensity * 600.0;
            }
            LightKind::Directional => {
                commands.spawn((
                    DirectionalLightBundle {
                        directional_light: DirectionalLight {
                            color: light.color,
                            illuminance: light.intensity * 10_000.0,
                            ..default()
                        },
                        transform: Transform::from_translation(light.position)
                            .looking_at(Vec3::ZERO, Vec3::Y),
                        ..default()
                    },
                    SceneLight,
                ));
            }
            LightKind::Point => {
                commands.spawn((
                    PointLightBundle {
                        point_light: PointLight {
                            color: light.color,
                            intensity: light.intensity * 20_000_000.0,
                            range: 1_000.0,
                            ..default()
                        },
                        transform: Transform::from_translation(light.position),
                        ..default()
                    },
                    SceneLight,
                ));
            }
        }
    }
    tracing::debug!(generation = rig.generation(), "scene lights applied");
}

/// Physical rect of the 3D viewport: the window minus the side panel.
/// `None` for a collapsed window.
pub fn graph_viewport(window: UVec2, scale: f32, sidebar: f32) -> Option<(UVec2, UVec2)> {
    if window.x == 0 || window.y == 0 {
        return None;
    }
    let offset = ((sidebar * scale).round() as u32).min(window.x.saturating_sub(1));
    Some((UVec2::new(offset, 0), UVec2::new(window.x - offset, window.y)))
}

pub fn track_viewport(
    mut resized: EventReader<WindowResized>,
    windows: Query<&Window>,
    st: Res<GraphState>,
    mut cam_q: Query<&mut Camera, With<SceneCamera>>,
    mut last_sidebar: Local<f32>,
) {
    let resize_seen = resized.read().filter(|e| e.width > 0.0 && e.height > 0.0).count() > 0;
    let sidebar_moved = (st.ui.sidebar_width - *last_sidebar).abs() > 0.5;
    if !resize_seen && !sidebar_moved {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok(mut camera) = cam_q.get_single_mut() else {
        return;
    };
    let size = UVec2::new(window.physical_width(), window.physical_height());
    let Some((position, size)) = graph_viewport(size, window.scale_factor(), st.ui.sidebar_width)
    else {
        return;
    };
    *last_sidebar = st.ui.sidebar_width;
    camera.viewport = Some(Viewport {
        physical_position: position,
        physical_size: size,
        ..default()
    });
}

pub fn apply_background(st: Res<GraphState>, mut clear: ResMut<ClearColor>) {
    if clear.0 != st.palette.graph_bg {
        clear.0 = st.palette.graph_bg;
    }
}
