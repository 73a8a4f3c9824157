pub mod accounts;
pub mod hud;
pub mod panel;
pub mod rings;
pub mod shortcuts;
pub mod timeline;
pub mod tooltips;

pub use hud::hud_overlay;
pub use panel::ui_panel;
pub use shortcuts::handle_shortcuts;
pub use timeline::timeline_bar;
pub use tooltips::hover_tooltip;

pub const PANEL_W: f32 = 340.0;
pub const HUD_EDGE_PADDING: f32 = 12.0;
pub const HUD_MIN_CONTENT_W: f32 = 260.0;
