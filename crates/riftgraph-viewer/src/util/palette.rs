use bevy::prelude::Color;
use bevy_egui::egui;

use crate::util::config::ThemeName;

// Theme-independent tier colours.
pub fn low_suspicion() -> Color {
    Color::srgb_u8(0xea, 0xb3, 0x08)
}

pub fn bridge() -> Color {
    Color::srgb_u8(0xa8, 0x55, 0xf7)
}

pub fn hub() -> Color {
    Color::srgb_u8(0x06, 0xb6, 0xd4)
}

pub fn default_node() -> Color {
    Color::srgb_u8(0x4a, 0x6f, 0xa5)
}

pub fn path() -> Color {
    Color::srgb_u8(0xff, 0xb0, 0x20)
}

pub fn ring_edge() -> Color {
    Color::srgb_u8(0xef, 0x44, 0x44)
}

/// Theme colours, passed explicitly to everything that draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub accent: Color,
    pub danger: Color,
    pub warning: Color,
    pub success: Color,
    pub edge: Color,
    pub label: Color,
    pub pill_bg: Color,
    pub graph_bg: Color,
    pub muted: Color,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            accent: Color::srgb_u8(0x00, 0xd4, 0xff),
            danger: Color::srgb_u8(0xff, 0x3d, 0x5a),
            warning: Color::srgb_u8(0xff, 0xb0, 0x20),
            success: Color::srgb_u8(0x00, 0xe5, 0xa0),
            edge: Color::srgb_u8(0x1e, 0x29, 0x3b),
            label: Color::srgb_u8(0xcb, 0xd5, 0xe1),
            pill_bg: Color::srgba_u8(0x05, 0x0b, 0x14, 230),
            graph_bg: Color::srgb_u8(0x03, 0x09, 0x12),
            muted: Color::srgb_u8(0x64, 0x74, 0x8b),
        }
    }

    pub fn light() -> Self {
        Self {
            accent: Color::srgb_u8(0x02, 0x84, 0xc7),
            danger: Color::srgb_u8(0xdc, 0x26, 0x26),
            warning: Color::srgb_u8(0xd9, 0x77, 0x06),
            success: Color::srgb_u8(0x05, 0x96, 0x69),
            edge: Color::srgb_u8(0xcb, 0xd5, 0xe1),
            label: Color::srgb_u8(0x33, 0x41, 0x55),
            pill_bg: Color::srgba_u8(0xff, 0xff, 0xff, 230),
            graph_bg: Color::srgb_u8(0xf8, 0xfa, 0xfc),
            muted: Color::srgb_u8(0x64, 0x74, 0x8b),
        }
    }

    pub fn for_theme(theme: ThemeName) -> Self {
        match theme {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

pub fn to_egui(color: Color) -> egui::Color32 {
    let c = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (c.red * 255.0).round() as u8,
        (c.green * 255.0).round() as u8,
        (c.blue * 255.0).round() as u8,
        (c.alpha * 255.0).round() as u8,
    )
}
