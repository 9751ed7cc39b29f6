use ratatui::style::Color;

use crate::data::VisaCategory;

/// Colour with alpha. The SVG writer uses it as-is, the terminal blends it
/// over the page background first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }

    /// Opaque terminal colour of `self` painted over `bg`
    pub fn over(&self, bg: Rgba) -> Color {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        Color::Rgb(mix(self.r, bg.r), mix(self.g, bg.g), mix(self.b, bg.b))
    }

    pub fn solid(&self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

/// Everything that depends on the visa category, for map and cards alike
#[derive(Debug, PartialEq)]
pub struct CategoryStyle {
    /// Short badge text
    pub label: &'static str,
    pub map_fill: Rgba,
    pub map_hover: Rgba,
    pub dot: Rgba,
    pub badge_bg: Rgba,
    pub badge_text: Rgba,
    pub badge_border: Rgba,
}

const GREEN_FILL: Rgba = Rgba::rgba(74, 222, 128, 0.6);
const GREEN_HOVER: Rgba = Rgba::rgba(34, 197, 94, 0.8);
const GREEN_DOT: Rgba = Rgba::rgb(34, 197, 94);
const ORANGE_FILL: Rgba = Rgba::rgba(251, 146, 60, 0.6);
const ORANGE_HOVER: Rgba = Rgba::rgba(249, 115, 22, 0.8);
const ORANGE_DOT: Rgba = Rgba::rgb(249, 115, 22);
const BLUE_FILL: Rgba = Rgba::rgba(96, 165, 250, 0.45);
const BLUE_HOVER: Rgba = Rgba::rgba(59, 130, 246, 0.7);
const BLUE_DOT: Rgba = Rgba::rgb(96, 165, 250);

static STYLES: [CategoryStyle; 5] = [
    // MutualFree
    CategoryStyle {
        label: "互免",
        map_fill: GREEN_FILL,
        map_hover: GREEN_HOVER,
        dot: GREEN_DOT,
        badge_bg: Rgba::rgb(236, 253, 245),
        badge_text: Rgba::rgb(5, 150, 105),
        badge_border: Rgba::rgb(209, 250, 229),
    },
    // VisaFree
    CategoryStyle {
        label: "免签",
        map_fill: GREEN_FILL,
        map_hover: GREEN_HOVER,
        dot: GREEN_DOT,
        badge_bg: Rgba::rgb(240, 253, 244),
        badge_text: Rgba::rgb(22, 163, 74),
        badge_border: Rgba::rgb(220, 252, 231),
    },
    // VisaOnArrival
    CategoryStyle {
        label: "落地签",
        map_fill: ORANGE_FILL,
        map_hover: ORANGE_HOVER,
        dot: ORANGE_DOT,
        badge_bg: Rgba::rgb(255, 247, 237),
        badge_text: Rgba::rgb(234, 88, 12),
        badge_border: Rgba::rgb(255, 237, 213),
    },
    // ElectronicAuthorization
    CategoryStyle {
        label: "电子/其他",
        map_fill: BLUE_FILL,
        map_hover: BLUE_HOVER,
        dot: BLUE_DOT,
        badge_bg: Rgba::rgb(248, 250, 252),
        badge_text: Rgba::rgb(71, 85, 105),
        badge_border: Rgba::rgb(241, 245, 249),
    },
    // Other
    CategoryStyle {
        label: "电子/其他",
        map_fill: BLUE_FILL,
        map_hover: BLUE_HOVER,
        dot: BLUE_DOT,
        badge_bg: Rgba::rgb(248, 250, 252),
        badge_text: Rgba::rgb(71, 85, 105),
        badge_border: Rgba::rgb(241, 245, 249),
    },
];

pub fn style_for(category: VisaCategory) -> &'static CategoryStyle {
    let idx = match category {
        VisaCategory::MutualFree => 0,
        VisaCategory::VisaFree => 1,
        VisaCategory::VisaOnArrival => 2,
        VisaCategory::ElectronicAuthorization => 3,
        VisaCategory::Other => 4,
    };
    &STYLES[idx]
}

/// Shapes whose code has no record
pub const UNRESOLVED_FILL: Rgba = Rgba::rgba(255, 255, 255, 0.9);
pub const UNRESOLVED_HOVER: Rgba = Rgba::rgba(148, 163, 184, 0.35);
pub const SHAPE_STROKE: Rgba = Rgba::rgba(203, 213, 225, 0.6);
pub const SHAPE_STROKE_WIDTH: f64 = 0.5;
pub const LABEL_TEXT: Rgba = Rgba::rgb(30, 41, 59);
pub const MUTED_TEXT: Rgba = Rgba::rgb(100, 116, 139);
pub const PAGE_BACKGROUND: Rgba = Rgba::rgb(248, 250, 252);
pub const ACCENT: Rgba = Rgba::rgb(59, 130, 246);
pub const WARNING: Rgba = Rgba::rgb(180, 83, 9);

/// Legend rows: (swatch, text)
pub const LEGEND: [(Rgba, &str); 3] = [
    (GREEN_DOT, "互免/免签"),
    (ORANGE_DOT, "落地签 (VOA)"),
    (BLUE_DOT, "电子/其他"),
];
