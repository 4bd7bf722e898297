use egui::{Color32, FontId, Rounding, Stroke, Visuals};
use gantt_timeline::render::Paint;

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const WARNING: Color32 = Color32::from_rgb(251, 140, 0);
pub const ERROR: Color32 = Color32::from_rgb(229, 57, 53);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const HEADER_HEIGHT: f32 = 24.0;
pub const STATUS_BAR_HEIGHT: f32 = 22.0;
pub const DASH: f32 = 4.0;
pub const DASH_GAP: f32 = 3.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(11.0)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_summary() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_status() -> FontId {
    FontId::proportional(11.0)
}

// ── Chart paints ─────────────────────────────────────────────────────────────

/// Colour for each kind of chart primitive.
pub fn paint_color(paint: Paint) -> Color32 {
    match paint {
        Paint::GridLine => GRID_LINE,
        Paint::WeekendShade => Color32::from_rgba_premultiplied(255, 255, 255, 5),
        Paint::TodayShade => Color32::from_rgba_premultiplied(240, 75, 75, 14),
        Paint::SummaryBar => Color32::from_rgb(120, 126, 150),
        Paint::SummaryProgress => Color32::from_rgb(52, 168, 83),
        Paint::SummaryMarker => Color32::from_rgb(171, 71, 188),
        Paint::BarPlanned => Color32::from_rgb(66, 133, 244),
        Paint::BarProgress => Color32::from_rgb(40, 90, 180),
        Paint::BarDelay => ERROR,
        Paint::ParentCap => Color32::from_rgb(200, 204, 220),
        Paint::DependencyIndicator => Color32::from_rgb(255, 193, 7),
        Paint::Connector => Color32::from_rgb(140, 146, 170),
        Paint::LinkDraft => ACCENT,
        Paint::Selection => Color32::WHITE,
        Paint::ProgressLine => Color32::from_rgb(0, 188, 212),
        Paint::TodayLine => TODAY_LINE,
        Paint::Label => TEXT_PRIMARY,
        Paint::SummaryLabel => TEXT_SECONDARY,
    }
}

pub fn paint_font(paint: Paint) -> FontId {
    match paint {
        Paint::SummaryLabel => font_summary(),
        _ => font_bar(),
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = Color32::from_rgb(20, 20, 28);

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(42, 44, 56);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(52, 54, 68);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);

    visuals.widgets.active.bg_fill = Color32::from_rgb(60, 62, 76);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);
    visuals.window_rounding = Rounding::same(8.0);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
