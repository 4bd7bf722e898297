use chrono::DateTime;
use egui::{Align2, CursorIcon, Pos2, Sense, Stroke, Ui, Vec2};
use gantt_timeline::geometry::Point;
use gantt_timeline::interaction::{EditMode, Gesture, GestureOutcome, HitRegion, Interaction, Key};
use gantt_timeline::layout::coords::time_to_screen_x;
use gantt_timeline::render::{render_frame, ConnectorCache, FrameInput, FrameOptions, RouteParams};
use gantt_timeline::{GanttState, GanttStore, ZoomLevel};

use crate::ui::surface::EguiSurface;
use crate::ui::theme;

const HEADER_LABEL_LIMIT: usize = 400;

/// Result details from interactions in the Gantt chart.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    /// A released gesture the host must persist.
    pub outcome: Option<GestureOutcome>,
}

fn header_format(zoom: ZoomLevel) -> &'static str {
    match zoom {
        ZoomLevel::Month => "%b %Y",
        ZoomLevel::Week => "%d %b",
        ZoomLevel::Day => "%a %d",
        ZoomLevel::Hour => "%a %d %b",
    }
}

fn draw_timeline_header(ui: &mut Ui, state: &GanttState) {
    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(Vec2::new(width, theme::HEADER_HEIGHT), Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 0.0, theme::BG_HEADER);

    let vp = &state.viewport;
    let from = vp.visible_start() as i64;
    let to = vp.visible_end() as i64;
    let format = header_format(state.zoom);
    for t in state.grid.boundaries(from, to, HEADER_LABEL_LIMIT) {
        let x = rect.left() + time_to_screen_x(t as f64, vp) as f32;
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        let Some(label) = DateTime::from_timestamp_millis(t)
            .map(|dt| dt.with_timezone(&state.grid.offset).format(format).to_string())
        else {
            continue;
        };
        painter.text(
            Pos2::new(x + 4.0, rect.center().y),
            Align2::LEFT_CENTER,
            label,
            theme::font_header(),
            theme::TEXT_SECONDARY,
        );
    }
}

fn cursor_for(interaction: &Interaction, state: &GanttState, local: Point, edge_px: f64) -> CursorIcon {
    match interaction.gesture() {
        Gesture::Pan { .. } => CursorIcon::Grabbing,
        Gesture::Edit(edit) if edit.mode == EditMode::Move => CursorIcon::Grabbing,
        Gesture::Edit(_) => CursorIcon::ResizeHorizontal,
        Gesture::Link(_) => CursorIcon::Crosshair,
        Gesture::Idle => {
            let hit = gantt_timeline::interaction::task_at(
                &state.tasks,
                &state.viewport,
                &state.grid,
                local,
                edge_px,
            );
            match hit.map(|h| h.region) {
                Some(HitRegion::Body) => CursorIcon::Grab,
                Some(_) => CursorIcon::ResizeHorizontal,
                None => CursorIcon::Default,
            }
        }
    }
}

/// Render the chart and feed it this frame's input.
pub fn show_gantt_chart(
    store: &mut GanttStore,
    interaction: &mut Interaction,
    connectors: &mut ConnectorCache,
    frame_options: FrameOptions,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut result = ChartInteraction::default();

    draw_timeline_header(ui, &store.state());

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let rect = response.rect;
    store.set_viewport_size(rect.width() as f64, rect.height() as f64);

    let origin = rect.min;
    let to_local = |p: Pos2| Point::new((p.x - origin.x) as f64, (p.y - origin.y) as f64);

    let (pressed, released, latest, zoom_delta, scroll) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.latest_pos(),
            i.zoom_delta(),
            i.smooth_scroll_delta,
        )
    });

    if let Some(pos) = latest {
        let local = to_local(pos);
        if pressed && rect.contains(pos) {
            interaction.pointer_down(store, local);
        }
        if rect.contains(pos) || !interaction.is_idle() {
            interaction.pointer_move(store, local);
        }
        if released {
            result.outcome = interaction.pointer_up(store, local);
        }
    }
    if !response.hovered() {
        interaction.pointer_leave(store);
    }

    if response.hovered() {
        if zoom_delta != 1.0 {
            let anchor = latest.map_or(rect.width() / 2.0, |p| p.x - origin.x);
            store.zoom_by(zoom_delta as f64, anchor as f64);
        } else if scroll != Vec2::ZERO {
            store.scroll_by(-scroll.x as f64, -scroll.y as f64);
        }
    }

    if !ui.ctx().wants_keyboard_input() {
        let keys = [
            (egui::Key::Escape, Key::Escape),
            (egui::Key::ArrowUp, Key::ArrowUp),
            (egui::Key::ArrowDown, Key::ArrowDown),
            (egui::Key::ArrowLeft, Key::ArrowLeft),
            (egui::Key::ArrowRight, Key::ArrowRight),
        ];
        for (egui_key, key) in keys {
            if ui.input(|i| i.key_pressed(egui_key)) {
                interaction.key(store, key);
            }
        }
    }

    let state = store.state();
    if let Some(pos) = latest.filter(|p| rect.contains(*p)) {
        let icon = cursor_for(interaction, &state, to_local(pos), store.config().edge_hit_px);
        ui.ctx().set_cursor_icon(icon);
    }

    painter.rect_filled(rect, 0.0, theme::BG_DARK);
    let input = FrameInput {
        tasks: &state.tasks,
        rows: &state.layout_rows,
        relations: &state.relations,
        viewport: &state.viewport,
        zoom: state.zoom,
        grid: state.grid,
        today: Some(chrono::Utc::now().timestamp_millis()),
        selected: state.selected_task_id,
        link_draft: interaction.link_line(),
        options: FrameOptions {
            route: RouteParams {
                revision: state.layout_generation,
                ..frame_options.route
            },
            ..frame_options
        },
    };
    let mut surface = EguiSurface::new(&painter, origin);
    let stats = render_frame(&mut surface, &input, connectors);
    tracing::trace!(bars = stats.bars, connectors = stats.connectors, "frame drawn");

    result
}
