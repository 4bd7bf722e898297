use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;
use gantt_timeline::ZoomLevel;

use crate::app::GanttApp;

const ZOOM_STEP: f64 = 1.25;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui.button(format!("{} Open...", icons::FOLDER_OPEN)).clicked() {
                app.open_dataset();
                ui.close_menu();
            }
            if ui.button(format!("{} Reload      F5", icons::ARROWS_CLOCKWISE)).clicked() {
                app.reload();
                ui.close_menu();
            }
        });

        ui.menu_button("View", |ui| {
            let state = app.store.state();
            let mut group = state.view.group_by_project;
            if ui.checkbox(&mut group, "Group by project").changed() {
                app.store.set_group_by_project(group);
            }
            let mut versions = state.view.show_versions;
            if ui.checkbox(&mut versions, "Show versions").changed() {
                app.store.set_show_versions(versions);
            }
            let mut organize = state.view.organize_by_dependency;
            if ui.checkbox(&mut organize, "Organize by dependency").changed() {
                app.store.set_organize_by_dependency(organize);
            }
            ui.separator();
            if ui.button(format!("{} Expand all", icons::ARROWS_OUT_SIMPLE)).clicked() {
                app.store.expand_all();
                ui.close_menu();
            }
            if ui.button(format!("{} Collapse all", icons::ARROWS_IN_SIMPLE)).clicked() {
                app.store.collapse_all();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reset zoom").clicked() {
                app.store.reset_zoom_override();
                ui.close_menu();
            }
        });

        ui.separator();

        let current = app.store.current().zoom;
        for level in ZoomLevel::ALL {
            if ui.selectable_label(current == level, level.label()).clicked() && current != level {
                app.store.set_view_mode(level);
            }
        }

        let center = app.store.current().viewport.width / 2.0;
        if ui.button(icons::MAGNIFYING_GLASS_MINUS).on_hover_text("Zoom out").clicked() {
            app.store.zoom_by(1.0 / ZOOM_STEP, center);
        }
        if ui.button(icons::MAGNIFYING_GLASS_PLUS).on_hover_text("Zoom in").clicked() {
            app.store.zoom_by(ZOOM_STEP, center);
        }
        if ui.button(icons::TREE_STRUCTURE).on_hover_text("Expand / collapse all").clicked() {
            app.store.toggle_all();
        }

        ui.separator();

        ui.label(RichText::new(icons::FUNNEL).weak());
        let search = ui.add(
            egui::TextEdit::singleline(&mut app.filter_text)
                .hint_text("Filter tasks")
                .desired_width(180.0),
        );
        if search.changed() {
            app.store.set_filter_text(app.filter_text.clone());
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(app.source_label()).size(11.0).weak());
        });
    });
}
