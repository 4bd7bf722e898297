use std::path::PathBuf;

use gantt_timeline::interaction::GestureOutcome;
use gantt_timeline::io::JsonFileBackend;
use gantt_timeline::model::{ProjectId, Version, VersionId};
use gantt_timeline::render::{ConnectorCache, FrameOptions};
use gantt_timeline::{
    Dataset, GanttBackend, GanttConfig, GanttStore, Interaction, MemoryBackend, NoticeLevel,
    Relation, RelationType, Task, TaskId, DAY_MS,
};

use crate::ui;

/// Main application state.
pub struct GanttApp {
    pub store: GanttStore,
    pub interaction: Interaction,
    pub backend: Box<dyn GanttBackend>,
    pub connectors: ConnectorCache,
    pub frame_options: FrameOptions,
    pub file_path: Option<PathBuf>,
    pub filter_text: String,

    // Status message
    pub status_message: String,
    pub status_level: NoticeLevel,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: GanttConfig, path: Option<PathBuf>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let connectors = ConnectorCache::new(config.connector_cache_capacity, config.connector_cache_max_age);
        let frame_options = FrameOptions {
            connector_buffer_rows: config.connector_buffer_rows,
            ..FrameOptions::default()
        };
        let interaction = Interaction::from_config(&config);

        let mut app = Self {
            store: GanttStore::new(config),
            interaction,
            backend: Box::new(MemoryBackend::new(Self::sample_dataset())),
            connectors,
            frame_options,
            file_path: None,
            filter_text: String::new(),
            status_message: "Ready".to_string(),
            status_level: NoticeLevel::Info,
        };
        match path {
            Some(path) => app.open_path(path),
            None => app.reload(),
        }
        app
    }

    /// Generate a sample dataset for demonstration.
    fn sample_dataset() -> Dataset {
        let today = gantt_timeline::io::records::today();
        let day = |n: i64| today + n * DAY_MS;
        let project = ProjectId(1);

        let task = |id: i64, subject: &str, start: i64, due: i64, done: u8, parent: Option<i64>| {
            let mut t = Task::new(id, subject, day(start), day(due));
            t.ratio_done = done;
            t.parent_id = parent.map(TaskId);
            t.project_id = Some(project);
            t.project_name = Some("Sample Project".to_string());
            t
        };

        // ── Phase 1: Planning ───────────────────────────────────────
        let mut tasks = vec![
            task(1, "Planning", -5, 8, 0, None),
            task(2, "Project Kickoff", -5, -2, 100, Some(1)),
            task(3, "Requirements Gathering", -1, 5, 60, Some(1)),
            task(4, "Planning Complete", 8, 8, 0, Some(1)),
        ];
        // ── Phase 2: Execution ──────────────────────────────────────
        tasks.extend([
            task(5, "Execution", 9, 32, 0, None),
            task(6, "UI Design", 9, 18, 0, Some(5)),
            task(7, "Backend Development", 9, 28, 0, Some(5)),
            task(8, "Testing & QA", 29, 32, 0, Some(5)),
            task(9, "Launch", 34, 34, 0, None),
        ]);
        tasks[4].fixed_version_id = Some(VersionId(1));
        tasks[8].fixed_version_id = Some(VersionId(1));
        tasks[8].editable = false;

        let relations = [(2, 3), (3, 6), (7, 8), (8, 9)]
            .into_iter()
            .enumerate()
            .map(|(i, (from, to))| Relation::new(i as i64 + 1, TaskId(from), TaskId(to), RelationType::Precedes))
            .collect();

        let versions = vec![Version {
            id: VersionId(1),
            name: "1.0".to_string(),
            effective_date: day(34),
            start_date: Some(day(9)),
            ratio_done: Some(0.0),
            project_id: project,
            status: "open".to_string(),
        }];

        Dataset::new(tasks, relations, versions)
    }

    // --- Data source ---

    pub fn source_label(&self) -> String {
        match &self.file_path {
            Some(path) => path.display().to_string(),
            None => "Sample data (not saved)".to_string(),
        }
    }

    pub fn open_dataset(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Gantt dataset", &["json"])
            .pick_file()
        {
            self.open_path(path);
        }
    }

    fn open_path(&mut self, path: PathBuf) {
        match JsonFileBackend::open(&path) {
            Ok(backend) => {
                self.backend = Box::new(backend);
                self.file_path = Some(path);
                self.reload();
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "could not open dataset");
                self.set_status(NoticeLevel::Error, format!("Error loading: {e}"));
            }
        }
    }

    pub fn reload(&mut self) {
        self.interaction.cancel(&mut self.store);
        self.connectors.clear();
        self.store.reload(self.backend.as_mut());
        let count = self.store.current().all_tasks.len();
        self.set_status(NoticeLevel::Info, format!("Loaded {count} tasks"));
    }

    fn persist(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::Save(pending) => self.store.commit_save(pending, self.backend.as_mut()),
            GestureOutcome::Link(request) => self.store.create_relation(request, self.backend.as_mut()),
        }
    }

    fn set_status(&mut self, level: NoticeLevel, message: String) {
        self.status_level = level;
        self.status_message = message;
    }

    fn status_color(&self) -> egui::Color32 {
        match self.status_level {
            NoticeLevel::Info | NoticeLevel::Success => ui::theme::TEXT_SECONDARY,
            NoticeLevel::Warning => ui::theme::WARNING,
            NoticeLevel::Error => ui::theme::ERROR,
        }
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let should_open = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::O));
        let should_reload = ctx.input(|i| i.key_pressed(egui::Key::F5));
        if should_open {
            self.open_dataset();
        }
        if should_reload {
            self.reload();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(self.status_color()),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let state = self.store.current();
                        ui.label(
                            egui::RichText::new(format!(
                                "Rows: {} · Tasks: {} · {}",
                                state.row_count,
                                state.all_tasks.len(),
                                state.zoom.label()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let chart = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::gantt_chart::show_gantt_chart(
                    &mut self.store,
                    &mut self.interaction,
                    &mut self.connectors,
                    self.frame_options,
                    ui,
                )
            })
            .inner;

        if let Some(outcome) = chart.outcome {
            self.persist(outcome);
        }

        if let Some(last) = self.store.drain_notifications().pop() {
            self.set_status(last.level, last.to_string());
        }
    }
}
