#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use gantt_timeline::GanttConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dataset JSON file to open; sample data is shown without one
    dataset: Option<PathBuf>,

    /// Config file to use instead of the one in the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn load_config(&self) -> GanttConfig {
        match &self.config {
            Some(path) => GanttConfig::load_or_default(path),
            None => GanttConfig::load(),
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.load_config();
    let dataset = args.dataset;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Rust Gantt Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Rust Gantt Timeline",
        options,
        Box::new(move |cc| Ok(Box::new(app::GanttApp::new(cc, config, dataset)))),
    )
}
