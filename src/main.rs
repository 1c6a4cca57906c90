//! OptiExtract - document uploader client
//!
//! A desktop client for the OptiExtract upload service: send a document, then
//! browse the history of everything uploaded so far.

mod api;
mod app;
mod core;
mod ui;

use app::{Route, UploaderApp};
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting OptiExtract uploader...");

    // Optional start page, e.g. `optiextract /history`
    let start = std::env::args()
        .nth(1)
        .map(|path| Route::from_path(&path))
        .unwrap_or_default();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 520.0])
            .with_title("OptiExtract File Uploader"),
        ..Default::default()
    };

    eframe::run_native(
        "OptiExtract",
        native_options,
        Box::new(move |cc| Ok(Box::new(UploaderApp::new(cc, start)?))),
    )
}
