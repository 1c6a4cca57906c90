//! History page: table of files the service has stored

use std::sync::Arc;

use eframe::egui::{self, Color32, RichText};
use egui_extras::{Column, TableBuilder};

use crate::api::{ApiClient, ApiError};
use crate::core::record::FileRecord;
use crate::core::task::{Pending, Spawner, TaskStatus};

use super::glass::{GlassSurface, PanelWidth};

pub const FETCH_FAILED: &str = "Failed to fetch files.";
pub const NO_FILES: &str = "No files have been uploaded yet.";

const PANEL_WIDTH: PanelWidth = PanelWidth {
    fraction: 0.9,
    min: 500.0,
    max: 1000.0,
};

/// Where the history fetch stands
#[derive(Debug, Default, PartialEq, Eq)]
pub enum HistoryState {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    Loaded(Vec<FileRecord>),
    Failed,
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryRow {
    File {
        filename: String,
        size: String,
        uploaded_at: String,
    },
    /// Shown alone when the server has no records
    Placeholder,
}

/// History page state
#[derive(Debug, Default)]
pub struct HistoryView {
    state: HistoryState,
    in_flight: Option<Pending<Result<Vec<FileRecord>, ApiError>>>,
}

impl HistoryView {
    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    /// Mark the fetch as started. Returns false if one already ran or is running.
    pub fn begin_fetch(&mut self) -> bool {
        if self.state != HistoryState::Idle {
            return false;
        }
        self.state = HistoryState::Loading;
        true
    }

    pub fn finish_fetch(&mut self, result: Result<Vec<FileRecord>, ApiError>) {
        self.in_flight = None;
        self.state = match result {
            Ok(records) => HistoryState::Loaded(records),
            Err(e) => {
                tracing::error!("Fetching history failed: {}", e);
                HistoryState::Failed
            }
        };
    }

    /// Table rows for the current state; empty unless loaded
    pub fn rows(&self) -> Vec<HistoryRow> {
        match &self.state {
            HistoryState::Loaded(records) if records.is_empty() => vec![HistoryRow::Placeholder],
            HistoryState::Loaded(records) => records
                .iter()
                .map(|record| HistoryRow::File {
                    filename: record.original_filename.clone(),
                    size: record.display_size(),
                    uploaded_at: record.display_uploaded_at(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn start(&mut self, api: &Arc<ApiClient>, spawner: &Spawner) {
        if self.begin_fetch() {
            let api = Arc::clone(api);
            self.in_flight = Some(spawner.spawn(async move { api.list_files().await }));
        }
    }

    fn poll(&mut self) {
        let Some(pending) = self.in_flight.as_mut() else {
            return;
        };
        match pending.poll() {
            TaskStatus::Running => {}
            TaskStatus::Ready(result) => self.finish_fetch(result),
            TaskStatus::Lost => self.finish_fetch(Err(ApiError::Lost)),
        }
    }

    /// Show the history page. Returns true when the back link was clicked.
    pub fn show(&mut self, ui: &mut egui::Ui, api: &Arc<ApiClient>, spawner: &Spawner) -> bool {
        self.start(api, spawner);
        self.poll();

        let mut back = false;
        GlassSurface::new(PANEL_WIDTH).show(ui, |ui| {
            ui.heading(RichText::new("File Upload History").size(24.0).color(Color32::WHITE));
            if ui.link("\u{2190} Back to Uploader").clicked() {
                back = true;
            }
            ui.add_space(12.0);

            match self.state() {
                HistoryState::Idle | HistoryState::Loading => {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new());
                        ui.label("Loading history...");
                    });
                }
                HistoryState::Failed => {
                    ui.label(RichText::new(FETCH_FAILED).color(Color32::from_rgb(0xF8, 0x71, 0x71)));
                }
                HistoryState::Loaded(_) => Self::show_table(ui, &self.rows()),
            }
        });
        back
    }

    fn show_table(ui: &mut egui::Ui, rows: &[HistoryRow]) {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::remainder().at_least(160.0).clip(true))
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(160.0))
            .max_scroll_height(420.0)
            .header(24.0, |mut header| {
                for title in ["Original Filename", "File Size", "Uploaded At"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(22.0, |mut table_row| match row {
                        HistoryRow::File {
                            filename,
                            size,
                            uploaded_at,
                        } => {
                            table_row.col(|ui| {
                                ui.label(filename.as_str());
                            });
                            table_row.col(|ui| {
                                ui.label(size.as_str());
                            });
                            table_row.col(|ui| {
                                ui.label(uploaded_at.as_str());
                            });
                        }
                        HistoryRow::Placeholder => {
                            table_row.col(|ui| {
                                ui.label(RichText::new(NO_FILES).italics());
                            });
                            table_row.col(|_| {});
                            table_row.col(|_| {});
                        }
                    });
                }
            });
    }
}
