//! Upload page: pick one file and send it to the service

use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText};

use crate::api::{ApiClient, ApiError, UPLOAD_FAILED_FALLBACK};
use crate::core::record::FileRecord;
use crate::core::task::{Pending, Spawner, TaskStatus};

use super::glass::{GlassSurface, PanelWidth, ShinyText};

pub const SELECT_FIRST: &str = "Please select a file first.";
pub const UPLOADING: &str = "Uploading...";
pub const UPLOAD_SUCCESS: &str = "Upload successful!";

const PANEL_WIDTH: PanelWidth = PanelWidth {
    fraction: 0.8,
    min: 300.0,
    max: 550.0,
};

/// How a status line is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Neutral,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl StatusMessage {
    fn new(text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    fn color(&self) -> Color32 {
        match self.kind {
            MessageKind::Neutral => Color32::from_gray(220),
            MessageKind::Success => Color32::from_rgb(0x4A, 0xDE, 0x80),
            MessageKind::Error => Color32::from_rgb(0xF8, 0x71, 0x71),
        }
    }
}

/// The file chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

/// Upload page state
#[derive(Debug, Default)]
pub struct UploadView {
    selected: Option<SelectedFile>,
    status: Option<StatusMessage>,
    uploading: bool,
    in_flight: Option<Pending<Result<Option<FileRecord>, ApiError>>>,
}

impl UploadView {
    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Choose a file; its name becomes the status line
    pub fn select_file(&mut self, path: PathBuf) {
        if self.uploading {
            return;
        }
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        self.status = Some(StatusMessage::new(name.clone(), MessageKind::Neutral));
        self.selected = Some(SelectedFile { path, name });
    }

    /// Validate and enter the uploading state.
    ///
    /// Returns the path to send, or `None` if nothing should be sent.
    pub fn begin_upload(&mut self) -> Option<PathBuf> {
        if self.uploading {
            return None;
        }
        let Some(selected) = &self.selected else {
            self.status = Some(StatusMessage::new(SELECT_FIRST, MessageKind::Error));
            return None;
        };

        self.uploading = true;
        self.status = Some(StatusMessage::new(UPLOADING, MessageKind::Neutral));
        Some(selected.path.clone())
    }

    /// Apply the outcome of an upload started with [`Self::begin_upload`]
    pub fn finish_upload(&mut self, result: Result<Option<FileRecord>, ApiError>) {
        self.uploading = false;
        self.in_flight = None;

        match result {
            Ok(record) => {
                if let Some(record) = record {
                    tracing::info!("Uploaded {} as record {}", record.original_filename, record.id);
                }
                self.status = Some(StatusMessage::new(UPLOAD_SUCCESS, MessageKind::Success));
                self.selected = None;
            }
            Err(e) => {
                tracing::error!(status = ?e.status(), "Upload failed: {}", e);
                // Only the server's own message is shown; other causes stay in the log
                let detail = match &e {
                    ApiError::Rejected { detail, .. } => detail.as_str(),
                    _ => UPLOAD_FAILED_FALLBACK,
                };
                self.status = Some(StatusMessage::new(format!("Error: {}", detail), MessageKind::Error));
            }
        }
    }

    fn submit(&mut self, api: &Arc<ApiClient>, spawner: &Spawner) {
        if let Some(path) = self.begin_upload() {
            let api = Arc::clone(api);
            self.in_flight = Some(spawner.spawn(async move { api.upload_document(&path).await }));
        }
    }

    fn poll(&mut self) {
        let Some(pending) = self.in_flight.as_mut() else {
            return;
        };
        match pending.poll() {
            TaskStatus::Running => {}
            TaskStatus::Ready(result) => self.finish_upload(result),
            TaskStatus::Lost => self.finish_upload(Err(ApiError::Lost)),
        }
    }

    /// Show the upload page
    pub fn show(&mut self, ui: &mut egui::Ui, api: &Arc<ApiClient>, spawner: &Spawner) {
        self.poll();

        GlassSurface::new(PANEL_WIDTH).show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ShinyText::new("Upload Document").speed(4.0).size(30.0).show(ui);
                ui.label(RichText::new("Select a file and click upload.").color(Color32::from_gray(190)));
                ui.add_space(16.0);

                let choose = ui.add_enabled(!self.is_uploading(), egui::Button::new("Choose File"));
                if choose.clicked() {
                    if let Some(path) = rfd::FileDialog::new().pick_file() {
                        self.select_file(path);
                    }
                }

                ui.add_space(8.0);
                if self.is_uploading() {
                    ui.add(egui::Spinner::new());
                } else {
                    let mut upload = ui.add(egui::Button::new(RichText::new("Upload File").strong()));
                    if let Some(selected) = self.selected() {
                        upload = upload.on_hover_text(selected.path.display().to_string());
                    }
                    if upload.clicked() {
                        self.submit(api, spawner);
                    }
                }

                if let Some(status) = self.status() {
                    ui.add_space(12.0);
                    ui.label(RichText::new(&status.text).color(status.color()));
                }
            });
        });
    }
}
