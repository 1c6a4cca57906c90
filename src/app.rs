//! Main application state and page routing

use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;

use crate::api::ApiClient;
use crate::core::config::AppConfig;
use crate::core::task::Spawner;
use crate::ui::{background::SilkBackground, history::HistoryView, upload::UploadView};

/// Pages the client can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Upload,
    History,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Upload => "/",
            Route::History => "/history",
        }
    }

    /// Unknown paths land on the uploader
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/history" | "history" => Route::History,
            _ => Route::Upload,
        }
    }

    /// The other page
    pub fn toggled(self) -> Self {
        match self {
            Route::Upload => Route::History,
            Route::History => Route::Upload,
        }
    }

    /// Text of the bottom navigation link
    pub fn nav_label(self) -> &'static str {
        match self {
            Route::Upload => "View Upload History",
            Route::History => "Go to Uploader",
        }
    }
}

/// Main application state
pub struct UploaderApp {
    /// Service client shared with background requests
    api: Arc<ApiClient>,
    /// Runs network requests off the UI thread
    _runtime: tokio::runtime::Runtime,
    spawner: Spawner,
    background: SilkBackground,
    route: Route,
    upload: UploadView,
    history: HistoryView,
}

impl UploaderApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>, start: Route) -> Result<Self> {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default config: {:#}", e);
            let mut config = AppConfig::default();
            config.apply_env_override(std::env::var(crate::core::config::API_URL_ENV).ok());
            config
        });

        let api = ApiClient::new(&config.api).context("Failed to create API client")?;
        tracing::info!("Using upload service at {}", api.base_url());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("optiextract-net")
            .enable_all()
            .build()
            .context("Failed to start network runtime")?;
        let spawner = Spawner::new(runtime.handle().clone(), cc.egui_ctx.clone());

        Ok(Self {
            api: Arc::new(api),
            _runtime: runtime,
            spawner,
            background: SilkBackground::from_config(&config.background),
            route: start,
            upload: UploadView::default(),
            history: HistoryView::default(),
        })
    }

    /// Switch pages; the page being left loses its state
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        tracing::info!("Navigating {} -> {}", self.route.path(), route.path());
        self.route = route;
        self.upload = UploadView::default();
        self.history = HistoryView::default();
    }

    fn render_nav(&mut self, ui: &mut egui::Ui) {
        ui.add_space(16.0);
        if ui.link(self.route.nav_label()).clicked() {
            self.navigate(self.route.toggled());
        }
    }
}

impl eframe::App for UploaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::H)) {
            self.navigate(self.route.toggled());
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.background.paint(ui, ui.max_rect());

                ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                    self.render_nav(ui);

                    ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
                        ui.add_space((ui.available_height() * 0.12).min(96.0));
                        match self.route {
                            Route::Upload => {
                                self.upload.show(ui, &self.api, &self.spawner);
                            }
                            Route::History => {
                                if self.history.show(ui, &self.api, &self.spawner) {
                                    self.navigate(Route::Upload);
                                }
                            }
                        }
                    });
                });
            });
    }
}
