use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::classifier::{Classifier, PreloadStatus, Provider};
use crate::constants::{
    CACHE_FILE, EXPORT_CSV_FILE, LLM_BATCH_SIZE, PRELOAD_LOOKAHEAD, PROGRESS_FILE,
    TOAST_DURATION_SECS,
};
use crate::models::{ClassificationSession, Track};
use crate::screens::{self, UiAction};
use crate::services::playlist_sync::{DryRunSync, PlaylistSync, SpotifySync};
use crate::services::{SyncOutcome, SyncWorker};
use crate::state::{AuthOutcome, BackgroundTasks};
use crate::storage::{ProgressStore, UserConfig};
use crate::usecases::check_update::UpdateInfo;
use crate::usecases::{classify_track, export_session, resume_session, undo_decision};
use crate::utils::oauth::{OAuthConfig, OAuthManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Loading,
    Classify,
    Complete,
}

/// Credential form state for the setup screen.
#[derive(Default)]
pub struct SetupForm {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub llm_provider: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub simulation_mode: bool,
    pub error: Option<String>,
}

impl SetupForm {
    fn from_config(config: &UserConfig) -> Self {
        Self {
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            redirect_uri: config.spotify_redirect_uri.clone(),
            llm_provider: config.llm_provider.clone(),
            llm_api_key: config.llm_api_key.clone(),
            llm_model: config.llm_model.clone(),
            simulation_mode: config.simulation_mode,
            error: None,
        }
    }
}

pub struct ClassifyApp {
    pub config: UserConfig,
    pub screen: Screen,
    pub setup: SetupForm,
    pub status_line: String,

    pub tasks: BackgroundTasks,
    pub token: Option<String>,
    pub display_name: Option<String>,

    pub tracks: Vec<Track>,
    pub track_by_id: HashMap<String, usize>,
    pub session: Option<ClassificationSession>,
    pub classifier: Option<Arc<Classifier>>,
    pub sync: Option<SyncWorker>,
    pub progress_store: ProgressStore,
    pub export_path: PathBuf,

    pub preload: Option<PreloadStatus>,
    pub sync_failures: Vec<SyncOutcome>,
    pub update_info: Option<UpdateInfo>,
    pub completion_exported: bool,
    pub show_stop_confirm: bool,
    pub toast: Option<(String, Instant)>,
}

impl ClassifyApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = UserConfig::load();
        let setup = SetupForm::from_config(&config);
        let config_dir = UserConfig::config_dir();

        let mut app = Self {
            setup,
            screen: Screen::Setup,
            status_line: String::new(),
            tasks: BackgroundTasks::default(),
            token: None,
            display_name: None,
            tracks: Vec::new(),
            track_by_id: HashMap::new(),
            session: None,
            classifier: None,
            sync: None,
            progress_store: ProgressStore::new(config_dir.join(PROGRESS_FILE)),
            export_path: config_dir.join(EXPORT_CSV_FILE),
            preload: None,
            sync_failures: Vec::new(),
            update_info: None,
            completion_exported: false,
            show_stop_confirm: false,
            toast: None,
            config,
        };

        if app.config.is_configured() {
            app.start_auth();
        } else {
            log::info!("[App] No credentials configured yet, showing setup");
        }
        app
    }

    // === Background work ===

    fn start_auth(&mut self) {
        self.screen = Screen::Loading;
        self.status_line = "Connecting to Spotify...".to_string();

        let (tx, rx) = mpsc::channel();
        self.tasks.auth_rx = Some(rx);
        let config = self.config.clone();

        // The OAuth flow blocks on the browser redirect, so it gets its
        // own plain thread.
        std::thread::spawn(move || {
            let oauth_config = OAuthConfig::new(
                config.spotify_client_id,
                config.spotify_client_secret,
                config.spotify_redirect_uri,
            );
            let mut manager = OAuthManager::new(oauth_config);
            let result = match manager.authenticate() {
                Ok(token) => {
                    let display_name = crate::utils::error_handling::create_runtime()
                        .ok()
                        .and_then(|rt| {
                            rt.block_on(crate::api::users::current_user_profile(&token))
                                .ok()
                                .and_then(|profile| profile.display_name)
                        });
                    Ok(AuthOutcome {
                        token,
                        display_name,
                    })
                }
                Err(e) => Err(e),
            };
            let _ = tx.send(result);
        });
    }

    fn start_fetch_tracks(&mut self) {
        let Some(token) = self.token.clone() else {
            return;
        };
        self.status_line = "Fetching liked songs...".to_string();

        let (tx, rx) = mpsc::channel();
        self.tasks.tracks_rx = Some(rx);
        crate::utils::async_helper::spawn_and_send(
            move || {
                Box::pin(async move {
                    crate::api::tracks::fetch_liked_songs(&token)
                        .await
                        .map_err(|e| e.to_string())
                })
            },
            tx,
        );
    }

    fn start_update_check(&mut self) {
        let (tx, rx) = mpsc::channel();
        self.tasks.update_rx = Some(rx);
        crate::utils::async_helper::spawn_and_send(
            move || Box::pin(async move { Ok(crate::usecases::check_update::check_for_update().await) }),
            tx,
        );
    }

    fn start_preload(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(classifier) = self.classifier.as_ref() else {
            return;
        };
        let start = session.current_index;
        let end = (start + PRELOAD_LOOKAHEAD).min(session.track_ids.len());
        let upcoming: Vec<Track> = session.track_ids[start..end]
            .iter()
            .filter_map(|id| self.track_by_id.get(id).map(|&i| self.tracks[i].clone()))
            .collect();
        let classifier = Arc::clone(classifier);
        if upcoming.is_empty() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        self.tasks.preload_rx = Some(rx);
        classifier.preload(upcoming, LLM_BATCH_SIZE, tx);
    }

    fn on_tracks_fetched(&mut self, tracks: Vec<Track>) {
        log::info!("[App] {} liked songs ready", tracks.len());
        let session = resume_session::resume_or_start(&tracks, &self.progress_store);

        self.track_by_id = tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        self.tracks = tracks;

        let provider = Provider::from_key(&self.config.llm_provider).unwrap_or_else(|| {
            log::warn!(
                "[App] Unknown LLM provider \"{}\", falling back to openai",
                self.config.llm_provider
            );
            Provider::OpenAi
        });
        self.classifier = Some(Arc::new(Classifier::new(
            provider,
            self.config.llm_api_key.clone(),
            self.config.llm_model.clone(),
            self.config.themes.clone(),
            UserConfig::config_dir().join(CACHE_FILE),
        )));

        let backend = if self.config.simulation_mode {
            log::info!("[App] Simulation mode: playlist writes are recorded only");
            PlaylistSync::DryRun(DryRunSync::new())
        } else {
            PlaylistSync::Spotify(SpotifySync::new(
                self.token.clone().unwrap_or_default(),
                self.config.themes.clone(),
            ))
        };
        let (worker, events) = SyncWorker::spawn(backend);
        self.sync = Some(worker);
        self.tasks.sync_rx = Some(events);

        // A session resumed in its terminal state was already exported on
        // the run that finished it.
        self.completion_exported = session.is_complete();
        self.screen = if session.is_complete() {
            Screen::Complete
        } else {
            Screen::Classify
        };
        self.session = Some(session);
        self.start_preload();
    }

    fn poll_background(&mut self) {
        if let Some(rx) = self.tasks.auth_rx.take() {
            match rx.try_recv() {
                Ok(Ok(outcome)) => {
                    if let Some(name) = &outcome.display_name {
                        self.show_toast(format!("Logged in as {}", name));
                    }
                    self.token = Some(outcome.token);
                    self.display_name = outcome.display_name;
                    self.start_fetch_tracks();
                    self.start_update_check();
                }
                Ok(Err(e)) => {
                    log::error!("[App] Authentication failed: {}", e);
                    self.setup.error = Some(e);
                    self.screen = Screen::Setup;
                }
                Err(TryRecvError::Empty) => self.tasks.auth_rx = Some(rx),
                Err(TryRecvError::Disconnected) => {
                    self.setup.error = Some("Authentication thread died unexpectedly".to_string());
                    self.screen = Screen::Setup;
                }
            }
        }

        if let Some(rx) = self.tasks.tracks_rx.take() {
            match rx.try_recv() {
                Ok(Ok(tracks)) => self.on_tracks_fetched(tracks),
                Ok(Err(e)) => {
                    log::error!("[App] Liked songs fetch failed: {}", e);
                    self.setup.error = Some(format!("Could not fetch liked songs: {}", e));
                    self.screen = Screen::Setup;
                }
                Err(TryRecvError::Empty) => self.tasks.tracks_rx = Some(rx),
                Err(TryRecvError::Disconnected) => {}
            }
        }

        if let Some(rx) = self.tasks.preload_rx.take() {
            let mut disconnected = false;
            loop {
                match rx.try_recv() {
                    Ok(status) => self.preload = Some(status),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
            if !disconnected {
                self.tasks.preload_rx = Some(rx);
            }
        }

        if let Some(rx) = self.tasks.sync_rx.take() {
            let mut disconnected = false;
            loop {
                match rx.try_recv() {
                    Ok(outcome) => self.record_sync_outcome(outcome),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
            if !disconnected {
                self.tasks.sync_rx = Some(rx);
            }
        }

        if let Some(rx) = self.tasks.update_rx.take() {
            match rx.try_recv() {
                Ok(Ok(Some(info))) => {
                    log::info!("[App] Update available: v{}", info.latest);
                    self.update_info = Some(info);
                }
                Ok(_) => {}
                Err(TryRecvError::Empty) => self.tasks.update_rx = Some(rx),
                Err(TryRecvError::Disconnected) => {}
            }
        }
    }

    fn record_sync_outcome(&mut self, outcome: SyncOutcome) {
        match &outcome.result {
            Ok(()) => {
                // a later success clears an earlier failure for the same pair
                self.sync_failures.retain(|f| {
                    f.track_id != outcome.track_id || f.theme_key != outcome.theme_key
                });
            }
            Err(_) => self.sync_failures.push(outcome),
        }
    }

    // === Session actions ===

    pub fn current_track(&self) -> Option<&Track> {
        let session = self.session.as_ref()?;
        let id = session.current_track_id()?;
        self.track_by_id.get(id).map(|&i| &self.tracks[i])
    }

    fn decide(&mut self, theme_key: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.current_index >= session.track_ids.len() {
            return;
        }
        let Some(track_id) = session.current_track_id().map(str::to_string) else {
            return;
        };
        let Some(&idx) = self.track_by_id.get(&track_id) else {
            log::warn!("[App] Current track {} missing from fetch, skipping decide", track_id);
            return;
        };
        let track = self.tracks[idx].clone();
        let Some(sync) = self.sync.as_ref() else {
            return;
        };
        classify_track::decide(session, &track, theme_key, sync, &self.progress_store);
        self.after_mutation();
    }

    fn skip(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.current_index >= session.track_ids.len() {
            return;
        }
        let Some(track_id) = session.current_track_id().map(str::to_string) else {
            return;
        };
        let Some(&idx) = self.track_by_id.get(&track_id) else {
            return;
        };
        let track = self.tracks[idx].clone();
        classify_track::skip(session, &track, &self.progress_store);
        self.after_mutation();
    }

    fn undo(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(sync) = self.sync.as_ref() else {
            return;
        };
        match undo_decision::undo(session, sync, &self.progress_store) {
            Some(undone) => {
                self.show_toast(format!("Undid decision for \"{}\"", undone.track_name));
                self.screen = Screen::Classify;
                self.start_preload();
            }
            None => self.show_toast("Nothing to undo".to_string()),
        }
    }

    fn after_mutation(&mut self) {
        let complete = self
            .session
            .as_ref()
            .map(|s| s.is_complete())
            .unwrap_or(false);
        if complete {
            if !self.completion_exported {
                self.completion_exported = true;
                self.export_decisions(false);
                self.show_toast(format!(
                    "All {} tracks classified! Exported to {}",
                    self.tracks.len(),
                    self.export_path.display()
                ));
            }
            self.screen = Screen::Complete;
        } else {
            self.start_preload();
        }
    }

    fn export_decisions(&mut self, announce: bool) {
        let result = match self.session.as_ref() {
            Some(session) => export_session::export(session, &self.export_path),
            None => return,
        };
        match result {
            Ok(path) => {
                if announce {
                    self.show_toast(format!("CSV exported to {}", path.display()));
                }
            }
            Err(e) => {
                log::error!("[App] Export failed: {}", e);
                self.show_toast(format!("Export failed: {}", e));
            }
        }
    }

    fn stop_and_clear(&mut self, ctx: &egui::Context) {
        if let Err(e) = self.progress_store.clear() {
            log::error!("[App] Could not delete progress: {}", e);
        }
        self.session = None;
        self.tasks.clear_all();
        log::info!("[App] Progress cleared, closing");
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn save_setup(&mut self) {
        self.config.spotify_client_id = self.setup.client_id.trim().to_string();
        self.config.spotify_client_secret = self.setup.client_secret.trim().to_string();
        self.config.spotify_redirect_uri = self.setup.redirect_uri.trim().to_string();
        self.config.llm_provider = self.setup.llm_provider.trim().to_string();
        self.config.llm_api_key = self.setup.llm_api_key.trim().to_string();
        self.config.llm_model = self.setup.llm_model.trim().to_string();
        self.config.simulation_mode = self.setup.simulation_mode;

        if let Err(e) = self.config.save() {
            self.setup.error = Some(format!("Could not save config: {}", e));
            return;
        }
        if !self.config.is_configured() {
            self.setup.error =
                Some("Spotify credentials and an LLM API key are required".to_string());
            return;
        }
        self.setup.error = None;
        self.start_auth();
    }

    pub fn show_toast(&mut self, message: String) {
        self.toast = Some((message, Instant::now()));
    }

    // === Input ===

    fn handle_keys(&mut self, ctx: &egui::Context) -> Option<UiAction> {
        if self.screen != Screen::Classify || self.show_stop_confirm || ctx.wants_keyboard_input()
        {
            return None;
        }
        let themes = self.config.themes.clone();
        ctx.input(|i| {
            for theme in &themes {
                let name = theme.shortcut.to_uppercase().to_string();
                if let Some(key) = egui::Key::from_name(&name) {
                    if i.key_pressed(key) {
                        return Some(UiAction::Decide(theme.key.clone()));
                    }
                }
            }
            if i.key_pressed(egui::Key::S) {
                return Some(UiAction::Skip);
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                return Some(UiAction::Undo);
            }
            if i.key_pressed(egui::Key::Escape) {
                return Some(UiAction::Pause);
            }
            None
        })
    }

    fn apply_action(&mut self, action: UiAction, ctx: &egui::Context) {
        match action {
            UiAction::Decide(theme_key) => self.decide(&theme_key),
            UiAction::Skip => self.skip(),
            UiAction::Undo => self.undo(),
            UiAction::Export => self.export_decisions(true),
            UiAction::Pause => {
                log::info!("[App] Pausing, progress stays on disk");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            UiAction::RequestStopClear => self.show_stop_confirm = true,
            UiAction::CancelStopClear => self.show_stop_confirm = false,
            UiAction::ConfirmStopClear => {
                self.show_stop_confirm = false;
                self.stop_and_clear(ctx);
            }
            UiAction::SaveSetup => self.save_setup(),
        }
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.preload {
                    Some(status) => {
                        let state = if let Some(error) = &status.error {
                            format!("partial, {}", error)
                        } else if status.running {
                            "running".to_string()
                        } else {
                            "ready".to_string()
                        };
                        ui.label(format!(
                            "AI preload: {}/{} ({})",
                            status.done, status.total, state
                        ));
                    }
                    None => {
                        ui.label("AI preload: idle");
                    }
                }
                ui.separator();
                if self.sync_failures.is_empty() {
                    ui.label("Sync: ok");
                } else {
                    ui.colored_label(
                        egui::Color32::from_rgb(220, 80, 80),
                        format!("Sync: {} failed", self.sync_failures.len()),
                    );
                }
                if let Some(info) = &self.update_info {
                    ui.separator();
                    ui.hyperlink_to(format!("Update v{} available", info.latest), &info.release_url);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("v{}", crate::APP_VERSION));
                    if let Some(name) = &self.display_name {
                        ui.label(name);
                        ui.separator();
                    }
                });
            });
        });
    }

    fn render_toast(&mut self, ctx: &egui::Context) {
        let Some((message, shown_at)) = &self.toast else {
            return;
        };
        if shown_at.elapsed() > Duration::from_secs(TOAST_DURATION_SECS) {
            self.toast = None;
            return;
        }
        let message = message.clone();
        egui::TopBottomPanel::bottom("toast").show(ctx, |ui| {
            ui.label(message);
        });
    }
}

impl eframe::App for ClassifyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background();

        let mut action = self.handle_keys(ctx);

        self.render_status_bar(ctx);
        self.render_toast(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let screen_action = match self.screen {
                Screen::Setup => screens::setup::render(self, ui),
                Screen::Loading => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() * 0.4);
                        ui.spinner();
                        ui.add_space(8.0);
                        ui.label(&self.status_line);
                    });
                    None
                }
                Screen::Classify => screens::classify::render(self, ui),
                Screen::Complete => screens::complete::render(self, ui),
            };
            if action.is_none() {
                action = screen_action;
            }
        });

        if self.show_stop_confirm {
            let mut confirm_action = None;
            egui::Window::new("Stop & Clear")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("This will delete all progress. Continue?");
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            confirm_action = Some(UiAction::CancelStopClear);
                        }
                        let delete = egui::Button::new(
                            egui::RichText::new("Delete").color(egui::Color32::WHITE),
                        )
                        .fill(egui::Color32::from_rgb(180, 60, 60));
                        if ui.add(delete).clicked() {
                            confirm_action = Some(UiAction::ConfirmStopClear);
                        }
                    });
                });
            if confirm_action.is_some() {
                action = confirm_action;
            }
        }

        if let Some(action) = action {
            self.apply_action(action, ctx);
        }

        // keep polling background channels while work is in flight
        ctx.request_repaint_after(Duration::from_millis(200));
    }
}
