mod api;
mod app;
mod classifier;
mod constants;
mod models;
mod screens;
mod services;
mod state;
mod storage;
mod usecases;
mod utils;

use app::ClassifyApp;
use eframe::egui;

// App version and metadata
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "TidyRS";
pub const APP_DESCRIPTION: &str = "Spotify Liked Songs Classifier";

fn main() -> Result<(), eframe::Error> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("{} {}", APP_NAME, APP_VERSION);
        return Ok(());
    }

    // .env lets developers override config without touching config.json
    let _ = dotenvy::dotenv();

    // Set RUST_LOG=debug for verbose output, RUST_LOG=info for normal logs
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("[Main] Starting {} v{}", APP_NAME, APP_VERSION);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{} - {}",
                APP_NAME, APP_VERSION, APP_DESCRIPTION
            ))
            .with_inner_size([constants::APP_WIDTH, constants::APP_HEIGHT])
            .with_min_inner_size([760.0, 560.0]),
        persist_window: true, // Remember window position
        ..Default::default()
    };

    eframe::run_native(
        &format!("{} v{}", APP_NAME, APP_VERSION),
        options,
        Box::new(|cc| Ok(Box::new(ClassifyApp::new(cc)))),
    )
}
