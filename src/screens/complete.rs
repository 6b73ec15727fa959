use eframe::egui;

use crate::app::ClassifyApp;

use super::UiAction;

/// Terminal screen once every track has a decision.
pub fn render(app: &mut ClassifyApp, ui: &mut egui::Ui) -> Option<UiAction> {
    let mut action = None;

    let Some(session) = app.session.as_ref() else {
        ui.label("No session");
        return None;
    };
    let classified = session.decisions.iter().filter(|d| !d.skipped).count();
    let skipped = session.decisions.len() - classified;

    ui.add_space(ui.available_height() * 0.25);
    ui.vertical_centered(|ui| {
        ui.heading(format!("All {} tracks classified!", session.track_ids.len()));
        ui.add_space(8.0);
        ui.label(format!(
            "{} assigned to playlists, {} skipped",
            classified, skipped
        ));
        ui.label(format!("Export: {}", app.export_path.display()));
        ui.add_space(16.0);

        ui.horizontal(|ui| {
            // center the button row
            ui.add_space(ui.available_width() * 0.25);
            if ui.button("Export CSV again").clicked() {
                action = Some(UiAction::Export);
            }
            if ui.button("Undo last decision").clicked() {
                action = Some(UiAction::Undo);
            }
            if ui.button("Stop & Clear").clicked() {
                action = Some(UiAction::RequestStopClear);
            }
        });
    });

    action
}
