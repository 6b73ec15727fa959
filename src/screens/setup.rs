use eframe::egui;

use crate::app::ClassifyApp;
use crate::classifier::Provider;

use super::UiAction;

/// Credentials form, shown on first run and after an auth failure.
pub fn render(app: &mut ClassifyApp, ui: &mut egui::Ui) -> Option<UiAction> {
    let mut action = None;

    ui.add_space(12.0);
    ui.heading("Setup");
    ui.label("Connect your Spotify app and an LLM provider to get started.");
    ui.add_space(8.0);

    if let Some(error) = &app.setup.error {
        ui.colored_label(egui::Color32::from_rgb(220, 80, 80), error);
        ui.add_space(8.0);
    }

    egui::Grid::new("setup_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Spotify client id");
            ui.add(egui::TextEdit::singleline(&mut app.setup.client_id).desired_width(360.0));
            ui.end_row();

            ui.label("Spotify client secret");
            ui.add(
                egui::TextEdit::singleline(&mut app.setup.client_secret)
                    .password(true)
                    .desired_width(360.0),
            );
            ui.end_row();

            ui.label("Redirect URI");
            ui.add(egui::TextEdit::singleline(&mut app.setup.redirect_uri).desired_width(360.0));
            ui.end_row();

            ui.label("LLM provider");
            egui::ComboBox::from_id_salt("llm_provider")
                .selected_text(
                    Provider::from_key(&app.setup.llm_provider)
                        .map(|p| p.label())
                        .unwrap_or("Select..."),
                )
                .show_ui(ui, |ui| {
                    for provider in [Provider::OpenAi, Provider::Anthropic] {
                        ui.selectable_value(
                            &mut app.setup.llm_provider,
                            provider.key().to_string(),
                            provider.label(),
                        );
                    }
                });
            ui.end_row();

            ui.label("LLM API key");
            ui.add(
                egui::TextEdit::singleline(&mut app.setup.llm_api_key)
                    .password(true)
                    .desired_width(360.0),
            );
            ui.end_row();

            ui.label("LLM model");
            ui.add(
                egui::TextEdit::singleline(&mut app.setup.llm_model)
                    .hint_text("leave empty for the provider default")
                    .desired_width(360.0),
            );
            ui.end_row();

            ui.label("Simulation mode");
            ui.checkbox(
                &mut app.setup.simulation_mode,
                "Record playlist changes without touching Spotify",
            );
            ui.end_row();
        });

    ui.add_space(12.0);
    if ui.button("Save & Connect").clicked() {
        action = Some(UiAction::SaveSetup);
    }

    action
}
