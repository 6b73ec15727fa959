use eframe::egui;

use crate::app::ClassifyApp;

use super::UiAction;

/// Main classification screen: current track, AI suggestions, one button
/// per theme, and the skip/undo/export controls.
pub fn render(app: &mut ClassifyApp, ui: &mut egui::Ui) -> Option<UiAction> {
    let mut action = None;

    let Some(session) = app.session.as_ref() else {
        ui.label("No session");
        return None;
    };
    let position = session.current_index;
    let total = session.track_ids.len();
    let decided = session
        .decisions
        .iter()
        .filter(|d| !d.skipped)
        .count();
    let skipped = session.decisions.len() - decided;

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.heading(format!("Track {} of {}", position + 1, total));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(format!("{} classified, {} skipped", decided, skipped));
        });
    });
    ui.add(egui::ProgressBar::new(position as f32 / total.max(1) as f32).show_percentage());
    ui.add_space(12.0);

    match app.current_track() {
        Some(track) => {
            ui.label(egui::RichText::new(track.name.as_str()).size(26.0).strong());
            ui.label(egui::RichText::new(track.artist.as_str()).size(18.0));
            let mut details = vec![track.album.clone()];
            if !track.release_date.is_empty() {
                details.push(track.release_date.clone());
            }
            if track.duration_ms > 0 {
                details.push(format_duration(track.duration_ms));
            }
            if let Some(popularity) = track.popularity {
                details.push(format!("popularity {}/100", popularity));
            }
            details.push(if track.explicit { "explicit" } else { "clean" }.to_string());
            ui.label(details.join("  |  "));
        }
        None => {
            ui.label("Track metadata unavailable");
        }
    }

    ui.add_space(12.0);
    ui.separator();
    ui.label(egui::RichText::new("AI suggestions").strong());

    let current_id = session.current_track_id().map(str::to_string);
    let suggestions = match (&current_id, &app.classifier) {
        (Some(id), Some(classifier)) => classifier.get_suggestions(id),
        _ => Vec::new(),
    };
    let known = match (&current_id, &app.classifier) {
        (Some(id), Some(classifier)) => classifier.is_known(id),
        _ => false,
    };

    if suggestions.is_empty() {
        if known {
            ui.label("No suggestion for this track.");
        } else {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Analyzing...");
            });
        }
    } else {
        for suggestion in &suggestions {
            let theme_name = app
                .config
                .theme(&suggestion.theme_key)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| suggestion.theme_key.clone());
            ui.label(format!(
                "{} ({:.0}%) - {}",
                theme_name,
                suggestion.confidence * 100.0,
                suggestion.reasoning
            ));
        }
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(4.0);

    ui.horizontal_wrapped(|ui| {
        for theme in &app.config.themes {
            let label = format!("[{}] {}", theme.shortcut, theme.name);
            if ui
                .add(egui::Button::new(label).min_size(egui::vec2(140.0, 36.0)))
                .on_hover_text(&theme.description)
                .clicked()
            {
                action = Some(UiAction::Decide(theme.key.clone()));
            }
        }
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.button("[S] Skip").clicked() {
            action = Some(UiAction::Skip);
        }
        if ui.button("[\u{2190}] Undo").clicked() {
            action = Some(UiAction::Undo);
        }
        if ui.button("Export CSV").clicked() {
            action = Some(UiAction::Export);
        }
        if ui.button("[Esc] Pause").clicked() {
            action = Some(UiAction::Pause);
        }
        if ui.button("Stop & Clear").clicked() {
            action = Some(UiAction::RequestStopClear);
        }
    });

    if !app.sync_failures.is_empty() {
        ui.add_space(8.0);
        egui::CollapsingHeader::new(format!("Sync issues ({})", app.sync_failures.len()))
            .default_open(false)
            .show(ui, |ui| {
                for failure in &app.sync_failures {
                    let error = failure
                        .result
                        .as_ref()
                        .err()
                        .cloned()
                        .unwrap_or_default();
                    ui.label(format!(
                        "{:?} {} -> {}: {}",
                        failure.action, failure.track_id, failure.theme_key, error
                    ));
                }
            });
    }

    action
}

fn format_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59_999), "0:59");
        assert_eq!(format_duration(187_000), "3:07");
        assert_eq!(format_duration(3_600_000), "60:00");
    }
}
