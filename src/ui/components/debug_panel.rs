//! Debug panel component
//!
//! Displays internal state information for debugging.

use crate::relay::ChannelState;
use crate::ui::state::{AppState, RecordingState};
use crate::ui::theme::Theme;
use egui::{self, RichText, ScrollArea};

/// Debug panel component
pub struct DebugPanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> DebugPanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    // Header
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new("Debug Panel")
                                .strong()
                                .color(self.theme.text_primary),
                        );

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(
                                RichText::new(format!("{:.1} FPS", self.state.debug_info.fps))
                                    .size(12.0)
                                    .family(egui::FontFamily::Monospace)
                                    .color(self.fps_color()),
                            );
                        });
                    });

                    ui.separator();

                    // Stats grid
                    egui::Grid::new("debug_stats")
                        .num_columns(2)
                        .spacing([20.0, 4.0])
                        .show(ui, |ui| {
                            self.stat_row(ui, "Channel", &self.channel_status());
                            self.stat_row(ui, "Voice", &self.voice_status());
                            self.stat_row(ui, "Recording", &self.recording_status());
                            self.stat_row(ui, "Messages", &self.state.messages.len().to_string());
                            self.stat_row(ui, "Setup", &self.setup_status());
                            self.stat_row(ui, "Language", self.state.session.locale());
                            self.stat_row(ui, "Last reply", &self.state.debug_info.last_reply_status);
                        });

                    // Wake listener toggle, only when a phrase is configured
                    if self.state.wake_configured {
                        ui.add_space(self.theme.spacing_sm);
                        let mut wake = self.state.wake_enabled;
                        if ui.checkbox(&mut wake, "Wake phrase listener").changed() {
                            self.state.set_wake_mode(wake);
                        }
                    }

                    // Error display
                    if let Some(error) = &self.state.last_error {
                        ui.add_space(self.theme.spacing_sm);
                        ui.horizontal(|ui| {
                            ui.label(RichText::new("⚠").color(self.theme.error));
                            ui.label(RichText::new(error).size(12.0).color(self.theme.error));
                        });
                    }

                    ui.add_space(self.theme.spacing_sm);
                    ui.separator();

                    // Log messages
                    ui.label(
                        RichText::new("Recent Logs")
                            .size(12.0)
                            .strong()
                            .color(self.theme.text_secondary),
                    );

                    let log_height = 100.0;
                    ScrollArea::vertical()
                        .max_height(log_height)
                        .auto_shrink([false, false])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            ui.vertical(|ui| {
                                for msg in &self.state.debug_info.log_messages {
                                    ui.label(
                                        RichText::new(msg)
                                            .size(11.0)
                                            .family(egui::FontFamily::Monospace)
                                            .color(self.theme.text_muted),
                                    );
                                }

                                if self.state.debug_info.log_messages.is_empty() {
                                    ui.label(
                                        RichText::new("No log messages")
                                            .size(11.0)
                                            .color(self.theme.text_muted)
                                            .italics(),
                                    );
                                }
                            });
                        });
                });
            });
    }

    fn stat_row(&self, ui: &mut egui::Ui, label: &str, value: &str) {
        ui.label(RichText::new(label).size(12.0).color(self.theme.text_muted));

        let display_value = if value.is_empty() { "—" } else { value };

        ui.label(
            RichText::new(display_value)
                .size(12.0)
                .family(egui::FontFamily::Monospace)
                .color(self.theme.text_primary),
        );

        ui.end_row();
    }

    fn channel_status(&self) -> String {
        match self.state.channel_state() {
            ChannelState::Closed => "Closed".to_string(),
            ChannelState::Connecting => "Connecting...".to_string(),
            ChannelState::Open => "Open".to_string(),
        }
    }

    fn voice_status(&self) -> String {
        if self.state.voice_available {
            "Available".to_string()
        } else {
            "Unavailable".to_string()
        }
    }

    fn recording_status(&self) -> String {
        match self.state.recording_state {
            RecordingState::Idle => "Idle".to_string(),
            RecordingState::Recording => "Recording".to_string(),
            RecordingState::Processing => "Transcribing...".to_string(),
        }
    }

    fn setup_status(&self) -> String {
        if self.state.session.is_setup_complete() {
            "Complete".to_string()
        } else {
            "In progress".to_string()
        }
    }

    fn fps_color(&self) -> egui::Color32 {
        let fps = self.state.debug_info.fps;
        if fps >= 55.0 {
            self.theme.success
        } else if fps >= 30.0 {
            self.theme.warning
        } else {
            self.theme.error
        }
    }
}
