//! Input bar component
//!
//! Provides quick-reply buttons, text input, push-to-talk record button, and
//! send controls.

use crate::ui::state::{AppState, RecordingState};
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

/// Input bar component for text and voice input
pub struct InputBar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                // Quick replies while the wizard offers canonical choices
                if let Some(choices) = self.state.session.quick_replies() {
                    self.show_quick_replies(ui, choices);
                    ui.add_space(self.theme.spacing_sm);
                }

                ui.horizontal(|ui| {
                    // Record button
                    self.show_record_button(ui);

                    ui.add_space(self.theme.spacing_sm);

                    // Text input
                    self.show_text_input(ui);

                    ui.add_space(self.theme.spacing_sm);

                    // Send button
                    self.show_send_button(ui);
                });
            });
    }

    fn show_quick_replies(&mut self, ui: &mut egui::Ui, choices: &'static [&'static str]) {
        ui.horizontal(|ui| {
            for choice in choices {
                let button = egui::Button::new(
                    RichText::new(*choice).size(14.0).color(self.theme.primary),
                )
                .min_size(Vec2::new(72.0, 32.0))
                .rounding(self.theme.button_rounding)
                .fill(self.theme.bg_tertiary);

                if ui.add(button).clicked() {
                    self.state.send_choice(choice);
                }
            }
        });
    }

    fn show_record_button(&mut self, ui: &mut egui::Ui) {
        let is_recording = self.state.recording_state == RecordingState::Recording;
        let is_processing = self.state.recording_state == RecordingState::Processing;
        let voice_ok = self.state.voice_available;

        let (icon, tooltip, color) = match self.state.recording_state {
            RecordingState::Idle => ("🎤", "Hold to talk", self.theme.text_secondary),
            RecordingState::Recording => ("⏹", "Release to stop", self.theme.recording),
            RecordingState::Processing => ("⏳", "Transcribing...", self.theme.warning),
        };

        let button = egui::Button::new(RichText::new(icon).size(20.0).color(color))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding);

        let button = if is_recording {
            button.fill(self.theme.recording.gamma_multiply(0.2))
        } else {
            button
        };

        let response = ui.add_enabled(voice_ok && !is_processing, button);

        // Store rect before consuming response with on_hover_text
        let button_rect = response.rect;

        let is_hovered = response.hovered();
        let is_pointer_down = response.is_pointer_button_down_on();
        let was_right_clicked = response.secondary_clicked();

        if is_hovered {
            let hover = if voice_ok {
                tooltip
            } else {
                "Voice input unavailable on this device"
            };
            response.on_hover_text(hover);
        }

        // Push-to-talk: press starts a turn, release ends it
        if is_pointer_down && !is_recording && !is_processing {
            self.state.start_recording();
        } else if !is_pointer_down && is_recording {
            self.state.stop_recording();
        }

        // Right-click discards the turn
        if was_right_clicked && is_recording {
            self.state.cancel_recording();
        }

        // Pulsing ring while recording
        if is_recording {
            let t = ui.ctx().input(|i| i.time);
            let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

            let painter = ui.painter();
            let center = button_rect.center();
            let radius = button_rect.width() / 2.0 + 2.0 + pulse * 3.0;

            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(
                    2.0 * pulse,
                    self.theme.recording.gamma_multiply(1.0 - pulse * 0.5),
                ),
            );

            ui.ctx().request_repaint();
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        let is_recording = self.state.recording_state != RecordingState::Idle;

        // Reserve space for the send button
        let available_width = ui.available_width() - 60.0;

        let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
            .hint_text("Type a message...")
            .desired_width(available_width)
            .font(egui::TextStyle::Body)
            .margin(egui::Margin::symmetric(12.0, 8.0));

        let response = ui.add_enabled(!is_recording, text_edit);

        // Enter sends; egui drops focus on Enter, so grab it back
        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            self.state.send_message();
            response.request_focus();
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let can_send = !self.state.input_text.trim().is_empty()
            && self.state.recording_state == RecordingState::Idle;

        let button_color = if can_send {
            self.theme.primary
        } else {
            self.theme.text_muted
        };

        let button = egui::Button::new(RichText::new("➤").size(18.0).color(egui::Color32::WHITE))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding)
            .fill(button_color);

        let response = ui.add_enabled(can_send, button);

        if response.clicked() {
            self.state.send_message();
        }

        response.on_hover_text("Send message (Enter)");
    }
}
