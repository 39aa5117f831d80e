//! Message list component
//!
//! Displays the conversation history with support for text and image messages.

use crate::messages::{ImageData, Message, MessageContent, Sender};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, RichText};

/// Message list component
pub struct MessageList<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let messages = self.state.messages.get_all();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(self.theme.spacing);

                    for message in &messages {
                        self.show_message(ui, message);
                        ui.add_space(self.theme.spacing_sm);
                    }

                    // Typing dots while a backend reply is outstanding
                    if self.state.awaiting_reply {
                        self.show_typing_indicator(ui);
                    }

                    ui.add_space(self.theme.spacing);
                });
            });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let is_user = matches!(message.sender, Sender::User);
        let bubble_color = if is_user {
            self.theme.user_bubble
        } else {
            self.theme.bot_bubble
        };

        let text_color = self.theme.text_primary;

        // Align messages based on sender
        let align = if is_user { Align::RIGHT } else { Align::LEFT };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            // Sender label, with a mic marker for spoken turns
            let sender_label = match (is_user, message.metadata.is_speech) {
                (true, true) => "You 🎤",
                (true, false) => "You",
                (false, _) => "CureBot",
            };
            ui.label(
                RichText::new(sender_label)
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(2.0);

            // Message bubble
            let max_width = ui.available_width() * 0.75;

            egui::Frame::none()
                .fill(bubble_color)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);

                    match &message.content {
                        MessageContent::Text(text) => {
                            ui.label(RichText::new(text).color(text_color));
                        }
                        MessageContent::Image(image) => {
                            self.show_image_message(ui, image, text_color);
                        }
                    }
                });

            // Timestamp, plus the backend round-trip for correlated replies
            let mut stamp = message
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%H:%M")
                .to_string();
            if let Some(ms) = message.metadata.processing_time_ms {
                stamp = format!("{} ({}ms)", stamp, ms);
            }
            ui.label(
                RichText::new(stamp)
                    .size(10.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_image_message(&self, ui: &mut egui::Ui, image: &ImageData, text_color: Color32) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("🖼").size(24.0));
            ui.vertical(|ui| {
                ui.label(RichText::new(&image.name).color(text_color).strong());
                ui.label(
                    RichText::new(format!("{:.1} KB", image.data.len() as f32 / 1024.0))
                        .size(11.0)
                        .color(text_color.gamma_multiply(0.7)),
                );
            });
        });
    }

    fn show_typing_indicator(&self, ui: &mut egui::Ui) {
        ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
            ui.label(
                RichText::new("CureBot")
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(2.0);

            egui::Frame::none()
                .fill(self.theme.bot_bubble)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for i in 0..3 {
                            let t = ui.ctx().input(|i| i.time);
                            let alpha = ((t * 3.0 + i as f64 * 0.5).sin() * 0.5 + 0.5) as f32;
                            ui.label(
                                RichText::new("●")
                                    .size(10.0)
                                    .color(self.theme.text_muted.gamma_multiply(alpha)),
                            );
                        }
                    });
                });
        });

        // Request repaint for the animation
        ui.ctx().request_repaint();
    }
}
