//! Main application struct and eframe integration
//!
//! This module contains the main CureBotApp that implements eframe::App.

use crate::relay::{ChannelState, RelayEvent, RelayHandle};
use crate::ui::components::{DebugPanel, InputBar, MessageList};
use crate::ui::state::{AppState, RecordingState};
use crate::ui::theme::Theme;
use crate::voice::{VoiceEvent, VoiceHandle};
use crossbeam_channel::Receiver;
use egui::{self, CentralPanel, RichText, Sense, SidePanel, TopBottomPanel, Vec2};
use std::time::{Duration, Instant};

/// Main CureBot application
pub struct CureBotApp {
    /// Application state
    state: AppState,
    /// Visual theme
    theme: Theme,
    /// Dark theme toggle
    dark_mode: bool,
    /// Last frame time for FPS calculation
    last_frame_time: Instant,
    /// Whether the first-frame setup has run
    initialized: bool,
}

impl CureBotApp {
    /// Create a new CureBot application wired to the worker channels
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        relay: RelayHandle,
        relay_events: Receiver<RelayEvent>,
        voice: VoiceHandle,
        voice_events: Receiver<VoiceEvent>,
        wake_configured: bool,
    ) -> Self {
        let theme = Theme::light();
        theme.apply(&cc.egui_ctx);

        let mut state = AppState::new();
        state.relay = Some(relay);
        state.relay_events = Some(relay_events);
        state.voice = Some(voice);
        state.voice_events = Some(voice_events);
        state.wake_configured = wake_configured;
        state.wake_enabled = wake_configured;

        Self {
            state,
            theme,
            dark_mode: false,
            last_frame_time: Instant::now(),
            initialized: false,
        }
    }

    /// Start the conversation and open the channel (called on first frame)
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        self.state.debug_info.add_log("CureBot UI initialized".to_string());
        self.state.begin_session();
        self.initialized = true;
    }

    /// Show the top header bar
    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    // App title
                    ui.label(
                        RichText::new("CureBot")
                            .size(20.0)
                            .strong()
                            .color(self.theme.primary),
                    );

                    ui.label(
                        RichText::new("Health Assistant")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        // Theme toggle
                        let theme_icon = if self.dark_mode { "☀" } else { "🌙" };
                        if ui.button(theme_icon).on_hover_text("Toggle theme").clicked() {
                            self.dark_mode = !self.dark_mode;
                            self.theme = if self.dark_mode {
                                Theme::dark()
                            } else {
                                Theme::light()
                            };
                            self.theme.apply(ctx);
                        }

                        // Debug toggle
                        if ui.button("🔍").on_hover_text("Toggle Debug Panel").clicked() {
                            self.state.show_debug_panel = !self.state.show_debug_panel;
                        }

                        // Restart conversation
                        if ui.button("🗑").on_hover_text("Restart conversation").clicked() {
                            self.state.clear_messages();
                        }

                        ui.add_space(8.0);

                        // Channel status dot
                        self.show_status(ui);
                    });
                });
            });
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        let (color, label) = match self.state.channel_state() {
            ChannelState::Open => (self.theme.success, "Online"),
            ChannelState::Connecting => (self.theme.warning, "Connecting"),
            ChannelState::Closed => (self.theme.error, "Offline"),
        };

        ui.label(RichText::new(label).size(11.0).color(self.theme.text_muted));
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
        ui.painter().circle_filled(rect.center(), 4.0, color);
    }

    /// Show the bottom input area
    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    /// Show the debug panel on the side
    fn show_debug_panel(&mut self, ctx: &egui::Context) {
        if !self.state.show_debug_panel {
            return;
        }

        SidePanel::right("debug_panel")
            .resizable(true)
            .default_width(300.0)
            .min_width(250.0)
            .max_width(500.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                DebugPanel::new(&mut self.state, &self.theme).show(ui);
            });
    }

    /// Show the main content area (message list)
    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                MessageList::new(&self.state, &self.theme).show(ui);
            });
    }

    /// Route a dropped file into the transcript as an image analysis request
    fn handle_dropped_file(&mut self, file: egui::DroppedFile) {
        let name = file
            .path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file.name.clone());

        let bytes = if let Some(bytes) = file.bytes {
            bytes.to_vec()
        } else if let Some(path) = &file.path {
            match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    self.state
                        .debug_info
                        .add_log(format!("Could not read {}: {}", name, err));
                    return;
                }
            }
        } else {
            return;
        };

        if !is_image_name(&name) {
            self.state
                .debug_info
                .add_log(format!("Ignored non-image drop: {}", name));
            return;
        }

        self.state.handle_dropped_image(name, bytes);
    }
}

impl eframe::App for CureBotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Calculate delta time for FPS
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f64();
        self.last_frame_time = now;
        self.state.update_fps(delta);

        // Initialize on first frame
        self.initialize();

        // Poll worker events
        self.state.poll_events();

        // Dropped images go to the analysis endpoint
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            self.handle_dropped_file(file);
        }

        // Render UI
        self.show_header(ctx);
        self.show_debug_panel(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);

        // Animations need every frame; otherwise poll worker events at a
        // slower cadence so replies show up without user input
        if self.state.awaiting_reply || self.state.recording_state != RecordingState::Idle {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.shutdown_workers();
    }
}

fn is_image_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ["png", "jpg", "jpeg", "gif", "webp", "bmp"]
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}
