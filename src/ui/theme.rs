//! Visual theme
//!
//! Two palettes around the clinical teal accent. Light is the default.

use egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    /// Accent used for buttons and highlights
    pub primary: Color32,
    pub user_bubble: Color32,
    pub bot_bubble: Color32,

    pub recording: Color32,
    pub warning: Color32,
    pub error: Color32,
    pub success: Color32,

    pub spacing: f32,
    pub spacing_sm: f32,
    pub spacing_lg: f32,

    pub card_rounding: f32,
    pub bubble_rounding: f32,
    pub button_rounding: f32,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            bg_primary: Color32::from_rgb(224, 247, 250),
            bg_secondary: Color32::from_rgb(243, 250, 249),
            bg_tertiary: Color32::from_rgb(223, 238, 236),

            text_primary: Color32::from_rgb(28, 43, 42),
            text_secondary: Color32::from_rgb(62, 84, 82),
            text_muted: Color32::from_rgb(118, 138, 136),

            primary: Color32::from_rgb(0, 121, 107),
            user_bubble: Color32::from_rgb(200, 230, 201),
            bot_bubble: Color32::from_rgb(241, 248, 233),

            recording: Color32::from_rgb(229, 57, 53),
            warning: Color32::from_rgb(249, 168, 37),
            error: Color32::from_rgb(198, 40, 40),
            success: Color32::from_rgb(46, 125, 50),

            spacing: 12.0,
            spacing_sm: 6.0,
            spacing_lg: 24.0,

            card_rounding: 10.0,
            bubble_rounding: 12.0,
            button_rounding: 22.0,
        }
    }

    pub fn dark() -> Self {
        Self {
            bg_primary: Color32::from_rgb(18, 26, 25),
            bg_secondary: Color32::from_rgb(26, 36, 35),
            bg_tertiary: Color32::from_rgb(36, 48, 47),

            text_primary: Color32::from_rgb(229, 239, 238),
            text_secondary: Color32::from_rgb(178, 196, 194),
            text_muted: Color32::from_rgb(124, 140, 138),

            primary: Color32::from_rgb(38, 166, 154),
            user_bubble: Color32::from_rgb(27, 77, 62),
            bot_bubble: Color32::from_rgb(33, 44, 43),

            recording: Color32::from_rgb(239, 83, 80),
            warning: Color32::from_rgb(251, 192, 45),
            error: Color32::from_rgb(229, 115, 115),
            success: Color32::from_rgb(102, 187, 106),

            spacing: 12.0,
            spacing_sm: 6.0,
            spacing_lg: 24.0,

            card_rounding: 10.0,
            bubble_rounding: 12.0,
            button_rounding: 22.0,
        }
    }

    /// Push the palette into egui's visuals
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = if self.is_dark() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_secondary;
        visuals.override_text_color = Some(self.text_primary);
        visuals.selection.bg_fill = self.primary.gamma_multiply(0.35);
        visuals.widgets.noninteractive.bg_fill = self.bg_secondary;

        ctx.set_visuals(visuals);
    }

    fn is_dark(&self) -> bool {
        // Perceived luma of the main background
        let [r, g, b, _] = self.bg_primary.to_array();
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        luma < 128.0
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
