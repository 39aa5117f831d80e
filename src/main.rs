use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curebot::config::ClientConfig;
use curebot::relay::RelayPipelineBuilder;
use curebot::ui::CureBotApp;
use curebot::voice::VoicePipeline;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curebot=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CureBot health assistant");

    let config = ClientConfig::from_env();
    config.validate().map_err(|e| anyhow!(e))?;

    let wake_configured = config.voice.enabled
        && config
            .voice
            .wake_phrase
            .as_deref()
            .is_some_and(|phrase| !phrase.trim().is_empty());

    // Relay worker owns the backend channel
    let mut relay = RelayPipelineBuilder::new()
        .with_config(config.relay.clone())
        .build();
    let relay_handle = relay.handle();
    let relay_events = relay.event_receiver();
    relay.start_worker()?;

    // Voice worker owns recognition and synthesis
    let voice = VoicePipeline::new(config.voice.clone());
    let voice_handle = voice.handle();
    let voice_events = voice.event_receiver();
    let _voice_worker = voice.start_worker()?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CureBot")
            .with_inner_size([480.0, 760.0])
            .with_min_inner_size([360.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CureBot",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(CureBotApp::new(
                cc,
                relay_handle,
                relay_events,
                voice_handle,
                voice_events,
                wake_configured,
            )))
        }),
    )
    .map_err(|e| anyhow!("UI error: {e}"))?;

    Ok(())
}
