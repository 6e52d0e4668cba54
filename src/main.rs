//! Voicetype binary: wires config, telemetry, model discovery, the
//! pipeline, and the hotkey into the event loop.

use anyhow::Result;
use global_hotkey::GlobalHotKeyEvent;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};

use voicetype::config::Config;
use voicetype::focus::XdotoolFocus;
use voicetype::inject::XdotoolTyper;
use voicetype::input::HotkeyBinding;
use voicetype::pipeline::Pipeline;
use voicetype::recognition::{locate_model, SpeechEngine, VoskEngine};
use voicetype::status::{self, Status};
use voicetype::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    telemetry::init(config.telemetry.enabled, &config.telemetry.log_path)?;
    tracing::info!("voicetype starting");
    println!("✓ Config loaded from ~/.voicetype.toml");

    let (status_sink, mut status_rx) = status::channel();

    // Model absence is non-fatal; recording start is rejected until a
    // model is installed.
    let engine: Option<Arc<Mutex<dyn SpeechEngine>>> = locate_model(&config.model.paths).and_then(
        |path| match VoskEngine::load(&path, config.audio.sample_rate) {
            Ok(engine) => Some(Arc::new(Mutex::new(engine)) as Arc<Mutex<dyn SpeechEngine>>),
            Err(e) => {
                tracing::warn!("model load failed: {}", e);
                None
            }
        },
    );
    if engine.is_some() {
        println!("✓ Model loaded");
    } else {
        status_sink.publish(Status::ModelMissing);
    }

    let pipeline = Pipeline::new(
        engine,
        Arc::new(XdotoolFocus::default()),
        Arc::new(XdotoolTyper::default()),
        status_sink,
        config.audio.clone(),
        config.drain.clone(),
    );

    // Hotkey wiring is purely additive; without it the app runs
    // toggle-only via stdin.
    let hotkey = match HotkeyBinding::try_bind(&config.hotkey) {
        Ok(binding) => {
            println!(
                "✓ Hotkey registered: {:?} + {}",
                config.hotkey.modifiers, config.hotkey.key
            );
            Some(binding)
        }
        Err(e) => {
            tracing::warn!("global hotkey unavailable: {}", e);
            println!("✗ Global hotkey unavailable - press Enter to toggle");
            None
        }
    };

    println!("\nVoicetype is running. Toggle recording with the hotkey or Enter.");
    println!("Press Ctrl+C to exit.\n");

    let hotkey_events = GlobalHotKeyEvent::receiver();
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        // Poll for hotkey events
        if let Some(binding) = &hotkey {
            if let Ok(event) = hotkey_events.try_recv() {
                if binding.is_toggle_press(&event) {
                    pipeline.toggle();
                }
            }
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                println!("\nShutting down...");
                break;
            }
            line = stdin_lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(_)) => pipeline.toggle(),
                    _ => stdin_open = false,
                }
            }
            Some(update) = status_rx.recv() => {
                tracing::info!(status = %update, "status");
                println!("{update}");
            }
            _ = tokio::time::sleep(tokio::time::Duration::from_millis(10)) => {
                // Poll interval (10ms to avoid busy-waiting)
            }
        }
    }

    Ok(())
}
