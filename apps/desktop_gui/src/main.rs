use std::{path::PathBuf, time::Duration};

mod backend_bridge;
mod controller;
mod ui;

use browser_env::EnvOptions;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

use backend_bridge::{commands::BackendCommand, runtime::BackendSettings};
use controller::events::UiEvent;
use ui::ChatApp;

const WINDOW_TITLE: &str = "Browser Automation Chat";

#[derive(Parser, Debug)]
#[command(about = "Chat window that drives a browser one command at a time")]
struct Args {
    /// Task configuration the browser is reset to.
    #[arg(long, env = "BROWSER_CONFIG_FILE", default_value = "config_files/51.json")]
    config_file: PathBuf,
    /// Run Chromium without a visible window.
    #[arg(long, env = "BROWSER_HEADLESS")]
    headless: bool,
    /// Pause after each action, in milliseconds.
    #[arg(long, env = "BROWSER_SLOW_MO_MS", default_value_t = 100)]
    slow_mo_ms: u64,
    /// Save a screenshot of every step into this directory.
    #[arg(long, env = "BROWSER_SCREENSHOT_DIR")]
    screenshot_dir: Option<PathBuf>,
}

impl Args {
    fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            config_file: self.config_file.clone(),
            options: EnvOptions {
                headless: self.headless,
                slow_mo: Duration::from_millis(self.slow_mo_ms),
                screenshot_dir: self.screenshot_dir.clone(),
                ..EnvOptions::default()
            },
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(args.backend_settings(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };
    let config_file = args.config_file;
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(ChatApp::new(cmd_tx, ui_rx, config_file)))),
    )
}
