use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use browser_env::{ChromiumEnv, EnvOptions};
use clap::{Parser, Subcommand};
use harness::BrowserController;

mod session;

#[derive(Parser, Debug)]
#[command(about = "Drive a browser with chat commands from a terminal or a script")]
struct Cli {
    /// Task configuration the browser is reset to.
    #[arg(long, env = "BROWSER_CONFIG_FILE", default_value = "config_files/51.json")]
    config_file: PathBuf,
    /// Show the Chromium window instead of running headless.
    #[arg(long)]
    headed: bool,
    /// Pause after each action, in milliseconds.
    #[arg(long, env = "BROWSER_SLOW_MO_MS", default_value_t = 100)]
    slow_mo_ms: u64,
    /// Save a screenshot of every step into this directory.
    #[arg(long, env = "BROWSER_SCREENSHOT_DIR")]
    screenshot_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Read commands from stdin until EOF or `exit`.
    Repl,
    /// Run one command per line from a file.
    Script { file: PathBuf },
}

impl Cli {
    fn env_options(&self) -> EnvOptions {
        EnvOptions {
            headless: !self.headed,
            slow_mo: Duration::from_millis(self.slow_mo_ms),
            screenshot_dir: self.screenshot_dir.clone(),
            ..EnvOptions::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    // Read the script up front so a bad path fails before Chromium starts.
    let script = match &cli.command {
        Mode::Script { file } => Some(
            std::fs::read_to_string(file)
                .with_context(|| format!("failed to read script '{}'", file.display()))?,
        ),
        Mode::Repl => None,
    };

    let options = cli.env_options();
    let mut controller = BrowserController::<ChromiumEnv>::new();
    let mut stdout = std::io::stdout();
    session::start(
        &mut controller,
        || ChromiumEnv::launch(options),
        &cli.config_file,
        &mut stdout,
    )
    .await?;

    let outcome = match script {
        Some(source) => session::run_script(&mut controller, &source, &mut stdout).await,
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session::run_repl(&mut controller, stdin, &mut stdout).await
        }
    };
    controller.close().await;
    outcome.map(|_| ())
}
