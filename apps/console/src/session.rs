//! Line-driven sessions over a [`BrowserController`].

use std::{future::Future, io::Write, path::Path};

use anyhow::{bail, Context, Result};
use browser_env::{BrowserEnvironment, EnvError};
use harness::BrowserController;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

const PROMPT: &str = "> ";

/// Lines that end an interactive session.
fn is_exit(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit")
}

/// Script lines worth running: not blank and not a `#` comment.
pub fn script_commands(source: &str) -> impl Iterator<Item = &str> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Initializes the controller and writes the greeting. Fails when the
/// browser did not come up.
pub async fn start<E, F, Fut>(
    controller: &mut BrowserController<E>,
    launch: F,
    config_file: &Path,
    out: &mut impl Write,
) -> Result<()>
where
    E: BrowserEnvironment,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<E, EnvError>>,
{
    let lines = controller.initialize_report(launch, config_file).await;
    for line in &lines {
        writeln!(out, "{line}")?;
    }
    if !controller.is_initialized() {
        bail!("browser could not be initialized from {}", config_file.display());
    }
    Ok(())
}

/// Reads commands from `input` until EOF or `exit`, answering each one.
pub async fn run_repl<E, R>(
    controller: &mut BrowserController<E>,
    input: R,
    out: &mut impl Write,
) -> Result<usize>
where
    E: BrowserEnvironment,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next_line().await.context("failed to read command")? else {
            writeln!(out)?;
            break;
        };
        if is_exit(&line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let reply = controller.handle_line(&line).await;
        writeln!(out, "{reply}\n")?;
        handled += 1;
    }
    Ok(handled)
}

/// Runs every command in `source`, then writes the final observation.
pub async fn run_script<E>(
    controller: &mut BrowserController<E>,
    source: &str,
    out: &mut impl Write,
) -> Result<usize>
where
    E: BrowserEnvironment,
{
    let mut handled = 0;
    for line in script_commands(source) {
        let reply = controller.handle_line(line).await;
        writeln!(out, "{reply}\n")?;
        handled += 1;
    }
    info!(commands = handled, "script finished");

    if let Some(observation) = controller.observation() {
        writeln!(out, "Final observation:\n{}", observation.text)?;
    }
    Ok(handled)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
