//! Runtime bridge between UI command queue and the browser controller.

use std::{future::Future, path::PathBuf, thread};

use browser_env::{BrowserEnvironment, ChromiumEnv, EnvError, EnvOptions};
use crossbeam_channel::{Receiver, Sender};
use harness::{BrowserController, WELCOME_MESSAGE};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub config_file: PathBuf,
    pub options: EnvOptions,
}

/// Starts the backend worker thread. The worker initializes the browser
/// before it reads its first queued command; that initialize answers with
/// exactly one `Output` or `Error`, which `ChatState::default` counts.
pub fn launch(settings: BackendSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let options = settings.options;
            let launch_browser = || ChromiumEnv::launch(options.clone());
            let mut controller = BrowserController::<ChromiumEnv>::new();

            let initial = BackendCommand::Initialize {
                config_file: settings.config_file,
            };
            handle_command(&mut controller, &launch_browser, initial, &ui_tx).await;

            while let Ok(cmd) = cmd_rx.recv() {
                handle_command(&mut controller, &launch_browser, cmd, &ui_tx).await;
            }

            tracing::info!("ui command queue closed; shutting down browser");
            controller.close().await;
        });
    });
}

pub(crate) async fn handle_command<E, F, Fut>(
    controller: &mut BrowserController<E>,
    launch_browser: &F,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) where
    E: BrowserEnvironment,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<E, EnvError>>,
{
    match cmd {
        BackendCommand::Initialize { config_file } => {
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Launching browser for {}",
                config_file.display()
            )));
            match controller.initialize(launch_browser, &config_file).await {
                Ok(url) => {
                    let _ = ui_tx.try_send(UiEvent::Output(format!(
                        "{WELCOME_MESSAGE}\n\nBrowser initialized. Current URL: {url}"
                    )));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "browser initialization failed");
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_controller(
                        UiErrorContext::Initialize,
                        &err,
                    )));
                }
            }
        }
        BackendCommand::Perform { line } => match controller.perform(&line).await {
            Ok(reply) => {
                let _ = ui_tx.try_send(UiEvent::Output(reply.to_string()));
            }
            Err(err) => {
                tracing::warn!(command = line.trim(), error = %err, "command failed");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_controller(
                    UiErrorContext::Perform,
                    &err,
                )));
            }
        },
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
