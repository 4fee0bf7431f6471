use std::{
    fs,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use browser_env::{Action, ElementId, RenderedTree, StepOutcome, TabSummary};

use super::*;

const TREE: &str = "[1] RootWebArea 'Homepage'\n\
\t[12] link 'Scratchpad'\n\
\t[15] textbox 'Search' focused: True";

/// Environment double that records stepped actions.
struct ScriptedEnv {
    url: String,
    observation: Observation,
    steps: Arc<Mutex<Vec<Action>>>,
    fail_next: Option<EnvError>,
}

impl ScriptedEnv {
    fn new(steps: Arc<Mutex<Vec<Action>>>) -> Self {
        Self {
            url: "about:blank".to_string(),
            observation: Observation::default(),
            steps,
            fail_next: None,
        }
    }
}

#[async_trait]
impl BrowserEnvironment for ScriptedEnv {
    async fn reset(&mut self, config: &TaskConfig) -> Result<Observation, EnvError> {
        self.url = config
            .start_urls()
            .into_iter()
            .next()
            .unwrap_or_else(|| "about:blank".to_string());
        let tree = RenderedTree {
            text: TREE.to_string(),
            ..RenderedTree::default()
        };
        self.observation = Observation::new(tree, self.url.clone(), Vec::new(), 0);
        Ok(self.observation.clone())
    }

    async fn step(&mut self, action: &Action) -> Result<StepOutcome, EnvError> {
        self.steps.lock().expect("steps").push(action.clone());
        let result = match self.fail_next.take() {
            Some(err) => Err(err),
            None => {
                if let Action::Goto(url) = action {
                    self.url = url.clone();
                }
                Ok(())
            }
        };
        Ok(StepOutcome::after(action, self.observation.clone(), result))
    }

    async fn current_url(&self) -> Result<String, EnvError> {
        Ok(self.url.clone())
    }

    fn observation(&self) -> &Observation {
        &self.observation
    }

    async fn close(self) -> Result<(), EnvError> {
        Ok(())
    }
}

fn write_task(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("51.json");
    fs::write(&path, r#"{"task_id": 51, "start_url": "http://homepage.test/"}"#).expect("task");
    path
}

async fn ready_controller(
    steps: Arc<Mutex<Vec<Action>>>,
) -> (BrowserController<ScriptedEnv>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_task(&dir);
    let mut controller = BrowserController::new();
    controller
        .initialize(|| async move { Ok(ScriptedEnv::new(steps)) }, &path)
        .await
        .expect("initialize");
    (controller, dir)
}

#[tokio::test]
async fn initialize_report_greets_with_start_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_task(&dir);
    let steps = Arc::new(Mutex::new(Vec::new()));
    let mut controller = BrowserController::new();

    let lines = controller
        .initialize_report(|| async move { Ok(ScriptedEnv::new(steps)) }, &path)
        .await;

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Welcome to Browser Automation Chat!"));
    assert!(lines[0].contains("- stop answer: Stop the current task with an optional answer"));
    assert_eq!(lines[1], "Browser initialized. Current URL: http://homepage.test/");
    assert!(controller.is_initialized());
}

#[tokio::test]
async fn initialize_failure_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_task(&dir);
    let mut controller = BrowserController::<ScriptedEnv>::new();

    let lines = controller
        .initialize_report(
            || async { Err(EnvError::Launch("chrome not found".to_string())) },
            &path,
        )
        .await;

    assert_eq!(
        lines,
        vec!["Error initializing browser: failed to launch browser: chrome not found".to_string()]
    );
    assert!(!controller.is_initialized());
}

#[tokio::test]
async fn missing_task_file_fails_before_launch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut controller = BrowserController::<ScriptedEnv>::new();

    let err = controller
        .initialize(
            || async { Err(EnvError::Launch("launched without a task".to_string())) },
            &dir.path().join("absent.json"),
        )
        .await
        .expect_err("missing config");

    assert!(matches!(err, ControllerError::Env(EnvError::Io { .. })));
}

#[tokio::test]
async fn print_returns_observation_without_stepping() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir) = ready_controller(steps.clone()).await;

    let reply = controller.handle_line("print").await;

    assert_eq!(reply, format!("Observation:\n{TREE}"));
    assert!(steps.lock().expect("steps").is_empty());
}

#[tokio::test]
async fn print_lists_tabs_when_several_are_open() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir) = ready_controller(steps).await;
    if let Some(env) = controller.env.as_mut() {
        env.observation.tabs = vec![
            TabSummary {
                title: "Homepage".to_string(),
                url: "http://homepage.test/".to_string(),
            },
            TabSummary {
                title: "Calculator".to_string(),
                url: "http://homepage.test/calculator.html".to_string(),
            },
        ];
    }

    let reply = controller.handle_line("print").await;

    assert_eq!(
        reply,
        format!(
            "Observation:\n{TREE}\n\nTabs:\n\
             *Tab 0: Homepage (http://homepage.test/)\n \
             Tab 1: Calculator (http://homepage.test/calculator.html)"
        )
    );
}

#[tokio::test]
async fn click_resolves_text_and_reports_feedback() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir) = ready_controller(steps.clone()).await;

    let reply = controller.handle_line("click scratchpad").await;

    assert_eq!(
        reply,
        "Performed action: click scratchpad\n\
         Before URL: http://homepage.test/\n\
         After URL: http://homepage.test/\n\
         Reward: 1.0, Terminated: False, Truncated: False"
    );
    assert_eq!(*steps.lock().expect("steps"), vec![Action::Click(ElementId(12))]);
}

#[tokio::test]
async fn goto_changes_after_url() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir) = ready_controller(steps).await;

    let reply = controller
        .perform("goto http://homepage.test/password.html")
        .await
        .expect("goto");

    let Reply::Feedback(feedback) = reply else {
        panic!("expected feedback");
    };
    assert_eq!(feedback.before_url, "http://homepage.test/");
    assert_eq!(feedback.after_url, "http://homepage.test/password.html");
}

#[tokio::test]
async fn stop_terminates() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir) = ready_controller(steps).await;

    let reply = controller.handle_line("stop $279.49").await;

    assert!(reply.ends_with("Reward: 1.0, Terminated: True, Truncated: False"));
}

#[tokio::test]
async fn failed_step_reports_zero_reward() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir) = ready_controller(steps).await;
    if let Some(env) = controller.env.as_mut() {
        env.fail_next = Some(EnvError::NoActivePage);
    }

    let reply = controller.perform("go_back").await.expect("step");

    let Reply::Feedback(feedback) = reply else {
        panic!("expected feedback");
    };
    assert_eq!(feedback.reward, 0.0);
    assert_eq!(feedback.fail_error.as_deref(), Some("no active page"));
}

#[tokio::test]
async fn failed_step_shows_the_browser_error() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir) = ready_controller(steps).await;
    if let Some(env) = controller.env.as_mut() {
        env.fail_next = Some(EnvError::Cdp("node is detached from document".to_string()));
    }

    let reply = controller.handle_line("click Scratchpad").await;

    assert_eq!(
        reply,
        "Performed action: click Scratchpad\n\
         Before URL: http://homepage.test/\n\
         After URL: http://homepage.test/\n\
         Reward: 0.0, Terminated: False, Truncated: False\n\
         Error: devtools protocol error: node is detached from document"
    );
}

#[tokio::test]
async fn errors_surface_as_single_message() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir) = ready_controller(steps.clone()).await;

    assert_eq!(
        controller.handle_line("click checkout").await,
        "Error performing action: Element 'checkout' not found"
    );
    assert_eq!(
        controller.handle_line("scroll sideways").await,
        "Error performing action: Invalid scroll direction 'sideways': expected up or down"
    );
    assert_eq!(
        controller.handle_line("dance").await,
        "Error performing action: Unknown action: dance"
    );
    assert!(steps.lock().expect("steps").is_empty());
}

#[tokio::test]
async fn commands_before_initialization_are_rejected() {
    let mut controller = BrowserController::<ScriptedEnv>::new();

    assert_eq!(
        controller.handle_line("print").await,
        "Error performing action: browser is not initialized"
    );
}
