use std::{
    fs,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use browser_env::{Action, ElementId, Observation, RenderedTree, StepOutcome, TaskConfig};

use super::*;

const SEARCH_PAGE: &str = "[1] RootWebArea 'Search'\n\
\t[21] searchbox 'Search query'\n\
\t[22] button 'Go'";

/// Environment double that records stepped actions.
struct RecordingEnv {
    observation: Observation,
    steps: Arc<Mutex<Vec<Action>>>,
}

#[async_trait]
impl BrowserEnvironment for RecordingEnv {
    async fn reset(&mut self, config: &TaskConfig) -> Result<Observation, EnvError> {
        let url = config.start_urls().into_iter().next().unwrap_or_default();
        let tree = RenderedTree {
            text: SEARCH_PAGE.to_string(),
            ..RenderedTree::default()
        };
        self.observation = Observation::new(tree, url, Vec::new(), 0);
        Ok(self.observation.clone())
    }

    async fn step(&mut self, action: &Action) -> Result<StepOutcome, EnvError> {
        self.steps.lock().expect("steps").push(action.clone());
        Ok(StepOutcome::after(action, self.observation.clone(), Ok(())))
    }

    async fn current_url(&self) -> Result<String, EnvError> {
        Ok(self.observation.url.clone())
    }

    fn observation(&self) -> &Observation {
        &self.observation
    }

    async fn close(self) -> Result<(), EnvError> {
        Ok(())
    }
}

async fn started(
    steps: Arc<Mutex<Vec<Action>>>,
) -> (BrowserController<RecordingEnv>, tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("156.json");
    fs::write(&config, r#"{"task_id": 156, "start_url": "http://search.test/"}"#).expect("task");

    let mut controller = BrowserController::new();
    let mut out = Vec::new();
    start(
        &mut controller,
        || async move {
            Ok(RecordingEnv {
                observation: Observation::default(),
                steps,
            })
        },
        &config,
        &mut out,
    )
    .await
    .expect("start");
    (controller, dir, String::from_utf8(out).expect("utf8"))
}

#[test]
fn script_skips_blank_lines_and_comments() {
    let source = "# search flow\n\nclick Search query\n   \n  # type next\ntype Search query [rust]\n";
    let commands: Vec<&str> = script_commands(source).collect();
    assert_eq!(commands, vec!["click Search query", "type Search query [rust]"]);
}

#[tokio::test]
async fn start_writes_the_greeting() {
    let (controller, _dir, greeting) = started(Arc::new(Mutex::new(Vec::new()))).await;
    assert!(controller.is_initialized());
    assert!(greeting.starts_with("Welcome to Browser Automation Chat!"));
    assert!(greeting.ends_with("Browser initialized. Current URL: http://search.test/\n"));
}

#[tokio::test]
async fn start_fails_when_the_browser_does_not_launch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("156.json");
    fs::write(&config, r#"{"start_url": "http://search.test/"}"#).expect("task");
    let mut controller = BrowserController::<RecordingEnv>::new();
    let mut out = Vec::new();

    let result = start(
        &mut controller,
        || async { Err(EnvError::Launch("chrome not found".to_string())) },
        &config,
        &mut out,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "Error initializing browser: failed to launch browser: chrome not found\n"
    );
}

#[tokio::test]
async fn script_runs_click_then_type() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir, _) = started(steps.clone()).await;
    let mut out = Vec::new();

    let handled = run_script(
        &mut controller,
        "# click the box, then search\nclick Search query\ntype Search query [rust]\n",
        &mut out,
    )
    .await
    .expect("script");

    assert_eq!(handled, 2);
    assert_eq!(
        *steps.lock().expect("steps"),
        vec![
            Action::Click(ElementId(21)),
            Action::Type {
                element: ElementId(21),
                text: "rust".to_string(),
                press_enter: true,
            },
        ]
    );
    let printed = String::from_utf8(out).expect("utf8");
    assert!(printed.contains("Performed action: click Search query\n"));
    assert!(printed.contains("Performed action: type Search query [rust]\n"));
    assert!(printed.ends_with(&format!("Final observation:\n{SEARCH_PAGE}\n")));
}

#[tokio::test]
async fn repl_answers_until_exit() {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let (mut controller, _dir, _) = started(steps.clone()).await;
    let mut out = Vec::new();
    let input: &[u8] = b"print\n\ndance\nexit\nclick Go\n";

    let handled = run_repl(&mut controller, input, &mut out)
        .await
        .expect("repl");

    assert_eq!(handled, 2);
    assert!(steps.lock().expect("steps").is_empty());
    let printed = String::from_utf8(out).expect("utf8");
    assert!(printed.contains(&format!("Observation:\n{SEARCH_PAGE}\n")));
    assert!(printed.contains("Error performing action: Unknown action: dance\n"));
}

#[tokio::test]
async fn repl_stops_at_end_of_input() {
    let (mut controller, _dir, _) = started(Arc::new(Mutex::new(Vec::new()))).await;
    let mut out = Vec::new();
    let input: &[u8] = b"scroll down";

    let handled = run_repl(&mut controller, input, &mut out)
        .await
        .expect("repl");

    assert_eq!(handled, 1);
    let printed = String::from_utf8(out).expect("utf8");
    assert!(printed.contains("Performed action: scroll down\n"));
    assert!(printed.ends_with("> \n"));
}
