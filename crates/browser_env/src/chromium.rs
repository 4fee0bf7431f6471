//! `BrowserEnvironment` backed by a local Chromium over the DevTools protocol.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chromiumoxide::{
    browser::HeadlessMode,
    cdp::browser_protocol::{
        accessibility::{EnableParams, GetFullAxTreeParams},
        dom::{BackendNodeId, FocusParams, GetBoxModelParams, ScrollIntoViewIfNeededParams},
        input::{DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams},
        network::{CookieParam, CookieSameSite, TimeSinceEpoch},
    },
    handler::viewport::Viewport,
    layout::Point,
    page::ScreenshotParams,
    Browser, BrowserConfig, Page,
};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    action::{Action, ElementId, ScrollDirection},
    config::{EnvOptions, StorageState, StoredCookie, TaskConfig},
    env::{BrowserEnvironment, EnvError, StepOutcome},
    keys::{KeyCombo, KeyStroke},
    observation::{render_accessibility_tree, AxNodeSnapshot, Observation, TabSummary},
};

const BLANK_PAGE: &str = "about:blank";

pub struct ChromiumEnv {
    options: EnvOptions,
    browser: Browser,
    handler: JoinHandle<()>,
    pages: Vec<Page>,
    active: usize,
    observation: Observation,
    step_count: usize,
}

impl ChromiumEnv {
    pub async fn launch(options: EnvOptions) -> Result<Self, EnvError> {
        let viewport = options.viewport;
        let headless = if options.headless {
            HeadlessMode::True
        } else {
            HeadlessMode::False
        };
        let config = BrowserConfig::builder()
            .headless_mode(headless)
            .window_size(viewport.width, viewport.height)
            .viewport(Viewport {
                width: viewport.width,
                height: viewport.height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            })
            .build()
            .map_err(EnvError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| EnvError::Launch(err.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "devtools handler event failed");
                }
            }
        });

        info!(
            headless = options.headless,
            width = viewport.width,
            height = viewport.height,
            "browser launched"
        );

        Ok(Self {
            options,
            browser,
            handler,
            pages: Vec::new(),
            active: 0,
            observation: Observation::default(),
            step_count: 0,
        })
    }

    fn active_page(&self) -> Result<&Page, EnvError> {
        self.pages.get(self.active).ok_or(EnvError::NoActivePage)
    }

    async fn close_pages(&mut self) {
        for page in self.pages.drain(..) {
            if let Err(err) = page.close().await {
                warn!(error = %err, "failed to close page");
            }
        }
        self.active = 0;
    }

    async fn open_page(&mut self, url: &str) -> Result<(), EnvError> {
        let page = self.browser.new_page(url).await?;
        page.bring_to_front().await?;
        self.pages.push(page);
        self.active = self.pages.len() - 1;
        Ok(())
    }

    async fn execute(&mut self, action: &Action) -> Result<(), EnvError> {
        match action {
            Action::Click(element) => {
                let point = self.element_centre(*element).await?;
                self.active_page()?.click(point).await?;
            }
            Action::Hover(element) => {
                let point = self.element_centre(*element).await?;
                self.active_page()?.move_mouse(point).await?;
            }
            Action::Type {
                element,
                text,
                press_enter,
            } => {
                let backend = self.backend_node(*element)?;
                let page = self.active_page()?;
                page.execute(
                    FocusParams::builder()
                        .backend_node_id(BackendNodeId::new(backend))
                        .build(),
                )
                .await?;
                press_keys(page, "Control+a").await?;
                page.execute(InsertTextParams::new(text.clone())).await?;
                if *press_enter {
                    press_keys(page, "Enter").await?;
                }
            }
            Action::Scroll(direction) => {
                let sign = match direction {
                    ScrollDirection::Up => "-",
                    ScrollDirection::Down => "",
                };
                self.active_page()?
                    .evaluate(format!(
                        "window.scrollBy(0, {sign}document.documentElement.clientHeight);"
                    ))
                    .await?;
            }
            Action::KeyPress(keys) => press_keys(self.active_page()?, keys).await?,
            Action::NewTab => self.open_page(BLANK_PAGE).await?,
            Action::CloseTab => {
                if self.pages.is_empty() {
                    return Err(EnvError::NoActivePage);
                }
                let page = self.pages.remove(self.active);
                page.close().await?;
                if self.pages.is_empty() {
                    self.open_page(BLANK_PAGE).await?;
                } else {
                    self.active = self.pages.len() - 1;
                    self.active_page()?.bring_to_front().await?;
                }
            }
            Action::Goto(url) => {
                let url = normalize_url(url)?;
                self.active_page()?.goto(url.as_str()).await?;
            }
            Action::GoBack => {
                self.active_page()?.evaluate("history.back();").await?;
            }
            Action::GoForward => {
                self.active_page()?.evaluate("history.forward();").await?;
            }
            Action::TabFocus(index) => {
                let page = self.pages.get(*index).ok_or(EnvError::TabOutOfRange {
                    index: *index,
                    open: self.pages.len(),
                })?;
                page.bring_to_front().await?;
                self.active = *index;
            }
            Action::Stop(_) | Action::None => {}
        }
        Ok(())
    }

    fn backend_node(&self, element: ElementId) -> Result<i64, EnvError> {
        self.observation
            .backend_node(element)
            .ok_or(EnvError::UnknownElement(element))
    }

    async fn element_centre(&self, element: ElementId) -> Result<Point, EnvError> {
        let backend = self.backend_node(element)?;
        let page = self.active_page()?;
        page.execute(
            ScrollIntoViewIfNeededParams::builder()
                .backend_node_id(BackendNodeId::new(backend))
                .build(),
        )
        .await?;
        let quad = content_quad(page, backend).await?;
        let bounds = QuadBounds::from_quad(&quad).ok_or(EnvError::UnknownElement(element))?;
        let (x, y) = bounds.centre();
        Ok(Point::new(x, y))
    }

    async fn refresh_observation(&mut self) -> Result<(), EnvError> {
        let page = self.active_page()?;
        page.execute(EnableParams::default()).await?;
        let tree = page.execute(GetFullAxTreeParams::default()).await?;
        let raw = serde_json::to_value(&tree.result.nodes)
            .map_err(|err| EnvError::Cdp(format!("unreadable accessibility tree: {err}")))?;
        let nodes: Vec<AxNodeSnapshot> = serde_json::from_value(raw)
            .map_err(|err| EnvError::Cdp(format!("unreadable accessibility tree: {err}")))?;

        let hidden = if self.options.current_viewport_only {
            offscreen_nodes(page, &nodes, &self.options).await
        } else {
            HashSet::new()
        };
        let rendered = render_accessibility_tree(&nodes, &hidden);
        let url = page.url().await?.unwrap_or_default();
        let tabs = tab_summaries(&self.pages).await;

        debug!(url = %url, nodes = nodes.len(), hidden = hidden.len(), "observation refreshed");
        self.observation = Observation::new(rendered, url, tabs, self.active);
        Ok(())
    }

    async fn capture_screenshot(&self) {
        let Some(dir) = self.options.screenshot_dir.as_deref() else {
            return;
        };
        match self.save_screenshot(dir).await {
            Ok(path) => debug!(path = %path.display(), "screenshot saved"),
            Err(err) => warn!(error = %err, "failed to save screenshot"),
        }
    }

    async fn save_screenshot(&self, dir: &Path) -> Result<PathBuf, EnvError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| EnvError::Io {
                context: format!("failed to create screenshot dir '{}'", dir.display()),
                source,
            })?;
        let bytes = self
            .active_page()?
            .screenshot(ScreenshotParams::builder().build())
            .await?;
        let path = dir.join(format!("step{}.png", self.step_count));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| EnvError::Io {
                context: format!("failed to write screenshot '{}'", path.display()),
                source,
            })?;
        Ok(path)
    }

    async fn apply_storage_state(&self, path: &Path) -> Result<(), EnvError> {
        let state = StorageState::load(path)?;
        let cookies = state
            .cookies
            .iter()
            .map(cookie_param)
            .collect::<Result<Vec<_>, _>>()?;
        if cookies.is_empty() {
            return Ok(());
        }
        let count = cookies.len();
        self.active_page()?.set_cookies(cookies).await?;
        info!(count, path = %path.display(), "storage state applied");
        Ok(())
    }
}

#[async_trait]
impl BrowserEnvironment for ChromiumEnv {
    async fn reset(&mut self, config: &TaskConfig) -> Result<Observation, EnvError> {
        self.close_pages().await;
        self.step_count = 0;

        let mut urls = config.start_urls();
        if urls.is_empty() {
            urls.push(BLANK_PAGE.to_string());
        }

        self.open_page(BLANK_PAGE).await?;
        if let Some(path) = config.storage_state_path() {
            self.apply_storage_state(&path).await?;
        }
        let first = normalize_url(&urls[0])?;
        self.active_page()?.goto(first.as_str()).await?;
        for url in &urls[1..] {
            let url = normalize_url(url)?;
            self.open_page(&url).await?;
        }

        self.active = 0;
        self.active_page()?.bring_to_front().await?;
        tokio::time::sleep(self.options.slow_mo).await;
        self.refresh_observation().await?;
        self.capture_screenshot().await;

        info!(
            task_id = ?config.task_id,
            tabs = self.pages.len(),
            url = %self.observation.url,
            "environment reset"
        );
        Ok(self.observation.clone())
    }

    async fn step(&mut self, action: &Action) -> Result<StepOutcome, EnvError> {
        let result = self.execute(action).await;
        match &result {
            Ok(()) => debug!(action = %action, "action executed"),
            Err(err) => warn!(action = %action, error = %err, "action failed"),
        }

        tokio::time::sleep(self.options.slow_mo).await;
        self.step_count += 1;
        self.refresh_observation().await?;
        self.capture_screenshot().await;

        Ok(StepOutcome::after(action, self.observation.clone(), result))
    }

    async fn current_url(&self) -> Result<String, EnvError> {
        Ok(self.active_page()?.url().await?.unwrap_or_default())
    }

    fn observation(&self) -> &Observation {
        &self.observation
    }

    async fn close(mut self) -> Result<(), EnvError> {
        self.close_pages().await;
        let closed = self.browser.close().await;
        if let Err(err) = self.browser.wait().await {
            warn!(error = %err, "browser process did not exit cleanly");
        }
        self.handler.abort();
        closed?;
        info!("browser closed");
        Ok(())
    }
}

/// Adds `http://` when the scheme is missing.
pub(crate) fn normalize_url(raw: &str) -> Result<String, EnvError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") || raw.starts_with("about:") || raw.starts_with("data:") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    Url::parse(&candidate)
        .map(String::from)
        .map_err(|err| EnvError::Config(format!("invalid url '{raw}': {err}")))
}

async fn press_keys(page: &Page, raw: &str) -> Result<(), EnvError> {
    let combo = KeyCombo::parse(raw)?;
    for held in &combo.held {
        page.execute(key_event(DispatchKeyEventType::RawKeyDown, held, combo.modifiers, None)?)
            .await?;
    }

    let down_kind = if combo.key.text.is_some() {
        DispatchKeyEventType::KeyDown
    } else {
        DispatchKeyEventType::RawKeyDown
    };
    page.execute(key_event(
        down_kind,
        &combo.key,
        combo.modifiers,
        combo.key.text.as_deref(),
    )?)
    .await?;
    page.execute(key_event(DispatchKeyEventType::KeyUp, &combo.key, combo.modifiers, None)?)
        .await?;

    for held in combo.held.iter().rev() {
        page.execute(key_event(DispatchKeyEventType::KeyUp, held, 0, None)?)
            .await?;
    }
    Ok(())
}

fn key_event(
    kind: DispatchKeyEventType,
    stroke: &KeyStroke,
    modifiers: i64,
    text: Option<&str>,
) -> Result<DispatchKeyEventParams, EnvError> {
    let mut builder = DispatchKeyEventParams::builder()
        .r#type(kind)
        .modifiers(modifiers)
        .key(stroke.key.clone())
        .code(stroke.code.clone());
    if let Some(vk) = stroke.windows_virtual_key_code {
        builder = builder.windows_virtual_key_code(vk).native_virtual_key_code(vk);
    }
    if let Some(text) = text {
        builder = builder.text(text.to_string());
    }
    builder.build().map_err(EnvError::Cdp)
}

async fn content_quad(page: &Page, backend: i64) -> Result<Vec<f64>, EnvError> {
    let response = page
        .execute(
            GetBoxModelParams::builder()
                .backend_node_id(BackendNodeId::new(backend))
                .build(),
        )
        .await?;
    let model = serde_json::to_value(&response.result.model)
        .map_err(|err| EnvError::Cdp(format!("unreadable box model: {err}")))?;
    Ok(model
        .get("content")
        .and_then(|content| content.as_array())
        .map(|points| points.iter().filter_map(|p| p.as_f64()).collect())
        .unwrap_or_default())
}

/// Axis-aligned bounds of a CDP quad (four x/y pairs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct QuadBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl QuadBounds {
    pub(crate) fn from_quad(quad: &[f64]) -> Option<Self> {
        if quad.len() < 8 {
            return None;
        }
        let xs = quad.iter().step_by(2).copied();
        let ys = quad.iter().skip(1).step_by(2).copied();
        Some(Self {
            left: xs.clone().fold(f64::INFINITY, f64::min),
            right: xs.fold(f64::NEG_INFINITY, f64::max),
            top: ys.clone().fold(f64::INFINITY, f64::min),
            bottom: ys.fold(f64::NEG_INFINITY, f64::max),
        })
    }

    pub(crate) fn centre(&self) -> (f64, f64) {
        ((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// True when no part of the box is inside a `width` x `height` viewport.
    pub(crate) fn outside_viewport(&self, width: f64, height: f64) -> bool {
        self.right <= 0.0 || self.bottom <= 0.0 || self.left >= width || self.top >= height
    }
}

/// Nodes laid out entirely outside the viewport. Nodes without a box model
/// (text runs, detached nodes) stay visible; the root is never hidden.
async fn offscreen_nodes(
    page: &Page,
    nodes: &[AxNodeSnapshot],
    options: &EnvOptions,
) -> HashSet<String> {
    let width = f64::from(options.viewport.width);
    let height = f64::from(options.viewport.height);
    let mut hidden = HashSet::new();
    for node in nodes.iter().skip(1) {
        let Some(backend) = node.backend_dom_node_id else {
            continue;
        };
        let Ok(quad) = content_quad(page, backend).await else {
            continue;
        };
        if QuadBounds::from_quad(&quad).is_some_and(|bounds| bounds.outside_viewport(width, height)) {
            hidden.insert(node.node_id.clone());
        }
    }
    hidden
}

async fn tab_summaries(pages: &[Page]) -> Vec<TabSummary> {
    let mut tabs = Vec::with_capacity(pages.len());
    for page in pages {
        let title = page.get_title().await.ok().flatten().unwrap_or_default();
        let url = page.url().await.ok().flatten().unwrap_or_default();
        tabs.push(TabSummary { title, url });
    }
    tabs
}

fn cookie_param(cookie: &StoredCookie) -> Result<CookieParam, EnvError> {
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone());
    if let Some(domain) = &cookie.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(path) = &cookie.path {
        builder = builder.path(path.clone());
    }
    if let Some(secure) = cookie.secure {
        builder = builder.secure(secure);
    }
    if let Some(http_only) = cookie.http_only {
        builder = builder.http_only(http_only);
    }
    if let Some(same_site) = cookie.same_site.as_deref().and_then(same_site) {
        builder = builder.same_site(same_site);
    }
    // Session cookies are stored with a negative expiry.
    if let Some(expires) = cookie.expires.filter(|expires| *expires > 0.0) {
        builder = builder.expires(TimeSinceEpoch::new(expires));
    }
    builder
        .build()
        .map_err(|err| EnvError::Config(format!("invalid cookie '{}': {err}", cookie.name)))
}

fn same_site(raw: &str) -> Option<CookieSameSite> {
    match raw.to_ascii_lowercase().as_str() {
        "strict" => Some(CookieSameSite::Strict),
        "lax" => Some(CookieSameSite::Lax),
        "none" => Some(CookieSameSite::None),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/chromium_tests.rs"]
mod tests;
