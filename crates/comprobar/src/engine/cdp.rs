//! Chromium control over the DevTools protocol.
//!
//! Real-browser implementation of [`PageEngine`], compiled with the
//! `browser` feature. All page interaction goes through `evaluate` so the
//! engine needs nothing from the protocol beyond navigation and script
//! execution; element lookup, visibility, obstruction, and input dispatch
//! are expressed as small JavaScript probes built by the `script` helpers.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{ClickOutcome, ElementState, EngineFactory, PageEngine};
use crate::result::{ComprobarError, ComprobarResult};

/// Network is considered idle after this long without new resource entries
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Browser launch options
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Path to the chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the chromium binary path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable the sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// A launched browser; hands out one isolated page per scenario
#[derive(Debug)]
pub struct CdpBrowser {
    inner: Arc<Mutex<Browser>>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl CdpBrowser {
    /// Launch a browser process
    pub async fn launch(options: LaunchOptions) -> ComprobarResult<Self> {
        let mut builder = BrowserConfig::builder();

        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| ComprobarError::engine(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ComprobarError::engine(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Open a fresh page
    pub async fn new_engine(&self) -> ComprobarResult<CdpEngine> {
        let browser = self.inner.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ComprobarError::engine(e.to_string()))?;
        Ok(CdpEngine::new(page))
    }

    /// Shut the browser down
    pub async fn close(&self) -> ComprobarResult<()> {
        let mut browser = self.inner.lock().await;
        browser
            .close()
            .await
            .map_err(|e| ComprobarError::engine(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl EngineFactory for CdpBrowser {
    async fn page(&self) -> ComprobarResult<Arc<dyn PageEngine>> {
        Ok(Arc::new(self.new_engine().await?))
    }
}

#[derive(Debug, Default)]
struct IdleSample {
    resources: u64,
    since: Option<Instant>,
}

/// One browser page driven over CDP
#[derive(Debug)]
pub struct CdpEngine {
    page: Arc<Mutex<Page>>,
    idle: std::sync::Mutex<IdleSample>,
}

#[derive(Debug, Deserialize)]
struct ProbedElement {
    visible: bool,
    stable: bool,
    obstructed: bool,
    text: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct NetworkSample {
    ready: bool,
    resources: u64,
}

impl CdpEngine {
    /// Wrap an already opened page
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page: Arc::new(Mutex::new(page)),
            idle: std::sync::Mutex::new(IdleSample::default()),
        }
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, expr: &str) -> ComprobarResult<T> {
        let page = self.page.lock().await;
        let result = page
            .evaluate(expr)
            .await
            .map_err(|e| ComprobarError::engine(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| ComprobarError::engine(e.to_string()))
    }
}

#[async_trait]
impl PageEngine for CdpEngine {
    async fn navigate(&self, url: &str) -> ComprobarResult<()> {
        let page = self.page.lock().await;
        page.goto(url)
            .await
            .map_err(|e| ComprobarError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn probe(&self, selector: &str) -> ComprobarResult<Option<ElementState>> {
        let probed: Option<ProbedElement> = self.eval(&script::probe(selector)).await?;
        Ok(probed.map(|p| ElementState {
            visible: p.visible,
            stable: p.stable,
            obstructed: p.obstructed,
            text: p.text,
            value: p.value,
        }))
    }

    async fn click(&self, selector: &str) -> ComprobarResult<ClickOutcome> {
        let verdict: String = self.eval(&script::click(selector)).await?;
        Ok(if verdict == "clicked" {
            ClickOutcome::Registered
        } else {
            ClickOutcome::Blocked
        })
    }

    async fn fill(&self, selector: &str, text: &str) -> ComprobarResult<()> {
        let filled: bool = self.eval(&script::fill(selector, text)).await?;
        if filled {
            Ok(())
        } else {
            Err(ComprobarError::engine(format!(
                "fill target '{selector}' is no longer attached"
            )))
        }
    }

    async fn scroll_into_view(&self, selector: &str) -> ComprobarResult<()> {
        let _: bool = self.eval(&script::scroll_into_view(selector)).await?;
        Ok(())
    }

    async fn network_idle(&self) -> ComprobarResult<bool> {
        let sample: NetworkSample = self.eval(script::NETWORK_SAMPLE).await?;
        if !sample.ready {
            return Ok(false);
        }
        let mut idle = self.idle.lock().unwrap();
        if idle.since.is_none() || idle.resources != sample.resources {
            idle.resources = sample.resources;
            idle.since = Some(Instant::now());
            return Ok(false);
        }
        let settled = idle
            .since
            .map(|t| t.elapsed() >= Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS));
        Ok(settled.unwrap_or(false))
    }

    async fn close(&self) -> ComprobarResult<()> {
        // Page targets are owned by the browser process; closing the
        // CdpBrowser releases them.
        Ok(())
    }
}

/// JavaScript probe builders. Kept as plain string functions so the shape
/// of each probe is unit-testable without a browser.
mod script {
    /// Snapshot one element: visibility, two-frame layout stability,
    /// center-point obstruction, text, and form value.
    pub fn probe(selector: &str) -> String {
        format!(
            "new Promise(resolve => {{ \
                const q = () => document.querySelector({selector:?}); \
                const el = q(); \
                if (!el) {{ resolve(null); return; }} \
                const before = el.getBoundingClientRect(); \
                requestAnimationFrame(() => {{ \
                    const now = q(); \
                    if (!now) {{ resolve(null); return; }} \
                    const r = now.getBoundingClientRect(); \
                    const cs = window.getComputedStyle(now); \
                    const visible = r.width > 0 && r.height > 0 && \
                        cs.visibility !== 'hidden' && cs.display !== 'none'; \
                    const stable = visible && \
                        Math.abs(r.left - before.left) < 0.5 && \
                        Math.abs(r.top - before.top) < 0.5; \
                    let obstructed = false; \
                    if (visible) {{ \
                        const hit = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2); \
                        obstructed = hit !== null && hit !== now && !now.contains(hit) && !hit.contains(now); \
                    }} \
                    resolve({{ visible, stable, obstructed, \
                        text: now.innerText === undefined ? '' : now.innerText, \
                        value: 'value' in now ? String(now.value) : '' }}); \
                }}); \
            }})"
        )
    }

    /// Click if visible and unobstructed; report what happened.
    pub fn click(selector: &str) -> String {
        format!(
            "(() => {{ \
                const el = document.querySelector({selector:?}); \
                if (!el) return 'missing'; \
                const r = el.getBoundingClientRect(); \
                if (r.width === 0 || r.height === 0) return 'blocked'; \
                const hit = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2); \
                if (hit !== null && hit !== el && !el.contains(hit) && !hit.contains(el)) return 'blocked'; \
                el.click(); \
                return 'clicked'; \
            }})()"
        )
    }

    /// Replace a field's value and fire the framework-visible events.
    pub fn fill(selector: &str, text: &str) -> String {
        format!(
            "(() => {{ \
                const el = document.querySelector({selector:?}); \
                if (!el) return false; \
                el.focus(); \
                el.value = {text:?}; \
                el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                return true; \
            }})()"
        )
    }

    /// Center the element in the viewport.
    pub fn scroll_into_view(selector: &str) -> String {
        format!(
            "(() => {{ \
                const el = document.querySelector({selector:?}); \
                if (!el) return false; \
                el.scrollIntoView({{ block: 'center' }}); \
                return true; \
            }})()"
        )
    }

    /// Document readiness plus the resource-entry count; the engine calls
    /// the network idle once the count stops moving.
    pub const NETWORK_SAMPLE: &str = "(() => ({ \
        ready: document.readyState === 'complete', \
        resources: performance.getEntriesByType('resource').length }))()";

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_probe_script_quotes_selector() {
            let js = probe("div.cart-total > span");
            assert!(js.contains("\"div.cart-total > span\""));
            assert!(js.contains("requestAnimationFrame"));
            assert!(js.contains("elementFromPoint"));
        }

        #[test]
        fn test_click_script_reports_verdicts() {
            let js = click("button#submitLoginBtn");
            assert!(js.contains("'missing'"));
            assert!(js.contains("'blocked'"));
            assert!(js.contains("'clicked'"));
        }

        #[test]
        fn test_fill_script_replaces_and_notifies() {
            let js = fill("input#email", "admin@admin.com");
            assert!(js.contains("\"admin@admin.com\""));
            assert!(js.contains("el.value ="));
            assert!(js.contains("new Event('input'"));
        }

        #[test]
        fn test_fill_script_escapes_quotes() {
            let js = fill("input#email", "a\"b");
            assert!(js.contains("\\\""));
        }

        #[test]
        fn test_network_sample_reads_resource_entries() {
            assert!(NETWORK_SAMPLE.contains("readyState"));
            assert!(NETWORK_SAMPLE.contains("resource"));
        }
    }
}
