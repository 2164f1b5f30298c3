//! Headless browser page fetching.
//!
//! Section pages are rendered client-side, so they are fetched through a
//! headless Chrome driven over CDP by `chromiumoxide`.
//!
//! # Architecture
//!
//! - [`PageSource`]: Core trait, "give me the rendered HTML for this URL"
//! - [`BrowserSession`]: The real source; one browser process per run, one tab
//!   per fetch
//! - [`retry_once`]: Runs a navigation attempt and repeats it once on failure
//!
//! The session is created and closed by the caller of the scrape, never held
//! in a global.

use crate::error::{BrowserError, FetchError};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, SetLifecycleEventsEnabledParams};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Desktop Chrome user agent presented to the site.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const VIEWPORT_WIDTH: u32 = 1920;
const VIEWPORT_HEIGHT: u32 = 1080;

/// Default bound on a single navigation attempt.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Anything that can turn a URL into rendered HTML.
///
/// Implemented by [`BrowserSession`]; tests substitute canned pages.
pub trait PageSource {
    /// Fetch the fully rendered HTML of `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Launch settings for [`BrowserSession`].
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Browser binary; `None` lets chromiumoxide find one.
    pub executable: Option<PathBuf>,
    /// Bound on each navigation attempt.
    pub navigation_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            executable: None,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }
}

/// A running headless browser, reused for every fetch of one run.
///
/// Must be shut down with [`BrowserSession::close`].
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl BrowserSession {
    /// Start a headless browser and its CDP event loop.
    #[instrument(level = "info", skip_all)]
    pub async fn launch(options: &BrowserOptions) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                ..Default::default()
            })
            .request_timeout(options.navigation_timeout);
        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(BrowserError::Config)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(BrowserError::Launch)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler event error");
                }
            }
        });

        info!("Headless browser started");
        Ok(Self {
            browser,
            handler,
            navigation_timeout: options.navigation_timeout,
        })
    }

    /// Shut the browser down and stop its CDP event loop.
    ///
    /// Asks Chrome to close over CDP; if that fails the process is killed
    /// before waiting for it, so shutdown cannot hang on a browser that never
    /// received the close. The handler task is aborted afterwards.
    ///
    /// # Returns
    ///
    /// The CDP close error, if the graceful close failed (the process is
    /// still killed and reaped in that case).
    #[instrument(level = "info", skip_all)]
    pub async fn close(mut self) -> Result<(), BrowserError> {
        let closed = shut_down(&mut self.browser).await;
        self.handler.abort();
        closed.map_err(BrowserError::Close)?;
        info!("Headless browser closed");
        Ok(())
    }

    /// Set up the tab, navigate (retrying once) and serialize the DOM.
    async fn render(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        page.set_user_agent(SetUserAgentOverrideParams::new(USER_AGENT))
            .await
            .map_err(|source| FetchError::Page {
                url: url.to_string(),
                source,
            })?;

        retry_once(url, move || self.navigate(page, url)).await?;

        page.content().await.map_err(|source| FetchError::Content {
            url: url.to_string(),
            source,
        })
    }

    /// One bounded navigation attempt.
    ///
    /// Navigates and then waits for the main frame's `networkIdle` lifecycle
    /// event, so client-side rendered story lists are in the DOM. Both waits
    /// share the navigation timeout.
    async fn navigate(&self, page: &Page, url: &str) -> Result<(), FetchError> {
        let attempt = async {
            page.execute(SetLifecycleEventsEnabledParams::new(true)).await?;
            let main_frame = page.mainframe().await?.map(|frame| frame.inner().clone());
            let lifecycle = page.event_listener::<EventLifecycleEvent>().await?;
            let steps = std::pin::pin!(lifecycle.map(|event| LifecycleStep {
                frame_id: event.frame_id.inner().clone(),
                loader_id: event.loader_id.inner().clone(),
                name: event.name.clone(),
            }));

            page.goto(url).await?;
            if !wait_for_network_idle(steps, main_frame.as_deref()).await {
                warn!(%url, "Lifecycle events ended before network idle");
            }
            Ok::<(), CdpError>(())
        };

        match timeout(self.navigation_timeout, attempt).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(FetchError::Navigation {
                url: url.to_string(),
                source,
            }),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout: self.navigation_timeout,
            }),
        }
    }
}

impl PageSource for BrowserSession {
    /// Render `url` in a fresh tab that is closed again whatever the outcome.
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        info!("Fetching");

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|source| FetchError::Page {
                url: url.to_string(),
                source,
            })?;

        let result = self.render(&page, url).await;

        if let Err(e) = page.close().await {
            warn!(error = %e, "Failed to close page");
        }

        match &result {
            Ok(html) => debug!(
                bytes = html.len(),
                elapsed_ms = t0.elapsed().as_millis(),
                "Fetched page"
            ),
            Err(e) => error!(error = %e, elapsed_ms = t0.elapsed().as_millis(), "Fetch failed"),
        }
        result
    }
}

/// The parts of a CDP `Page.lifecycleEvent` the idle wait looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LifecycleStep {
    frame_id: String,
    loader_id: String,
    name: String,
}

/// Consume lifecycle events until the main frame's current document reports
/// `networkIdle`.
///
/// A document's events start with `init`; only a `networkIdle` carrying the
/// loader id of the latest `init` counts, so a late idle from the previous
/// `about:blank` document is ignored. Events of other frames are skipped when
/// the main frame is known.
///
/// # Returns
///
/// `true` once idle is reached, `false` if the stream ends first.
async fn wait_for_network_idle<S>(mut steps: S, main_frame: Option<&str>) -> bool
where
    S: Stream<Item = LifecycleStep> + Unpin,
{
    let mut loader: Option<String> = None;
    while let Some(step) = steps.next().await {
        if main_frame.is_some_and(|frame| frame != step.frame_id) {
            continue;
        }
        match step.name.as_str() {
            "init" => loader = Some(step.loader_id),
            "networkIdle" if loader.as_deref() == Some(step.loader_id.as_str()) => {
                debug!(loader_id = %step.loader_id, "Network idle");
                return true;
            }
            _ => {}
        }
    }
    false
}

/// Graceful-close, kill and reap operations on a browser process.
trait BrowserProcess {
    async fn close_gracefully(&mut self) -> Result<(), CdpError>;
    async fn kill(&mut self);
    async fn wait_exit(&mut self);
}

impl BrowserProcess for Browser {
    async fn close_gracefully(&mut self) -> Result<(), CdpError> {
        self.close().await.map(|_| ())
    }

    async fn kill(&mut self) {
        if let Some(Err(e)) = Browser::kill(self).await {
            warn!(error = %e, "Failed to kill browser process");
        }
    }

    async fn wait_exit(&mut self) {
        if let Err(e) = self.wait().await {
            warn!(error = %e, "Failed waiting for browser process to exit");
        }
    }
}

/// Close `process`, killing it first if the graceful close fails, then reap it.
async fn shut_down<P: BrowserProcess>(process: &mut P) -> Result<(), CdpError> {
    let closed = process.close_gracefully().await;
    if let Err(e) = &closed {
        warn!(error = %e, "Graceful browser close failed; killing process");
        process.kill().await;
    }
    process.wait_exit().await;
    closed
}

/// Run `attempt`, and once more if the first try fails.
///
/// The first failure is logged as a warning; the second is returned.
pub async fn retry_once<T, E, F, Fut>(url: &str, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    match attempt().await {
        Ok(value) => Ok(value),
        Err(first) => {
            warn!(%url, error = %first, "Timeout or navigation error; retrying");
            attempt()
                .await
                .inspect_err(|second| error!(%url, error = %second, "Failed again"))
        }
    }
}
