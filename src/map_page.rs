//! Map search page navigation and snapshot capture.
//!
//! Renders the map search page for a query in headless Chrome, scrolls the
//! results panel until the visible result count stops growing, and returns
//! the full page HTML (including embedded JSON data blocks, which the
//! extraction layer mines separately).
//!
//! Query variations are rendered in the same tab and appended to the main
//! snapshot behind a marker comment, so downstream extraction sees one
//! combined document.

use crate::browser_pool;
use crate::config::{BrowserConfig, SearchConfig};
use crate::interrupt;
use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Separates the main snapshot from appended variation snapshots.
pub const VARIATION_MARKER: &str = "\n<!-- ADDITIONAL_SEARCH_CONTENT -->\n";

/// Scrolls everything that can hold results: the window itself, the main
/// panel, nested regions, and the feed containers. Map UIs move the scroll
/// container between revisions, so all candidates are hit every round.
const SCROLL_JS: &str = r#"
(() => {
    window.scrollTo(0, document.body.scrollHeight);
    const candidates = [
        document.querySelector('[role="main"]'),
        document.querySelector('[role="main"] [role="region"]'),
        ...document.querySelectorAll('[role="feed"], .section-result, [data-result-index]'),
    ];
    for (const el of candidates) {
        if (el) {
            el.scrollTop = el.scrollHeight;
        }
    }
})()
"#;

/// Counts visible results. Takes the max element count across known result
/// selectors, then compares against the number of unique non-trivial text
/// blocks, since selector markup varies across page revisions.
const COUNT_JS: &str = r#"
(() => {
    const selectors = [
        '[data-result-index]',
        '[role="article"]',
        '.section-result',
        '[jsaction*="mouseover"]',
        '[data-cid]',
        '[data-feature-id]',
        '[aria-label*="results"]',
    ];
    let maxCount = 0;
    const uniqueTexts = new Set();
    for (const selector of selectors) {
        const elements = document.querySelectorAll(selector);
        maxCount = Math.max(maxCount, elements.length);
        for (const el of elements) {
            const text = el.textContent && el.textContent.trim();
            if (text && text.length > 5) {
                uniqueTexts.add(text);
            }
        }
    }
    return Math.max(maxCount, uniqueTexts.size);
})()
"#;

/// Drives headless Chrome against the map search page.
pub struct MapSearchPage {
    search: SearchConfig,
    browser: BrowserConfig,
    user_agent: String,
}

impl MapSearchPage {
    pub fn new(search: SearchConfig, browser: BrowserConfig, user_agent: String) -> Self {
        Self {
            search,
            browser,
            user_agent,
        }
    }

    /// Build the search URL for a query.
    pub fn search_url(&self, query: &str) -> String {
        format!("{}{}", self.search.base_url, urlencoding::encode(query))
    }

    /// Render the search page for `query`, then each variation (capped by
    /// `max_variations`), and return the concatenated HTML snapshots.
    ///
    /// A failed variation logs a warning and is skipped; only a failure on
    /// the main query aborts the capture. An interrupt stops scrolling and
    /// skips the remaining variations, returning what was captured so far.
    pub async fn capture_snapshot(&self, query: &str, variations: &[String]) -> Result<String> {
        let query = query.to_string();
        let variations: Vec<String> = variations
            .iter()
            .take(self.search.max_variations)
            .cloned()
            .collect();
        let search = self.search.clone();
        let browser = self.browser.clone();
        let user_agent = self.user_agent.clone();

        // headless_chrome is a synchronous API; run it off the async runtime.
        tokio::task::spawn_blocking(move || {
            capture_blocking(&search, &browser, &user_agent, &query, &variations)
        })
        .await
        .map_err(|e| anyhow!("Browser task panicked: {}", e))?
    }
}

fn capture_blocking(
    search: &SearchConfig,
    browser_config: &BrowserConfig,
    user_agent: &str,
    query: &str,
    variations: &[String],
) -> Result<String> {
    let guard = browser_pool::create_browser(browser_config)?;
    let tab = guard
        .browser
        .new_tab()
        .map_err(|e| anyhow!("Failed to open browser tab: {}", e))?;
    tab.set_default_timeout(Duration::from_secs(browser_config.nav_timeout_secs));
    tab.set_user_agent(user_agent, None, None)
        .map_err(|e| anyhow!("Failed to set user agent: {}", e))?;

    let url = format!("{}{}", search.base_url, urlencoding::encode(query));
    info!("Navigating to search page: {}", url);
    navigate_and_scroll(&tab, &url, search, search.initial_wait_ms)?;
    std::thread::sleep(Duration::from_millis(search.settle_wait_ms));

    let mut content = tab
        .get_content()
        .map_err(|e| anyhow!("Failed to capture page content: {}", e))?;
    info!("Captured main snapshot ({} bytes)", content.len());

    for variation in variations {
        if interrupt::is_interrupted() {
            warn!("Interrupted, skipping remaining search variations");
            break;
        }
        info!("Rendering search variation: {}", variation);
        let url = format!("{}{}", search.base_url, urlencoding::encode(variation));
        match capture_variation(&tab, &url, search) {
            Ok(extra) => {
                content.push_str(VARIATION_MARKER);
                content.push_str(&extra);
            }
            Err(e) => warn!("Search variation '{}' failed: {}", variation, e),
        }
    }

    Ok(content)
}

fn capture_variation(
    tab: &headless_chrome::Tab,
    url: &str,
    search: &SearchConfig,
) -> Result<String> {
    navigate_and_scroll(tab, url, search, search.variation_wait_ms)?;
    std::thread::sleep(Duration::from_millis(search.variation_wait_ms));
    tab.get_content()
        .map_err(|e| anyhow!("Failed to capture page content: {}", e))
}

fn navigate_and_scroll(
    tab: &headless_chrome::Tab,
    url: &str,
    search: &SearchConfig,
    initial_wait_ms: u64,
) -> Result<()> {
    tab.navigate_to(url)
        .map_err(|e| anyhow!("Navigation failed: {}", e))?;
    tab.wait_until_navigated()
        .map_err(|e| anyhow!("Page load failed: {}", e))?;
    std::thread::sleep(Duration::from_millis(initial_wait_ms));
    scroll_results(tab, search);
    Ok(())
}

/// Scroll until the result count stops growing for `scroll_stable_rounds`
/// consecutive rounds, or `max_scroll_rounds` is reached.
fn scroll_results(tab: &headless_chrome::Tab, search: &SearchConfig) {
    let mut best_count = 0u64;
    let mut stable_rounds = 0u32;

    for round in 1..=search.max_scroll_rounds {
        if stable_rounds >= search.scroll_stable_rounds {
            break;
        }
        // The snapshot is still captured after an early stop
        if interrupt::is_interrupted() {
            debug!("Interrupted, stopping scroll after round {}", round - 1);
            break;
        }
        if let Err(e) = tab.evaluate(SCROLL_JS, false) {
            debug!("Scroll round {} failed: {}", round, e);
        }
        std::thread::sleep(Duration::from_millis(search.scroll_wait_ms));

        let count = result_count(tab);
        debug!("Scroll round {}: {} results visible", round, count);
        if count > best_count {
            best_count = count;
            stable_rounds = 0;
        } else {
            stable_rounds += 1;
        }
    }

    info!("Finished scrolling with {} results visible", best_count);
}

fn result_count(tab: &headless_chrome::Tab) -> u64 {
    match tab.evaluate(COUNT_JS, false) {
        Ok(result) => result.value.and_then(|v| v.as_u64()).unwrap_or(0),
        Err(e) => {
            debug!("Result count probe failed: {}", e);
            0
        }
    }
}
