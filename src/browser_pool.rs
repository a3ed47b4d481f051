//! Browser concurrency pool for headless Chrome instances.
//!
//! Each Chrome process consumes ~100-300 MB RAM, and a harvest run can
//! render the search page plus several variation pages. This module caps
//! concurrent browser instances so those renders cannot exhaust memory.
//!
//! Uses std::sync primitives so it works in both async and sync
//! (spawn_blocking) contexts.

use crate::config::BrowserConfig;

/// Default cap, overridden from `[browser] max_concurrent` at startup.
const DEFAULT_MAX_BROWSER_INSTANCES: usize = 2;

/// Global counting semaphore for browser instances.
static BROWSER_SEMAPHORE: once_cell::sync::Lazy<BrowserSemaphore> =
    once_cell::sync::Lazy::new(|| BrowserSemaphore::new(DEFAULT_MAX_BROWSER_INSTANCES));

/// Apply the configured instance cap. Call once before the first
/// `create_browser`.
pub fn set_max_instances(max: usize) {
    BROWSER_SEMAPHORE.set_max(max);
}

struct SemState {
    active: usize,
    max: usize,
}

/// A simple counting semaphore using std::sync primitives.
/// Unlike tokio::sync::Semaphore, this works in synchronous contexts
/// (e.g., inside spawn_blocking closures).
struct BrowserSemaphore {
    state: std::sync::Mutex<SemState>,
    condvar: std::sync::Condvar,
}

impl BrowserSemaphore {
    fn new(max: usize) -> Self {
        Self {
            state: std::sync::Mutex::new(SemState { active: 0, max }),
            condvar: std::sync::Condvar::new(),
        }
    }

    /// Acquire a permit, blocking until one is available.
    fn acquire(&self) -> BrowserPermit<'_> {
        let mut state = self.state.lock().unwrap();
        while state.active >= state.max {
            state = self.condvar.wait(state).unwrap();
        }
        state.active += 1;
        BrowserPermit { semaphore: self }
    }

    fn release(&self) {
        let mut state = self.state.lock().unwrap();
        state.active -= 1;
        self.condvar.notify_one();
    }

    fn set_max(&self, max: usize) {
        let mut state = self.state.lock().unwrap();
        state.max = max.max(1);
        self.condvar.notify_all();
    }
}

/// RAII guard that releases a browser semaphore permit on drop.
struct BrowserPermit<'a> {
    semaphore: &'a BrowserSemaphore,
}

impl<'a> Drop for BrowserPermit<'a> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}

/// A Chrome browser instance with an attached semaphore permit.
/// When the BrowserGuard is dropped, the Chrome process is killed AND
/// the semaphore permit is released, allowing another browser to be created.
pub struct BrowserGuard {
    pub browser: headless_chrome::Browser,
    _permit: BrowserPermit<'static>,
}

/// Create a headless Chrome browser instance, gated by the global semaphore.
/// Blocks until a permit is available.
/// Automatically disables the Chrome sandbox when running inside a container
/// (detected via /.dockerenv or the MAPLEADS_CONTAINER env var).
///
/// Returns a BrowserGuard that releases the semaphore permit when dropped.
pub fn create_browser(config: &BrowserConfig) -> anyhow::Result<BrowserGuard> {
    let permit = BROWSER_SEMAPHORE.acquire();

    let is_container = std::env::var("MAPLEADS_CONTAINER").is_ok()
        || std::path::Path::new("/.dockerenv").exists();

    // Try to find Chrome binary: check env var, then well-known paths
    let chrome_path: Option<std::path::PathBuf> = std::env::var("CHROME_PATH")
        .ok()
        .map(std::path::PathBuf::from)
        .or_else(|| {
            // WSL: Windows Chrome installation
            let wsl_path = std::path::Path::new(
                "/mnt/c/Program Files/Google/Chrome/Application/chrome.exe",
            );
            if wsl_path.exists() {
                Some(wsl_path.to_path_buf())
            } else {
                None
            }
        });

    // Assign a unique debug port per browser instance to avoid port conflicts.
    // Uses an atomic counter starting at 9222 (Chrome's default debug port).
    static PORT_COUNTER: std::sync::atomic::AtomicU16 = std::sync::atomic::AtomicU16::new(9222);
    let debug_port = PORT_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    // Wrap around if we exceed reasonable range
    if debug_port > 9322 {
        PORT_COUNTER.store(9222, std::sync::atomic::Ordering::Relaxed);
    }

    let mut builder = headless_chrome::LaunchOptions::default_builder();
    builder
        .headless(config.headless)
        .window_size(Some((config.window_width, config.window_height)))
        .port(Some(debug_port));
    if is_container {
        builder.sandbox(false);
    }
    if let Some(path) = &chrome_path {
        builder.path(Some(path.clone()));
    }

    let options = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build Chrome launch options: {}", e))?;
    let browser = headless_chrome::Browser::new(options)
        .map_err(|e| anyhow::anyhow!("Failed to launch headless Chrome: {}", e))?;

    Ok(BrowserGuard {
        browser,
        _permit: permit,
    })
}
