//! Website fetching and email recovery
//!
//! Candidate websites are fetched in small batches and their pages mined
//! for contact emails. Results are memoized on disk per URL so repeated
//! runs against the same search never re-fetch a site. A failed fetch is
//! not an error: it yields an empty email list and the pair stays eligible
//! for matching.

use crate::config::{CacheConfig, HttpConfig};
use crate::extract::SignalExtractor;
use crate::interrupt;
use crate::site_matcher::WebsiteEmailPair;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use url::Url;

/// Cache behavior:
/// - Each fetched URL gets its own JSON file in the cache directory
/// - Failed fetches are cached as empty email lists, so a dead site is
///   not retried on the next run
/// - Delete specific cache files to refresh one site, or the whole
///   directory (or run with --clear-cache) to start over
pub struct EmailCache {
    cache_dir: PathBuf,
    enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct EmailCacheEntry {
    url: String,
    emails: Vec<String>,
    fetched_at: u64,
    cache_version: u32,
}

impl EmailCache {
    const CACHE_VERSION: u32 = 1;

    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache_dir: PathBuf::from(&config.dir),
            enabled: config.enabled,
        }
    }

    /// Initialize the cache directory
    pub async fn load(config: &CacheConfig) -> Self {
        let cache = Self::new(config);
        if cache.enabled {
            if let Err(e) = tokio::fs::create_dir_all(&cache.cache_dir).await {
                debug!("Failed to create cache directory: {}", e);
            } else {
                debug!("Email cache ready in {:?}", cache.cache_dir);
            }
        }
        cache
    }

    pub async fn get(&self, url: &str) -> Option<Vec<String>> {
        if !self.enabled {
            return None;
        }
        let path = self.cache_file_path(url);
        if let Ok(content) = tokio::fs::read_to_string(&path).await {
            if let Ok(entry) = serde_json::from_str::<EmailCacheEntry>(&content) {
                if entry.cache_version == Self::CACHE_VERSION {
                    debug!("Cache hit for {}: {} emails", url, entry.emails.len());
                    return Some(entry.emails);
                }
                debug!("Cache version mismatch for {}, refetching", url);
            }
        }
        None
    }

    pub async fn put(&self, url: &str, emails: &[String]) {
        if !self.enabled {
            return;
        }
        let entry = EmailCacheEntry {
            url: url.to_string(),
            emails: emails.to_vec(),
            fetched_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            cache_version: Self::CACHE_VERSION,
        };
        match serde_json::to_string_pretty(&entry) {
            Ok(content) => {
                if let Err(e) = tokio::fs::write(self.cache_file_path(url), content).await {
                    debug!("Failed to write cache entry for {}: {}", url, e);
                }
            }
            Err(e) => debug!("Failed to serialize cache entry for {}: {}", url, e),
        }
    }

    /// Remove all cached lookups, returning how many files were deleted
    pub async fn clear(&self) -> Result<usize> {
        let mut count = 0;
        if let Ok(mut entries) = tokio::fs::read_dir(&self.cache_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                if entry.path().extension().and_then(|s| s.to_str()) == Some("json") {
                    if let Err(e) = tokio::fs::remove_file(entry.path()).await {
                        debug!("Failed to remove cache file {:?}: {}", entry.path(), e);
                    } else {
                        count += 1;
                    }
                }
            }
        }
        info!("Cleared {} cached email lookups", count);
        Ok(count)
    }

    /// Cache file path for a URL, sanitized against path traversal
    fn cache_file_path(&self, url: &str) -> PathBuf {
        let stripped = url
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        let safe: String = stripped
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        let safe = safe.replace("..", "_");
        if safe.is_empty() || safe == "." {
            return self.cache_dir.join("_invalid_url_.json");
        }
        self.cache_dir.join(format!("{}.json", safe))
    }
}

/// HTTP client for business-website pages
pub struct SiteFetcher {
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
    batch_size: usize,
    batch_delay: Duration,
    min_host_chars: usize,
}

impl SiteFetcher {
    pub fn new(http: &HttpConfig, min_host_chars: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.request_timeout_secs))
            .user_agent(&http.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .danger_accept_invalid_certs(false)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            max_retries: http.max_retries.max(1),
            retry_delay: Duration::from_millis(http.retry_delay_ms),
            batch_size: http.batch_size.max(1),
            batch_delay: Duration::from_millis(http.batch_delay_ms),
            min_host_chars,
        })
    }

    /// Hosts shorter than the configured minimum are not worth fetching
    pub fn is_fetchable(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => parsed
                .host_str()
                .map_or(false, |h| h.chars().count() >= self.min_host_chars),
            Err(_) => false,
        }
    }

    /// Fetch every plausible candidate site in batches and return one pair
    /// per site, cache-first. Pairs may carry zero emails. An interrupt
    /// stops the loop at the next batch boundary and returns the pairs
    /// fetched so far.
    pub async fn fetch_website_pairs(
        &self,
        urls: &[String],
        extractor: &SignalExtractor,
        cache: &EmailCache,
        logger: Option<&crate::logger::HarvestLogger>,
    ) -> Vec<WebsiteEmailPair> {
        let candidates: Vec<&String> = urls.iter().filter(|u| self.is_fetchable(u)).collect();
        info!(
            "fetching {} candidate sites ({} URLs extracted)",
            candidates.len(),
            urls.len()
        );

        let mut pairs = Vec::with_capacity(candidates.len());
        let chunks: Vec<_> = candidates.chunks(self.batch_size).collect();
        let total_batches = chunks.len();

        for (batch_index, chunk) in chunks.into_iter().enumerate() {
            // An interrupt lands between batches: the batch in flight
            // finishes, the rest are skipped, and the pairs collected so
            // far go on to matching and export
            if interrupt::is_interrupted() {
                warn!(
                    "Interrupted, skipping {} remaining fetch batches",
                    total_batches - batch_index
                );
                break;
            }

            let batch_futures: Vec<_> = chunk
                .iter()
                .map(|url| {
                    let url = url.as_str();
                    async move {
                        if let Some(cached) = cache.get(url).await {
                            return WebsiteEmailPair::new(url.to_string(), cached);
                        }
                        let emails = self.fetch_site_emails(url, extractor).await;
                        cache.put(url, &emails).await;
                        WebsiteEmailPair::new(url.to_string(), emails)
                    }
                })
                .collect();

            pairs.extend(futures::future::join_all(batch_futures).await);

            if let Some(logger) = logger {
                logger.advance_progress(chunk.len() as u64).await;
                logger
                    .update_progress(&format!("Batch {}/{}", batch_index + 1, total_batches))
                    .await;
            }

            if batch_index + 1 < total_batches {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        pairs
    }

    async fn fetch_site_emails(&self, url: &str, extractor: &SignalExtractor) -> Vec<String> {
        for attempt in 1..=self.max_retries {
            match self.try_fetch(url).await {
                Ok(body) => {
                    let emails = extractor.extract_emails(&body);
                    if !emails.is_empty() {
                        info!("Found {} emails on {}", emails.len(), url);
                    }
                    return emails;
                }
                Err(e) => {
                    debug!(
                        "fetch attempt {}/{} for {} failed: {}",
                        attempt, self.max_retries, url, e
                    );
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        warn!("Giving up on {} after {} attempts", url, self.max_retries);
        Vec::new()
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(body)
    }
}

/// Pairs synthesized from emails found in the search snapshot itself, the
/// website inferred from the email domain. The regular scorer decides
/// whether any record claims them.
pub fn on_page_pairs(
    snapshot: &str,
    extractor: &SignalExtractor,
    max: usize,
) -> Vec<WebsiteEmailPair> {
    let mut emails = extractor.extract_emails(snapshot);
    emails.truncate(max);
    emails
        .into_iter()
        .filter_map(|email| {
            let domain = email.split('@').nth(1)?.to_string();
            Some(WebsiteEmailPair::new(format!("https://{}", domain), vec![email]))
        })
        .collect()
}
