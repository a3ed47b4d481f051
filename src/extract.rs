//! Signal extraction from rendered page snapshots
//!
//! Turns a raw search-results snapshot into candidate lists: business names
//! (three independent strategies), phone numbers, website URLs, and emails
//! from fetched business pages. Everything here is best-effort over noisy
//! markup; a strategy that finds nothing returns an empty list.

use crate::config::{ConfigError, ExtractionConfig};
use crate::name_filter::NameFilter;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Selectors queried for business-name text. The results page renders
/// listing titles in several different container shapes depending on
/// layout experiments, so the list is deliberately broad; the filters
/// downstream absorb the noise this produces.
const DOM_NAME_SELECTOR_LIST: &[&str] = &[
    // Primary listing containers
    r#"[role="article"] h3"#,
    r#"[role="article"] [role="button"] span"#,
    r#"[role="article"] a[href*="/maps/place/"] span"#,
    r#"[role="article"] div[role="button"] span"#,
    // Alternative article markup
    "article h3",
    r#"article [role="button"] span"#,
    r#"article a[href*="/maps/place/"] span"#,
    // Legacy section-result markup
    ".section-result-title",
    ".section-result-content h3",
    ".section-result h3",
    ".section-listresult-title",
    // Data attribute containers
    "[data-result-index] h3",
    r#"[data-result-index] [role="button"] span"#,
    r#"[data-result-index] a[href*="/maps/place/"] span"#,
    "[data-cid] h3",
    "[data-feature-id] h3",
    // Place links
    r#"a[href*="/maps/place/"] span"#,
    r#"a[href*="/maps/place/"] div"#,
    r#"a[href*="/maps/place/"] h3"#,
    // Interactive elements
    r#"[jsaction*="mouseover"] h3"#,
    r#"[jsaction*="mouseover"] span[role="button"]"#,
    r#"[jsaction*="mouseover"] div[role="button"] span"#,
    r#"[jsaction*="click"] h3"#,
    r#"[jsaction*="click"] span"#,
    // Main content area
    r#"[role="main"] h3"#,
    r#"[role="main"] [role="button"] span"#,
    r#"[role="main"] [role="region"] h3"#,
    r#"[role="main"] [role="region"] [role="button"] span"#,
    r#"[role="main"] [role="region"] a[href*="/maps/place/"] span"#,
    // Feed containers
    r#"[role="feed"] h3"#,
    r#"[role="feed"] [role="button"] span"#,
    r#"[role="feed"] a[href*="/maps/place/"] span"#,
    // Labeled result regions
    r#"div[aria-label*="results"] h3"#,
    r#"div[aria-label*="results"] span"#,
    r#"[aria-label*="business"] h3"#,
    r#"[aria-label*="business"] span"#,
    // Obfuscated class-name fragments that survive releases
    r#"div[class*="fontHeadlineSmall"]"#,
    r#"span[class*="fontHeadlineSmall"]"#,
    r#"h3[class*="fontHeadlineSmall"]"#,
    r#"div[class*="fontBodyMedium"]"#,
    r#"span[class*="fontBodyMedium"]"#,
    r#"[data-result-index] div[class*="fontHeadlineSmall"]"#,
    r#"[data-result-index] span[class*="fontHeadlineSmall"]"#,
    r#"[data-cid] div[class*="fontHeadlineSmall"]"#,
    r#"[data-cid] span[class*="fontHeadlineSmall"]"#,
    "div[jsaction] h3",
    r#"div[jsaction] span[class*="fontHeadlineSmall"]"#,
    r#"div[jsaction] div[class*="fontHeadlineSmall"]"#,
    r#"div[role="button"] span[class*="fontHeadlineSmall"]"#,
    r#"a[role="button"] span[class*="fontHeadlineSmall"]"#,
    r#"button span[class*="fontHeadlineSmall"]"#,
    r#"div[tabindex="0"] h3"#,
    r#"div[tabindex="0"] span[class*="fontHeadlineSmall"]"#,
    r#"div[tabindex="0"] div[class*="fontHeadlineSmall"]"#,
];

// Compile CSS selectors once at startup. The .unwrap() calls are safe because
// the selector strings are compile-time constants with valid CSS syntax.
static DOM_NAME_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    DOM_NAME_SELECTOR_LIST
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

static PLACE_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="/maps/place/"]"#).unwrap()
});

// Review text shares the DOM regions business names appear in. These match
// the openers of review sentences and other user-generated fragments.
static REVIEW_OPENERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(très|super|excellent|parfait|génial|bien|mal|mauvais|nul)",
        r"(?i)^(je|j'|nous|on|il|elle|ils|elles|vous|tu|c'est|c'était)",
        r"(?i)^(recommande|conseille|déconseille|éviter|à éviter)",
        r"(?i)^(service|accueil|personnel|équipe|staff|client|clientèle)",
        r"(?i)^(prix|tarif|coût|cher|pas cher|gratuit|payant)",
        r"(?i)^(rapide|lent|long|court|vite|rapidement)",
        r"(?i)^(merci|thanks|thank you|bravo|félicitations)",
        r"(?i)^(problème|souci|bug|erreur|panne|défaut)",
        r"(?i)^(avis|commentaire|review|opinion|expérience)",
        r"(?i)^(hier|aujourd'hui|demain|maintenant|récemment)",
        r"(?i)^(depuis|pendant|durant|après|avant|lors)",
        r"(?i)^\d+\s*(ans?|mois|jours?|heures?|minutes?|semaines?)$",
        r"(?i)^(mais|cependant|néanmoins|toutefois|pourtant)",
        r"(?i)^(vraiment|assez|très|trop|plutôt|quite|rather)",
        r"(?i)^(bonjour|bonsoir|salut|hello|hi|bye|au revoir)",
        r"(?i)il y a \d+",
        r"(?i)^\w+\s+(est|était|sera|serait|a|avait|aura)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Name shapes accepted by the DOM strategy's keyword gate
static SHAPE_CAPITALIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z\s]{4,}$").unwrap());
static SHAPE_SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+\s+(est|était|sera|a|avait)\b").unwrap());
static SHAPE_ACRONYM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,}$").unwrap());
static SHAPE_CAMEL_CASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][a-z]+[A-Z][a-z]+").unwrap());
static SHAPE_MULTI_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+\s+[A-Z][a-zA-Z]+$").unwrap());

// Tracking-token shapes leaking out of place-link segments and data payloads
static TRACKING_TOKEN_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0ah[A-Za-z0-9]+").unwrap());
static LONG_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]{25,}").unwrap());
static CODE_SHAPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").unwrap());
static SEGMENT_CODE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]{20,}").unwrap());
static URL_SHAPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());
static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\u([0-9A-Fa-f]{4})").unwrap());
static MULTI_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// Fragments of the page's own navigation tokens that show up in
/// place-link segments
const TRACKING_FRAGMENTS: &[&str] = &[
    "UKEw", "QzCc", "zCc", "oAA", "oEQ", "oEg", "oFA", "oFQ", "oFg", "oCQ",
    "oCA", "oEw", "oAw",
];

/// Distance, rating and separator markers that only appear in listing
/// metadata lines, never in names
const METADATA_MARKERS: &[&str] = &["km", "min", "★", "·"];

/// Compiled extraction patterns, built once from `[extraction]` config.
pub struct SignalExtractor {
    phone_patterns: Vec<Regex>,
    min_phone_digits: usize,
    max_phone_digits: usize,
    embedded_patterns: Vec<Regex>,
    email_pattern: fancy_regex::Regex,
    email_blacklist: Vec<String>,
    min_email_chars: usize,
    max_email_chars: usize,
    regional_url: Regex,
    generic_url: Regex,
    max_url_chars: usize,
    min_generic_url_chars: usize,
    host_denylist: Vec<String>,
    tracking_params: Vec<String>,
    business_keywords: Vec<String>,
}

impl SignalExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let mut phone_patterns = Vec::with_capacity(config.phone_patterns.len());
        for (i, pattern) in config.phone_patterns.iter().enumerate() {
            phone_patterns.push(compile(&format!("extraction.phone_patterns[{}]", i), pattern)?);
        }

        let mut embedded_patterns = Vec::with_capacity(config.embedded_name_patterns.len());
        for (i, pattern) in config.embedded_name_patterns.iter().enumerate() {
            embedded_patterns.push(compile(
                &format!("extraction.embedded_name_patterns[{}]", i),
                pattern,
            )?);
        }

        let email_pattern = fancy_regex::Regex::new(&config.email_pattern).map_err(|e| {
            ConfigError::InvalidRegex {
                pattern_name: "extraction.email_pattern".to_string(),
                pattern: config.email_pattern.clone(),
                error: e.to_string(),
            }
        })?;

        Ok(Self {
            phone_patterns,
            min_phone_digits: config.min_phone_digits,
            max_phone_digits: config.max_phone_digits,
            embedded_patterns,
            email_pattern,
            email_blacklist: config.email_blacklist.clone(),
            min_email_chars: config.min_email_chars,
            max_email_chars: config.max_email_chars,
            regional_url: compile("extraction.regional_url_pattern", &config.regional_url_pattern)?,
            generic_url: compile("extraction.generic_url_pattern", &config.generic_url_pattern)?,
            max_url_chars: config.max_url_chars,
            min_generic_url_chars: config.min_generic_url_chars,
            host_denylist: config.host_denylist.clone(),
            tracking_params: config.tracking_params.clone(),
            business_keywords: config.business_keywords.clone(),
        })
    }

    /// Union of the three name strategies, deduplicated in discovery order
    /// and validated through the business-name filter.
    pub fn extract_business_names(&self, snapshot: &str, filter: &NameFilter) -> Vec<String> {
        let document = Html::parse_document(snapshot);

        let dom_names = self.names_from_dom(&document);
        let link_names = self.names_from_place_links(&document);
        let embedded_names = self.names_from_embedded_data(snapshot);
        debug!(
            "name candidates: dom={} links={} embedded={}",
            dom_names.len(),
            link_names.len(),
            embedded_names.len()
        );

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for candidate in dom_names.into_iter().chain(link_names).chain(embedded_names) {
            let trimmed = candidate.trim().to_string();
            if trimmed.is_empty() || !seen.insert(trimmed.clone()) {
                continue;
            }
            if filter.is_valid_business_name(&trimmed) {
                names.push(trimmed);
            }
        }

        debug!("{} unique valid business names", names.len());
        names
    }

    /// DOM-text strategy: listing-title selectors plus a keyword-or-shape
    /// gate. Leaf text alone catches far too much incidental chrome; the
    /// gate keeps only strings that read like a business identity.
    fn names_from_dom(&self, document: &Html) -> Vec<String> {
        let mut names = Vec::new();
        for selector in DOM_NAME_SELECTORS.iter() {
            for element in document.select(selector) {
                let text = element.text().collect::<String>();
                let text = text.trim();
                if !self.passes_dom_battery(text) {
                    continue;
                }
                if self.keyword_or_shape(text) {
                    names.push(text.to_string());
                }
            }
        }
        names
    }

    fn passes_dom_battery(&self, text: &str) -> bool {
        let len = text.chars().count();
        if len <= 3 || len >= 80 {
            return false;
        }
        if METADATA_MARKERS.iter().any(|m| text.contains(m)) {
            return false;
        }
        !looks_like_review_text(text)
    }

    fn keyword_or_shape(&self, text: &str) -> bool {
        if self.business_keywords.iter().any(|k| text.contains(k.as_str())) {
            return true;
        }
        if SHAPE_CAPITALIZED.is_match(text) && !SHAPE_SENTENCE_START.is_match(text) {
            return true;
        }
        if SHAPE_ACRONYM.is_match(text) && text.chars().count() <= 10 {
            return true;
        }
        if SHAPE_CAMEL_CASE.is_match(text) && !text.contains(' ') {
            return true;
        }
        if SHAPE_MULTI_WORD.is_match(text) && text.split_whitespace().count() <= 4 {
            return true;
        }
        false
    }

    /// URL-derived strategy: the first path segment after `/maps/place/`
    /// is the percent-encoded display name.
    fn names_from_place_links(&self, document: &Html) -> Vec<String> {
        let mut names = Vec::new();
        for element in document.select(&PLACE_LINK_SELECTOR) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(rest) = href.split("/maps/place/").nth(1) else {
                continue;
            };
            let Some(segment) = rest.split('/').next() else {
                continue;
            };
            let Ok(decoded) = urlencoding::decode(segment) else {
                continue;
            };
            let mut name = decoded.replace('+', " ");
            // Coordinates ride along after an @ separator
            if let Some(at) = name.find('@') {
                name.truncate(at);
            }
            let name = name.trim();
            if passes_token_battery(name) && !looks_like_review_text(name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Embedded-data strategy: quoted display names sitting next to the
    /// page's client-side data-payload delimiters. Coupled to an unstable
    /// internal format, so it is isolated here and can be retired by
    /// clearing `extraction.embedded_name_patterns`.
    fn names_from_embedded_data(&self, snapshot: &str) -> Vec<String> {
        let mut names = Vec::new();
        for pattern in &self.embedded_patterns {
            for caps in pattern.captures_iter(snapshot) {
                let Some(m) = caps.get(1) else {
                    continue;
                };
                let decoded = decode_unicode_escapes(m.as_str()).replace('\\', "");
                let name = decoded.trim();
                if URL_SHAPED.is_match(name) || DIGITS_ONLY.is_match(name) {
                    continue;
                }
                if name.contains("google.com") {
                    continue;
                }
                if passes_token_battery(name) && !looks_like_review_text(name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// All regional mobile patterns, normalized and digit-count bounded.
    pub fn extract_phone_numbers(&self, raw: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut phones = Vec::new();
        for pattern in &self.phone_patterns {
            for m in pattern.find_iter(raw) {
                let normalized = normalize_phone(m.as_str());
                let digits = normalized.chars().filter(|c| c.is_ascii_digit()).count();
                if digits < self.min_phone_digits || digits > self.max_phone_digits {
                    continue;
                }
                if seen.insert(normalized.clone()) {
                    phones.push(normalized);
                }
            }
        }
        debug!("{} phone numbers extracted", phones.len());
        phones
    }

    /// Two passes over quoted URLs: regional TLD first, then generic TLDs.
    /// Tracking parameters are stripped before any acceptance check so the
    /// working set never carries attribution noise.
    pub fn extract_website_urls(&self, raw: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for (pattern, generic) in [(&self.regional_url, false), (&self.generic_url, true)] {
            for caps in pattern.captures_iter(raw) {
                let Some(m) = caps.get(1) else {
                    continue;
                };
                let unescaped: String = m
                    .as_str()
                    .chars()
                    .filter(|c| *c != '\\' && *c != '"' && *c != '\'')
                    .collect();
                let cleaned = self.clean_tracking_parameters(&unescaped);
                if !self.accept_url(&cleaned, generic) {
                    continue;
                }
                if seen.insert(cleaned.clone()) {
                    urls.push(cleaned);
                }
            }
        }

        debug!("{} website URLs extracted", urls.len());
        urls
    }

    fn accept_url(&self, url: &str, generic_pass: bool) -> bool {
        if !url.starts_with("http") {
            return false;
        }
        let len = url.chars().count();
        if len >= self.max_url_chars {
            return false;
        }
        if generic_pass && len <= self.min_generic_url_chars {
            return false;
        }

        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host_lower = host.to_lowercase();
        if self.host_denylist.iter().any(|d| host_lower.contains(d.as_str())) {
            return false;
        }
        if host_lower.split('.').count() < 2 {
            return false;
        }

        // A 20+ character alphanumeric run in the last path segment is a
        // tracking identifier, not a page
        let last_segment = url.rsplit('/').next().unwrap_or_default();
        if SEGMENT_CODE_RUN.is_match(last_segment) {
            return false;
        }

        true
    }

    /// Strips analytics/attribution query parameters. Unparseable input is
    /// returned unchanged.
    pub fn clean_tracking_parameters(&self, url: &str) -> String {
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };

        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !self.tracking_params.iter().any(|t| t == key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            let mut pairs = parsed.query_pairs_mut();
            pairs.clear();
            for (key, value) in &kept {
                pairs.append_pair(key, value);
            }
            pairs.finish();
        }

        let mut cleaned = parsed.to_string();
        if cleaned.ends_with('/') && parsed.path() == "/" {
            cleaned.pop();
        }
        cleaned
    }

    /// Lowercased, deduplicated emails with placeholder local-parts and
    /// asset-shaped matches removed.
    pub fn extract_emails(&self, page: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut emails = Vec::new();
        for m in self.email_pattern.find_iter(page) {
            let Ok(m) = m else {
                continue;
            };
            let email = m.as_str().to_lowercase();
            let len = email.chars().count();
            if len <= self.min_email_chars || len >= self.max_email_chars {
                continue;
            }
            if self.email_blacklist.iter().any(|b| email.contains(b.as_str())) {
                continue;
            }
            if email.contains("image") || email.contains("photo") {
                continue;
            }
            if seen.insert(email.clone()) {
                emails.push(email);
            }
        }
        emails
    }
}

/// Shared rejection battery for name candidates coming out of link
/// segments and data payloads.
fn passes_token_battery(name: &str) -> bool {
    let len = name.chars().count();
    if len <= 3 || len >= 80 {
        return false;
    }
    if TRACKING_TOKEN_PREFIX.is_match(name) || LONG_ALNUM_RUN.is_match(name) {
        return false;
    }
    if TRACKING_FRAGMENTS.iter().any(|f| name.contains(f)) {
        return false;
    }
    if CODE_SHAPED.is_match(name) {
        return false;
    }
    true
}

fn looks_like_review_text(name: &str) -> bool {
    REVIEW_OPENERS.iter().any(|p| p.is_match(name))
}

fn normalize_phone(raw: &str) -> String {
    let without_spaces: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    MULTI_HYPHEN.replace_all(&without_spaces, "-").into_owned()
}

fn decode_unicode_escapes(raw: &str) -> String {
    UNICODE_ESCAPE
        .replace_all(raw, |caps: &regex::Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned()
}

fn compile(name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        pattern_name: name.to_string(),
        pattern: pattern.to_string(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn extractor() -> SignalExtractor {
        let config: AppConfig = toml::from_str(crate::config::DEFAULT_CONFIG).unwrap();
        SignalExtractor::from_config(&config.extraction).unwrap()
    }

    fn name_filter() -> NameFilter {
        let config: AppConfig = toml::from_str(crate::config::DEFAULT_CONFIG).unwrap();
        NameFilter::from_config(&config.filters).unwrap()
    }

    #[test]
    fn test_phone_extraction_and_normalization() {
        let e = extractor();
        let raw = "Call 0661-511183 or +212 661 511 183 today";
        let phones = e.extract_phone_numbers(raw);
        assert!(phones.contains(&"0661-511183".to_string()));
        assert!(phones.contains(&"+212661511183".to_string()));
    }

    #[test]
    fn test_phone_digit_bounds() {
        let e = extractor();
        // Truncated numbers never reach nine digits
        assert!(e.extract_phone_numbers("0661-5111").is_empty());
        // Separator-heavy runs can satisfy a pattern with too few digits;
        // the digit-count gate drops them
        assert!(e.extract_phone_numbers("appelez 06 12 34 5 maintenant").is_empty());
    }

    #[test]
    fn test_phone_deduplication() {
        let e = extractor();
        let raw = "0661511183 ... 0661511183 ... 0661511183";
        let phones = e.extract_phone_numbers(raw);
        assert_eq!(phones, vec!["0661511183".to_string()]);
    }

    #[test]
    fn test_url_extraction_rejects_platform_hosts() {
        let e = extractor();
        let raw = r#"
            "https://webmarko.ma/services"
            "https://www.google.com/maps/preview"
            "https://lh3.googleusercontent.com/p/AF1Qip"
            "https://www.facebook.com/somepage"
        "#;
        let urls = e.extract_website_urls(raw);
        assert_eq!(urls, vec!["https://webmarko.ma/services".to_string()]);
    }

    #[test]
    fn test_url_tracking_parameters_stripped() {
        let e = extractor();
        let cleaned = e.clean_tracking_parameters("https://example.ma/page?utm_source=google&gclid=123");
        assert_eq!(cleaned, "https://example.ma/page");
    }

    #[test]
    fn test_url_tracking_strip_keeps_real_parameters() {
        let e = extractor();
        let cleaned = e.clean_tracking_parameters("https://example.ma/search?q=dentiste&utm_medium=cpc");
        assert_eq!(cleaned, "https://example.ma/search?q=dentiste");
    }

    #[test]
    fn test_url_bare_domain_loses_trailing_slash() {
        let e = extractor();
        let cleaned = e.clean_tracking_parameters("https://example.ma/?gclid=9");
        assert_eq!(cleaned, "https://example.ma");
    }

    #[test]
    fn test_url_rejects_tracking_id_segment() {
        let e = extractor();
        let raw = r#""https://site.com/p/AF1QipNrEXAMPLEtrackingtoken12345""#;
        let urls = e.extract_website_urls(raw);
        assert!(urls.is_empty());
    }

    #[test]
    fn test_url_deduplication_across_passes() {
        let e = extractor();
        // .ma URLs match both the regional and the generic pattern
        let raw = r#""https://webmarko.ma/apropos" and again "https://webmarko.ma/apropos""#;
        let urls = e.extract_website_urls(raw);
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_email_extraction_filters() {
        let e = extractor();
        let page = "contact@nassimseo.com noreply@nassimseo.com image@site.com \
                    CONTACT@NASSIMSEO.COM logo@2x.png";
        let emails = e.extract_emails(page);
        assert_eq!(emails, vec!["contact@nassimseo.com".to_string()]);
    }

    #[test]
    fn test_email_length_bounds() {
        let e = extractor();
        let long_local = format!("{}@x.com", "a".repeat(60));
        let emails = e.extract_emails(&format!("a@b.c {}", long_local));
        assert!(emails.is_empty());
    }

    #[test]
    fn test_dom_names_require_keyword_or_shape() {
        let e = extractor();
        let f = name_filter();
        let snapshot = r#"
            <html><body>
            <div role="feed">
                <h3>Webmarko Agence Digital</h3>
                <h3>Partager</h3>
                <h3>un texte quelconque sans forme</h3>
            </div>
            </body></html>
        "#;
        let names = e.extract_business_names(snapshot, &f);
        assert!(names.contains(&"Webmarko Agence Digital".to_string()));
        assert!(!names.iter().any(|n| n == "Partager"));
        assert!(!names.iter().any(|n| n.contains("quelconque")));
    }

    #[test]
    fn test_place_link_names_decoded() {
        let e = extractor();
        let f = name_filter();
        let snapshot = r#"
            <html><body>
            <a href="https://www.google.com/maps/place/NassimSEO+Cr%C3%A9ation+Site+Web/@34.03,-6.84,17z/data=x">x</a>
            <a href="https://www.google.com/maps/place/0ahUKEwjW8tr3xKmJAxXkTqQEHRkZB0MQ/@34.0,-6.8">y</a>
            </body></html>
        "#;
        let names = e.extract_business_names(snapshot, &f);
        assert!(names.contains(&"NassimSEO Création Site Web".to_string()));
        assert_eq!(names.len(), 1, "tracking token must not survive: {:?}", names);
    }

    #[test]
    fn test_embedded_names_decoded() {
        let e = extractor();
        let f = name_filter();
        let snapshot = r#"["Académie Digitale Plus",null,[12"]] "Webmarko Studio",null,null,null,null,[["#;
        let names = e.extract_business_names(snapshot, &f);
        assert!(names.contains(&"Académie Digitale Plus".to_string()), "{:?}", names);
        assert!(names.contains(&"Webmarko Studio".to_string()), "{:?}", names);
    }

    #[test]
    fn test_names_deduplicated_across_strategies() {
        let e = extractor();
        let f = name_filter();
        let snapshot = r#"
            <html><body>
            <div role="feed"><h3>Webmarko Studio</h3></div>
            <p>"Webmarko Studio",null,null,null,null,[[</p>
            </body></html>
        "#;
        let names = e.extract_business_names(snapshot, &f);
        assert_eq!(
            names.iter().filter(|n| n.as_str() == "Webmarko Studio").count(),
            1
        );
    }

    #[test]
    fn test_no_duplicates_in_any_extractor_output() {
        let e = extractor();
        let raw = r#"
            0661511183 0661511183 "https://webmarko.ma/a" "https://webmarko.ma/a"
            contact@webmarko.ma contact@webmarko.ma
        "#;
        let phones = e.extract_phone_numbers(raw);
        let urls = e.extract_website_urls(raw);
        let emails = e.extract_emails(raw);
        for list in [&phones, &urls, &emails] {
            let set: HashSet<_> = list.iter().collect();
            assert_eq!(set.len(), list.len());
        }
    }
}
