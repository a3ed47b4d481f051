//! Business-name validity filtering
//!
//! The search page mixes structural UI labels, user reviews, street
//! segments, and genuine business names in the same DOM regions. A single
//! allowlist pattern cannot separate them, so the filter is a stack of
//! independent rejection layers. Each layer is order-insensitive with
//! respect to the others.

use crate::config::{ConfigError, FiltersConfig};
use regex::Regex;

/// Layered rejection filter for business-name candidates.
///
/// Compiled once from `[filters]` configuration; all checks are pure.
pub struct NameFilter {
    min_chars: usize,
    max_chars: usize,
    ui_phrases: Vec<String>,
    street_prefix: Option<Regex>,
    bare_rating: Regex,
    rating_with_count: Regex,
    review_count: Regex,
    open_closed: Regex,
    phone_like: Regex,
    day_of_week: Regex,
    opening_hours: Regex,
    quoted: Regex,
    has_letter: Regex,
}

impl NameFilter {
    pub fn from_config(config: &FiltersConfig) -> Result<Self, ConfigError> {
        // A blank entry would put an empty branch in the alternation, and
        // `^(?:)\b` matches every word-initial candidate. No prefixes at
        // all means the street layer is simply off.
        let escaped: Vec<String> = config
            .street_prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| regex::escape(p))
            .collect();
        let street_prefix = if escaped.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)^(?:{})\b", escaped.join("|"));
            Some(compile("filters.street_prefixes", &pattern)?)
        };

        Ok(Self {
            min_chars: config.min_name_chars,
            max_chars: config.max_name_chars,
            ui_phrases: config.ui_phrases.iter().map(|p| p.to_lowercase()).collect(),
            street_prefix,
            bare_rating: compile("filters.regex.bare_rating", &config.regex.bare_rating)?,
            rating_with_count: compile("filters.regex.rating_with_count", &config.regex.rating_with_count)?,
            review_count: compile("filters.regex.review_count", &config.regex.review_count)?,
            open_closed: compile("filters.regex.open_closed", &config.regex.open_closed)?,
            phone_like: compile("filters.regex.phone_like", &config.regex.phone_like)?,
            day_of_week: compile("filters.regex.day_of_week", &config.regex.day_of_week)?,
            opening_hours: compile("filters.regex.opening_hours", &config.regex.opening_hours)?,
            quoted: compile("filters.regex.quoted", &config.regex.quoted)?,
            has_letter: compile("filters.regex.has_letter", &config.regex.has_letter)?,
        })
    }

    /// Returns true when the candidate looks like a genuine business name.
    ///
    /// Pure and deterministic: same input, same answer, no side effects.
    pub fn is_valid_business_name(&self, candidate: &str) -> bool {
        let lower = candidate.trim().to_lowercase();

        // UI chrome: containment in either direction disqualifies. An empty
        // candidate is contained by every phrase and falls out here too.
        if self
            .ui_phrases
            .iter()
            .any(|ui| lower.contains(ui.as_str()) || ui.contains(&lower))
        {
            return false;
        }

        let len = lower.chars().count();
        if len < self.min_chars || len > self.max_chars {
            return false;
        }

        // Street segments, ratings, review counts, status words, schedules
        if let Some(street_prefix) = &self.street_prefix {
            if street_prefix.is_match(&lower) {
                return false;
            }
        }
        if self.bare_rating.is_match(&lower) {
            return false;
        }
        if self.rating_with_count.is_match(&lower) {
            return false;
        }
        if self.review_count.is_match(&lower) {
            return false;
        }
        if self.open_closed.is_match(&lower) {
            return false;
        }
        if self.phone_like.is_match(&lower) {
            return false;
        }
        if self.day_of_week.is_match(&lower) {
            return false;
        }
        if self.opening_hours.is_match(&lower) {
            return false;
        }

        // Quoted text reads like a review excerpt
        if self.quoted.is_match(&lower) {
            return false;
        }

        // Must contain at least one Latin or Arabic letter
        if !self.has_letter.is_match(&lower) {
            return false;
        }

        true
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        pattern_name: name.to_string(),
        pattern: pattern.to_string(),
        error: e.to_string(),
    })
}
