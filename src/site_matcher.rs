//! Scored website/email assignment
//!
//! Business names and domains share no identifier, so assignment relies on
//! weighted lexical overlap between name tokens and the candidate domain.
//! Distinctive tokens score far above generic vocabulary: in a single
//! vertical and region, shared words like "centre" or "formation" are the
//! dominant source of false matches between unrelated businesses.

use crate::config::MatchingConfig;
use crate::records::BusinessRecord;
use tracing::{debug, info};
use url::Url;

/// One fetched website and the emails recovered from it. `assigned` is a
/// one-shot claim flag: once a record takes the pair, no other record may.
#[derive(Debug, Clone)]
pub struct WebsiteEmailPair {
    pub website: String,
    pub emails: Vec<String>,
    pub assigned: bool,
}

impl WebsiteEmailPair {
    pub fn new(website: String, emails: Vec<String>) -> Self {
        Self {
            website,
            emails,
            assigned: false,
        }
    }
}

pub struct SiteMatcher {
    score_threshold: u32,
    min_token_chars: usize,
    common_words: Vec<String>,
}

impl SiteMatcher {
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self {
            score_threshold: config.score_threshold,
            min_token_chars: config.min_token_chars,
            common_words: config.common_words.clone(),
        }
    }

    /// Gives each website-less record the best-scoring unassigned pair, if
    /// that score reaches the acceptance threshold. Ties favor the earlier
    /// pair. Below-threshold best matches are logged and discarded.
    pub fn assign_websites(&self, records: &mut [BusinessRecord], pairs: &mut [WebsiteEmailPair]) {
        for record in records.iter_mut() {
            if !record.website.is_empty() {
                continue;
            }
            let tokens = self.tokens_for(&record.name);

            let mut best: Option<(usize, u32)> = None;
            for (i, pair) in pairs.iter().enumerate() {
                if pair.assigned {
                    continue;
                }
                let score = self.score(&tokens, pair);
                if score > best.map_or(0, |(_, s)| s) {
                    best = Some((i, score));
                }
            }

            match best {
                Some((i, score)) if score >= self.score_threshold => {
                    record.website = pairs[i].website.clone();
                    record.emails = pairs[i].emails.clone();
                    pairs[i].assigned = true;
                    info!(
                        "matched {} with '{}' (score {})",
                        record.website, record.name, score
                    );
                }
                Some((i, score)) => {
                    debug!(
                        "weak match rejected: {} with '{}' (score {} < {})",
                        pairs[i].website, record.name, score, self.score_threshold
                    );
                }
                None => {}
            }
        }
    }

    fn tokens_for(&self, name: &str) -> Vec<String> {
        name.to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() >= self.min_token_chars)
            .map(|w| w.to_string())
            .collect()
    }

    fn score(&self, tokens: &[String], pair: &WebsiteEmailPair) -> u32 {
        let Some((host, main)) = host_parts(&pair.website) else {
            return 0;
        };
        let mut score = 0u32;

        // Leading host label vs name tokens
        for word in tokens {
            let common = self.is_common(word);
            let len = word.chars().count();
            if *word == main {
                score += if common { 15 } else { 30 };
            } else if main.contains(word.as_str()) {
                score += if common {
                    3
                } else if len <= 6 {
                    20
                } else {
                    15
                };
            } else if word.contains(main.as_str()) && main.chars().count() >= 4 {
                score += if common { 3 } else { 10 };
            }
        }

        // Email domains vs name tokens
        for email in &pair.emails {
            let Some(email_main) = email.split('@').nth(1).and_then(|d| d.split('.').next())
            else {
                continue;
            };
            for word in tokens {
                let common = self.is_common(word);
                let len = word.chars().count();
                if word.as_str() == email_main {
                    score += if common { 12 } else { 25 };
                } else if email_main.contains(word.as_str()) {
                    score += if common {
                        2
                    } else if len <= 6 {
                        15
                    } else {
                        12
                    };
                } else if word.contains(email_main) && email_main.chars().count() >= 4 {
                    score += if common { 2 } else { 8 };
                }
            }
        }

        // Full host vs name tokens
        for word in tokens {
            let common = self.is_common(word);
            let len = word.chars().count();
            if host.contains(word.as_str()) {
                score += if common {
                    2
                } else if len <= 6 {
                    25
                } else {
                    20
                };
            }
        }

        score
    }

    fn is_common(&self, word: &str) -> bool {
        self.common_words.iter().any(|w| w == word)
    }
}

fn host_parts(website: &str) -> Option<(String, String)> {
    let parsed = Url::parse(website).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let main = host.split('.').next()?.to_string();
    Some((host, main))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn matcher() -> SiteMatcher {
        let config: AppConfig = toml::from_str(crate::config::DEFAULT_CONFIG).unwrap();
        SiteMatcher::from_config(&config.matching)
    }

    fn record(name: &str) -> BusinessRecord {
        BusinessRecord::new(name.to_string())
    }

    #[test]
    fn test_distinctive_token_assigns_pair() {
        let m = matcher();
        let mut records = vec![record("NassimSEO Création Site Web")];
        let mut pairs = vec![WebsiteEmailPair::new(
            "https://nassimseo.com".to_string(),
            vec!["contact@nassimseo.com".to_string()],
        )];

        m.assign_websites(&mut records, &mut pairs);

        assert_eq!(records[0].website, "https://nassimseo.com");
        assert_eq!(records[0].emails, vec!["contact@nassimseo.com".to_string()]);
        assert!(pairs[0].assigned);
    }

    #[test]
    fn test_unrelated_site_not_assigned() {
        let m = matcher();
        let mut records = vec![record("Atlas Bakery")];
        let mut pairs = vec![WebsiteEmailPair::new(
            "https://randomtech.ma".to_string(),
            vec![],
        )];

        m.assign_websites(&mut records, &mut pairs);

        assert!(records[0].website.is_empty());
        assert!(!pairs[0].assigned);
    }

    #[test]
    fn test_common_vocabulary_stays_below_threshold() {
        let m = matcher();
        let mut records = vec![record("Centre Formation")];
        let mut pairs = vec![WebsiteEmailPair::new(
            "https://centreformation.ma".to_string(),
            vec![],
        )];

        m.assign_websites(&mut records, &mut pairs);

        // Both tokens are generic vocabulary; their damped awards sum to 10
        assert!(records[0].website.is_empty());
        assert!(!pairs[0].assigned);
    }

    #[test]
    fn test_exact_common_match_still_assigns() {
        let m = matcher();
        let mut records = vec![record("Formation Académie")];
        let mut pairs = vec![WebsiteEmailPair::new("https://formation.ma".to_string(), vec![])];

        m.assign_websites(&mut records, &mut pairs);

        // Exact label equality carries even for a generic word
        assert_eq!(records[0].website, "https://formation.ma");
    }

    #[test]
    fn test_pair_assigned_once() {
        let m = matcher();
        let mut records = vec![record("Webmarko Agence"), record("Webmarko Studio")];
        let mut pairs = vec![WebsiteEmailPair::new(
            "https://webmarko.ma".to_string(),
            vec!["info@webmarko.ma".to_string()],
        )];

        m.assign_websites(&mut records, &mut pairs);

        assert_eq!(records[0].website, "https://webmarko.ma");
        assert!(records[1].website.is_empty());
        assert!(records[1].emails.is_empty());
    }

    #[test]
    fn test_tie_favors_earlier_pair() {
        let m = matcher();
        let mut records = vec![record("Webmarko Agence")];
        let mut pairs = vec![
            WebsiteEmailPair::new("https://webmarko.ma".to_string(), vec![]),
            WebsiteEmailPair::new("https://webmarko.net".to_string(), vec![]),
        ];

        m.assign_websites(&mut records, &mut pairs);

        assert_eq!(records[0].website, "https://webmarko.ma");
        assert!(!pairs[1].assigned);
    }

    #[test]
    fn test_email_domain_alone_can_assign() {
        let m = matcher();
        let mut records = vec![record("Atlas Team")];
        let mut pairs = vec![WebsiteEmailPair::new(
            "https://randomthing.ma".to_string(),
            vec!["hello@atlas.ma".to_string()],
        )];

        m.assign_websites(&mut records, &mut pairs);

        assert_eq!(records[0].website, "https://randomthing.ma");
    }

    #[test]
    fn test_empty_email_pair_still_eligible() {
        let m = matcher();
        let mut records = vec![record("Webmarko Agence")];
        let mut pairs = vec![WebsiteEmailPair::new("https://webmarko.ma".to_string(), vec![])];

        m.assign_websites(&mut records, &mut pairs);

        assert_eq!(records[0].website, "https://webmarko.ma");
        assert!(records[0].emails.is_empty());
    }

    #[test]
    fn test_preassigned_website_skipped() {
        let m = matcher();
        let mut records = vec![record("Webmarko Agence")];
        records[0].website = "https://already.ma".to_string();
        let mut pairs = vec![WebsiteEmailPair::new("https://webmarko.ma".to_string(), vec![])];

        m.assign_websites(&mut records, &mut pairs);

        assert_eq!(records[0].website, "https://already.ma");
        assert!(!pairs[0].assigned);
    }

    #[test]
    fn test_short_tokens_ignored() {
        let m = matcher();
        let mut records = vec![record("Top Web Pro")];
        let mut pairs = vec![WebsiteEmailPair::new("https://topwebpro.ma".to_string(), vec![])];

        m.assign_websites(&mut records, &mut pairs);

        // Every token is under four characters, so nothing scores
        assert!(records[0].website.is_empty());
    }
}
