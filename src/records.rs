//! Business records and final assembly
//!
//! The assembler owns the record list: matchers receive it by reference and
//! fill fields in place, never reorder it. Output order is name-discovery
//! order.

use crate::config::MatchingConfig;
use crate::name_filter::NameFilter;
use crate::proximity::assign_phones_by_proximity;
use crate::site_matcher::{SiteMatcher, WebsiteEmailPair};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: String,
    pub number: String,
    pub website: String,
    pub emails: Vec<String>,
}

impl BusinessRecord {
    pub fn new(name: String) -> Self {
        Self {
            name,
            number: String::new(),
            website: String::new(),
            emails: Vec::new(),
        }
    }

    pub fn has_contact_channel(&self) -> bool {
        !self.number.is_empty() || !self.website.is_empty() || !self.emails.is_empty()
    }
}

/// Harvest output envelope, serialized as the top level of the JSON export
#[derive(Debug, Serialize, Deserialize)]
pub struct HarvestReport {
    pub timestamp: String,
    #[serde(rename = "searchQuery")]
    pub search_query: String,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    pub results: Vec<BusinessRecord>,
}

impl HarvestReport {
    pub fn new(search_query: String, results: Vec<BusinessRecord>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            search_query,
            total_results: results.len(),
            results,
        }
    }
}

/// One empty-contact record per validated unique name, in discovery order.
/// The validity filter runs again here so the assembler holds its own
/// postcondition regardless of what produced the name list.
pub fn build_records(names: &[String], filter: &NameFilter) -> Vec<BusinessRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
            continue;
        }
        if filter.is_valid_business_name(trimmed) {
            records.push(BusinessRecord::new(trimmed.to_string()));
        }
    }
    records
}

/// Full correlation pass over extracted signals: build records, pair phones
/// by proximity, assign websites and emails by score, then drop records
/// that end up with no contact channel at all.
///
/// `pairs` must already be resolved (websites fetched, emails extracted);
/// no I/O happens here.
pub fn assemble(
    names: &[String],
    phones: &[String],
    raw_content: &str,
    pairs: &mut [WebsiteEmailPair],
    filter: &NameFilter,
    matching: &MatchingConfig,
) -> Vec<BusinessRecord> {
    let mut records = build_records(names, filter);
    info!("assembling {} records from {} names", records.len(), names.len());

    assign_phones_by_proximity(&mut records, phones, raw_content, matching.proximity_threshold);
    SiteMatcher::from_config(matching).assign_websites(&mut records, pairs);

    let before = records.len();
    records.retain(|r| r.has_contact_channel());
    debug!("dropped {} records with no contact channel", before - records.len());

    records
}
