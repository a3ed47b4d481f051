mod common;

use common::fixtures;
use mapleads::config::AppConfig;
use mapleads::extract::SignalExtractor;
use mapleads::name_filter::NameFilter;

fn extractor() -> SignalExtractor {
    let config = AppConfig::load_embedded().unwrap();
    SignalExtractor::from_config(&config.extraction).unwrap()
}

fn name_filter() -> NameFilter {
    let config = AppConfig::load_embedded().unwrap();
    NameFilter::from_config(&config.filters).unwrap()
}

#[test]
fn test_names_found_by_all_three_strategies() {
    let snapshot = fixtures::search_snapshot();
    let names = extractor().extract_business_names(&snapshot, &name_filter());

    assert_eq!(
        names,
        vec![
            "Webmarko Agence Digital".to_string(),
            "NassimSEO Création Site Web".to_string(),
            "Atlas Web Studio".to_string(),
        ],
        "expected one name per strategy, in discovery order"
    );
}

#[test]
fn test_chrome_and_review_text_never_become_names() {
    let snapshot = fixtures::search_snapshot();
    let names = extractor().extract_business_names(&snapshot, &name_filter());

    assert!(!names.iter().any(|n| n == "Partager"));
    assert!(!names.iter().any(|n| n.contains("recommande")));
    assert!(!names.iter().any(|n| n.starts_with("0ah")), "tracking segment leaked: {:?}", names);
}

#[test]
fn test_phone_numbers_normalized_in_discovery_order() {
    let snapshot = fixtures::search_snapshot();
    let phones = extractor().extract_phone_numbers(&snapshot);

    assert_eq!(
        phones,
        vec![
            "0661-511183".to_string(),
            "0662334455".to_string(),
            "0537123456".to_string(),
        ]
    );
}

#[test]
fn test_website_urls_keep_business_hosts_only() {
    let snapshot = fixtures::search_snapshot();
    let urls = extractor().extract_website_urls(&snapshot);

    assert_eq!(
        urls,
        vec![
            "https://webmarko.ma".to_string(),
            "https://atlasweb.ma".to_string(),
            "https://www.nassimseo.com".to_string(),
        ],
        "platform and asset hosts must be rejected"
    );
}

#[test]
fn test_variation_content_extends_every_extractor() {
    let snapshot = fixtures::search_snapshot_with_variation();
    let e = extractor();

    let names = e.extract_business_names(&snapshot, &name_filter());
    assert_eq!(names.len(), 4);
    assert!(names.contains(&"Fennec Digital Solutions".to_string()), "{:?}", names);

    let phones = e.extract_phone_numbers(&snapshot);
    assert_eq!(phones.len(), 4);
    assert!(phones.contains(&"0770-112233".to_string()));

    let urls = e.extract_website_urls(&snapshot);
    assert_eq!(urls.len(), 4);
    assert!(urls.contains(&"https://fennecdigital.ma".to_string()));
}

#[test]
fn test_noise_snapshot_extracts_nothing() {
    let snapshot = fixtures::noise_snapshot();
    let e = extractor();

    assert!(e.extract_business_names(&snapshot, &name_filter()).is_empty());
    assert!(e.extract_phone_numbers(&snapshot).is_empty());
    assert!(e.extract_website_urls(&snapshot).is_empty());
}

#[test]
fn test_business_page_emails_deduplicated_across_mailto_and_text() {
    let page = fixtures::business_site_html("Webmarko", &["contact@webmarko.ma"]);
    let emails = extractor().extract_emails(&page);

    // The address appears in both the mailto href and the link text
    assert_eq!(emails, vec!["contact@webmarko.ma".to_string()]);
}
