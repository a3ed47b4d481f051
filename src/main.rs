// Allow dead code for functions that are part of the API surface but not used in all code paths
#![allow(dead_code)]

use anyhow::Result;
use clap::Parser;
use ctrlc;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;

mod browser_pool;
mod cli;
mod config;
mod email_fetch;
mod export;
mod extract;
mod interrupt;
mod logger;
mod map_page;
mod name_filter;
mod proximity;
mod records;
mod site_matcher;

use cli::{Args, Cli};
use config::AppConfig;
use email_fetch::{EmailCache, SiteFetcher};
use extract::SignalExtractor;
use logger::{HarvestLogger, VerbosityLevel};
use map_page::MapSearchPage;
use name_filter::NameFilter;
use records::HarvestReport;
use site_matcher::WebsiteEmailPair;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let args = Args::from(&cli);

    if args.no_color {
        // console and indicatif honor this
        std::env::set_var("NO_COLOR", "1");
    }

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_ansi(!args.no_color)
        .with_writer(std::io::stderr)
        .init();

    // Handle --init flag first (before any other processing)
    if args.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!(
                    "✅ Created default configuration file at: {}",
                    path.display()
                );
                println!("   Edit this file to customize settings, then run mapleads again.");
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Load configuration
    let mut app_config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(config::ConfigError::FileNotFound(path)) => {
            // Config not found - prompt to create if interactive
            match AppConfig::prompt_create_config() {
                Ok(Some(created_path)) => {
                    println!(
                        "✅ Created default configuration file at: {}",
                        created_path.display()
                    );
                    println!("   Edit this file to customize settings, then run mapleads again.");
                    std::process::exit(0);
                }
                Ok(None) => {
                    eprintln!("⚠️  Configuration file not found at: {}", path.display());
                    eprintln!("   Proceeding with built-in defaults (run --init to customize).");
                    match AppConfig::load_embedded() {
                        Ok(cfg) => cfg,
                        Err(e) => {
                            eprintln!("❌ Configuration error: {}", e);
                            std::process::exit(1);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("❌ Failed to create configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let verbosity = VerbosityLevel::from_verbose_count(args.verbose);
    let logger = Arc::new(match &args.log_file {
        Some(log_file_path) => HarvestLogger::with_log_file(verbosity, log_file_path.clone()),
        None => HarvestLogger::new(verbosity),
    });

    // First Ctrl-C raises the flag and lets the long phases wind down at
    // their next unit boundary; a second Ctrl-C exits immediately
    ctrlc::set_handler(move || {
        if interrupt::request_interrupt() {
            eprintln!("\n⚠️  Interrupt received. Finishing current phase and exporting collected results...");
            eprintln!("   Press Ctrl-C again to exit immediately.");
        } else {
            eprintln!("\n⚠️  Force exiting (results may be incomplete).");
            std::process::exit(130); // 130 = 128 + SIGINT(2), standard exit code for Ctrl-C
        }
    })
    .unwrap_or_else(|e| {
        eprintln!(
            "⚠️  Warning: Failed to set Ctrl-C handler: {}. Interrupt signals may not be handled gracefully.",
            e
        );
    });

    // Validate arguments
    if let Err(e) = args.validate() {
        logger.error(&format!("Invalid arguments: {}", e));
        std::process::exit(1);
    }

    // Handle --clear-cache (needs the configured cache directory)
    if args.clear_cache {
        let cache = EmailCache::load(&app_config.cache).await;
        match cache.clear().await {
            Ok(count) => {
                logger.log_cache_cleared(count);
                println!("✅ Cleared {} cached email lookups.", count);
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to clear cache: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Apply CLI overrides to the loaded configuration
    if args.no_headless {
        app_config.browser.headless = false;
    }
    if let Some(rounds) = args.max_scroll_rounds {
        app_config.search.max_scroll_rounds = rounds;
    }
    let app_config = app_config;

    let email_fetch_enabled = !args.no_email_fetch;

    // Print consolidated initialization status block
    eprintln!();
    if app_config.browser.headless {
        eprintln!(
            "✅ ENABLED: Headless browser rendering ({}x{} viewport)",
            app_config.browser.window_width, app_config.browser.window_height
        );
    } else {
        eprintln!("❌ DISABLED: Headless mode (browser window will be visible)");
    }
    if email_fetch_enabled {
        eprintln!(
            "✅ ENABLED: Website email fetch (batches of {}, {} retries per site)",
            app_config.http.batch_size, app_config.http.max_retries
        );
    } else {
        eprintln!("❌ DISABLED: Website email fetch (via --no-email-fetch)");
    }
    if app_config.cache.enabled && email_fetch_enabled {
        eprintln!(
            "✅ ENABLED: Email lookup cache (directory: {})",
            app_config.cache.dir
        );
    } else {
        eprintln!("❌ DISABLED: Email lookup cache");
    }
    if app_config.extraction.on_page_email_fallback {
        eprintln!(
            "✅ ENABLED: On-page email fallback (max {} addresses)",
            app_config.extraction.max_on_page_emails
        );
    } else {
        eprintln!("❌ DISABLED: On-page email fallback");
    }
    if !args.variation.is_empty() {
        eprintln!(
            "✅ ENABLED: Query variations ({} queued, {} max)",
            args.variation.len(),
            app_config.search.max_variations
        );
    }
    eprintln!();

    // Query is required at this point since --init and --clear-cache were not used
    let query = args
        .query
        .as_ref()
        .expect("Search query is required when not using --init or --clear-cache");

    // Resolve output format and filename
    let output_format = args
        .output_format
        .clone()
        .unwrap_or_else(|| app_config.output.default_format.clone());
    let output_stem = args
        .output
        .clone()
        .unwrap_or_else(|| app_config.output.default_stem.clone());

    let output_filename = if output_stem.contains('.') {
        output_stem.clone()
    } else if output_stem == app_config.output.default_stem {
        match output_format.as_str() {
            "html" => format!("Business Leads for {}.html", query),
            "json" => format!("Business Leads for {}.json", query),
            "markdown" => format!("Business Leads for {}.md", query),
            _ => format!("Business Leads for {}.csv", query),
        }
    } else {
        let extension = match output_format.as_str() {
            "markdown" => "md",
            other => other,
        };
        format!("{}.{}", output_stem, extension)
    };

    let output_dir = match args.get_output_dir() {
        Ok(dir) => dir,
        Err(e) => {
            logger.error(&format!("Failed to determine output directory: {}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        logger.error(&format!(
            "Failed to create output directory '{}': {}",
            output_dir, e
        ));
        std::process::exit(1);
    }

    let output_path = Path::new(&output_dir).join(&output_filename);
    let output_path_str = output_path.to_string_lossy();

    // Confirm the output location, skipping the prompt when stdin is not a terminal
    println!("📁 Output file will be saved to: {}", output_path_str);
    let is_interactive = std::io::stdin().is_terminal();
    let final_output_path = if is_interactive {
        eprintln!();
        print!("Press Enter to continue or type a different directory path: ");
        let _ = io::Write::flush(&mut io::stdout());

        let mut user_input = String::new();
        if let Err(e) = io::stdin().read_line(&mut user_input) {
            logger.warn(&format!(
                "Failed to read stdin: {}, using default output path",
                e
            ));
        }
        let user_input = user_input.trim();

        if user_input.is_empty() {
            output_path_str.to_string()
        } else {
            let custom_path = Path::new(user_input).join(&output_filename);
            custom_path.to_string_lossy().to_string()
        }
    } else {
        // Non-interactive mode: use default path without prompting
        output_path_str.to_string()
    };

    println!("✅ Results will be saved to: {}", final_output_path);

    browser_pool::set_max_instances(app_config.browser.max_concurrent);

    logger.log_initialization(query);
    for variation in &args.variation {
        logger.log_variation_queued(variation);
    }

    let report = run_harvest(&args, &app_config, &logger, query).await?;

    logger.log_export_start(&output_format);

    match output_format.as_str() {
        "json" => export::export_json(&report, &final_output_path)?,
        "markdown" => export::export_markdown(&report, &final_output_path)?,
        "html" => export::export_html(&report, &final_output_path)?,
        _ => export::export_csv(&report, &final_output_path)?,
    }

    logger.log_export_success(&final_output_path);

    export::print_harvest_summary(&report);

    logger.record_end();
    logger.print_final_summary();

    // Export logs to file if enabled
    if logger.is_log_export_enabled() {
        match logger.export_logs() {
            Ok(()) => {
                if let Some(ref log_file) = args.log_file {
                    println!("📄 Execution logs exported to: {}", log_file);
                    println!("   Total log entries: {}", logger.get_log_count());
                }
            }
            Err(e) => {
                eprintln!("⚠️ Warning: Failed to export logs: {}", e);
            }
        }
    }

    if interrupt::is_interrupted() {
        std::process::exit(130);
    }

    Ok(())
}

/// Drive the full harvest: render the search page, extract the raw signals,
/// fetch candidate websites for emails, and assemble the final records.
async fn run_harvest(
    args: &Args,
    config: &AppConfig,
    logger: &HarvestLogger,
    query: &str,
) -> Result<HarvestReport> {
    logger.record_start();

    let page = MapSearchPage::new(
        config.search.clone(),
        config.browser.clone(),
        config.http.user_agent.clone(),
    );
    logger.log_navigation_start(&page.search_url(query));
    let snapshot = page.capture_snapshot(query, &args.variation).await?;
    logger.log_snapshot_captured(snapshot.len());

    let filter = NameFilter::from_config(&config.filters)?;
    let extractor = SignalExtractor::from_config(&config.extraction)?;

    let names = extractor.extract_business_names(&snapshot, &filter);
    let phones = extractor.extract_phone_numbers(&snapshot);
    let urls = extractor.extract_website_urls(&snapshot);
    logger.log_extraction_summary(names.len(), phones.len(), urls.len());

    let mut pairs: Vec<WebsiteEmailPair> = if args.no_email_fetch || interrupt::is_interrupted() {
        if interrupt::is_interrupted() {
            logger.warn("Interrupted, skipping website fetch");
        } else {
            logger.log_fetch_skipped();
        }
        urls.iter()
            .map(|url| WebsiteEmailPair::new(url.clone(), Vec::new()))
            .collect()
    } else {
        let cache = EmailCache::load(&config.cache).await;
        let fetcher = SiteFetcher::new(&config.http, config.matching.min_site_host_chars)?;
        logger.log_fetch_start(urls.len());
        logger.start_progress(urls.len() as u64).await;
        let pairs = fetcher
            .fetch_website_pairs(&urls, &extractor, &cache, Some(logger))
            .await;
        logger.finish_progress("Website fetch finished").await;
        logger.record_websites_fetched(pairs.len());
        logger.log_fetch_complete(pairs.iter().filter(|p| !p.emails.is_empty()).count());
        pairs
    };

    if config.extraction.on_page_email_fallback {
        let extra = email_fetch::on_page_pairs(
            &snapshot,
            &extractor,
            config.extraction.max_on_page_emails,
        );
        if !extra.is_empty() {
            logger.debug(&format!(
                "Added {} on-page email pairs to the candidate pool",
                extra.len()
            ));
            pairs.extend(extra);
        }
    }

    let results = records::assemble(
        &names,
        &phones,
        &snapshot,
        &mut pairs,
        &filter,
        &config.matching,
    );
    logger.log_assembly_complete(results.len());

    Ok(HarvestReport::new(query.to_string(), results))
}
