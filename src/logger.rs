use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::RwLock;
use std::io::{self, Write};
use std::fs::OpenOptions;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Silent = 0,    // Only show progress bar and final summary
    Summary = 1,   // High-level harvest progress (default)
    Detailed = 2,  // Detailed steps, results, warnings
    Debug = 3,     // All messages including debug info and errors
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }
}

#[derive(Clone)]
pub struct HarvestLogger {
    verbosity: VerbosityLevel,
    progress_bar: Arc<RwLock<Option<ProgressBar>>>,
    harvest_metadata: Arc<Mutex<HarvestMetadata>>,
    log_buffer: Arc<Mutex<Vec<String>>>,
    log_file_path: Option<String>,
}

#[derive(Default, Clone)]
struct HarvestMetadata {
    start_time: Option<SystemTime>,
    end_time: Option<SystemTime>,
    names_extracted: usize,
    phones_extracted: usize,
    candidate_urls: usize,
    websites_fetched: usize,
    records_assembled: usize,
    output_file: String,
}

impl HarvestLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: Arc::new(RwLock::new(None)),
            harvest_metadata: Arc::new(Mutex::new(HarvestMetadata::default())),
            log_buffer: Arc::new(Mutex::new(Vec::new())),
            log_file_path: None,
        }
    }

    pub fn with_log_file(verbosity: VerbosityLevel, log_file_path: String) -> Self {
        Self {
            verbosity,
            progress_bar: Arc::new(RwLock::new(None)),
            harvest_metadata: Arc::new(Mutex::new(HarvestMetadata::default())),
            log_buffer: Arc::new(Mutex::new(Vec::new())),
            log_file_path: Some(log_file_path),
        }
    }

    // Core logging functions with consistent timestamp formatting
    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_message("WARN", message);
        }
    }

    pub fn error(&self, message: &str) {
        // Errors are always shown regardless of verbosity
        self.print_message("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Debug {
            self.print_message("DEBUG", message);
        }
    }

    fn print_message(&self, level: &str, message: &str) {
        let timestamp = self.get_timestamp();
        let msg = format!("[{}] {}: {}", timestamp, level, message);

        // Store in log buffer if log file export is enabled
        if self.log_file_path.is_some() {
            if let Ok(mut buffer) = self.log_buffer.lock() {
                buffer.push(msg.clone());
            }
        }

        // Route through the progress bar's println to avoid clobbering it
        if let Ok(guard) = self.progress_bar.try_read() {
            if let Some(pb) = guard.as_ref() {
                pb.println(msg);
                return;
            }
        }

        // Fallback if no progress bar
        eprintln!("{}", msg);
    }

    fn get_timestamp(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let secs = now.as_secs();
        let millis = now.subsec_millis();

        let hours = (secs / 3600) % 24;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    // Progress bar management for the website fetch phase
    pub async fn start_progress(&self, total_steps: u64) {
        let pb = ProgressBar::new(total_steps);

        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| {
                    // Fallback to a simpler template if the complex one fails
                    ProgressStyle::default_bar()
                        .template("{bar:40} {pos}/{len} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                })
                .progress_chars("##-"),
        );

        pb.set_message("Initializing...");

        let mut progress_guard = self.progress_bar.write().await;
        *progress_guard = Some(pb);

        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.start_time = Some(SystemTime::now());
    }

    pub async fn update_progress(&self, message: &str) {
        if let Some(pb) = self.progress_bar.read().await.as_ref() {
            pb.set_message(message.to_string());
        }
    }

    pub async fn advance_progress(&self, steps: u64) {
        if let Some(pb) = self.progress_bar.read().await.as_ref() {
            pb.inc(steps);
        }
    }

    pub async fn finish_progress(&self, final_message: &str) {
        let mut progress_guard = self.progress_bar.write().await;
        if let Some(pb) = progress_guard.take() {
            pb.finish_and_clear();
        }

        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.end_time = Some(SystemTime::now());

        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", final_message);
        }
    }

    // Metadata recording functions
    pub fn record_start(&self) {
        let mut metadata = self.harvest_metadata.lock().unwrap();
        if metadata.start_time.is_none() {
            metadata.start_time = Some(SystemTime::now());
        }
    }

    pub fn record_end(&self) {
        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.end_time = Some(SystemTime::now());
    }

    pub fn record_names_extracted(&self, count: usize) {
        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.names_extracted = count;
    }

    pub fn record_phones_extracted(&self, count: usize) {
        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.phones_extracted = count;
    }

    pub fn record_candidate_urls(&self, count: usize) {
        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.candidate_urls = count;
    }

    pub fn record_websites_fetched(&self, count: usize) {
        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.websites_fetched += count;
    }

    pub fn record_records_assembled(&self, count: usize) {
        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.records_assembled = count;
    }

    pub fn record_output_file(&self, path: &str) {
        let mut metadata = self.harvest_metadata.lock().unwrap();
        metadata.output_file = path.to_string();
    }

    // Final summary of the run itself; per-record stats are printed by
    // export::print_harvest_summary.
    pub fn print_final_summary(&self) {
        let metadata = self.harvest_metadata.lock().unwrap();

        // Clear any remaining progress bar artifacts
        print!("\x1b[2K\r");
        let _ = io::stdout().flush();

        println!("\n=== HARVEST SUMMARY ===");

        if let (Some(start), Some(end)) = (metadata.start_time, metadata.end_time) {
            let duration = end.duration_since(start).unwrap_or_default();
            println!("Harvest Duration: {:.2}s", duration.as_secs_f64());
        }

        println!("Business Names Extracted: {}", metadata.names_extracted);
        println!("Phone Numbers Extracted: {}", metadata.phones_extracted);
        println!("Candidate Websites: {}", metadata.candidate_urls);
        println!("Websites Fetched: {}", metadata.websites_fetched);
        println!("Records Collected: {}", metadata.records_assembled);

        if !metadata.output_file.is_empty() {
            println!("Results Exported: {}", metadata.output_file);
        }

        println!("=======================\n");

        if metadata.records_assembled > 0 {
            println!(
                "✅ Harvest completed successfully! Collected {} business records.",
                metadata.records_assembled
            );
        } else {
            println!("✅ Harvest completed. No business records with contact details found.");
        }
    }

    // Specialized logging methods for the harvest phases
    pub fn log_initialization(&self, query: &str) {
        self.info(&format!("Starting business harvest for query: {}", query));
    }

    pub fn log_navigation_start(&self, url: &str) {
        self.info(&format!("Rendering search page: {}", url));
    }

    pub fn log_snapshot_captured(&self, bytes: usize) {
        self.info(&format!("Search page snapshot captured ({} bytes)", bytes));
    }

    pub fn log_extraction_summary(&self, names: usize, phones: usize, urls: usize) {
        self.record_names_extracted(names);
        self.record_phones_extracted(phones);
        self.record_candidate_urls(urls);
        self.info(&format!(
            "Extracted {} business names, {} phone numbers, {} candidate websites",
            names, phones, urls
        ));
    }

    pub fn log_fetch_start(&self, url_count: usize) {
        self.info(&format!(
            "Fetching {} candidate websites for email addresses",
            url_count
        ));
    }

    pub fn log_fetch_complete(&self, pairs_with_emails: usize) {
        self.info(&format!(
            "Website fetch completed: {} sites yielded email addresses",
            pairs_with_emails
        ));
    }

    pub fn log_fetch_skipped(&self) {
        self.info("Website email fetch disabled, matching on domain names only");
    }

    pub fn log_assembly_complete(&self, record_count: usize) {
        self.record_records_assembled(record_count);
        self.info(&format!(
            "Assembled {} business records with contact details",
            record_count
        ));
    }

    pub fn log_variation_queued(&self, variation: &str) {
        self.debug(&format!("Queued search variation: {}", variation));
    }

    pub fn log_export_start(&self, format: &str) {
        self.info(&format!("Exporting results in {} format", format));
    }

    pub fn log_export_success(&self, path: &str) {
        self.record_output_file(path);
        self.info(&format!("Export completed: {}", path));
    }

    pub fn log_cache_cleared(&self, count: usize) {
        self.info(&format!("Cleared {} cached email lookups", count));
    }

    /// Export all collected logs to the specified file
    pub fn export_logs(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref log_file_path) = self.log_file_path {
            if let Ok(buffer) = self.log_buffer.lock() {
                // Create parent directories if they don't exist
                if let Some(parent) = Path::new(log_file_path).parent() {
                    std::fs::create_dir_all(parent)?;
                }

                let mut file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(log_file_path)?;

                for log_entry in buffer.iter() {
                    writeln!(file, "{}", log_entry)?;
                }

                file.flush()?;
                return Ok(());
            }
        }
        Ok(())
    }

    /// Check if log export is enabled
    pub fn is_log_export_enabled(&self) -> bool {
        self.log_file_path.is_some()
    }

    /// Get the current number of logged messages
    pub fn get_log_count(&self) -> usize {
        if let Ok(buffer) = self.log_buffer.lock() {
            buffer.len()
        } else {
            0
        }
    }
}
